#![allow(dead_code)]

use pipetest::encoder::{Outcome, TestCase, TestContext, TestInfo};

type Body = Box<dyn Fn(&mut TestContext) -> Outcome>;

/// A test case backed by a closure.
pub struct FnTest {
    info: TestInfo,
    body: Body,
}

impl FnTest {
    pub fn new<F>(id: &str, body: F) -> Self
    where
        F: Fn(&mut TestContext) -> Outcome + 'static,
    {
        Self {
            info: TestInfo::new(id),
            body: Box::new(body),
        }
    }

    pub fn with_doc(mut self, doc: &str) -> Self {
        self.info = self.info.with_doc(doc);
        self
    }

    /// A test that always reports `outcome`.
    pub fn returning(id: &str, outcome: Outcome) -> Self {
        Self::new(id, move |_| outcome.clone())
    }

    pub fn passing(id: &str) -> Self {
        Self::returning(id, Outcome::Success)
    }
}

impl TestCase for FnTest {
    fn info(&self) -> TestInfo {
        self.info.clone()
    }

    fn run(&self, ctx: &mut TestContext) -> Outcome {
        (self.body)(ctx)
    }
}

/// Deterministic clock: always one second after the epoch.
pub fn fixed_clock() -> f64 {
    1.0
}
