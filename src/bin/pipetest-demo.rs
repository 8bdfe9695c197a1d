// src/bin/pipetest-demo.rs

//! A small test executor built on the encoder.
//!
//! It follows the executor invocation contract (`--testdir DIR` followed by
//! optional labels) and streams its built-in suite as result frames on
//! stdout. Useful as a `[executor] program` for trying the runner end to end.

use std::fmt::Write as _;

use clap::Parser;
use tracing::debug;

use pipetest::encoder::{
    select_tests, Outcome, PathStyle, PipedRunner, SubFailure, Suite, TestCase, TestContext,
    TestInfo,
};

#[derive(Debug, Parser)]
#[command(name = "pipetest-demo", about = "Demo test executor speaking the pipetest protocol.")]
struct DemoArgs {
    /// Directory the tests would be discovered in (unused by the demo suite).
    #[arg(long, value_name = "DIR", default_value = ".")]
    testdir: String,

    /// Report `<package>.<Case>.<method>` instead of full test ids.
    #[arg(long)]
    package_paths: bool,

    #[arg(value_name = "LABEL", trailing_var_arg = true)]
    labels: Vec<String>,
}

struct DemoTest {
    id: &'static str,
    doc: &'static str,
    body: fn(&mut TestContext) -> Outcome,
}

impl TestCase for DemoTest {
    fn info(&self) -> TestInfo {
        TestInfo::new(self.id).with_doc(self.doc)
    }

    fn run(&self, ctx: &mut TestContext) -> Outcome {
        (self.body)(ctx)
    }
}

fn prints_greeting(_: &mut TestContext) -> Outcome {
    print!("hello from body");
    Outcome::Success
}

fn mixes_context_and_stdout(ctx: &mut TestContext) -> Outcome {
    let _ = writeln!(ctx, "from the context");
    println!("printed line");
    Outcome::Success
}

fn checks_arithmetic(_: &mut TestContext) -> Outcome {
    if 2 + 2 == 4 {
        Outcome::Success
    } else {
        Outcome::Failure("arithmetic is broken".to_string())
    }
}

fn compares_table(ctx: &mut TestContext) -> Outcome {
    for (input, expected) in [(1, 1), (2, 4), (3, 10)] {
        ctx.subtest(&format!("square of {input}"), |_| {
            if input * input == expected {
                Ok(())
            } else {
                Err(SubFailure::Fail(format!("{input}^2 != {expected}")))
            }
        });
    }
    Outcome::Success
}

fn demo_suites() -> Vec<Suite> {
    vec![
        Suite::new("demo.tests.greeting.Greeting")
            .with_test(DemoTest {
                id: "demo.tests.greeting.Greeting.test_prints",
                doc: "Prints straight to stdout.",
                body: prints_greeting,
            })
            .with_test(DemoTest {
                id: "demo.tests.greeting.Greeting.test_mixed",
                doc: "Writes to the context, then to stdout.",
                body: mixes_context_and_stdout,
            }),
        Suite::new("demo.tests.math.Math")
            .with_test(DemoTest {
                id: "demo.tests.math.Math.test_add",
                doc: "",
                body: checks_arithmetic,
            })
            .with_test(DemoTest {
                id: "demo.tests.math.Math.test_squares",
                doc: "Squares of small numbers.",
                body: compares_table,
            }),
    ]
}

fn main() -> anyhow::Result<()> {
    let args = DemoArgs::parse();
    debug!(testdir = %args.testdir, labels = ?args.labels, "running demo suite");

    let mut suites = demo_suites();
    select_tests(&mut suites, &args.labels);

    let style = if args.package_paths {
        PathStyle::Package
    } else {
        PathStyle::Full
    };
    let mut runner = PipedRunner::for_stdout()?.with_path_style(style);
    runner.run(&suites)?;
    Ok(())
}
