#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use pipetest::events::{Event, EventRegistry};

pub use pipetest_test_utils::builders;
pub use pipetest_test_utils::init_tracing;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Bind a handler for each of `kinds` that clones the event into a shared log.
pub fn record<E>(registry: &mut EventRegistry<E>, kinds: &[E::Kind]) -> Arc<Mutex<Vec<E>>>
where
    E: Event + Clone + Send + 'static,
{
    let log = Arc::new(Mutex::new(Vec::new()));
    for kind in kinds {
        let log = Arc::clone(&log);
        registry.bind(*kind, move |event: &E| {
            log.lock().unwrap().push(event.clone());
        });
    }
    log
}
