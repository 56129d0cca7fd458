//! Loggers sharing one process.
//!
//! Kept in its own binary: `tracing` caches callsite interest per process,
//! so the first component to reach a callsite must be the disabled one.

mod common;

use api_harness::{ClientFactory, FactoryState, LogSink, Logger};
use common::Harness;

#[test]
fn disabled_logger_does_not_silence_a_live_sink() {
    let harness = Harness::for_url("http://localhost:3000");
    let sink = LogSink::open(harness.config.logging()).unwrap();

    let mut quiet = ClientFactory::new(&harness.config, Logger::disabled());
    quiet.initialize(&[]).unwrap();
    quiet.dispose();

    let mut factory = ClientFactory::new(&harness.config, sink.logger());
    factory.initialize(&[]).unwrap();
    assert_eq!(factory.state(), FactoryState::Initialized);
    factory.dispose();
    sink.close();

    let log = harness.log_text();
    assert!(
        log.contains("API client initialized with base URL: http://localhost:3000"),
        "missing initialize entry in log:\n{log}"
    );
    assert!(log.contains("API client disposed"), "{log}");
    assert_eq!(log.matches("API client initialized").count(), 1, "{log}");
}
