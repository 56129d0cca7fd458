//! Test lifecycle controller.
//!
//! A [`Suite`] covers one fixture: [`Suite::setup`] opens the log sink and
//! initializes the client factory, [`Suite::run_test`] wraps each test body
//! with start/outcome logging, and [`Suite::teardown`] disposes everything
//! and returns the [`SuiteReport`]. Dropping a suite without tearing it down
//! still releases the factory and flushes the log.
//!
//! A fatal error (bad configuration or headers) raised by a test aborts the
//! suite: every later `run_test` is recorded as failed without running.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::assertions::ResponseAssertions;
use crate::codec;
use crate::config::Configuration;
use crate::context::RequestContext;
use crate::error::Result;
use crate::factory::ClientFactory;
use crate::http::ResponseEnvelope;
use crate::logging::{LogSink, Logger};
use crate::services::{PostService, Service, TodoService, UserService};

/// Outcome of one test body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub error: Option<String>,
}

/// Results of a whole suite, in execution order.
#[derive(Debug, Clone)]
pub struct SuiteReport {
    pub suite: String,
    pub run_id: Uuid,
    pub results: Vec<TestResult>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Panic listing every failed test, if any.
    #[track_caller]
    pub fn assert_all_passed(&self) {
        if self.all_passed() {
            return;
        }
        let failures: Vec<String> = self
            .failed()
            .map(|r| format!("  {}: {}", r.name, r.error.as_deref().unwrap_or("failed")))
            .collect();
        panic!(
            "{} of {} tests failed in {}:\n{}",
            failures.len(),
            self.results.len(),
            self.suite,
            failures.join("\n")
        );
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.suite, self.run_id)?;
        for result in &self.results {
            match &result.error {
                None => writeln!(f, "  PASS  {}", result.name)?,
                Some(message) => writeln!(f, "  FAIL  {}: {message}", result.name)?,
            }
        }
        write!(
            f,
            "{} passed, {} failed",
            self.passed(),
            self.results.len() - self.passed()
        )
    }
}

pub struct Suite {
    name: String,
    run_id: Uuid,
    config: Arc<Configuration>,
    logger: Logger,
    sink: Option<LogSink>,
    factory: ClientFactory,
    results: Mutex<Vec<TestResult>>,
    aborted: AtomicBool,
}

impl Suite {
    pub fn setup(name: impl Into<String>, config: Arc<Configuration>) -> Result<Self> {
        Self::setup_with_headers(name, config, &[])
    }

    /// Set up with headers merged over the configured ones.
    pub fn setup_with_headers(
        name: impl Into<String>,
        config: Arc<Configuration>,
        extra_headers: &[(&str, &str)],
    ) -> Result<Self> {
        let name = name.into();
        let run_id = Uuid::new_v4();
        let sink = LogSink::open(config.logging())?;
        let logger = sink.logger();

        let mut factory = ClientFactory::new(&config, logger.clone());
        if let Err(err) = factory.initialize(extra_headers) {
            logger.in_scope(|| error!(suite = %name, %err, "Test suite setup failed"));
            return Err(err);
        }

        logger.in_scope(|| {
            info!(
                suite = %name,
                %run_id,
                environment = config.environment(),
                "Test suite setup completed: {name}"
            );
        });

        Ok(Self {
            name,
            run_id,
            config,
            logger,
            sink: Some(sink),
            factory,
            results: Mutex::new(Vec::new()),
            aborted: AtomicBool::new(false),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// The primary request context
    pub fn context(&self) -> Result<&RequestContext> {
        self.factory.context()
    }

    /// An extra context for another base URL, owned by the caller.
    pub fn create_context(&self, base_url: &str, headers: &[(&str, &str)]) -> Result<RequestContext> {
        self.factory.create_context(base_url, headers)
    }

    /// Bind a service to the primary context.
    pub fn service<'a, S: Service<'a>>(&'a self) -> Result<S> {
        Ok(S::new(self.context()?))
    }

    pub fn posts(&self) -> Result<PostService<'_>> {
        self.service()
    }

    pub fn todos(&self) -> Result<TodoService<'_>> {
        self.service()
    }

    pub fn users(&self) -> Result<UserService<'_>> {
        self.service()
    }

    /// Whether a fatal error stopped the suite
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Run one test body and record its outcome. Errors and panics both
    /// count as failures; the return value is `true` on success.
    pub async fn run_test<F>(&self, name: &str, test: F) -> bool
    where
        F: Future<Output = Result<()>>,
    {
        if self.is_aborted() {
            self.logger.in_scope(|| {
                warn!(suite = %self.name, test = name, "Test SKIPPED after fatal error: {name}");
            });
            self.record(name, Some("skipped: suite aborted by a fatal error".to_string()));
            return false;
        }

        self.logger.in_scope(|| {
            info!(suite = %self.name, test = name, "Starting test: {name}");
        });

        let error = match AssertUnwindSafe(test).catch_unwind().await {
            Ok(Ok(())) => None,
            Ok(Err(err)) => {
                if err.is_fatal() {
                    self.aborted.store(true, Ordering::SeqCst);
                }
                Some(err.to_string())
            }
            Err(payload) => Some(format!("panicked: {}", panic_message(payload.as_ref()))),
        };

        self.logger.in_scope(|| match &error {
            None => info!(suite = %self.name, test = name, "Test PASSED: {name}"),
            Some(message) => {
                error!(suite = %self.name, test = name, error = %message, "Test FAILED: {name}")
            }
        });

        let passed = error.is_none();
        self.record(name, error);
        passed
    }

    fn record(&self, name: &str, error: Option<String>) {
        let mut results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
        results.push(TestResult {
            name: name.to_string(),
            passed: error.is_none(),
            error,
        });
    }

    /// Decode a response body, logging the raw text at debug level.
    pub fn decode_response<T: DeserializeOwned>(&self, envelope: &ResponseEnvelope) -> Result<T> {
        let body = envelope.text()?;
        self.logger.in_scope(|| debug!(status = envelope.status, body, "Response body"));
        match codec::decode(body) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.logger.in_scope(|| error!(%err, "Failed to decode response"));
                Err(err)
            }
        }
    }

    /// Log actual and expected status, then check them.
    pub fn assert_status(&self, envelope: &ResponseEnvelope, expected: u16) -> Result<()> {
        let actual = envelope.status;
        self.logger.in_scope(|| {
            info!(actual, expected, "Response status: {actual} (expected: {expected})");
        });
        envelope.expect_status(expected)
    }

    /// Results recorded so far
    pub fn results(&self) -> Vec<TestResult> {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Dispose the client factory, close the log and report.
    pub fn teardown(mut self) -> SuiteReport {
        self.factory.dispose();
        let results = std::mem::take(
            &mut *self.results.lock().unwrap_or_else(PoisonError::into_inner),
        );
        let report = SuiteReport {
            suite: self.name.clone(),
            run_id: self.run_id,
            results,
        };

        self.logger.in_scope(|| {
            info!(
                suite = %report.suite,
                run_id = %report.run_id,
                passed = report.passed(),
                failed = report.results.len() - report.passed(),
                "Test suite teardown completed: {}",
                report.suite
            );
        });
        if let Some(sink) = self.sink.take() {
            sink.close();
        }
        report
    }
}

impl fmt::Debug for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("run_id", &self.run_id)
            .field("state", &self.factory.state())
            .finish_non_exhaustive()
    }
}

impl Drop for Suite {
    fn drop(&mut self) {
        self.factory.dispose();
        if let Some(sink) = self.sink.take() {
            sink.close();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
