//! Assertion helpers for response envelopes and decoded fields.
//!
//! Every check returns `Err(Error::Assertion)` on mismatch so a test body can
//! use `?` and let the suite record the failure.

use std::fmt::Debug;

use reqwest::header::CONTENT_TYPE;
use tracing::info;

use crate::error::{Error, Result};
use crate::headers::JSON;
use crate::http::ResponseEnvelope;
use crate::logging::Logger;

/// Compare two values; `subject` names what is being checked.
pub fn expect_eq<T: PartialEq + Debug>(subject: &str, expected: T, actual: T) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::assertion(
            subject,
            format!("{expected:?}"),
            format!("{actual:?}"),
        ))
    }
}

/// Fail unless `condition` holds. `expectation` describes the passing case,
/// e.g. `"> 0"` or `"non-empty"`.
pub fn expect_that(subject: &str, condition: bool, expectation: &str, actual: impl Debug) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::assertion(subject, expectation, format!("{actual:?}")))
    }
}

/// Checks on a raw response.
pub trait ResponseAssertions {
    fn expect_status(&self, expected: u16) -> Result<()>;

    /// Any 2xx status
    fn expect_success(&self) -> Result<()>;

    /// Header present and containing `fragment`
    fn expect_header(&self, name: &str, fragment: &str) -> Result<()>;

    /// `Content-Type` is `application/json`, parameters allowed
    fn expect_json(&self) -> Result<()>;

    fn expect_body_contains(&self, text: &str) -> Result<()>;

    /// Log status and body to `logger`, returning the body text.
    fn log_response(&self, logger: &Logger) -> Result<&str>;
}

impl ResponseAssertions for ResponseEnvelope {
    fn expect_status(&self, expected: u16) -> Result<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(Error::assertion("status code", expected, self.status))
        }
    }

    fn expect_success(&self) -> Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(Error::assertion("status code", "2xx", self.status))
        }
    }

    fn expect_header(&self, name: &str, fragment: &str) -> Result<()> {
        match self.header(name) {
            Some(value) if value.contains(fragment) => Ok(()),
            Some(value) => Err(Error::assertion(
                &format!("header '{name}'"),
                format!("value containing '{fragment}'"),
                format!("'{value}'"),
            )),
            None => Err(Error::assertion(
                &format!("header '{name}'"),
                format!("value containing '{fragment}'"),
                "no such header",
            )),
        }
    }

    fn expect_json(&self) -> Result<()> {
        self.expect_header(CONTENT_TYPE.as_str(), JSON)
    }

    fn expect_body_contains(&self, text: &str) -> Result<()> {
        let body = self.text()?;
        if body.contains(text) {
            Ok(())
        } else {
            Err(Error::assertion(
                "response body",
                format!("text containing '{text}'"),
                format!("{} bytes without it", body.len()),
            ))
        }
    }

    fn log_response(&self, logger: &Logger) -> Result<&str> {
        let body = self.text()?;
        logger.in_scope(|| {
            info!(status = self.status, "Response status: {}", self.status);
            info!(body, "Response body");
        });
        Ok(body)
    }
}
