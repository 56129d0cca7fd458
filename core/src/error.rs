//! Error types for the API test harness.
//!
//! # Design
//! Non-2xx responses are never errors here: they come back as
//! `ResponseEnvelope` data and only become `Assertion` failures when a test
//! says so. `Configuration` and `InvalidHeader` are the only fatal kinds;
//! everything else is scoped to the single test that raised it.

use thiserror::Error;

use crate::http::HttpMethod;

/// Result type alias using the harness error type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Configuration key '{key}' is not set")]
    MissingConfiguration { key: String },

    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    // === Lifecycle Errors ===
    #[error("Cannot {action} while the client factory is {state}")]
    InvalidState { action: String, state: String },

    // === Transport Errors ===
    #[error("{method} {url} failed before a response was received: {source}")]
    Transport {
        method: HttpMethod,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // === Codec Errors ===
    #[error("Failed to decode response body as {target}: {message}")]
    Decode { target: String, message: String },

    #[error("Failed to encode request payload: {0}")]
    Serialization(#[from] serde_json::Error),

    // === Assertion Errors ===
    #[error("Assertion failed for {subject}: expected {expected}, got {actual}")]
    Assertion {
        subject: String,
        expected: String,
        actual: String,
    },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid state error
    pub fn invalid_state(action: &str, state: impl std::fmt::Display) -> Self {
        Self::InvalidState {
            action: action.to_string(),
            state: state.to_string(),
        }
    }

    /// Create an assertion failure from anything printable
    pub fn assertion(
        subject: &str,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::Assertion {
            subject: subject.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a decode error naming the target type
    pub fn decode<T: ?Sized>(message: impl std::fmt::Display) -> Self {
        Self::Decode {
            target: short_type_name::<T>().to_string(),
            message: message.to_string(),
        }
    }

    /// Whether this error must abort the whole suite rather than one test.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::InvalidHeader { .. })
    }
}

/// `alloc::vec::Vec<api_harness::types::Post>` → `Vec<Post>`
fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for ch in full.chars() {
        match ch {
            ':' => segment.clear(),
            '<' | '>' | ',' | ' ' | '[' | ']' | ';' | '&' | '(' | ')' => {
                out.push_str(&segment);
                segment.clear();
                out.push(ch);
            }
            _ => segment.push(ch),
        }
    }
    out.push_str(&segment);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_configuration_errors_are_fatal() {
        assert!(Error::Configuration("x".into()).is_fatal());
        assert!(Error::InvalidHeader {
            name: "a b".into(),
            reason: "bad".into()
        }
        .is_fatal());
        assert!(!Error::MissingConfiguration { key: "k".into() }.is_fatal());
        assert!(!Error::assertion("status", 200, 404).is_fatal());
        assert!(!Error::invalid_state("read context", "disposed").is_fatal());
    }

    #[test]
    fn assertion_message_carries_both_values() {
        let err = Error::assertion("status code", 201, 400);
        assert_eq!(
            err.to_string(),
            "Assertion failed for status code: expected 201, got 400"
        );
    }

    #[test]
    fn decode_error_uses_short_type_name() {
        let err = Error::decode::<Vec<crate::types::Post>>("boom");
        match err {
            Error::Decode { target, .. } => assert_eq!(target, "Vec<Post>"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
