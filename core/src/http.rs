//! HTTP request and response types shared by the transport and the tests.
//!
//! # Design
//! `ResponseEnvelope` is the raw outcome of exactly one request: status,
//! headers and the buffered body. Nothing here interprets the status code;
//! a 404 is as valid an envelope as a 200. Header lookups go through
//! `HeaderMap`, so names compare case-insensitively.

use std::fmt;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::codec;
use crate::error::{Error, Result};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// The raw response to one request, before any decoding.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ResponseEnvelope {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.body).map_err(|e| Error::decode::<str>(e))
    }

    /// First value of a header, if present and printable.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body into `T`. See [`codec::decode`] for the matching rules.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        codec::decode(self.text()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, CONTENT_TYPE};

    fn envelope(status: u16, body: &'static str) -> ResponseEnvelope {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        ResponseEnvelope::new(status, headers, body)
    }

    #[test]
    fn header_lookup_ignores_case() {
        let resp = envelope(200, "{}");
        assert_eq!(resp.header("Content-Type"), Some("application/json; charset=utf-8"));
        assert_eq!(resp.header("CONTENT-TYPE"), Some("application/json; charset=utf-8"));
        assert_eq!(resp.header("x-missing"), None);
    }

    #[test]
    fn success_covers_whole_2xx_range() {
        assert!(envelope(200, "").is_success());
        assert!(envelope(204, "").is_success());
        assert!(!envelope(199, "").is_success());
        assert!(!envelope(404, "").is_success());
    }

    #[test]
    fn non_utf8_body_is_a_decode_error() {
        let resp = ResponseEnvelope::new(200, HeaderMap::new(), vec![0xff, 0xfe]);
        assert!(matches!(resp.text(), Err(Error::Decode { .. })));
    }

    #[test]
    fn method_converts_to_reqwest() {
        assert_eq!(reqwest::Method::from(HttpMethod::Patch), reqwest::Method::PATCH);
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }
}
