//! Per-target request context.
//!
//! A [`RequestContext`] binds the shared HTTP engine to one base URL, one
//! header set and one timeout. Every request it sends produces a
//! [`ResponseEnvelope`] whatever the status code; only failures before a
//! response arrives become errors.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::codec;
use crate::error::{Error, Result};
use crate::headers::HeaderSet;
use crate::http::{HttpMethod, ResponseEnvelope};
use crate::logging::Logger;

#[derive(Debug)]
pub struct RequestContext {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderSet,
    timeout: Duration,
    accept_invalid_certs: bool,
    logger: Logger,
}

impl RequestContext {
    pub(crate) fn new(
        client: reqwest::Client,
        base_url: &str,
        headers: HeaderSet,
        timeout: Duration,
        accept_invalid_certs: bool,
        logger: Logger,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            headers,
            timeout,
            accept_invalid_certs,
            logger,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether TLS certificate validation is disabled for this context
    pub fn accepts_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Absolute URL for a path relative to the base URL.
    pub fn url(&self, path: &str) -> String {
        if path.is_empty() {
            return self.base_url.clone();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get(&self, path: &str) -> Result<ResponseEnvelope> {
        self.send(HttpMethod::Get, path, None).await
    }

    pub async fn delete(&self, path: &str) -> Result<ResponseEnvelope> {
        self.send(HttpMethod::Delete, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ResponseEnvelope> {
        let body = codec::encode(body)?;
        self.send(HttpMethod::Post, path, Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ResponseEnvelope> {
        let body = codec::encode(body)?;
        self.send(HttpMethod::Put, path, Some(body)).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ResponseEnvelope> {
        let body = codec::encode(body)?;
        self.send(HttpMethod::Patch, path, Some(body)).await
    }

    /// Send one request and buffer the whole response.
    pub async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
    ) -> Result<ResponseEnvelope> {
        let url = self.url(path);
        let transport = |source: reqwest::Error| Error::Transport {
            method,
            url: url.clone(),
            source,
        };

        let mut request = self
            .client
            .request(method.into(), &url)
            .headers(self.headers.as_map().clone())
            .timeout(self.timeout);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(transport)?;

        self.logger.in_scope(|| {
            debug!(%method, %url, status, bytes = body.len(), "response received");
        });
        Ok(ResponseEnvelope::new(status, headers, body))
    }
}
