//! Owner of the shared HTTP engine and the suite's primary request context.
//!
//! Lifecycle: `Uninitialized --initialize--> Initialized --dispose--> Disposed`.
//! Disposing is idempotent and also happens on drop. The engine is created
//! lazily the first time a context needs it; secondary contexts built after
//! disposal get a fresh engine while the factory itself stays disposed.

use std::fmt;
use std::sync::OnceLock;

use tracing::info;

use crate::config::{ApiSettings, Configuration};
use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::headers::HeaderSet;
use crate::logging::Logger;

/// Certificate validation is off for every context.
const ACCEPT_INVALID_CERTS: bool = true;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryState {
    Uninitialized,
    Initialized,
    Disposed,
}

impl fmt::Display for FactoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FactoryState::Uninitialized => "uninitialized",
            FactoryState::Initialized => "initialized",
            FactoryState::Disposed => "disposed",
        })
    }
}

#[derive(Debug)]
pub struct ClientFactory {
    settings: ApiSettings,
    logger: Logger,
    engine: OnceLock<reqwest::Client>,
    primary: Option<RequestContext>,
    state: FactoryState,
}

impl ClientFactory {
    pub fn new(config: &Configuration, logger: Logger) -> Self {
        Self::from_settings(config.api().clone(), logger)
    }

    pub fn from_settings(settings: ApiSettings, logger: Logger) -> Self {
        Self {
            settings,
            logger,
            engine: OnceLock::new(),
            primary: None,
            state: FactoryState::Uninitialized,
        }
    }

    pub fn state(&self) -> FactoryState {
        self.state
    }

    /// Whether an HTTP engine currently exists
    pub fn has_engine(&self) -> bool {
        self.engine.get().is_some()
    }

    fn engine(&self) -> Result<&reqwest::Client> {
        if let Some(client) = self.engine.get() {
            return Ok(client);
        }
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(ACCEPT_INVALID_CERTS)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP engine: {e}")))?;
        Ok(self.engine.get_or_init(|| client))
    }

    /// Build the primary context from the configured settings.
    ///
    /// Headers are layered as JSON defaults, then `api.headers`, then
    /// `extra_headers`; later layers win on name collisions.
    pub fn initialize(&mut self, extra_headers: &[(&str, &str)]) -> Result<()> {
        if self.state != FactoryState::Uninitialized {
            return Err(Error::invalid_state("initialize", self.state));
        }

        let headers = HeaderSet::json_defaults()
            .merge(&self.settings.headers)?
            .merge(extra_headers.iter().copied())?;
        let client = self.engine()?.clone();
        let context = RequestContext::new(
            client,
            &self.settings.base_url,
            headers,
            self.settings.timeout,
            ACCEPT_INVALID_CERTS,
            self.logger.clone(),
        );

        self.primary = Some(context);
        self.state = FactoryState::Initialized;

        let settings = &self.settings;
        self.logger.in_scope(|| {
            info!(
                base_url = %settings.base_url,
                timeout_ms = settings.timeout.as_millis() as u64,
                retry_count = settings.retry_count,
                "API client initialized with base URL: {}",
                settings.base_url
            );
        });
        Ok(())
    }

    /// The primary context. Only available while initialized.
    pub fn context(&self) -> Result<&RequestContext> {
        match (&self.primary, self.state) {
            (Some(context), FactoryState::Initialized) => Ok(context),
            _ => Err(Error::invalid_state("access the request context", self.state)),
        }
    }

    /// Build an independent context for another base URL. The caller owns it.
    ///
    /// `headers` are merged over the JSON defaults only; configured
    /// `api.headers` belong to the primary context.
    pub fn create_context(&self, base_url: &str, headers: &[(&str, &str)]) -> Result<RequestContext> {
        let parsed = reqwest::Url::parse(base_url)
            .map_err(|e| Error::Configuration(format!("invalid base URL '{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Configuration(format!(
                "base URL must use http or https, got '{base_url}'"
            )));
        }

        let headers = HeaderSet::json_defaults().merge(headers.iter().copied())?;
        let client = self.engine()?.clone();
        let context = RequestContext::new(
            client,
            base_url,
            headers,
            self.settings.timeout,
            ACCEPT_INVALID_CERTS,
            self.logger.clone(),
        );

        self.logger.in_scope(|| {
            info!(base_url = %context.base_url(), "Created request context for {}", context.base_url());
        });
        Ok(context)
    }

    /// Release the primary context and the engine. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.state == FactoryState::Disposed {
            return;
        }
        let primary = self.primary.take();
        self.engine.take();
        self.state = FactoryState::Disposed;

        let base_url = primary
            .as_ref()
            .map_or(self.settings.base_url.as_str(), |context| context.base_url());
        self.logger.in_scope(|| {
            info!(base_url = %base_url, "API client disposed");
        });
    }
}

impl Drop for ClientFactory {
    fn drop(&mut self) {
        self.dispose();
    }
}
