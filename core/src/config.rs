//! Layered configuration for a test run.
//!
//! Layers, lowest precedence first:
//! 1. `appsettings.{toml,json,yaml,yml}` in the configuration directory
//! 2. `appsettings.<environment>.*` where the environment comes from
//!    `HARNESS_ENVIRONMENT` (default `development`)
//! 3. environment variables such as `HARNESS__API__BASE_URL`
//! 4. overrides set on the [`ConfigLoader`]
//!
//! The result is an immutable [`Configuration`] built once and shared by
//! reference. `api.base_url` is the only required key.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::FileFormat;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "HARNESS";

/// Variable selecting the environment overlay file
pub const ENVIRONMENT_VAR: &str = "HARNESS_ENVIRONMENT";

pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Stem of the settings files
pub const SETTINGS_FILE: &str = "appsettings";

pub const BASE_URL_KEY: &str = "api.base_url";

const FILE_FORMATS: &[(&str, FileFormat)] = &[
    ("toml", FileFormat::Toml),
    ("json", FileFormat::Json),
    ("yaml", FileFormat::Yaml),
    ("yml", FileFormat::Yaml),
];

#[derive(Debug, Deserialize, Default)]
struct RawSettings {
    #[serde(default)]
    api: RawApi,
    #[serde(default)]
    logging: LoggingSettings,
}

#[derive(Debug, Deserialize)]
struct RawApi {
    #[serde(default)]
    base_url: Option<String>,

    #[serde(default = "default_timeout_ms")]
    timeout_ms: u64,

    #[serde(default = "default_retry_count")]
    retry_count: u32,

    #[serde(default)]
    headers: BTreeMap<String, String>,
}

impl Default for RawApi {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: default_timeout_ms(),
            retry_count: default_retry_count(),
            headers: BTreeMap::new(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    30_000
}
fn default_retry_count() -> u32 {
    2
}

/// Settings for the remote API under test
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Absolute http(s) URL without a trailing slash
    pub base_url: String,

    /// Applied to every request issued through a context
    pub timeout: Duration,

    /// Advisory only; requests are never retried
    pub retry_count: u32,

    /// Custom headers merged over the defaults
    pub headers: BTreeMap<String, String>,
}

/// Log sink settings
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Directory receiving the daily log files
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,

    /// `Verbose`/`Debug`/`Information`/`Warning`/`Error`/`Fatal`, or any
    /// tracing filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also echo log lines to the test output
    #[serde(default = "default_console")]
    pub console: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            level: default_log_level(),
            console: default_console(),
        }
    }
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("logs")
}
fn default_log_level() -> String {
    "Information".to_string()
}
fn default_console() -> bool {
    true
}

impl LoggingSettings {
    /// Translate the configured level into a tracing filter directive.
    pub fn filter_directive(&self) -> String {
        let level = self.level.trim();
        match level.to_ascii_lowercase().as_str() {
            "verbose" | "trace" => "trace".to_string(),
            "debug" => "debug".to_string(),
            "information" | "info" => "info".to_string(),
            "warning" | "warn" => "warn".to_string(),
            "error" | "fatal" => "error".to_string(),
            _ => level.to_string(),
        }
    }
}

/// Fully resolved, validated settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    fn validate(raw: RawSettings) -> Result<Self> {
        let base_url = raw
            .api
            .base_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                Error::Configuration(format!("required setting '{BASE_URL_KEY}' is not configured"))
            })?;

        let parsed = reqwest::Url::parse(&base_url).map_err(|e| {
            Error::Configuration(format!("'{BASE_URL_KEY}' is not a valid URL ({base_url}): {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Configuration(format!(
                "'{BASE_URL_KEY}' must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        if raw.api.timeout_ms == 0 {
            return Err(Error::Configuration(
                "'api.timeout_ms' must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api: ApiSettings {
                base_url: base_url.trim_end_matches('/').to_string(),
                timeout: Duration::from_millis(raw.api.timeout_ms),
                retry_count: raw.api.retry_count,
                headers: raw.api.headers,
            },
            logging: raw.logging,
        })
    }
}

/// Immutable configuration snapshot for one process.
#[derive(Debug)]
pub struct Configuration {
    tree: config::Config,
    settings: Settings,
    environment: String,
}

impl Configuration {
    /// Load from the working directory and the process environment.
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    pub fn api(&self) -> &ApiSettings {
        &self.settings.api
    }

    pub fn logging(&self) -> &LoggingSettings {
        &self.settings.logging
    }

    /// Name of the environment overlay that was applied
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Look up any dotted key across all layers.
    pub fn resolve(&self, key: &str) -> Result<String> {
        self.tree.get_string(key).map_err(|e| match e {
            config::ConfigError::NotFound(_) => Error::MissingConfiguration {
                key: key.to_string(),
            },
            other => Error::Configuration(format!("'{key}': {other}")),
        })
    }

    /// Configured value of a custom header, matched case-insensitively.
    pub fn custom_header(&self, name: &str) -> Option<&str> {
        self.settings
            .api
            .headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Builder for [`Configuration`]
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    directory: PathBuf,
    environment: Option<String>,
    env_prefix: String,
    env_vars: Option<config::Map<String, String>>,
    overrides: Vec<(String, String)>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            directory: PathBuf::from("."),
            environment: None,
            env_prefix: ENV_PREFIX.to_string(),
            env_vars: None,
            overrides: Vec::new(),
        }
    }

    /// Directory holding the `appsettings` files
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Environment overlay to apply instead of `HARNESS_ENVIRONMENT`
    pub fn environment(mut self, name: impl Into<String>) -> Self {
        self.environment = Some(name.into());
        self
    }

    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Read variables from `vars` instead of the process environment
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Highest-precedence value for `key`
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    pub fn load(self) -> Result<Configuration> {
        let environment = self
            .environment
            .or_else(|| std::env::var(ENVIRONMENT_VAR).ok())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        let mut builder = config::Config::builder();

        if let Some((path, format)) = find_settings_file(&self.directory, SETTINGS_FILE) {
            builder = builder.add_source(config::File::from(path).format(format));
        }
        let overlay = format!("{SETTINGS_FILE}.{environment}");
        if let Some((path, format)) = find_settings_file(&self.directory, &overlay) {
            builder = builder.add_source(config::File::from(path).format(format));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .separator("__")
                .source(self.env_vars),
        );

        for (key, value) in self.overrides {
            builder = builder
                .set_override(key.as_str(), value)
                .map_err(|e| Error::Configuration(format!("override '{key}': {e}")))?;
        }

        let tree = builder
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;
        let raw: RawSettings = tree
            .clone()
            .try_deserialize()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        Ok(Configuration {
            tree,
            settings: Settings::validate(raw)?,
            environment,
        })
    }
}

/// `<dir>/<stem>.<ext>` for the first supported extension that exists.
fn find_settings_file(directory: &Path, stem: &str) -> Option<(PathBuf, FileFormat)> {
    FILE_FORMATS.iter().find_map(|(ext, format)| {
        let path = directory.join(format!("{stem}.{ext}"));
        path.is_file().then_some((path, *format))
    })
}
