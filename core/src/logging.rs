//! Suite-scoped structured logging.
//!
//! Nothing here installs a global subscriber. [`LogSink::open`] builds a
//! `tracing` dispatcher writing to a daily rolling file (and optionally the
//! test output); the cloneable [`Logger`] handle is passed to every
//! component that logs, and events are emitted inside [`Logger::in_scope`].
//! Closing or dropping the sink flushes the file writer.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::Dispatch;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt as fmt_layer, layer::SubscriberExt, EnvFilter, Registry};

use crate::config::LoggingSettings;
use crate::error::{Error, Result};

/// Log files are named `test-log.<yyyy-mm-dd>.txt`
pub const LOG_FILE_PREFIX: &str = "test-log";
pub const LOG_FILE_SUFFIX: &str = "txt";

/// Handle to a suite's log dispatcher.
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// A logger that drops every event. It is still a registered
    /// dispatcher, so callsites it sees first stay enabled for live sinks.
    pub fn disabled() -> Self {
        Self {
            dispatch: Dispatch::new(Registry::default()),
        }
    }

    /// Wrap an existing dispatcher
    pub fn from_dispatch(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// Run `f` with this logger as the current dispatcher.
    pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

/// Owner of the file writer behind a suite's [`Logger`].
pub struct LogSink {
    logger: Logger,
    directory: PathBuf,
    guard: Option<WorkerGuard>,
}

impl LogSink {
    pub fn open(settings: &LoggingSettings) -> Result<Self> {
        let directory = settings.directory.clone();
        std::fs::create_dir_all(&directory)?;

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .filename_suffix(LOG_FILE_SUFFIX)
            .build(&directory)
            .map_err(|e| {
                Error::Configuration(format!(
                    "cannot open log directory '{}': {e}",
                    directory.display()
                ))
            })?;
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let filter = EnvFilter::try_new(settings.filter_directive()).map_err(|e| {
            Error::Configuration(format!("invalid logging.level '{}': {e}", settings.level))
        })?;

        let file_layer = fmt_layer::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(false);

        let console_layer = settings.console.then(|| {
            fmt_layer::layer()
                .with_test_writer()
                .with_target(false)
                .compact()
        });

        let subscriber = Registry::default()
            .with(filter)
            .with(file_layer)
            .with(console_layer);

        Ok(Self {
            logger: Logger::from_dispatch(Dispatch::new(subscriber)),
            directory,
            guard: Some(guard),
        })
    }

    pub fn logger(&self) -> Logger {
        self.logger.clone()
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Log files written to the sink directory so far, oldest first.
    pub fn log_files(&self) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.directory)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| {
                        name.starts_with(LOG_FILE_PREFIX) && name.ends_with(LOG_FILE_SUFFIX)
                    })
            })
            .collect();
        files.sort();
        Ok(files)
    }

    /// Flush pending lines and close the file writer.
    pub fn close(mut self) {
        self.guard.take();
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink")
            .field("directory", &self.directory)
            .field("open", &self.guard.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::info;

    fn settings(dir: &Path) -> LoggingSettings {
        LoggingSettings {
            directory: dir.to_path_buf(),
            level: "Information".to_string(),
            console: false,
        }
    }

    #[test]
    fn writes_daily_file_with_level_and_message() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LogSink::open(&settings(dir.path())).unwrap();
        let logger = sink.logger();
        logger.in_scope(|| info!(base_url = "http://x", "API client initialized"));

        let files_dir = sink.directory().to_path_buf();
        sink.close();

        let files: Vec<_> = std::fs::read_dir(&files_dir).unwrap().collect();
        assert_eq!(files.len(), 1);
        let path = files[0].as_ref().unwrap().path();
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.starts_with("test-log."), "{name}");
        assert!(name.ends_with(".txt"), "{name}");

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("INFO"), "{content}");
        assert!(content.contains("API client initialized"), "{content}");
        assert!(content.contains("base_url"), "{content}");
    }

    #[test]
    fn level_filter_drops_lower_events() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = settings(dir.path());
        config.level = "Warning".to_string();
        let sink = LogSink::open(&config).unwrap();
        sink.logger().in_scope(|| {
            info!("quiet");
            tracing::warn!("loud");
        });
        let files = sink.log_files().unwrap();
        sink.close();

        let content = std::fs::read_to_string(&files[0]).unwrap();
        assert!(content.contains("loud"));
        assert!(!content.contains("quiet"));
    }

    #[test]
    fn invalid_level_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = settings(dir.path());
        config.level = "api_harness=notalevel".to_string();
        let err = LogSink::open(&config).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn disabled_logger_swallows_events() {
        Logger::disabled().in_scope(|| info!("nowhere"));
    }

    #[test]
    fn log_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let sink = LogSink::open(&settings(&nested)).unwrap();
        assert!(nested.is_dir());
        sink.close();
    }
}
