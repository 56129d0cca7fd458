//! Shared fixtures for the integration tests.
//!
//! Each test gets its own mock server on a random port and its own temp
//! directory, used both as the settings directory (so no stray
//! `appsettings` file is picked up) and as the log directory.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use api_harness::{ConfigLoader, Configuration, Suite};
use tempfile::TempDir;

/// Serve the mock placeholder API on `127.0.0.1:<random>`.
pub async fn start_mock_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        mock_server::run(listener).await.unwrap();
    });
    format!("http://{addr}")
}

/// Loader isolated from the working directory and process environment.
pub fn loader(dir: &Path, base_url: &str) -> ConfigLoader {
    ConfigLoader::new()
        .directory(dir)
        .environment("test")
        .env_vars(Vec::<(String, String)>::new())
        .set("api.base_url", base_url)
        .set("logging.directory", dir.to_string_lossy().to_string())
        .set("logging.console", "false")
}

pub struct Harness {
    pub dir: TempDir,
    pub base_url: String,
    pub config: Arc<Configuration>,
}

impl Harness {
    /// Mock server plus configuration pointing at it.
    pub async fn start() -> Self {
        let base_url = start_mock_server().await;
        Self::for_url(&base_url)
    }

    pub fn for_url(base_url: &str) -> Self {
        Self::with_loader(base_url, |loader| loader)
    }

    pub fn with_loader(base_url: &str, customize: impl FnOnce(ConfigLoader) -> ConfigLoader) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = customize(loader(dir.path(), base_url)).load().unwrap();
        Self {
            dir,
            base_url: base_url.to_string(),
            config: Arc::new(config),
        }
    }

    pub fn suite(&self, name: &str) -> Suite {
        Suite::setup(name, Arc::clone(&self.config)).unwrap()
    }

    /// Contents of every log file written so far.
    pub fn log_text(&self) -> String {
        let mut files: Vec<_> = std::fs::read_dir(self.dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with("test-log."))
            })
            .collect();
        files.sort();
        files
            .iter()
            .map(|path| std::fs::read_to_string(path).unwrap())
            .collect()
    }
}
