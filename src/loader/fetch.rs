//! Resource sources: an HTTP data endpoint or a local data directory

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use serde_json::Value;
use crate::loader::config::LoaderConfig;
use crate::loader::errors::FetchError;
use crate::loader::{FetchRequest, Fetcher};

/// Build the fetcher matching the configured `base_url`
///
/// `http://` and `https://` URLs are fetched over HTTP; anything else is a
/// directory path (an optional `file://` prefix is stripped).
pub fn from_config(config: &LoaderConfig) -> Arc<dyn Fetcher> {
    let base = config.base_url.as_str();
    if base.starts_with("http://") || base.starts_with("https://") {
        Arc::new(HttpFetcher::new(base, config.request_timeout()))
    } else {
        let path = base.strip_prefix("file://").unwrap_or(base);
        Arc::new(DirFetcher::new(path))
    }
}

/// `GET <base>/<path>?t=<cache_buster>` for every request
pub struct HttpFetcher {
    base_url: String,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Full URL including the cache-busting query parameter
    pub fn url_for(&self, request: &FetchRequest) -> String {
        format!(
            "{}/{}?t={}",
            self.base_url,
            request.target.relative_path(),
            request.cache_buster
        )
    }

    fn get_json(url: &str, timeout: Duration) -> Result<Value, FetchError> {
        let response = match ureq::get(url).timeout(timeout).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => return Err(FetchError::Status(code)),
            Err(ureq::Error::Transport(e)) => return Err(FetchError::Transport(e.to_string())),
        };

        // ureq only reports 4xx/5xx as errors
        if !(200..300).contains(&response.status()) {
            return Err(FetchError::Status(response.status()));
        }

        let body = response
            .into_string()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value, FetchError> {
        let url = self.url_for(request);
        let timeout = self.timeout;
        tracing::debug!("GET {}", url);

        // ureq blocks; keep it off the async workers
        match tokio::task::spawn_blocking(move || Self::get_json(&url, timeout)).await {
            Ok(result) => result,
            Err(e) => Err(FetchError::Transport(format!("request task failed: {}", e))),
        }
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Reads `<root>/<path>` from disk
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Fetcher for DirFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value, FetchError> {
        let path = self.root.join(request.target.relative_path());
        tracing::debug!("read {}", path.display());
        let body = tokio::fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}
