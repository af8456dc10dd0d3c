use std::fs;
use serde::{Deserialize, Serialize};
use crate::dashboard::Args;
use crate::loader::LoaderConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub loader: LoaderConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    // API port, no server when unset
    pub port: Option<u16>,

    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: None,
            bind: default_bind(),
        }
    }
}

impl Config {
    /// Command-line flags win over file values
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(base_url) = &args.base_url {
            self.loader.base_url = base_url.clone();
        }
        if let Some(interval) = args.interval {
            self.loader.refresh_interval_secs = interval;
        }
        if let Some(timeout) = args.timeout {
            self.loader.request_timeout_secs = timeout;
        }
        if let Some(port) = args.http_port {
            self.http.port = Some(port);
        }
    }
}

pub fn load(path: &str) -> anyhow::Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// File config (if any) with flags applied, validated
pub fn resolve(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => load(path)?,
        None => Config::default(),
    };
    config.apply_args(args);
    config.loader.validate()?;
    Ok(config)
}
