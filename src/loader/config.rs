use std::collections::HashSet;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::loader::errors::ConfigError;
use crate::loader::AGENTS_KEY;

/// What the poller does with a tick that comes due while a cycle is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Drop the tick; the next cycle starts on the following tick
    #[default]
    Skip,

    /// Run one deferred cycle as soon as the in-flight one finishes
    Queue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    // data source: http(s) base url, or a local directory
    #[serde(default = "default_base_url")]
    pub base_url: String,

    // top-level resources, fetched as <base_url>/<name>.json
    #[serde(default = "default_resources")]
    pub resources: Vec<String>,

    // agent ids, fetched as <base_url>/agents/<id>.json
    #[serde(default = "default_agents")]
    pub agents: Vec<String>,

    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    // a request slower than this counts as failed for the cycle
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub overlap: OverlapPolicy,
}

fn default_base_url() -> String {
    "./data".to_string()
}

fn default_resources() -> Vec<String> {
    [
        "status",
        "relationship",
        "sessions",
        "cron",
        "memory",
        "scores",
        "suggestions",
        "capabilities",
        "analytics",
        "tasks",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_agents() -> Vec<String> {
    ["main", "fast", "learning"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_refresh_interval_secs() -> u64 {
    60
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            resources: default_resources(),
            agents: default_agents(),
            refresh_interval_secs: default_refresh_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            overlap: OverlapPolicy::default(),
        }
    }
}

impl LoaderConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check names and durations before any fetch is issued
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resources.is_empty() && self.agents.is_empty() {
            return Err(ConfigError::NoResources);
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::ZeroDuration("refresh_interval_secs"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroDuration("request_timeout_secs"));
        }

        check_names(&self.resources)?;
        check_names(&self.agents)?;

        if self.resources.iter().any(|r| r == AGENTS_KEY) {
            return Err(ConfigError::Reserved(AGENTS_KEY.to_string()));
        }
        Ok(())
    }
}

fn check_names(names: &[String]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ConfigError::InvalidName(name.clone()));
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::Duplicate(name.clone()));
        }
    }
    Ok(())
}
