//! HTTP API response models

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// Freshness summary of the cached snapshot
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StatusResponse {
    pub loaded: bool,
    /// RFC 3339 time of the last completed cycle
    pub last_update: Option<String>,
    pub resources_ok: usize,
    pub resources_total: usize,
    pub resources_failed: Vec<String>,
    /// failure reason per failed resource, `agent <id>` for agents
    pub failures: BTreeMap<String, String>,
}
