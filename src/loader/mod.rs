//! Polling data loader
//!
//! Fetches the configured JSON resources (and per-agent resources) from a
//! data source, merges them into one [`Snapshot`] per cycle, and keeps the
//! latest snapshot in a [`SnapshotCache`].
//!
//! - `fetch`: HTTP and directory sources behind the [`Fetcher`] trait
//! - `data_loader`: concurrent fetch + merge + atomic cache swap
//! - `poller`: fixed-interval refresh with an overlap guard
//! - `models`: typed views over the raw resource JSON

pub mod cache;
pub mod config;
pub mod data_loader;
pub mod errors;
pub mod fetch;
pub mod models;
pub mod poller;
pub mod snapshot;
#[cfg(test)]
pub(crate) mod testing;

pub use cache::SnapshotCache;
pub use config::{LoaderConfig, OverlapPolicy};
pub use data_loader::DataLoader;
pub use errors::{ConfigError, FetchError};
pub use poller::{Poller, PollerHandle};
pub use snapshot::Snapshot;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// Reserved snapshot key under which agent resources are nested
pub const AGENTS_KEY: &str = "agents";

/// What a single fetch is aimed at
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceTarget {
    /// Top-level resource, served as `<name>.json`
    Resource(String),
    /// Per-agent resource, served as `agents/<id>.json`
    Agent(String),
}

impl ResourceTarget {
    /// Path of the document relative to the data source root
    pub fn relative_path(&self) -> String {
        match self {
            ResourceTarget::Resource(name) => format!("{}.json", name),
            ResourceTarget::Agent(id) => format!("{}/{}.json", AGENTS_KEY, id),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            ResourceTarget::Resource(name) => name,
            ResourceTarget::Agent(id) => id,
        }
    }
}

impl fmt::Display for ResourceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceTarget::Resource(name) => write!(f, "{}", name),
            ResourceTarget::Agent(id) => write!(f, "agent {}", id),
        }
    }
}

/// One fetch of one resource within a load cycle
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub target: ResourceTarget,
    /// Cache-busting stamp (epoch millis), appended as `?t=` by HTTP sources
    pub cache_buster: u64,
}

impl FetchRequest {
    pub fn new(target: ResourceTarget, cache_buster: u64) -> Self {
        Self {
            target,
            cache_buster,
        }
    }
}

/// A source of resource documents
///
/// Implementations fail explicitly on transport errors, non-success
/// statuses and unparsable bodies; the loader decides how to degrade.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<Value, FetchError>;

    /// Human-readable location of the source, used in logs
    fn describe(&self) -> String;
}
