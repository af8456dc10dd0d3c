//! Merged result of one load cycle

use std::collections::BTreeMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::loader::errors::FetchError;
use crate::loader::ResourceTarget;

/// Every configured resource and agent, each either its parsed document or
/// `null` when the fetch failed.
///
/// Serializes as `{"<resource>": ..., "agents": {"<id>": ...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(flatten)]
    resources: BTreeMap<String, Option<Value>>,

    #[serde(default)]
    agents: BTreeMap<String, Option<Value>>,

    /// failure reason per failed key, `agent <id>` for agents
    #[serde(skip)]
    failures: BTreeMap<String, String>,

    #[serde(skip)]
    cache_buster: u64,
}

impl Snapshot {
    pub fn new(cache_buster: u64) -> Self {
        Self {
            cache_buster,
            ..Default::default()
        }
    }

    /// Record the outcome of one fetch; errors degrade to `null`
    pub fn insert(&mut self, target: ResourceTarget, result: Result<Value, FetchError>) {
        let value = match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.failures.insert(target.to_string(), e.to_string());
                None
            }
        };
        match target {
            ResourceTarget::Resource(name) => {
                self.resources.insert(name, value);
            }
            ResourceTarget::Agent(id) => {
                self.agents.insert(id, value);
            }
        }
    }

    /// Document for `name`, `None` if it failed or is not configured
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.resources.get(name).and_then(Option::as_ref)
    }

    pub fn get_agent(&self, id: &str) -> Option<&Value> {
        self.agents.get(id).and_then(Option::as_ref)
    }

    /// Whether `name` is a key of this snapshot (loaded or not)
    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn agent_ids(&self) -> impl Iterator<Item = &str> {
        self.agents.keys().map(String::as_str)
    }

    pub fn failures(&self) -> &BTreeMap<String, String> {
        &self.failures
    }

    pub fn cache_buster(&self) -> u64 {
        self.cache_buster
    }

    /// Number of resources and agents that loaded
    pub fn loaded_count(&self) -> usize {
        self.resources.values().filter(|v| v.is_some()).count()
            + self.agents.values().filter(|v| v.is_some()).count()
    }

    pub fn total_count(&self) -> usize {
        self.resources.len() + self.agents.len()
    }

    /// Decode a resource into a typed model; `Ok(None)` when it is null
    pub fn decode<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, serde_json::Error> {
        self.get(name).map(|v| T::deserialize(v)).transpose()
    }

    pub fn decode_agent<T: DeserializeOwned>(&self, id: &str) -> Result<Option<T>, serde_json::Error> {
        self.get_agent(id).map(|v| T::deserialize(v)).transpose()
    }
}
