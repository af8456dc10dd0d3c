use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use crate::loader::cache::SnapshotCache;
use crate::loader::config::LoaderConfig;
use crate::loader::errors::{ConfigError, FetchError};
use crate::loader::fetch;
use crate::loader::snapshot::Snapshot;
use crate::loader::{FetchRequest, Fetcher, ResourceTarget};
use crate::utils;

/// Fetches every configured resource and agent concurrently and publishes
/// the merged [`Snapshot`] to its cache.
///
/// A failing resource never fails the cycle: it shows up as `null`.
pub struct DataLoader {
    resources: Vec<String>,
    agents: Vec<String>,
    request_timeout: Duration,
    fetcher: Arc<dyn Fetcher>,
    cache: Arc<SnapshotCache>,

    /// held for the whole of a cycle; cycles never interleave cache writes
    cycle: Mutex<()>,

    last_cache_buster: AtomicU64,
}

impl DataLoader {
    pub fn new(config: &LoaderConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self, ConfigError> {
        Self::with_cache(config, fetcher, Arc::new(SnapshotCache::new()))
    }

    /// Loader publishing into an existing cache
    pub fn with_cache(
        config: &LoaderConfig,
        fetcher: Arc<dyn Fetcher>,
        cache: Arc<SnapshotCache>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            resources: config.resources.clone(),
            agents: config.agents.clone(),
            request_timeout: config.request_timeout(),
            fetcher,
            cache,
            cycle: Mutex::new(()),
            last_cache_buster: AtomicU64::new(0),
        })
    }

    /// Loader reading from the source named by `config.base_url`
    pub fn from_config(config: &LoaderConfig) -> Result<Self, ConfigError> {
        Self::new(config, fetch::from_config(config))
    }

    /// Handle to the cache for readers
    pub fn cache(&self) -> Arc<SnapshotCache> {
        self.cache.clone()
    }

    pub fn source(&self) -> String {
        self.fetcher.describe()
    }

    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }

    /// Run one full load cycle, waiting for any cycle already in flight
    ///
    /// Only fails if a fetch task itself dies (panic or cancellation); the
    /// cache is left untouched in that case.
    pub async fn load_all(&self) -> crate::Result<Arc<Snapshot>> {
        let _cycle = self.cycle.lock().await;
        self.run_cycle().await
    }

    /// Like [`load_all`](Self::load_all) but returns `None` at once if a
    /// cycle is already running
    pub async fn try_load_all(&self) -> Option<crate::Result<Arc<Snapshot>>> {
        let _cycle = self.cycle.try_lock().ok()?;
        Some(self.run_cycle().await)
    }

    /// Fetch one resource without touching the cache
    pub async fn load(&self, name: &str) -> Result<Value, FetchError> {
        self.fetch_one(ResourceTarget::Resource(name.to_string()))
            .await
    }

    /// Fetch one agent resource without touching the cache
    pub async fn load_agent(&self, id: &str) -> Result<Value, FetchError> {
        self.fetch_one(ResourceTarget::Agent(id.to_string())).await
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.cache.get(name)
    }

    pub fn get_agent(&self, id: &str) -> Option<Value> {
        self.cache.get_agent(id)
    }

    pub fn last_update(&self) -> Option<OffsetDateTime> {
        self.cache.last_update()
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.cache.snapshot()
    }

    async fn run_cycle(&self) -> crate::Result<Arc<Snapshot>> {
        let cache_buster = self.next_cache_buster();
        tracing::debug!(
            "Loading {} resources and {} agents from {} (t={})",
            self.resources.len(),
            self.agents.len(),
            self.fetcher.describe(),
            cache_buster
        );

        let mut tasks = JoinSet::new();
        for target in self.targets() {
            let fetcher = self.fetcher.clone();
            let timeout = self.request_timeout;
            tasks.spawn(async move {
                let request = FetchRequest::new(target, cache_buster);
                let result = fetch_with_timeout(fetcher.as_ref(), &request, timeout).await;
                (request.target, result)
            });
        }

        let mut snapshot = Snapshot::new(cache_buster);
        while let Some(joined) = tasks.join_next().await {
            let (target, result) = joined?;
            if let Err(e) = &result {
                tracing::warn!("Failed to load {}: {}", target, e);
            }
            snapshot.insert(target, result);
        }

        let snapshot = Arc::new(snapshot);
        self.cache.replace(snapshot.clone());
        tracing::debug!(
            "Snapshot updated: {}/{} loaded",
            snapshot.loaded_count(),
            snapshot.total_count()
        );
        Ok(snapshot)
    }

    async fn fetch_one(&self, target: ResourceTarget) -> Result<Value, FetchError> {
        let request = FetchRequest::new(target, self.next_cache_buster());
        fetch_with_timeout(self.fetcher.as_ref(), &request, self.request_timeout).await
    }

    fn targets(&self) -> impl Iterator<Item = ResourceTarget> + '_ {
        let resources = self.resources.iter().cloned().map(ResourceTarget::Resource);
        let agents = self.agents.iter().cloned().map(ResourceTarget::Agent);
        resources.chain(agents)
    }

    /// Epoch millis, bumped past the previous value so no two cycles share one
    fn next_cache_buster(&self) -> u64 {
        let now = utils::epoch_millis();
        let prev = self
            .last_cache_buster
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| {
                Some(now.max(prev + 1))
            })
            .unwrap_or_else(|prev| prev);
        now.max(prev + 1)
    }
}

async fn fetch_with_timeout(
    fetcher: &dyn Fetcher,
    request: &FetchRequest,
    timeout: Duration,
) -> Result<Value, FetchError> {
    match tokio::time::timeout(timeout, fetcher.fetch(request)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout(timeout)),
    }
}
