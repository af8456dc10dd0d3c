use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use crate::loader::config::{LoaderConfig, OverlapPolicy};
use crate::loader::data_loader::DataLoader;
use crate::loader::snapshot::Snapshot;

/// Drives [`DataLoader::load_all`] on a fixed interval
///
/// Cycles never run concurrently. With [`OverlapPolicy::Skip`] a tick that
/// comes due while a cycle (timer-driven or manual) is still running is
/// dropped; with [`OverlapPolicy::Queue`] one deferred cycle starts as soon
/// as the running one finishes.
pub struct Poller {
    loader: Arc<DataLoader>,
    interval: Duration,
    overlap: OverlapPolicy,
}

/// Running poller; [`stop`](Self::stop) it to cancel the timer
pub struct PollerHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl Poller {
    pub fn new(loader: Arc<DataLoader>, interval: Duration, overlap: OverlapPolicy) -> Self {
        Self {
            loader,
            interval,
            overlap,
        }
    }

    pub fn from_config(loader: Arc<DataLoader>, config: &LoaderConfig) -> Self {
        Self::new(loader, config.refresh_interval(), config.overlap)
    }

    /// Start refreshing; `on_update` runs once per completed cycle
    ///
    /// The first cycle starts one interval from now. A cycle that fails as
    /// a whole is logged and retried on the next tick without calling
    /// `on_update`.
    pub fn start_auto_refresh<F>(self, on_update: F) -> PollerHandle
    where
        F: Fn(Arc<Snapshot>) + Send + Sync + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        tracing::info!(
            "Auto-refresh every {:?} from {} (overlap: {:?})",
            self.interval,
            self.loader.source(),
            self.overlap
        );

        let task = tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(match self.overlap {
                OverlapPolicy::Skip => MissedTickBehavior::Skip,
                OverlapPolicy::Queue => MissedTickBehavior::Delay,
            });
            // the first tick completes immediately
            ticker.tick().await;

            let mut last_cycle_end: Option<Instant> = None;
            loop {
                let due = tokio::select! {
                    _ = cancelled.cancelled() => break,
                    due = ticker.tick() => due,
                };

                if self.overlap == OverlapPolicy::Skip
                    && last_cycle_end.is_some_and(|end| due < end)
                {
                    tracing::debug!("Tick came due during the previous cycle, skipping");
                    continue;
                }

                let result = tokio::select! {
                    _ = cancelled.cancelled() => break,
                    result = self.run_cycle() => result,
                };
                last_cycle_end = Some(Instant::now());

                match result {
                    Some(Ok(snapshot)) => {
                        tracing::info!(
                            "Refreshed {}/{} resources",
                            snapshot.loaded_count(),
                            snapshot.total_count()
                        );
                        on_update(snapshot);
                    }
                    Some(Err(e)) => {
                        tracing::error!("Refresh cycle failed: {}", e);
                    }
                    None => {
                        tracing::debug!("Another load is in flight, skipping tick");
                    }
                }
            }
            tracing::info!("Auto-refresh stopped");
        });

        PollerHandle { token, task }
    }

    async fn run_cycle(&self) -> Option<crate::Result<Arc<Snapshot>>> {
        match self.overlap {
            OverlapPolicy::Skip => self.loader.try_load_all().await,
            OverlapPolicy::Queue => Some(self.loader.load_all().await),
        }
    }
}

impl PollerHandle {
    /// Cancel the timer and wait for the poller task to exit
    ///
    /// A cycle in flight is abandoned without touching the cache.
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            tracing::error!("Poller task ended abnormally: {}", e);
        }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}
