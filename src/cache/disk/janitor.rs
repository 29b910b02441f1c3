//! Background task that periodically sweeps expired entries
//!
//! Each tick spawns a sweep and goes straight back to waiting; the cache's
//! single sweep permit keeps sweeps from overlapping, so a tick that fires while
//! the previous sweep is still running is simply dropped.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::disk_cache::CacheInner;

pub(super) struct Janitor {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Janitor {
    /// Spawn the sweep loop; the first sweep fires one `interval` after start
    pub(super) fn start(cache: Arc<CacheInner>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let cache = Arc::clone(&cache);
                        tokio::spawn(async move {
                            cache.delete_expired().await;
                        });
                    }
                    // Fires on explicit stop and when the sender is dropped
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Cache janitor shutting down");
                        break;
                    }
                }
            }
        });

        tracing::info!(interval_ms = interval.as_millis() as u64, "Started cache janitor");

        Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub(super) fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }

    /// Signal the loop and wait for it to exit
    pub(super) async fn stop(mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Cache janitor task ended abnormally");
            }
        }
        tracing::info!("Stopped cache janitor");
    }
}

impl Drop for Janitor {
    fn drop(&mut self) {
        // Signal only; the loop exits on its next poll without anyone waiting for it
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}
