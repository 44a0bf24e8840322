use std::sync::Arc;
use std::time::Duration;

use panomax_core::TaskRegistry;
use tokio_util::sync::CancellationToken;

/// Spawn the periodic registry eviction sweep.
///
/// Every `interval`, tasks older than `ttl` are treated as abandoned
/// (their job never called back) and all their correlations are
/// dropped, bounding registry memory. Runs until `cancel` fires.
pub fn start_registry_sweep(
    registry: Arc<TaskRegistry>,
    interval: Duration,
    ttl: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; there is nothing to evict yet.
        ticker.tick().await;

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!("Registry sweep stopped");
                    return;
                }
                _ = ticker.tick() => {
                    let evicted = registry.evict_older_than(ttl).await;
                    if evicted > 0 {
                        tracing::info!(evicted, "Evicted abandoned tasks from registry");
                    }
                }
            }
        }
    })
}
