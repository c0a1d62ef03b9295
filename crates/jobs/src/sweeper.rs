//! Background eviction of old terminal jobs.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::registry::{JobRegistry, RegistryConfig};

/// How often the sweeper wakes up.
const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60 * 60);

/// Periodically evict terminal jobs past the retention window until the
/// token is cancelled. Spawn this alongside the engine.
pub async fn run_sweeper(
    registry: Arc<JobRegistry>,
    config: RegistryConfig,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
    // The first tick fires immediately; skip it so a fresh start does not
    // sweep an empty registry.
    ticker.tick().await;

    tracing::info!(retention_hours = config.retention.num_hours(), "Job sweeper started");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Job sweeper stopping");
                break;
            }
            _ = ticker.tick() => {
                registry.cleanup_old_jobs(config.retention).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use reelgen_core::config::{AspectRatio, JobConfig};
    use reelgen_core::provider::ProviderId;
    use reelgen_core::routing::RoutingDecision;

    fn config() -> JobConfig {
        JobConfig {
            topic: Some("tides".into()),
            prompt: None,
            style: "documentary".into(),
            voice: None,
            duration_secs: Some(45),
            aspect_ratio: AspectRatio::Landscape,
            include_voiceover: false,
            content_type: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_evicts_on_schedule_and_stops_on_cancel() {
        let registry = Arc::new(JobRegistry::new());
        let id = registry
            .create(config(), RoutingDecision::static_route(ProviderId::Runway, "default"))
            .await
            .job_id;
        registry
            .fail(
                id,
                reelgen_core::error::JobError {
                    kind: "timeout".into(),
                    message: "gone".into(),
                },
            )
            .await;

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_sweeper(
            Arc::clone(&registry),
            RegistryConfig {
                retention: Duration::zero(),
            },
            cancel.clone(),
        ));

        // Nothing happens before the first scheduled tick.
        tokio::time::sleep(SWEEP_INTERVAL / 2).await;
        assert_eq!(registry.count().await, 1);

        tokio::time::sleep(SWEEP_INTERVAL).await;
        assert_eq!(registry.count().await, 0);

        cancel.cancel();
        handle.await.unwrap();
    }
}
