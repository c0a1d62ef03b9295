//! Broadcast notifications of job progress.
//!
//! Observers get a best-effort feed: lagging subscribers drop the oldest
//! events, and emitting with no subscribers is a no-op.

use tokio::sync::broadcast;

use reelgen_core::provider::ProviderId;
use reelgen_core::JobId;
use reelgen_jobs::JobStage;

const EVENT_CAPACITY: usize = 256;

/// One observable change in a job's lifecycle.
#[derive(Debug, Clone)]
pub struct JobEvent {
    pub job_id: JobId,
    pub kind: JobEventKind,
}

#[derive(Debug, Clone)]
pub enum JobEventKind {
    Submitted { provider: ProviderId },
    StageChanged { stage: JobStage },
    FailedOver { from: ProviderId, to: ProviderId },
    Completed { provider: ProviderId },
    Failed { kind: String },
}

/// Fan-out channel for job events.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<JobEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, job_id: JobId, kind: JobEventKind) {
        // SendError only means nobody is listening right now.
        let _ = self.tx.send(JobEvent { job_id, kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_events_in_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let id = uuid::Uuid::now_v7();

        bus.emit(
            id,
            JobEventKind::Submitted {
                provider: ProviderId::Runway,
            },
        );
        bus.emit(
            id,
            JobEventKind::StageChanged {
                stage: JobStage::Rendering,
            },
        );

        assert!(matches!(
            rx.recv().await.unwrap().kind,
            JobEventKind::Submitted { .. }
        ));
        assert!(matches!(
            rx.recv().await.unwrap().kind,
            JobEventKind::StageChanged {
                stage: JobStage::Rendering
            }
        ));
    }

    #[test]
    fn emitting_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.emit(
            uuid::Uuid::now_v7(),
            JobEventKind::Failed {
                kind: "timeout".into(),
            },
        );
    }
}
