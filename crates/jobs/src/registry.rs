//! The job registry: every submitted job's current state, in memory.
//!
//! Jobs move through a monotonic lifecycle (`Pending -> Running ->
//! Completed | Failed`). Terminal jobs are frozen; mutation attempts on them
//! are ignored and logged. Old terminal jobs are evicted by the sweeper.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use reelgen_core::config::JobConfig;
use reelgen_core::error::JobError;
use reelgen_core::media::GenerationResult;
use reelgen_core::provider::{ProviderId, RenderMode};
use reelgen_core::routing::RoutingDecision;
use reelgen_core::JobId;

// ---------------------------------------------------------------------------
// Status and stage
// ---------------------------------------------------------------------------

/// Coarse lifecycle state. Ordered; transitions never move backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

/// Fine-grained pipeline position, reported alongside the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    Queued,
    Routing,
    ScriptGeneration,
    VoiceSynthesis,
    ImageGeneration,
    Rendering,
    Failover,
    Done,
}

impl JobStage {
    /// Rough completion percentage for progress reporting.
    pub fn progress(&self) -> u8 {
        match self {
            JobStage::Queued => 0,
            JobStage::Routing => 10,
            JobStage::ScriptGeneration => 25,
            JobStage::VoiceSynthesis => 45,
            JobStage::ImageGeneration => 60,
            JobStage::Rendering => 80,
            JobStage::Failover => 80,
            JobStage::Done => 100,
        }
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// One submitted generation job.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub stage: JobStage,
    pub progress: u8,
    pub config: JobConfig,
    /// The decision currently driving (or that drove) this job. Replaced on
    /// failover.
    pub routing: RoutingDecision,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<GenerationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobError>,
}

/// Returned to the submitter immediately, before any pipeline work runs.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitReceipt {
    pub job_id: JobId,
    pub status: JobStatus,
    /// Where to poll for progress.
    pub poll_handle: String,
    pub provider: ProviderId,
    pub mode: RenderMode,
    pub routing_reason: String,
    pub estimated_time: &'static str,
}

/// Trimmed view for listings.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub id: JobId,
    pub status: JobStatus,
    pub stage: JobStage,
    pub progress: u8,
    pub provider: ProviderId,
    pub subject: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            status: job.status,
            stage: job.stage,
            progress: job.progress,
            provider: job.routing.provider,
            subject: job.config.subject().to_string(),
            created_at: job.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Terminal jobs older than this are evicted by the sweeper.
    pub retention: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            retention: Duration::hours(24),
        }
    }
}

#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending job and hand back its receipt.
    pub async fn create(&self, config: JobConfig, routing: RoutingDecision) -> SubmitReceipt {
        let id = uuid::Uuid::now_v7();
        let now = Utc::now();
        let receipt = SubmitReceipt {
            job_id: id,
            status: JobStatus::Pending,
            poll_handle: format!("/jobs/{id}"),
            provider: routing.provider,
            mode: routing.mode,
            routing_reason: routing.reason.clone(),
            estimated_time: routing.provider.estimated_time(),
        };
        let job = Job {
            id,
            status: JobStatus::Pending,
            stage: JobStage::Queued,
            progress: 0,
            config,
            routing,
            created_at: now,
            updated_at: now,
            result: None,
            error: None,
        };
        self.jobs.write().await.insert(id, job);
        tracing::info!(job_id = %id, provider = %receipt.provider, "Job registered");
        receipt
    }

    pub async fn get(&self, id: JobId) -> Option<Job> {
        self.jobs.read().await.get(&id).cloned()
    }

    /// Newest-first listing, optionally filtered by status.
    pub async fn list(&self, status: Option<JobStatus>, limit: usize) -> Vec<JobSummary> {
        let jobs = self.jobs.read().await;
        let mut summaries: Vec<JobSummary> = jobs
            .values()
            .filter(|job| status.is_none_or(|s| job.status == s))
            .map(JobSummary::from)
            .collect();
        // v7 ids are time-ordered, breaking ties between equal timestamps.
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        summaries.truncate(limit);
        summaries
    }

    pub async fn count(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Move a pending job into `Running`.
    pub async fn mark_running(&self, id: JobId) {
        self.mutate(id, |job| {
            job.status = JobStatus::Running;
            job.stage = JobStage::Routing;
            job.progress = job.stage.progress();
        })
        .await;
    }

    /// Advance the pipeline stage of a running job.
    pub async fn set_stage(&self, id: JobId, stage: JobStage) {
        self.mutate(id, |job| {
            job.stage = stage;
            job.progress = stage.progress();
        })
        .await;
    }

    /// Replace the active routing decision (dynamic selection or failover).
    pub async fn set_routing(&self, id: JobId, routing: RoutingDecision) {
        self.mutate(id, |job| {
            job.routing = routing;
        })
        .await;
    }

    /// Freeze the job as completed with its result.
    pub async fn complete(&self, id: JobId, result: GenerationResult) {
        self.mutate(id, |job| {
            job.status = JobStatus::Completed;
            job.stage = JobStage::Done;
            job.progress = 100;
            job.result = Some(result);
        })
        .await;
    }

    /// Freeze the job as failed with its error.
    pub async fn fail(&self, id: JobId, error: JobError) {
        self.mutate(id, |job| {
            job.status = JobStatus::Failed;
            job.stage = JobStage::Done;
            job.error = Some(error);
        })
        .await;
    }

    /// Evict terminal jobs older than the retention window. Returns how many
    /// were removed.
    pub async fn cleanup_old_jobs(&self, retention: Duration) -> usize {
        let cutoff = Utc::now() - retention;
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| !(job.status.is_terminal() && job.updated_at < cutoff));
        let removed = before - jobs.len();
        if removed > 0 {
            tracing::info!(removed, "Evicted old terminal jobs");
        }
        removed
    }

    async fn mutate(&self, id: JobId, apply: impl FnOnce(&mut Job)) {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&id) {
            Some(job) if job.status.is_terminal() => {
                tracing::warn!(job_id = %id, status = job.status.as_str(), "Ignoring update to terminal job");
            }
            Some(job) => {
                apply(job);
                job.updated_at = Utc::now();
            }
            None => {
                tracing::warn!(job_id = %id, "Update for unknown job");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
