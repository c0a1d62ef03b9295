//! The engine facade: submit jobs, poll them, observe events, shut down.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use reelgen_core::config::JobConfig;
use reelgen_core::error::EngineError;
use reelgen_core::provider::ProviderId;
use reelgen_core::JobId;
use reelgen_jobs::{run_sweeper, Job, JobRegistry, JobStatus, JobSummary, RegistryConfig, SubmitReceipt};
use reelgen_providers::sim::{SimHealthService, SimImageService, SimScriptService, SimVoiceService};
use reelgen_providers::traits::{HealthCheckService, ImageService, ScriptService, VoiceService};
use reelgen_resilience::{
    BreakerConfig, BreakerSet, BreakerSnapshot, CostRecord, CostTracker, RateLimiter, RetryPolicy,
};
use reelgen_routing::{DynamicRouter, ProviderCatalog, StaticRouter, StaticRoutes};

use crate::events::{EventBus, JobEvent, JobEventKind};
use crate::orchestrator::Pipeline;
use crate::renderers::RendererSet;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunables for the engine. Defaults match the reference deployment.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub catalog: ProviderCatalog,
    pub static_routes: StaticRoutes,
    pub retry: RetryPolicy,
    pub breaker: BreakerConfig,
    pub registry: RegistryConfig,
}

/// The pluggable collaborators behind the pipeline.
pub struct EngineServices {
    pub script: Arc<dyn ScriptService>,
    pub voice: Arc<dyn VoiceService>,
    pub images: Arc<dyn ImageService>,
    pub renderers: RendererSet,
    pub health: Arc<dyn HealthCheckService>,
}

impl EngineServices {
    /// Deterministic in-process services, for tests and dry runs.
    pub fn simulated() -> Self {
        Self {
            script: Arc::new(SimScriptService::new()),
            voice: Arc::new(SimVoiceService::new()),
            images: Arc::new(SimImageService::new()),
            renderers: RendererSet::simulated(),
            health: Arc::new(SimHealthService::all_healthy()),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct GenerationEngine {
    pipeline: Arc<Pipeline>,
    static_router: StaticRouter,
    registry: Arc<JobRegistry>,
    registry_config: RegistryConfig,
    costs: Arc<CostTracker>,
    breakers: Arc<BreakerSet>,
    events: EventBus,
    cancel: CancellationToken,
    tasks: TaskTracker,
}

impl GenerationEngine {
    pub fn new(services: EngineServices, config: EngineConfig) -> Self {
        let registry = Arc::new(JobRegistry::new());
        let costs = Arc::new(CostTracker::new());
        let breakers = Arc::new(BreakerSet::new(config.breaker.clone()));
        let events = EventBus::new();

        let pipeline = Arc::new(Pipeline {
            script: services.script,
            voice: services.voice,
            images: services.images,
            renderers: services.renderers,
            router: DynamicRouter::new(config.catalog, services.health),
            limiter: Arc::new(RateLimiter::new()),
            breakers: Arc::clone(&breakers),
            retry: config.retry,
            costs: Arc::clone(&costs),
            registry: Arc::clone(&registry),
            events: events.clone(),
        });

        Self {
            pipeline,
            static_router: StaticRouter::new(config.static_routes),
            registry,
            registry_config: config.registry,
            costs,
            breakers,
            events,
            cancel: CancellationToken::new(),
            tasks: TaskTracker::new(),
        }
    }

    /// A fully simulated engine with default tunables.
    pub fn simulated() -> Self {
        Self::new(EngineServices::simulated(), EngineConfig::default())
    }

    /// Validate and register a job, then hand it to the pipeline.
    ///
    /// Returns immediately with a receipt; generation continues on a
    /// detached task. The receipt's provider is the static table's pick and
    /// may be superseded by live routing once the pipeline runs.
    pub async fn submit_job(&self, config: JobConfig) -> Result<SubmitReceipt, EngineError> {
        config.validate()?;

        let decision = self.static_router.route(&config);
        let receipt = self.registry.create(config.clone(), decision).await;
        self.events.emit(
            receipt.job_id,
            JobEventKind::Submitted {
                provider: receipt.provider,
            },
        );

        let pipeline = Arc::clone(&self.pipeline);
        let cancel = self.cancel.clone();
        let job_id = receipt.job_id;
        self.tasks.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(job_id = %job_id, "Engine shutting down, abandoning job");
                }
                _ = pipeline.run(job_id, config) => {}
            }
        });

        Ok(receipt)
    }

    pub async fn get_job(&self, id: JobId) -> Option<Job> {
        self.registry.get(id).await
    }

    pub async fn list_jobs(&self, status: Option<JobStatus>, limit: usize) -> Vec<JobSummary> {
        self.registry.list(status, limit).await
    }

    /// Subscribe to the job event feed.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    pub async fn daily_costs(&self, date: NaiveDate) -> HashMap<ProviderId, CostRecord> {
        self.costs.daily_costs(date).await
    }

    pub async fn breaker_snapshot(&self, provider: ProviderId) -> BreakerSnapshot {
        self.breakers.for_provider(provider).snapshot().await
    }

    /// Start the background eviction sweeper. Call once after construction,
    /// from within a runtime.
    pub fn start_sweeper(&self) {
        self.tasks.spawn(run_sweeper(
            Arc::clone(&self.registry),
            self.registry_config.clone(),
            self.cancel.clone(),
        ));
    }

    /// Stop accepting work and wait for in-flight tasks to wind down.
    pub async fn shutdown(&self) {
        tracing::info!("Engine shutting down");
        self.cancel.cancel();
        self.tasks.close();
        self.tasks.wait().await;
    }
}
