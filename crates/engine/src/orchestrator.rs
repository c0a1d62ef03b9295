//! The generation pipeline: route, script, voice, imagery, render.
//!
//! Each submitted job runs through here once, on its own task. Script
//! failure is terminal; voice and imagery failures degrade to placeholders;
//! render failure gets exactly one failover to another live provider before
//! the job fails. Every remote render goes through the limiter, then the
//! provider's breaker, with retries inside the breaker so a burst of
//! transient errors counts as one breaker failure.

use std::sync::Arc;

use reelgen_core::config::JobConfig;
use reelgen_core::error::{EngineError, JobError};
use reelgen_core::media::{
    estimate_narration_secs, GenerationResult, MediaArtifact, SceneImage, Script, SlideshowImages,
    VoiceTrack,
};
use reelgen_core::provider::RenderMode;
use reelgen_core::routing::RoutingDecision;
use reelgen_core::JobId;
use reelgen_jobs::{JobRegistry, JobStage};
use reelgen_providers::traits::{
    ImageService, RenderRequest, ScriptService, VoiceOptions, VoiceService,
};
use reelgen_resilience::{with_retry, BreakerError, BreakerSet, CostTracker, RateLimiter, RetryPolicy};
use reelgen_routing::{plan_failover, DynamicRouter};

use crate::events::{EventBus, JobEventKind};
use crate::renderers::RendererSet;

const DEFAULT_VOICE: &str = "narrator_neutral";

/// Everything one pipeline run needs. Shared by all jobs; per-job state
/// lives in the registry.
pub struct Pipeline {
    pub(crate) script: Arc<dyn ScriptService>,
    pub(crate) voice: Arc<dyn VoiceService>,
    pub(crate) images: Arc<dyn ImageService>,
    pub(crate) renderers: RendererSet,
    pub(crate) router: DynamicRouter,
    pub(crate) limiter: Arc<RateLimiter>,
    pub(crate) breakers: Arc<BreakerSet>,
    pub(crate) retry: RetryPolicy,
    pub(crate) costs: Arc<CostTracker>,
    pub(crate) registry: Arc<JobRegistry>,
    pub(crate) events: EventBus,
}

impl Pipeline {
    /// Run one job to a terminal state. Never panics; any stage error is
    /// recorded on the job.
    pub async fn run(&self, job_id: JobId, config: JobConfig) {
        if let Err(err) = self.run_inner(job_id, &config).await {
            tracing::error!(job_id = %job_id, error = %err, kind = err.kind(), "Job failed");
            self.registry.fail(job_id, JobError::from(&err)).await;
            self.events.emit(
                job_id,
                JobEventKind::Failed {
                    kind: err.kind().to_string(),
                },
            );
        }
    }

    async fn run_inner(&self, job_id: JobId, config: &JobConfig) -> Result<(), EngineError> {
        self.registry.mark_running(job_id).await;

        // Live routing happens here, not at submit time; health may have
        // changed since the receipt was issued.
        let decision = self.router.route(config).await?;
        self.registry.set_routing(job_id, decision.clone()).await;

        self.advance(job_id, JobStage::ScriptGeneration).await;
        let script = self
            .script
            .generate(config.subject(), config.prompt.as_deref(), &config.style)
            .await?;
        tracing::info!(job_id = %job_id, scenes = script.scenes.len(), "Script generated");

        let voice = if config.include_voiceover {
            self.advance(job_id, JobStage::VoiceSynthesis).await;
            Some(self.voice_or_placeholder(&script, config).await)
        } else {
            None
        };

        let (artifact, images, provider) = match self
            .render_with(job_id, &decision, &script, voice.as_ref(), config)
            .await
        {
            Ok((artifact, images)) => (artifact, images, decision.provider),
            Err(err) => {
                tracing::warn!(
                    job_id = %job_id,
                    provider = %decision.provider,
                    error = %err,
                    "Render failed, attempting failover",
                );
                // Health may have moved since routing; plan against a fresh
                // probe, not the snapshot on the failed decision.
                let available = self.router.available_providers().await;
                let fallback = plan_failover(decision.provider, &available, config)?;
                let target = fallback.provider;
                self.events.emit(
                    job_id,
                    JobEventKind::FailedOver {
                        from: decision.provider,
                        to: target,
                    },
                );
                self.registry.set_routing(job_id, fallback.clone()).await;
                self.advance(job_id, JobStage::Failover).await;

                let (artifact, images) = self
                    .render_with(job_id, &fallback, &script, voice.as_ref(), config)
                    .await?;
                (artifact, images, target)
            }
        };

        let result = GenerationResult {
            artifact,
            script,
            voice,
            images,
        };
        self.registry.complete(job_id, result).await;
        self.events
            .emit(job_id, JobEventKind::Completed { provider });
        tracing::info!(job_id = %job_id, provider = %provider, "Job completed");
        Ok(())
    }

    /// One guarded render attempt against a single provider, including
    /// slideshow imagery when the target assembles locally.
    async fn render_with(
        &self,
        job_id: JobId,
        decision: &RoutingDecision,
        script: &Script,
        voice: Option<&VoiceTrack>,
        config: &JobConfig,
    ) -> Result<(MediaArtifact, Option<SlideshowImages>), EngineError> {
        let images = if decision.mode == RenderMode::Slideshow {
            self.advance(job_id, JobStage::ImageGeneration).await;
            Some(self.images_or_stock(script, decision, config).await)
        } else {
            None
        };

        self.advance(job_id, JobStage::Rendering).await;
        self.limiter.admit(decision.provider).await;

        let renderer = self.renderers.for_provider(decision.provider);
        let breaker = self.breakers.for_provider(decision.provider);
        let adaptations = decision.adaptations.as_ref();

        // Retries run inside the breaker: one guarded attempt, however many
        // internal retries it takes, counts once against the breaker.
        let outcome = breaker
            .execute(|| {
                with_retry(
                    &self.retry,
                    || {
                        renderer.render(RenderRequest {
                            script,
                            voice,
                            images: images.as_ref(),
                            config,
                            adaptations,
                        })
                    },
                    EngineError::is_retryable,
                )
            })
            .await;

        let artifact = match outcome {
            Ok(artifact) => artifact,
            Err(BreakerError::Open { provider }) => {
                return Err(EngineError::BreakerOpen { provider })
            }
            Err(BreakerError::Inner(err)) => return Err(err),
        };

        self.costs
            .track_usage(decision.provider, artifact.duration_secs, Some(job_id))
            .await;
        Ok((artifact, images))
    }

    async fn voice_or_placeholder(&self, script: &Script, config: &JobConfig) -> VoiceTrack {
        let text = script.narration_text();
        let voice_id = config.voice.as_deref().unwrap_or(DEFAULT_VOICE);
        match self
            .voice
            .synthesize(&text, voice_id, &VoiceOptions::default())
            .await
        {
            Ok(track) => track,
            Err(err) => {
                tracing::warn!(error = %err, "Voice synthesis failed, using silent placeholder");
                VoiceTrack {
                    audio_ref: "placeholder://silence".to_string(),
                    duration_secs: estimate_narration_secs(&text),
                    format: "mp3".to_string(),
                    voice_id: voice_id.to_string(),
                    placeholder: true,
                }
            }
        }
    }

    async fn images_or_stock(
        &self,
        script: &Script,
        decision: &RoutingDecision,
        config: &JobConfig,
    ) -> SlideshowImages {
        // Failover adaptations may override the imagery style.
        let style = decision
            .adaptations
            .as_ref()
            .and_then(|a| a.image_style.as_deref())
            .unwrap_or(&config.style);

        match self.images.generate_for_slideshow(script, style).await {
            Ok(set) => set,
            Err(err) => {
                tracing::warn!(error = %err, "Image generation failed, using stock imagery");
                SlideshowImages {
                    images: script
                        .scenes
                        .iter()
                        .map(|scene| SceneImage {
                            scene_id: scene.id,
                            image_ref: format!("stock://images/{}.jpg", scene.id),
                            prompt: scene.image_prompt.clone(),
                            duration_secs: scene.duration_secs,
                        })
                        .collect(),
                    source: "stock_images".to_string(),
                    quality: "standard".to_string(),
                    placeholder: true,
                }
            }
        }
    }

    async fn advance(&self, job_id: JobId, stage: JobStage) {
        self.registry.set_stage(job_id, stage).await;
        self.events
            .emit(job_id, JobEventKind::StageChanged { stage });
    }
}
