//! Deterministic in-process collaborator implementations.
//!
//! These mirror the reference backends closely enough to drive the whole
//! pipeline without network access: a three-scene script writer, a
//! word-count-based narrator, per-scene imagery, and one renderer per
//! provider identity with injectable failures. The engine's integration
//! tests are built on them.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use reelgen_core::error::EngineError;
use reelgen_core::media::{
    estimate_narration_secs, resolution_for, MediaArtifact, Scene, SceneImage, Script,
    SlideshowImages, VoiceTrack,
};
use reelgen_core::provider::ProviderId;

use crate::poll::poll_until_complete;
use crate::traits::{
    HealthCheckService, HealthStatus, ImageService, MediaProvider, RenderRequest, ScriptService,
    VoiceOptions, VoiceService,
};

/// Fixed status-poll interval for simulated queued renders.
const SIM_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polling bound: 120 attempts at 5 s is a ten-minute ceiling.
const SIM_MAX_POLL_ATTEMPTS: u32 = 120;

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

/// Writes a fixed three-scene script shaped by subject and style.
#[derive(Default)]
pub struct SimScriptService {
    fail: bool,
}

impl SimScriptService {
    pub fn new() -> Self {
        Self::default()
    }

    /// A script service whose every call fails. For failure-path tests.
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl ScriptService for SimScriptService {
    async fn generate(
        &self,
        subject: &str,
        prompt: Option<&str>,
        style: &str,
    ) -> Result<Script, EngineError> {
        if self.fail {
            return Err(EngineError::Transient {
                provider: ProviderId::Runway,
                message: "script backend unavailable".into(),
            });
        }

        let opening = prompt.map(str::to_string).unwrap_or_else(|| {
            format!("This is the beginning of our story about {subject}.")
        });

        let scenes = vec![
            Scene {
                id: 1,
                text: opening,
                duration_secs: 5.0,
                image_prompt: format!("Beautiful {style} style image related to {subject}"),
            },
            Scene {
                id: 2,
                text: "As we delve deeper into this subject, we discover amazing details that \
                       capture our imagination."
                    .to_string(),
                duration_secs: 5.0,
                image_prompt: format!("Detailed {style} style illustration showing key concepts"),
            },
            Scene {
                id: 3,
                text: "This conclusion brings together all the elements we've explored, leaving \
                       us with new understanding."
                    .to_string(),
                duration_secs: 4.0,
                image_prompt: format!("Concluding {style} style image that summarizes the story"),
            },
        ];
        let total_duration_secs = scenes.iter().map(|s| s.duration_secs).sum();

        Ok(Script {
            title: format!("The Story of {subject}"),
            scenes,
            total_duration_secs,
        })
    }
}

// ---------------------------------------------------------------------------
// Voice
// ---------------------------------------------------------------------------

/// Synthesizes narration with a word-count duration estimate.
#[derive(Default)]
pub struct SimVoiceService {
    fail: bool,
}

impl SimVoiceService {
    pub fn new() -> Self {
        Self::default()
    }

    /// A voice service whose every call fails, to exercise the placeholder
    /// degradation path.
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl VoiceService for SimVoiceService {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        options: &VoiceOptions,
    ) -> Result<VoiceTrack, EngineError> {
        if self.fail {
            return Err(EngineError::Transient {
                provider: ProviderId::Runway,
                message: "voice backend unavailable".into(),
            });
        }

        Ok(VoiceTrack {
            audio_ref: format!(
                "https://voice.example.com/audio/{}_{voice_id}.{}",
                uuid::Uuid::now_v7(),
                options.format
            ),
            duration_secs: estimate_narration_secs(text),
            format: options.format.clone(),
            voice_id: voice_id.to_string(),
            placeholder: false,
        })
    }
}

// ---------------------------------------------------------------------------
// Imagery
// ---------------------------------------------------------------------------

/// Produces one image per scene from the scene's image prompt.
#[derive(Default)]
pub struct SimImageService {
    fail: bool,
}

impl SimImageService {
    pub fn new() -> Self {
        Self::default()
    }

    /// An image service whose every call fails, to exercise the stock-image
    /// degradation path.
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl ImageService for SimImageService {
    async fn generate_for_slideshow(
        &self,
        script: &Script,
        style: &str,
    ) -> Result<SlideshowImages, EngineError> {
        if self.fail {
            return Err(EngineError::Transient {
                provider: ProviderId::Slideshow,
                message: "image backend unavailable".into(),
            });
        }

        let images = script
            .scenes
            .iter()
            .map(|scene| SceneImage {
                scene_id: scene.id,
                image_ref: format!(
                    "https://images.example.com/{}_{}.jpg",
                    uuid::Uuid::now_v7(),
                    scene.id
                ),
                prompt: format!("{}, {style} style, high quality", scene.image_prompt),
                duration_secs: scene.duration_secs,
            })
            .collect();

        Ok(SlideshowImages {
            images,
            source: "sim_images".to_string(),
            quality: "high".to_string(),
            placeholder: false,
        })
    }
}

// ---------------------------------------------------------------------------
// Media render
// ---------------------------------------------------------------------------

/// Simulated renderer for one provider identity.
///
/// Renders succeed by default. Failures are injected per call with
/// [`SimMediaProvider::fail_next`] (consumed queue) or permanently with
/// [`SimMediaProvider::fail_always`]. A queued-render simulation
/// (`with_queue_polls`) routes the call through the bounded polling helper.
pub struct SimMediaProvider {
    id: ProviderId,
    queue_polls: u32,
    scripted_failures: Mutex<VecDeque<EngineError>>,
    permanent_failure: Mutex<Option<EngineError>>,
    calls: AtomicU32,
}

impl SimMediaProvider {
    pub fn new(id: ProviderId) -> Self {
        Self {
            id,
            queue_polls: 0,
            scripted_failures: Mutex::new(VecDeque::new()),
            permanent_failure: Mutex::new(None),
            calls: AtomicU32::new(0),
        }
    }

    /// Simulate a backend that reports "still working" `polls` times before
    /// the artifact becomes ready.
    pub fn with_queue_polls(mut self, polls: u32) -> Self {
        self.queue_polls = polls;
        self
    }

    /// Queue an error for the next render call; consumed in FIFO order.
    pub fn fail_next(&self, err: EngineError) {
        if let Ok(mut queue) = self.scripted_failures.lock() {
            queue.push_back(err);
        }
    }

    /// Make every future render call fail with `err`.
    pub fn fail_always(&self, err: EngineError) {
        if let Ok(mut slot) = self.permanent_failure.lock() {
            *slot = Some(err);
        }
    }

    /// How many times `render` has been invoked.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_failure(&self) -> Option<EngineError> {
        if let Ok(mut queue) = self.scripted_failures.lock() {
            if let Some(err) = queue.pop_front() {
                return Some(err);
            }
        }
        self.permanent_failure
            .lock()
            .ok()
            .and_then(|slot| slot.clone())
    }

    fn build_artifact(&self, request: &RenderRequest<'_>) -> MediaArtifact {
        let duration_secs = request
            .config
            .duration_secs
            .map(f64::from)
            .unwrap_or(request.script.total_duration_secs);
        let thumbnail_ref = request
            .images
            .and_then(|set| set.images.first())
            .map(|img| img.image_ref.clone())
            .unwrap_or_else(|| {
                format!(
                    "https://{}.example.com/thumbs/{}.jpg",
                    self.id,
                    uuid::Uuid::now_v7()
                )
            });

        MediaArtifact {
            media_ref: format!(
                "https://{}.example.com/videos/{}.mp4",
                self.id,
                uuid::Uuid::now_v7()
            ),
            thumbnail_ref,
            duration_secs,
            resolution: resolution_for(self.id, request.config.aspect_ratio).to_string(),
            format: "mp4".to_string(),
            quality: self.id.capabilities().quality.to_string(),
            provider: self.id,
        }
    }
}

#[async_trait]
impl MediaProvider for SimMediaProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn render(&self, request: RenderRequest<'_>) -> Result<MediaArtifact, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.next_failure() {
            tracing::debug!(provider = %self.id, error = %err, "Simulated render failure");
            return Err(err);
        }

        let artifact = self.build_artifact(&request);
        if self.queue_polls == 0 {
            return Ok(artifact);
        }

        // Simulate a queued remote render: "not ready" for the first
        // `queue_polls` status checks.
        let ready_after = self.queue_polls;
        let mut artifact = Some(artifact);
        poll_until_complete(self.id, SIM_POLL_INTERVAL, SIM_MAX_POLL_ATTEMPTS, |attempt| {
            let value = if attempt > ready_after {
                artifact.take()
            } else {
                None
            };
            async move { Ok(value) }
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// Health probe with per-provider switchable status.
pub struct SimHealthService {
    statuses: Mutex<HashMap<ProviderId, bool>>,
}

impl SimHealthService {
    /// All providers healthy.
    pub fn all_healthy() -> Self {
        Self {
            statuses: Mutex::new(ProviderId::ALL.into_iter().map(|p| (p, true)).collect()),
        }
    }

    /// All providers unhealthy.
    pub fn all_unhealthy() -> Self {
        let service = Self::all_healthy();
        for provider in ProviderId::ALL {
            service.set_healthy(provider, false);
        }
        service
    }

    pub fn set_healthy(&self, provider: ProviderId, healthy: bool) {
        if let Ok(mut statuses) = self.statuses.lock() {
            statuses.insert(provider, healthy);
        }
    }

    fn response_time(provider: ProviderId) -> u64 {
        match provider {
            ProviderId::Runway => 150,
            ProviderId::GeminiVeo => 85,
            ProviderId::Slideshow => 25,
        }
    }
}

#[async_trait]
impl HealthCheckService for SimHealthService {
    async fn check(&self, provider: ProviderId) -> HealthStatus {
        let healthy = self
            .statuses
            .lock()
            .map(|statuses| statuses.get(&provider).copied().unwrap_or(false))
            .unwrap_or(false);

        if healthy {
            HealthStatus::healthy(Self::response_time(provider))
        } else {
            HealthStatus::unhealthy()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use reelgen_core::config::{AspectRatio, JobConfig};

    fn config() -> JobConfig {
        JobConfig {
            topic: Some("space".into()),
            prompt: None,
            style: "cinematic".into(),
            voice: None,
            duration_secs: Some(30),
            aspect_ratio: AspectRatio::Portrait,
            include_voiceover: false,
            content_type: None,
        }
    }

    async fn script() -> Script {
        SimScriptService::new()
            .generate("space", None, "cinematic")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn script_has_three_scenes_and_matching_total() {
        let script = script().await;
        assert_eq!(script.scenes.len(), 3);
        assert_eq!(script.total_duration_secs, 14.0);
        assert_eq!(script.title, "The Story of space");
    }

    #[tokio::test]
    async fn voice_duration_tracks_word_count() {
        let track = SimVoiceService::new()
            .synthesize("one two three", "sarah", &VoiceOptions::default())
            .await
            .unwrap();
        assert_eq!(track.duration_secs, estimate_narration_secs("one two three"));
        assert!(!track.placeholder);
    }

    #[tokio::test]
    async fn images_cover_every_scene() {
        let script = script().await;
        let set = SimImageService::new()
            .generate_for_slideshow(&script, "slideshow_modern")
            .await
            .unwrap();
        assert_eq!(set.images.len(), script.scenes.len());
        assert!(!set.placeholder);
    }

    #[tokio::test]
    async fn render_uses_provider_resolution() {
        let provider = SimMediaProvider::new(ProviderId::GeminiVeo);
        let script = script().await;
        let config = config();
        let artifact = provider
            .render(RenderRequest {
                script: &script,
                voice: None,
                images: None,
                config: &config,
                adaptations: None,
            })
            .await
            .unwrap();

        assert_eq!(artifact.resolution, "720x1280");
        assert_eq!(artifact.provider, ProviderId::GeminiVeo);
        assert_eq!(artifact.duration_secs, 30.0);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn queued_render_completes_after_polling() {
        let provider = SimMediaProvider::new(ProviderId::Runway).with_queue_polls(3);
        let script = script().await;
        let config = config();
        let artifact = provider
            .render(RenderRequest {
                script: &script,
                voice: None,
                images: None,
                config: &config,
                adaptations: None,
            })
            .await
            .unwrap();
        assert_eq!(artifact.provider, ProviderId::Runway);
    }

    #[tokio::test]
    async fn scripted_failure_is_consumed_then_succeeds() {
        let provider = SimMediaProvider::new(ProviderId::Runway);
        provider.fail_next(EngineError::Transient {
            provider: ProviderId::Runway,
            message: "502".into(),
        });

        let script = script().await;
        let config = config();
        let request = || RenderRequest {
            script: &script,
            voice: None,
            images: None,
            config: &config,
            adaptations: None,
        };

        assert_matches!(
            provider.render(request()).await,
            Err(EngineError::Transient { .. })
        );
        assert_matches!(provider.render(request()).await, Ok(_));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn health_toggles_per_provider() {
        let health = SimHealthService::all_healthy();
        health.set_healthy(ProviderId::Runway, false);

        assert!(!health.check(ProviderId::Runway).await.healthy);
        assert!(health.check(ProviderId::GeminiVeo).await.healthy);
        assert_eq!(health.check(ProviderId::Slideshow).await.response_time_ms, 25);
    }
}
