//! Collaborator contracts consumed by the generation engine.
//!
//! The traits here are abstract service seams, not wire-level API bindings:
//! one [`MediaProvider`] implementation exists per backend identity, and the
//! engine talks to script, voice, imagery, and health collaborators through
//! trait objects. The `sim` module ships deterministic in-process
//! implementations mirroring the reference backends, used by the engine's
//! tests and by embedders that want a dry-run pipeline.

pub mod poll;
pub mod sim;
pub mod traits;

pub use poll::poll_until_complete;
pub use traits::{
    HealthCheckService, HealthStatus, ImageService, MediaProvider, RenderRequest, ScriptService,
    VoiceOptions, VoiceService,
};
