//! The generation engine: job submission, resilient provider dispatch, and
//! lifecycle observation, assembled from the workspace crates.

pub mod engine;
pub mod events;
pub mod orchestrator;
pub mod renderers;
pub mod telemetry;

pub use engine::{EngineConfig, EngineServices, GenerationEngine};
pub use events::{EventBus, JobEvent, JobEventKind};
pub use orchestrator::Pipeline;
pub use renderers::RendererSet;
