//! In-memory job registry with lifecycle tracking and background cleanup.

pub mod registry;
pub mod sweeper;

pub use registry::{
    Job, JobRegistry, JobStage, JobStatus, JobSummary, RegistryConfig, SubmitReceipt,
};
pub use sweeper::run_sweeper;
