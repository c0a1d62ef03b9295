//! Domain types for the reelgen generation engine.
//!
//! This crate holds the provider enumeration, job configuration, routing
//! decision and media types, and the engine-wide error taxonomy. It has no
//! internal dependencies so that every other workspace crate can build on it.

pub mod config;
pub mod error;
pub mod media;
pub mod provider;
pub mod routing;

/// Globally unique job identifier (UUIDv7, time-ordered).
pub type JobId = uuid::Uuid;
