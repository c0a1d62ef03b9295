//! Provider selection: static tables, health-aware dynamic routing, and
//! failover planning.

pub mod catalog;
pub mod dynamic;
pub mod failover;
pub mod static_routes;

pub use catalog::{fallback_chain, ProviderCatalog};
pub use dynamic::DynamicRouter;
pub use failover::plan_failover;
pub use static_routes::{StaticRouter, StaticRoutes};
