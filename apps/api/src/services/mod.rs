//! Application services for Riskboard
//!
//! - Health checks against the entity stores
//! - Start-up hydration from bundled fixtures

pub mod health;
pub mod hydration;

pub use health::HealthService;
pub use hydration::{HydrationMode, HydrationService};
