//! Health check service for verifying the entity stores
//!
//! Readiness is decided by one round-trip per store; the risk and category
//! stores are probed in parallel.

use serde::Serialize;
use std::time::{Duration, Instant};

use crate::models::{CategoryFilter, RiskFilter};
use crate::repositories::Stores;

/// Status of an individual store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// Store is healthy and responding
    Healthy,
    /// Store is failing or unreachable
    Unhealthy,
}

/// Result of a single store health check
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealth {
    pub name: &'static str,
    pub status: ServiceStatus,
    /// Response time in milliseconds
    pub response_time_ms: u64,
    /// Error message if unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceHealth {
    pub fn healthy(name: &'static str, response_time: Duration) -> Self {
        Self {
            name,
            status: ServiceStatus::Healthy,
            response_time_ms: response_time.as_millis() as u64,
            error: None,
        }
    }

    pub fn unhealthy(name: &'static str, error: impl Into<String>, response_time: Duration) -> Self {
        Self {
            name,
            status: ServiceStatus::Unhealthy,
            response_time_ms: response_time.as_millis() as u64,
            error: Some(error.into()),
        }
    }
}

/// Aggregated health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResponse {
    /// Overall status (healthy only if every store is healthy)
    pub status: ServiceStatus,
    pub services: Vec<ServiceHealth>,
    /// Total time to complete all health checks
    pub total_time_ms: u64,
    /// API version
    pub version: &'static str,
}

impl HealthCheckResponse {
    pub fn new(services: Vec<ServiceHealth>, total_time: Duration) -> Self {
        let status = if services.iter().all(|s| s.status == ServiceStatus::Healthy) {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Unhealthy
        };

        Self {
            status,
            services,
            total_time_ms: total_time.as_millis() as u64,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Check if overall health is good
    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}

/// Health check service over the configured stores
#[derive(Clone)]
pub struct HealthService {
    stores: Stores,
}

impl HealthService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    async fn check_risks(&self) -> ServiceHealth {
        let start = Instant::now();
        match self.stores.risks.count(&RiskFilter::default()).await {
            Ok(_) => ServiceHealth::healthy("risks", start.elapsed()),
            Err(e) => {
                tracing::warn!(error = %e, "Risk store health check failed");
                ServiceHealth::unhealthy("risks", "store unavailable", start.elapsed())
            }
        }
    }

    async fn check_categories(&self) -> ServiceHealth {
        let start = Instant::now();
        match self.stores.categories.count(&CategoryFilter::default()).await {
            Ok(_) => ServiceHealth::healthy("categories", start.elapsed()),
            Err(e) => {
                tracing::warn!(error = %e, "Category store health check failed");
                ServiceHealth::unhealthy("categories", "store unavailable", start.elapsed())
            }
        }
    }

    /// Run all health checks in parallel
    pub async fn check_all(&self) -> HealthCheckResponse {
        let start = Instant::now();
        let (risks, categories) = tokio::join!(self.check_risks(), self.check_categories());
        HealthCheckResponse::new(vec![risks, categories], start.elapsed())
    }
}
