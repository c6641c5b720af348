//! Health checks.
//!
//! This service holds no external dependencies (no database, no cache), so
//! health reduces to process liveness and uptime. The shapes still follow
//! the Kubernetes probe split: liveness, readiness, and a human-facing
//! report.

mod routes;

pub use routes::*;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

/// Health service tracking process start time.
pub struct HealthService {
    started_at: Instant,
}

impl HealthService {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn report(&self) -> HealthReport {
        HealthReport {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
            uptime_seconds: self.uptime_seconds(),
            timestamp: Utc::now(),
        }
    }
}

impl Default for HealthService {
    fn default() -> Self {
        Self::new()
    }
}

/// Overall health report.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

/// Liveness probe response.
#[derive(Debug, Clone, Serialize)]
pub struct LivenessResponse {
    pub alive: bool,
}

impl LivenessResponse {
    pub fn alive() -> Self {
        Self { alive: true }
    }
}

/// Readiness probe response.
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_shape() {
        let service = HealthService::new();
        let report = service.report();

        assert_eq!(report.status, "healthy");
        assert_eq!(report.version, env!("CARGO_PKG_VERSION"));
    }
}
