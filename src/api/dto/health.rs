//! DTOs for the health check endpoint.

use serde::Serialize;

/// Overall service health with per-component checks.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

/// Component-level health checks.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: CheckStatus,
    pub click_queue: CheckStatus,
}

/// Status of a single health check.
#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
