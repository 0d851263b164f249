//! Handler for the health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Database**: Round-trips a trivial query through the pool
/// 2. **Click Queue**: Checks the channel is open and reports free capacity
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let db_check = check_database(&state).await;
    let queue_check = check_click_queue(&state);

    let all_healthy = db_check.status == "ok" && queue_check.status == "ok";

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database: db_check,
            click_queue: queue_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Checks database connectivity.
async fn check_database(state: &AppState) -> CheckStatus {
    match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(state.db.as_ref())
        .await
    {
        Ok(_) => CheckStatus {
            status: "ok".to_string(),
            message: None,
        },
        Err(e) => CheckStatus {
            status: "error".to_string(),
            message: Some(format!("Database error: {}", e)),
        },
    }
}

/// Checks that the click queue is still accepting events.
fn check_click_queue(state: &AppState) -> CheckStatus {
    if state.clicks.is_closed() {
        CheckStatus {
            status: "error".to_string(),
            message: Some("Click queue is closed".to_string()),
        }
    } else {
        CheckStatus {
            status: "ok".to_string(),
            message: Some(format!(
                "Free capacity: {}, dropped: {}",
                state.clicks.capacity(),
                state.clicks.dropped()
            )),
        }
    }
}
