//! Handler for link statistics.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::stats::StatsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Retrieves total click count for a short link.
///
/// # Endpoint
///
/// `GET /api/v1/links/{code}/stats`
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<StatsResponse>, AppError> {
    let (link, total_clicks) = state.link_service.get_link_stats(&code).await?;

    Ok(Json(StatsResponse {
        short_code: link.code,
        long_url: link.long_url,
        total_clicks,
    }))
}
