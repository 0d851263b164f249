//! Handler for link creation.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::json;
use validator::Validate;

use crate::api::dto::links::{CreateLinkRequest, CreateLinkResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a shortened link.
///
/// # Endpoint
///
/// `POST /api/v1/links`
///
/// # Request Body
///
/// ```json
/// { "long_url": "https://example.com/some/path" }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request when the URL is malformed, 500 when no free
/// short code could be found within the retry budget.
pub async fn create_link_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<CreateLinkResponse>), AppError> {
    request.validate().map_err(|e| {
        AppError::bad_request("Invalid request", json!({ "reason": e.to_string() }))
    })?;

    let link = state.link_service.create_link(request.long_url).await?;

    let full_short_url = format!(
        "{}/{}",
        state.base_url.trim_end_matches('/'),
        link.code
    );

    let response = CreateLinkResponse {
        short_code: link.code,
        long_url: link.long_url,
        full_short_url,
    };

    Ok((StatusCode::CREATED, Json(response)))
}
