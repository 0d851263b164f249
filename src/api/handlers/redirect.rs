//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect},
};
use std::net::SocketAddr;

use crate::domain::click_event::ClickEvent;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Click Tracking
///
/// After the link is resolved, a click event is submitted to the bounded
/// queue for asynchronous persistence. Submission never blocks this
/// handler; when the queue is full the event is dropped and only counted.
/// The redirect response does not depend on the submission outcome.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<impl IntoResponse, AppError> {
    let link = state.link_service.get_link_by_code(&code).await?;

    let event = ClickEvent::new(
        code,
        link.long_url.clone(),
        Some(addr.ip().to_string()),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
        headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
    );

    state.clicks.submit(event);

    Ok(Redirect::temporary(&link.long_url))
}
