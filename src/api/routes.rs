//! Versioned API route configuration.

use axum::Router;
use axum::routing::{get, post};

use crate::api::handlers::{create_link_handler, stats_handler};
use crate::state::AppState;

/// Routes mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/links", post(create_link_handler))
        .route("/links/{code}/stats", get(stats_handler))
}
