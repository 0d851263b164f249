//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`                    - Short link redirect
//! - `GET  /health`                    - Health check: DB, click queue
//! - `POST /api/v1/links`              - Create a short link
//! - `GET  /api/v1/links/{code}/stats` - Click statistics
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/health", get(health_handler))
        .nest("/api/v1", api::routes::routes())
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
