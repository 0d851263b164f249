//! Shared application state injected into HTTP handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::application::services::LinkService;
use crate::domain::click_worker::ClickPipeline;
use crate::infrastructure::persistence::PgLinkRepository;

/// State shared by all request handlers.
///
/// Every component here is explicitly constructed at startup and injected;
/// there are no lazily initialized process-wide singletons.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<PgPool>,
    pub base_url: String,
    pub link_service: Arc<LinkService<PgLinkRepository>>,
    pub clicks: ClickPipeline,
}

impl AppState {
    /// Creates the shared state.
    pub fn new(
        db: Arc<PgPool>,
        base_url: String,
        link_service: Arc<LinkService<PgLinkRepository>>,
        clicks: ClickPipeline,
    ) -> Self {
        Self {
            db,
            base_url,
            link_service,
            clicks,
        }
    }
}
