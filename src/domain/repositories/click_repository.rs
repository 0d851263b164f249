//! Repository trait for click persistence.

use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for recording click events.
///
/// Clicks are written exclusively by the pipeline workers; this subsystem
/// never updates or deletes them.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Records a new click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors, including a
    /// `link_id` that no longer references an existing link.
    async fn create(&self, new_click: NewClick) -> Result<Click, AppError>;
}
