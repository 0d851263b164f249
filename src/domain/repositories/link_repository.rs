//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing short links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code already exists
    /// (store-level uniqueness constraint). Returns [`AppError::Internal`]
    /// on other database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Returns every known link.
    ///
    /// Used by the availability monitor for its full sweep.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_all(&self) -> Result<Vec<Link>, AppError>;

    /// Counts recorded clicks for a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count_clicks_by_link_id(&self, link_id: i64) -> Result<i64, AppError>;
}
