//! Link creation, lookup, and statistics service.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::debug;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{CODE_LENGTH, generate_code};

/// Maximum attempts to find a free short code before giving up.
const MAX_CODE_ATTEMPTS: usize = 5;

/// Service for creating and retrieving shortened links.
///
/// Short-code uniqueness is guaranteed by the store's unique constraint;
/// the pre-insert lookup only avoids pointless constraint-violation round
/// trips for codes that are already visibly taken.
pub struct LinkService<L: LinkRepository> {
    link_repository: Arc<L>,
}

impl<L: LinkRepository> LinkService<L> {
    /// Creates a new link service.
    pub fn new(link_repository: Arc<L>) -> Self {
        Self { link_repository }
    }

    /// Creates a short link for `long_url`.
    ///
    /// Generates up to [`MAX_CODE_ATTEMPTS`] candidate codes. A candidate is
    /// rejected when the lookup finds it taken, or when the insert itself
    /// reports a uniqueness conflict (a concurrent creation won the race
    /// between check and insert). Any other lookup or insert error aborts
    /// the operation immediately.
    ///
    /// URL well-formedness is the HTTP boundary's concern; this service only
    /// rejects the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty URL,
    /// [`AppError::Internal`] when every attempt collided, and otherwise
    /// whatever the repository reported.
    pub async fn create_link(&self, long_url: String) -> Result<Link, AppError> {
        if long_url.is_empty() {
            return Err(AppError::bad_request("Long URL must not be empty", json!({})));
        }

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_code(CODE_LENGTH)?;

            if self.link_repository.find_by_code(&code).await?.is_some() {
                debug!(
                    %code,
                    attempt,
                    max = MAX_CODE_ATTEMPTS,
                    "short code already taken, regenerating"
                );
                continue;
            }

            let new_link = NewLink {
                code: code.clone(),
                long_url: long_url.clone(),
                created_at: Utc::now(),
            };

            match self.link_repository.create(new_link).await {
                Ok(link) => return Ok(link),
                // Lost the check-then-insert race; the candidate was free a
                // moment ago but another writer claimed it.
                Err(AppError::Conflict { .. }) => {
                    debug!(
                        %code,
                        attempt,
                        max = MAX_CODE_ATTEMPTS,
                        "short code taken at insert time, regenerating"
                    );
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Failed to generate a unique short code",
            json!({ "attempts": MAX_CODE_ATTEMPTS }),
        ))
    }

    /// Retrieves a link by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn get_link_by_code(&self, code: &str) -> Result<Link, AppError> {
        self.link_repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))
    }

    /// Retrieves a link together with its total click count.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn get_link_stats(&self, code: &str) -> Result<(Link, i64), AppError> {
        let link = self.get_link_by_code(code).await?;
        let total_clicks = self
            .link_repository
            .count_clicks_by_link_id(link.id)
            .await?;

        Ok((link, total_clicks))
    }
}
