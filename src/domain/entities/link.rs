//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL link.
///
/// Maps a unique short code to its original long URL. Links are immutable
/// once created; the code never changes after assignment.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(id: i64, code: String, long_url: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            code,
            long_url,
            created_at,
        }
    }
}

/// Input data for creating a new link.
///
/// `created_at` is stamped by the creation service at the moment a free
/// short code is accepted, not by the database.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub code: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
}
