//! Click entity representing a single redirect event.

use chrono::{DateTime, Utc};

/// A click recorded when a shortened link is accessed.
///
/// Captures per-redirect metadata for analytics. Client fields are optional
/// since headers may be missing or withheld.
#[derive(Debug, Clone)]
pub struct Click {
    pub id: i64,
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub ip: Option<String>,
}

impl Click {
    /// Creates a new Click instance.
    pub fn new(
        id: i64,
        link_id: i64,
        clicked_at: DateTime<Utc>,
        user_agent: Option<String>,
        referer: Option<String>,
        ip: Option<String>,
    ) -> Self {
        Self {
            id,
            link_id,
            clicked_at,
            user_agent,
            referer,
            ip,
        }
    }
}

/// Input data for recording a new click.
///
/// `link_id` must reference an existing link; the pipeline worker resolves
/// it from the event's short code immediately before persistence.
/// `clicked_at` carries the capture time from the redirect path, not the
/// time of the database write.
#[derive(Debug, Clone)]
pub struct NewClick {
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub ip: Option<String>,
}
