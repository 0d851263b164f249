//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};

/// An in-memory click event awaiting asynchronous persistence.
///
/// Created by the redirect path and handed to the bounded click queue so
/// the redirect response never waits on a database write. The event carries
/// only the short code; the worker resolves it to a link id immediately
/// before persisting, and an event whose code no longer resolves is
/// discarded.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub short_code: String,
    pub long_url: String,
    pub timestamp: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

impl ClickEvent {
    /// Creates a click event stamped with the current time.
    pub fn new(
        short_code: String,
        long_url: String,
        ip: Option<String>,
        user_agent: Option<&str>,
        referrer: Option<&str>,
    ) -> Self {
        Self {
            short_code,
            long_url,
            timestamp: Utc::now(),
            ip,
            user_agent: user_agent.map(|s| s.to_string()),
            referrer: referrer.map(|s| s.to_string()),
        }
    }
}
