//! DTOs for link statistics.

use serde::Serialize;

/// Aggregated statistics for a single short link.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub short_code: String,
    pub long_url: String,
    pub total_clicks: i64,
}
