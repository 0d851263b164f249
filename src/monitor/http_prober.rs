//! HTTP HEAD implementation of the URL prober.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::error::AppError;
use crate::monitor::UrlProber;

/// Probes URLs with lightweight HEAD requests.
///
/// A URL is accessible when the response status is in the 200-399 range.
/// Redirects are not followed: the raw status is classified, so a 3xx
/// answer counts as accessible without probing its target. Timeouts and
/// transport errors are treated exactly like a down server.
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    /// Creates a prober whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                AppError::internal(
                    "Failed to build probe HTTP client",
                    json!({ "source": e.to_string() }),
                )
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl UrlProber for HttpProber {
    async fn is_accessible(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                (200..400).contains(&status)
            }
            Err(e) => {
                debug!(%url, error = %e, "probe request failed");
                false
            }
        }
    }
}
