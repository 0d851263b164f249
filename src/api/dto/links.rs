//! DTOs for link creation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a URL.
///
/// Well-formedness is checked here at the boundary; the creation service
/// itself only refuses empty input.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// The original URL to shorten (must be a valid URL).
    #[validate(url(message = "Invalid URL format"))]
    pub long_url: String,
}

/// Response for a newly created link.
#[derive(Debug, Serialize)]
pub struct CreateLinkResponse {
    pub short_code: String,
    pub long_url: String,
    pub full_short_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_url_passes_validation() {
        let request = CreateLinkRequest {
            long_url: "https://example.com/some/path".to_string(),
        };

        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_invalid_url_fails_validation() {
        let request = CreateLinkRequest {
            long_url: "not-a-url".to_string(),
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_empty_url_fails_validation() {
        let request = CreateLinkRequest {
            long_url: String::new(),
        };

        assert!(request.validate().is_err());
    }
}
