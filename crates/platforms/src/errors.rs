//! Error types for the platform adapter crate.

use thiserror::Error;

use crate::models::Platform;

/// Errors that can occur while talking to an ad platform API.
///
/// Adapters return `Ok(false)` from `authenticate` for a rejected token;
/// `PlatformError` is reserved for conditions the caller cannot branch on
/// with a boolean: transport failures, vendor-side errors, malformed
/// responses.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The credential bundle is missing required fields.
    /// Detected by shape validation, before any network call.
    #[error("Invalid credentials for {platform}: missing {missing:?}")]
    InvalidCredentials {
        platform: Platform,
        missing: Vec<String>,
    },

    /// The vendor rejected the request for lack of authorization (HTTP 401/403).
    #[error("Authentication failed: {platform}")]
    AuthenticationFailed { platform: Platform },

    /// The vendor rate limited the request (HTTP 429).
    #[error("Rate limited: {platform}")]
    RateLimited { platform: Platform },

    /// The request to the vendor timed out.
    #[error("Timeout: {platform}")]
    Timeout { platform: Platform },

    /// The vendor returned a non-2xx response with an error payload.
    /// `suggestions` carries actionable hints surfaced to API clients.
    #[error("Platform API error: {platform} - {message}")]
    Api {
        platform: Platform,
        message: String,
        suggestions: Vec<String>,
    },

    /// The vendor response could not be parsed into the expected shape.
    #[error("Failed to parse {platform} response: {message}")]
    Parse { platform: Platform, message: String },

    /// The operation is not supported by this platform.
    #[error("Operation not supported by {platform}: {operation}")]
    NotSupported {
        platform: Platform,
        operation: String,
    },

    /// A network error occurred while communicating with the vendor.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl PlatformError {
    /// True for failures callers treat as expected (bad credentials,
    /// vendor 4xx) rather than bugs or infrastructure trouble.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::AuthenticationFailed { .. }
                | Self::RateLimited { .. }
                | Self::Api { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = PlatformError::RateLimited {
            platform: Platform::Meta,
        };
        assert_eq!(format!("{}", error), "Rate limited: meta_ads");

        let error = PlatformError::Api {
            platform: Platform::Google,
            message: "invalid customer id".to_string(),
            suggestions: vec![],
        };
        assert_eq!(
            format!("{}", error),
            "Platform API error: google_ads - invalid customer id"
        );
    }

    #[test]
    fn test_expected_classification() {
        assert!(PlatformError::AuthenticationFailed {
            platform: Platform::LinkedIn
        }
        .is_expected());
        assert!(!PlatformError::Parse {
            platform: Platform::Pinterest,
            message: "truncated body".to_string()
        }
        .is_expected());
    }
}
