//! Error types for manifest metadata resolution.

use thiserror::Error;

/// Errors returned by [`super::ManifestResolver::resolve`].
#[derive(Debug, Clone, Error)]
pub enum ManifestError {
    /// The metadata endpoint could not be reached, or answered with a
    /// non-success status and no readable envelope.
    #[error("manifest endpoint {url} unavailable: {reason}")]
    RemoteUnavailable {
        /// Metadata endpoint URL.
        url: String,
        /// Transport-level detail.
        reason: String,
    },

    /// The response body is not the expected metadata envelope.
    #[error("invalid manifest envelope from {url}: {reason}")]
    InvalidEnvelope {
        /// Metadata endpoint URL.
        url: String,
        /// Parse or shape failure detail.
        reason: String,
    },

    /// The envelope reports that the provider refused the call.
    ///
    /// `message` is the provider's `Message` field, unmodified.
    #[error("provider rejected manifest request (ErrorCode {error_code} {error_status}): {message}")]
    RemoteRejected {
        /// Provider `ErrorCode` (anything other than 1).
        error_code: i64,
        /// Provider `ErrorStatus` symbol, empty when absent.
        error_status: String,
        /// Provider `Message`, verbatim.
        message: String,
    },
}

impl ManifestError {
    /// Creates a `RemoteUnavailable` error.
    pub fn remote_unavailable(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an `InvalidEnvelope` error.
    pub fn invalid_envelope(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEnvelope {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `RemoteRejected` error.
    pub fn remote_rejected(
        error_code: i64,
        error_status: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::RemoteRejected {
            error_code,
            error_status: error_status.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_rejected_display_keeps_provider_message() {
        let error =
            ManifestError::remote_rejected(2101, "ApiInvalidOrExpiredKey", "Invalid API key.");
        let msg = error.to_string();
        assert!(msg.contains("2101"), "Expected code in: {msg}");
        assert!(msg.contains("ApiInvalidOrExpiredKey"), "Expected status in: {msg}");
        assert!(msg.ends_with("Invalid API key."), "Expected verbatim message in: {msg}");
    }

    #[test]
    fn test_remote_unavailable_display_names_url() {
        let error =
            ManifestError::remote_unavailable("https://example.com/m", "connection refused");
        let msg = error.to_string();
        assert!(msg.contains("https://example.com/m"), "Expected URL in: {msg}");
        assert!(msg.contains("connection refused"), "Expected reason in: {msg}");
    }
}
