//! Metadata resolver: asks the provider where the current manifest lives.
//!
//! The provider wraps every platform response in an envelope:
//!
//! ```json
//! { "ErrorCode": 1, "ErrorStatus": "Success", "Message": "Ok",
//!   "Response": { "version": "...", "mobileWorldContentPaths": { "en": "/common/..." } } }
//! ```
//!
//! `ErrorCode == 1` is the only success value. Anything else is a refusal
//! whose `Message` is surfaced unchanged.

use std::collections::BTreeMap;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::credential::ApiKey;
use super::error::ManifestError;
use crate::config::{
    DEFAULT_BASE_URL, MANIFEST_ENDPOINT, METADATA_CONNECT_TIMEOUT_SECS, METADATA_READ_TIMEOUT_SECS,
};
use crate::http::{ReadTimeout, build_http_client};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "X-API-Key";

/// Envelope `ErrorCode` meaning success.
const SUCCESS_ERROR_CODE: i64 = 1;

// ==================== Envelope Types ====================

/// Top-level platform envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ManifestEnvelope {
    pub error_code: i64,
    #[serde(default)]
    pub error_status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Kept loose: refusals often carry an empty or differently shaped body.
    #[serde(default)]
    pub response: Option<serde_json::Value>,
}

/// The `Response` payload of a successful manifest call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ManifestResponse {
    pub version: String,
    #[serde(default)]
    pub mobile_world_content_paths: BTreeMap<String, String>,
    #[serde(default)]
    pub json_world_content_paths: BTreeMap<String, String>,
}

// ==================== Descriptor ====================

/// Versioned map of language to archive location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestDescriptor {
    /// Provider manifest version string.
    pub version: String,
    /// Language code to archive path (relative to the provider origin).
    pub archive_locations: BTreeMap<String, String>,
    /// Language code to the uncompressed JSON world content path.
    pub json_world_locations: BTreeMap<String, String>,
}

impl ManifestDescriptor {
    /// Returns the archive path for `language`, if the manifest lists one.
    #[must_use]
    pub fn archive_location(&self, language: &str) -> Option<&str> {
        self.archive_locations.get(language).map(String::as_str)
    }

    /// Returns the absolute archive URL for `language`.
    ///
    /// Relative paths are joined onto `base_url`; absolute URLs pass through.
    #[must_use]
    pub fn archive_url(&self, base_url: &str, language: &str) -> Option<String> {
        self.archive_location(language)
            .map(|location| join_location(base_url, location))
    }

    /// Languages offered by the manifest, in ascending order.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.archive_locations.keys().map(String::as_str)
    }
}

fn join_location(base_url: &str, location: &str) -> String {
    if location.starts_with("http://") || location.starts_with("https://") {
        return location.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        location.trim_start_matches('/')
    )
}

// ==================== ManifestResolver ====================

/// Calls the provider's manifest endpoint.
///
/// Holds no credential; the key is supplied on every [`resolve`](Self::resolve).
pub struct ManifestResolver {
    client: Client,
    base_url: String,
}

impl ManifestResolver {
    /// Creates a resolver for the public provider.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::RemoteUnavailable`] if HTTP client construction fails.
    pub fn new() -> Result<Self, ManifestError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a resolver for a custom origin (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::RemoteUnavailable`] if HTTP client construction fails.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ManifestError> {
        Self::with_timeouts(
            base_url,
            METADATA_CONNECT_TIMEOUT_SECS,
            METADATA_READ_TIMEOUT_SECS,
        )
    }

    /// Creates a resolver with explicit timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::RemoteUnavailable`] if HTTP client construction fails.
    pub fn with_timeouts(
        base_url: impl Into<String>,
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, ManifestError> {
        let base_url = base_url.into();
        let client = build_http_client(
            connect_timeout_secs,
            ReadTimeout::WholeRequest(read_timeout_secs),
        )
        .map_err(|failure| ManifestError::remote_unavailable(&base_url, failure.to_string()))?;
        Ok(Self { client, base_url })
    }

    /// Provider origin this resolver targets.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), MANIFEST_ENDPOINT)
    }

    /// Fetches the current manifest descriptor.
    ///
    /// Makes exactly one request; there is no retry.
    ///
    /// # Errors
    ///
    /// - [`ManifestError::RemoteUnavailable`] on transport failure, or a
    ///   non-success HTTP status whose body is not an envelope
    /// - [`ManifestError::InvalidEnvelope`] when the body cannot be parsed
    /// - [`ManifestError::RemoteRejected`] when `ErrorCode != 1`
    #[instrument(skip(self, api_key), fields(base_url = %self.base_url))]
    pub async fn resolve(&self, api_key: &ApiKey) -> Result<ManifestDescriptor, ManifestError> {
        let url = self.endpoint_url();
        debug!(api_url = %url, "requesting manifest metadata");

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, api_key.expose())
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "manifest request failed");
                ManifestError::remote_unavailable(&url, e.to_string())
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ManifestError::remote_unavailable(&url, e.to_string()))?;

        let envelope = match serde_json::from_slice::<ManifestEnvelope>(&body) {
            Ok(envelope) => envelope,
            Err(e) if !status.is_success() => {
                debug!(status = status.as_u16(), error = %e, "non-success status without envelope");
                return Err(ManifestError::remote_unavailable(
                    &url,
                    format!("HTTP {}", status.as_u16()),
                ));
            }
            Err(e) => return Err(ManifestError::invalid_envelope(&url, e.to_string())),
        };

        let descriptor = descriptor_from_envelope(envelope, &url)?;
        info!(
            version = %descriptor.version,
            languages = descriptor.archive_locations.len(),
            "manifest metadata resolved"
        );
        Ok(descriptor)
    }
}

impl std::fmt::Debug for ManifestResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestResolver")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Validates an envelope and converts its payload into a descriptor.
pub(crate) fn descriptor_from_envelope(
    envelope: ManifestEnvelope,
    url: &str,
) -> Result<ManifestDescriptor, ManifestError> {
    if envelope.error_code != SUCCESS_ERROR_CODE {
        return Err(ManifestError::remote_rejected(
            envelope.error_code,
            envelope.error_status.unwrap_or_default(),
            envelope.message.unwrap_or_default(),
        ));
    }

    let payload = envelope
        .response
        .ok_or_else(|| ManifestError::invalid_envelope(url, "envelope has no Response"))?;
    let response: ManifestResponse = serde_json::from_value(payload)
        .map_err(|e| ManifestError::invalid_envelope(url, e.to_string()))?;

    Ok(ManifestDescriptor {
        version: response.version,
        archive_locations: response.mobile_world_content_paths,
        json_world_locations: response.json_world_content_paths,
    })
}
