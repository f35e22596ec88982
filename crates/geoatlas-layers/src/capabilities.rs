// crates/geoatlas-layers/src/capabilities.rs
// ============================================================================
// Module: Capabilities Documents
// Description: Remote service self-description model and HTTP fetch.
// Purpose: Retrieve and decode capability documents with strict limits.
// Dependencies: geoatlas-config, reqwest, serde, serde_json, url
// ============================================================================

//! ## Overview
//! A capabilities document is the remote service's self-description —
//! extent, spatial reference, tiling scheme, sub-layer list — fetched over
//! the network before a full layer descriptor can be built. The HTTP source
//! issues one bounded GET per call: redirects disabled, configured timeout,
//! and a hard response-size cap. Retry and timeout policy beyond that
//! belongs to callers and the transport.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use geoatlas_config::Service;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Deserializer;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Wire Model
// ============================================================================

/// Axis-aligned bounding box in a service's own spatial reference.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Bounds {
    /// Western bound.
    pub xmin: f64,
    /// Southern bound.
    pub ymin: f64,
    /// Eastern bound.
    pub xmax: f64,
    /// Northern bound.
    pub ymax: f64,
}

/// Numeric well-known id naming the document's coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SpatialReference {
    /// Well-known coordinate system id.
    pub wkid: i64,
}

/// Document metadata block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentInfo {
    /// Human-readable service title.
    #[serde(rename = "Title")]
    pub title: String,
}

/// One level-of-detail entry in a tiled service's pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Lod {
    /// Display scale denominator for the level.
    pub scale: f64,
    /// Ground units per pixel for the level.
    pub resolution: f64,
}

/// Tile grid origin in the service's spatial reference.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TileOrigin {
    /// Origin easting.
    pub x: f64,
    /// Origin northing.
    pub y: f64,
}

/// Tiling scheme for a cached service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TileInfo {
    /// Tile width in pixels.
    pub cols: u32,
    /// Tile height in pixels.
    pub rows: u32,
    /// Tile grid origin.
    pub origin: TileOrigin,
    /// Level-of-detail entries in server-native order.
    pub lods: Vec<Lod>,
}

/// One sub-layer advertised by the document.
///
/// # Invariants
/// - A wire scale of `0` means "no limit" and decodes to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubLayerInfo {
    /// Sub-layer id within the service.
    pub id: i64,
    /// Smallest scale denominator at which the sub-layer draws.
    #[serde(default, deserialize_with = "scale_limit")]
    pub min_scale: Option<f64>,
    /// Largest scale denominator at which the sub-layer draws.
    #[serde(default, deserialize_with = "scale_limit")]
    pub max_scale: Option<f64>,
}

/// Remote service capabilities document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCapabilities {
    /// Full extent of the service's data.
    pub full_extent: Bounds,
    /// Tiling scheme; absent for uncached services.
    #[serde(default)]
    pub tile_info: Option<TileInfo>,
    /// Coordinate system of the service's geometry.
    pub spatial_reference: SpatialReference,
    /// Document metadata block.
    pub document_info: DocumentInfo,
    /// Advertised sub-layers in server order.
    #[serde(default)]
    pub layers: Vec<SubLayerInfo>,
}

/// Decodes a wire scale bound, folding the `0` sentinel into `None`.
fn scale_limit<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|scale| *scale != 0.0))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure while fetching or decoding a capabilities document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// HTTP client construction failed.
    #[error("capabilities client build failed: {0}")]
    Client(String),
    /// Service URL violates the source's scheme policy.
    #[error("capabilities url rejected: {0}")]
    UrlNotAllowed(String),
    /// Outbound request failed before a response arrived.
    #[error("capabilities request failed: {0}")]
    Request(String),
    /// Remote returned a non-success status.
    #[error("capabilities request returned status {0}")]
    Status(u16),
    /// Response body could not be read within limits.
    #[error("capabilities response unreadable: {0}")]
    Body(String),
    /// Response body is not a capabilities document.
    #[error("capabilities document malformed: {0}")]
    Decode(String),
}

// ============================================================================
// SECTION: Source Contract
// ============================================================================

/// Provider of capabilities documents for services.
///
/// The production implementation is [`HttpCapabilitiesSource`]; tests swap
/// in scripted sources.
pub trait CapabilitiesSource {
    /// Fetches the capabilities document for `service`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the document cannot be retrieved or
    /// decoded.
    fn fetch(&self, service: &Service) -> Result<RemoteCapabilities, FetchError>;
}

// ============================================================================
// SECTION: HTTP Source
// ============================================================================

/// Configuration for the HTTP capabilities source.
///
/// # Invariants
/// - `allow_http = false` blocks cleartext `http://` URLs.
/// - `max_response_bytes` is a hard upper bound on response bodies.
/// - `timeout_ms` applies to the full request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CapabilitiesFetchConfig {
    /// Allow cleartext HTTP (disabled by default).
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for CapabilitiesFetchConfig {
    fn default() -> Self {
        Self {
            allow_http: false,
            timeout_ms: 5_000,
            max_response_bytes: 1024 * 1024,
            user_agent: "geoatlas/0.1".to_string(),
        }
    }
}

/// Capabilities source issuing one bounded GET per service.
///
/// # Invariants
/// - Redirects are not followed.
/// - Responses exceeding configured limits fail closed.
/// - At most one request per [`CapabilitiesSource::fetch`] call; no retries.
pub struct HttpCapabilitiesSource {
    /// Source configuration, including limits and policy.
    config: CapabilitiesFetchConfig,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpCapabilitiesSource {
    /// Creates a new HTTP source with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] when the HTTP client cannot be built.
    pub fn new(config: CapabilitiesFetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| FetchError::Client(err.to_string()))?;
        Ok(Self {
            config,
            client,
        })
    }

    /// Builds the capabilities request URL for a service.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::UrlNotAllowed`] when the service URL is
    /// malformed or uses a scheme the policy rejects.
    fn capabilities_url(&self, service: &Service) -> Result<Url, FetchError> {
        let url = Url::parse(&format!("{}/?f=json&pretty=true", service.url))
            .map_err(|err| FetchError::UrlNotAllowed(err.to_string()))?;
        match url.scheme() {
            "https" => {}
            "http" if self.config.allow_http => {}
            scheme => {
                return Err(FetchError::UrlNotAllowed(format!("unsupported scheme: {scheme}")));
            }
        }
        Ok(url)
    }
}

impl CapabilitiesSource for HttpCapabilitiesSource {
    fn fetch(&self, service: &Service) -> Result<RemoteCapabilities, FetchError> {
        let url = self.capabilities_url(service)?;
        let mut response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(|err| FetchError::Request(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = read_response_limited(&mut response, self.config.max_response_bytes)?;
        serde_json::from_slice(&body).map_err(|err| FetchError::Decode(err.to_string()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(response: &mut Response, max_bytes: usize) -> Result<Vec<u8>, FetchError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| FetchError::Body("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(FetchError::Body("response exceeds size limit".to_string()));
    }
    let mut buf = Vec::new();
    let limit = max_bytes_u64.saturating_add(1);
    let mut handle = response.take(limit);
    handle.read_to_end(&mut buf).map_err(|err| FetchError::Body(err.to_string()))?;
    if buf.len() > max_bytes {
        return Err(FetchError::Body("response exceeds size limit".to_string()));
    }
    Ok(buf)
}
