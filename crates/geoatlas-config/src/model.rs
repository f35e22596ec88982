// crates/geoatlas-config/src/model.rs
// ============================================================================
// Module: Catalog Category Nodes
// Description: Typed nodes for every recognized configuration category.
// Purpose: Apply declared defaults and per-category validity rules.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! One type per configuration category. Each node is built from one raw JSON
//! entry through [`CatalogNode::construct`], which fills the documented
//! defaults, and admitted into the catalog only when
//! [`CatalogNode::is_valid`] holds. Every validator except the locator's is
//! a permissive pass-through.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Classification applied when a service declares none.
const DEFAULT_CLASSIFICATION: &str = "UNCLASSIFIED";

/// Locator versions accepted by the locator validity rule.
const RECOGNIZED_LOCATOR_VERSIONS: [&str; 2] = ["9.3.1", "10"];

/// Default service classification.
fn default_classification() -> String {
    DEFAULT_CLASSIFICATION.to_string()
}

/// Default service opacity.
const fn default_opacity() -> f64 {
    1.0
}

/// Default locator field-name overrides.
fn default_locator_fields() -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();
    fields.insert("stateField".to_string(), " ".to_string());
    fields
}

// ============================================================================
// SECTION: Node Contract
// ============================================================================

/// Category node behavior shared by every configuration section.
///
/// # Invariants
/// - `construct` fills every documented default; it never leaves a field in
///   a raw or shared-default state.
/// - `is_valid` is a pure predicate; invalid nodes are dropped by the
///   builder without further effect.
pub trait CatalogNode: Sized {
    /// Builds the node from one raw entry, applying declared defaults.
    ///
    /// `key` is the entry's key in its category map (or its index for
    /// list-shaped categories); keyed nodes fall back to it when the raw
    /// object carries no identifier of its own.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when the raw entry cannot be shaped
    /// into the node type.
    fn construct(key: &str, raw: &Value) -> Result<Self, serde_json::Error>;

    /// Returns true when the node may enter the catalog.
    #[must_use]
    fn is_valid(&self) -> bool {
        true
    }
}

// ============================================================================
// SECTION: Services
// ============================================================================

/// Rendering protocol spoken by a remote map service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// Dynamically exported map images.
    Dynamic,
    /// Pre-rendered tile cache.
    Tiled,
    /// Any other declared type; kept in the tree but never rendered by the
    /// descriptor pipeline.
    #[default]
    #[serde(other)]
    Other,
}

impl ServiceKind {
    /// Returns the lowercase label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dynamic => "dynamic",
            Self::Tiled => "tiled",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Per-sub-layer override entry (identifiability, info templates, swatch
/// hints) carried through to the rendering consumer untouched.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct LayerOverride {
    /// Raw override fields for the sub-layer.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// One remote map service from the `services` category.
///
/// # Invariants
/// - `opacity` is clamped to `[0, 1]` at construction.
/// - `layers` is a per-instance container; empty when the entry declares no
///   overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Service identifier; falls back to the category map key.
    #[serde(default)]
    pub id: String,
    /// Base URL of the remote map service REST resource.
    pub url: String,
    /// Rendering protocol declared by the entry's `type` field.
    #[serde(rename = "type", default)]
    pub kind: ServiceKind,
    /// Name shown for the service in overlay listings.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Security classification label.
    #[serde(default = "default_classification")]
    pub classification: String,
    /// Caveats qualifying the classification, in declaration order.
    #[serde(default)]
    pub caveats: Vec<String>,
    /// URL of a metadata page for the service.
    #[serde(default)]
    pub metadata_url: Option<String>,
    /// SOAP endpoint used to fetch legend swatches.
    #[serde(default)]
    pub soap_endpoint: Option<String>,
    /// Credential lookup key for the SOAP endpoint.
    #[serde(default)]
    pub auth_id: Option<String>,
    /// Whether sub-layers are identifiable unless overridden.
    #[serde(default)]
    pub layers_default_identifiable: bool,
    /// Stacking order; higher values draw on top.
    #[serde(default)]
    pub draw_order: i64,
    /// URL of a downloadable archive for the service's data.
    #[serde(default)]
    pub download_url: Option<String>,
    /// Default layer opacity in `[0, 1]`.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Seconds between automatic layer refreshes.
    #[serde(default)]
    pub refresh_interval_seconds: Option<u64>,
    /// Per-sub-layer overrides keyed by sub-layer id.
    #[serde(default)]
    pub layers: BTreeMap<String, LayerOverride>,
    /// Export image format override.
    #[serde(default)]
    pub image_format: Option<String>,
    /// Whether the service is hidden from interactive viewing.
    #[serde(default)]
    pub disable_viewing: bool,
}

impl CatalogNode for Service {
    fn construct(key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        let mut service = Self::deserialize(raw)?;
        if service.id.is_empty() {
            service.id = key.to_string();
        }
        service.opacity = service.opacity.clamp(0.0, 1.0);
        Ok(service)
    }
}

// ============================================================================
// SECTION: Service Groups
// ============================================================================

/// Ordered grouping of services from the `serviceGroups` category.
///
/// # Invariants
/// - `service_ids` preserves declaration order; it is the group's iteration
///   and display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceGroup {
    /// Group identifier (the category map key).
    pub id: String,
    /// Member service ids in declaration order.
    pub service_ids: Vec<String>,
}

impl CatalogNode for ServiceGroup {
    fn construct(key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        let service_ids = Vec::<String>::deserialize(raw)?;
        Ok(Self {
            id: key.to_string(),
            service_ids,
        })
    }
}

// ============================================================================
// SECTION: Locators
// ============================================================================

/// Geocoding locator from the `locators` category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locator {
    /// Locator identifier; falls back to the category map key.
    #[serde(default)]
    pub id: String,
    /// URL of the remote geocoding service.
    pub url: String,
    /// Spatial reference of returned candidate geometries.
    #[serde(default)]
    pub spatial_reference: Option<String>,
    /// Locator protocol version; only `"9.3.1"` and `"10"` are recognized.
    #[serde(default)]
    pub version: String,
    /// Field-name overrides applied to locator requests.
    #[serde(default = "default_locator_fields")]
    pub fields: BTreeMap<String, String>,
    /// Whether a blank street value is substituted before submission.
    #[serde(default)]
    pub street_required: bool,
}

impl CatalogNode for Locator {
    fn construct(key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        let mut locator = Self::deserialize(raw)?;
        if locator.id.is_empty() {
            locator.id = key.to_string();
        }
        Ok(locator)
    }

    fn is_valid(&self) -> bool {
        RECOGNIZED_LOCATOR_VERSIONS.contains(&self.version.as_str())
    }
}

// ============================================================================
// SECTION: Extents
// ============================================================================

/// Named spatial extent from the `extents` category.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extent {
    /// Extent identifier; falls back to the category map key.
    #[serde(default)]
    pub id: String,
    /// Spatial reference identifier for the bounding box coordinates.
    pub spatial_reference: String,
    /// Western bound.
    pub xmin: f64,
    /// Southern bound.
    pub ymin: f64,
    /// Eastern bound.
    pub xmax: f64,
    /// Northern bound.
    pub ymax: f64,
}

impl Extent {
    /// Returns the bounding box as `[xmin, ymin, xmax, ymax]`.
    #[must_use]
    pub const fn max_extent(&self) -> [f64; 4] {
        [self.xmin, self.ymin, self.xmax, self.ymax]
    }
}

impl CatalogNode for Extent {
    fn construct(key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        let mut extent = Self::deserialize(raw)?;
        if extent.id.is_empty() {
            extent.id = key.to_string();
        }
        Ok(extent)
    }
}

// ============================================================================
// SECTION: Map Settings
// ============================================================================

/// One background basemap selection inside the map settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundMap {
    /// Service group providing the basemap's member services.
    pub service_group_id: String,
    /// Name shown for the composite basemap.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Initial map settings from the `mapConfig` section.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSettings {
    /// Background basemap selections in declaration order.
    #[serde(default)]
    pub background_maps: Vec<BackgroundMap>,
    /// Extent id answering full-extent and spatial-reference queries.
    #[serde(default)]
    pub full_extent_id: Option<String>,
    /// Extent id framing the initial view.
    #[serde(default)]
    pub initial_extent_id: Option<String>,
    /// Remaining section fields carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogNode for MapSettings {
    fn construct(_key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(raw)
    }
}

// ============================================================================
// SECTION: Keyed Pass-Through Categories
// ============================================================================

/// Bandwidth-test endpoint entry, carried through without derived
/// computation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BandwidthTestEndpoint {
    /// Endpoint identifier; falls back to the category map key.
    #[serde(default)]
    pub id: String,
    /// Raw endpoint fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogNode for BandwidthTestEndpoint {
    fn construct(key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        let mut endpoint = Self::deserialize(raw)?;
        if endpoint.id.is_empty() {
            endpoint.id = key.to_string();
        }
        Ok(endpoint)
    }
}

/// Toolbox task entry, carried through without derived computation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Task {
    /// Task identifier; falls back to the category map key.
    #[serde(default)]
    pub id: String,
    /// Raw task fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogNode for Task {
    fn construct(key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        let mut task = Self::deserialize(raw)?;
        if task.id.is_empty() {
            task.id = key.to_string();
        }
        Ok(task)
    }
}

/// Tool group entry from the list-shaped `tools` category; declaration
/// order is preserved in the catalog.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ToolGroup {
    /// Raw tool group fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogNode for ToolGroup {
    fn construct(_key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(raw)
    }
}

// ============================================================================
// SECTION: Singleton Pass-Through Sections
// ============================================================================

/// Application layout section (`layoutConfig`), carried through without
/// derived computation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct LayoutConfig {
    /// Raw section fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogNode for LayoutConfig {
    fn construct(_key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(raw)
    }
}

/// Info window section (`infoWindowConfig`), carried through without
/// derived computation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct InfoWindowConfig {
    /// Raw section fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogNode for InfoWindowConfig {
    fn construct(_key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(raw)
    }
}

/// Search UI section (`searchConfig`), carried through without derived
/// computation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SearchConfig {
    /// Raw section fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogNode for SearchConfig {
    fn construct(_key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(raw)
    }
}

/// Router section (`routerConfig`), carried through without derived
/// computation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RouterConfig {
    /// Raw section fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogNode for RouterConfig {
    fn construct(_key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(raw)
    }
}

/// Selection results section (`selectionResultsConfig`), carried through
/// without derived computation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SelectionResultsConfig {
    /// Raw section fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogNode for SelectionResultsConfig {
    fn construct(_key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(raw)
    }
}

/// Event entry form section (`nsseEventEntryConfig`), carried through
/// without derived computation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct NsseEventEntryConfig {
    /// Raw section fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogNode for NsseEventEntryConfig {
    fn construct(_key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(raw)
    }
}

/// Event list section (`nsseEventListConfig`), carried through without
/// derived computation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct NsseEventListConfig {
    /// Raw section fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogNode for NsseEventListConfig {
    fn construct(_key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(raw)
    }
}

/// User-added WMS services section (`dynamicUserServicesConfig`), carried
/// through without derived computation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DynamicUserServicesConfig {
    /// Raw section fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogNode for DynamicUserServicesConfig {
    fn construct(_key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(raw)
    }
}

/// Moving-target indicator section (`gmtiConfig`), carried through without
/// derived computation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct GmtiConfig {
    /// Raw section fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogNode for GmtiConfig {
    fn construct(_key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(raw)
    }
}

/// Annotation editing section (`editUtilConfig`), carried through without
/// derived computation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EditUtilConfig {
    /// Raw section fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogNode for EditUtilConfig {
    fn construct(_key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(raw)
    }
}

/// Previous-search persistence section (`previousSearchDataStore`), carried
/// through without derived computation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PreviousSearchDataStore {
    /// Raw section fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogNode for PreviousSearchDataStore {
    fn construct(_key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(raw)
    }
}

/// WMS interaction error section (`wmsErrorConfig`), carried through
/// without derived computation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct WmsErrorConfig {
    /// Raw section fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CatalogNode for WmsErrorConfig {
    fn construct(_key: &str, raw: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(raw)
    }
}
