// crates/geoatlas-config/src/catalog.rs
// ============================================================================
// Module: Catalog Tree Builder
// Description: Configuration tree assembly from raw JSON payloads.
// Purpose: Dispatch categories through a static registry with best-effort
//          entry filtering and strict top-level guards.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! The catalog is built once from a JSON payload and read-only afterwards;
//! a changed configuration is rebuilt wholesale. Top-level structural
//! failures abort the build, while individual entries that fail their
//! category's validity rule are dropped without aborting the rest — the
//! builder records the drops in a side report but emits no log of its own.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::model::BackgroundMap;
use crate::model::BandwidthTestEndpoint;
use crate::model::CatalogNode;
use crate::model::DynamicUserServicesConfig;
use crate::model::EditUtilConfig;
use crate::model::Extent;
use crate::model::GmtiConfig;
use crate::model::InfoWindowConfig;
use crate::model::LayoutConfig;
use crate::model::Locator;
use crate::model::MapSettings;
use crate::model::NsseEventEntryConfig;
use crate::model::NsseEventListConfig;
use crate::model::PreviousSearchDataStore;
use crate::model::RouterConfig;
use crate::model::SearchConfig;
use crate::model::SelectionResultsConfig;
use crate::model::Service;
use crate::model::ServiceGroup;
use crate::model::Task;
use crate::model::ToolGroup;
use crate::model::WmsErrorConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum catalog file size in bytes.
pub(crate) const MAX_CATALOG_FILE_SIZE: usize = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Structural failure while building a catalog.
///
/// Entry-level invalidity is never an error; it surfaces only through
/// [`BuildReport::rejected`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// I/O failure while reading a catalog file.
    #[error("catalog io error: {0}")]
    Io(String),
    /// Input string is not valid JSON.
    #[error("catalog parse error: {0}")]
    Syntax(String),
    /// Top-level JSON value is not an object.
    #[error("catalog root must be a json object")]
    NotAnObject,
    /// Catalog source violates a load guard.
    #[error("invalid catalog source: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Build Report
// ============================================================================

/// One raw entry dropped during catalog assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    /// Top-level category the entry belonged to.
    pub category: &'static str,
    /// Entry key (or index for list-shaped categories), when applicable.
    pub key: Option<String>,
    /// Why the entry was dropped.
    pub reason: String,
}

/// Outcome of a catalog build: the kept tree plus the dropped entries.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    /// The assembled catalog.
    pub catalog: Catalog,
    /// Raw entries dropped during assembly, in dispatch order.
    pub rejected: Vec<RejectedEntry>,
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Root configuration tree for a web-mapping application.
///
/// # Invariants
/// - Built once from a single payload; no incremental mutation.
/// - Keyed categories are keyed by their original map keys; `tools`
///   preserves declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Catalog {
    /// Remote map services keyed by service id.
    pub services: BTreeMap<String, Service>,
    /// Service groupings keyed by group id.
    pub service_groups: BTreeMap<String, ServiceGroup>,
    /// Geocoding locators keyed by locator id.
    pub locators: BTreeMap<String, Locator>,
    /// Bandwidth-test endpoints keyed by endpoint id.
    pub bandwidth_test_endpoints: BTreeMap<String, BandwidthTestEndpoint>,
    /// Named extents keyed by extent id.
    pub extents: BTreeMap<String, Extent>,
    /// Toolbox tasks keyed by task id.
    pub tasks: BTreeMap<String, Task>,
    /// Tool groups in declaration order.
    pub tools: Vec<ToolGroup>,
    /// Initial map settings.
    pub map: Option<MapSettings>,
    /// Application layout section.
    pub layout: Option<LayoutConfig>,
    /// Info window section.
    pub info_window: Option<InfoWindowConfig>,
    /// Search UI section.
    pub search: Option<SearchConfig>,
    /// Router section.
    pub router: Option<RouterConfig>,
    /// Selection results section.
    pub selection_results: Option<SelectionResultsConfig>,
    /// Event entry form section.
    pub nsse_event_entry: Option<NsseEventEntryConfig>,
    /// Event list section.
    pub nsse_event_list: Option<NsseEventListConfig>,
    /// User-added WMS services section.
    pub dynamic_user_services: Option<DynamicUserServicesConfig>,
    /// Moving-target indicator section.
    pub gmti: Option<GmtiConfig>,
    /// Annotation editing section.
    pub edit_util: Option<EditUtilConfig>,
    /// Previous-search persistence section.
    pub previous_search_store: Option<PreviousSearchDataStore>,
    /// WMS interaction error section.
    pub wms_error: Option<WmsErrorConfig>,
}

impl Catalog {
    /// Builds a catalog and reports the entries dropped along the way.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotAnObject`] when the top-level value is not
    /// a JSON object.
    pub fn build_with_report(raw: &Value) -> Result<BuildReport, ParseError> {
        let Value::Object(entries) = raw else {
            return Err(ParseError::NotAnObject);
        };
        let mut catalog = Self::default();
        let mut rejected = Vec::new();
        for spec in CATEGORIES {
            if let Some(value) = entries.get(spec.key) {
                (spec.ingest)(&mut catalog, &mut rejected, value);
            }
        }
        Ok(BuildReport {
            catalog,
            rejected,
        })
    }

    /// Builds a catalog from a pre-parsed JSON value, dropping invalid
    /// entries silently.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotAnObject`] when the top-level value is not
    /// a JSON object.
    pub fn from_value(raw: &Value) -> Result<Self, ParseError> {
        Ok(Self::build_with_report(raw)?.catalog)
    }

    /// Builds a catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Syntax`] when the string is not valid JSON and
    /// [`ParseError::NotAnObject`] when its top-level value is not an
    /// object.
    pub fn from_json_str(source: &str) -> Result<Self, ParseError> {
        let raw: Value =
            serde_json::from_str(source).map_err(|err| ParseError::Syntax(err.to_string()))?;
        Self::from_value(&raw)
    }

    /// Loads a catalog from a JSON file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the file cannot be read, violates the
    /// size or encoding guards, or fails to build.
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        let bytes = fs::read(path).map_err(|err| ParseError::Io(err.to_string()))?;
        if bytes.len() > MAX_CATALOG_FILE_SIZE {
            return Err(ParseError::Invalid("catalog file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ParseError::Invalid("catalog file must be utf-8".to_string()))?;
        Self::from_json_str(content)
    }

    /// Returns the extent named by the map settings' full-extent id.
    #[must_use]
    pub fn full_extent(&self) -> Option<&Extent> {
        let id = self.map.as_ref()?.full_extent_id.as_deref()?;
        self.extents.get(id)
    }

    /// Returns the map's spatial reference via the full-extent indirection.
    #[must_use]
    pub fn spatial_reference(&self) -> Option<&str> {
        self.full_extent().map(|extent| extent.spatial_reference.as_str())
    }

    /// Returns the map's maximum extent as `[xmin, ymin, xmax, ymax]`.
    #[must_use]
    pub fn max_extent(&self) -> Option<[f64; 4]> {
        self.full_extent().map(Extent::max_extent)
    }

    /// Returns the background basemap selections, empty when the map
    /// settings section is absent.
    #[must_use]
    pub fn background_maps(&self) -> &[BackgroundMap] {
        self.map.as_ref().map_or(&[], |map| map.background_maps.as_slice())
    }

    /// Returns the distinct service ids referenced by the background
    /// basemap groups, in first-seen order.
    ///
    /// Groups that are not defined contribute nothing here; their absence
    /// surfaces when composite synthesis tries to resolve them.
    #[must_use]
    pub fn background_layer_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for background in self.background_maps() {
            let Some(group) = self.service_groups.get(&background.service_group_id) else {
                continue;
            };
            for service_id in &group.service_ids {
                if !names.contains(service_id) {
                    names.push(service_id.clone());
                }
            }
        }
        names
    }
}

// ============================================================================
// SECTION: Dispatch Registry
// ============================================================================

/// Ingest routine for one recognized top-level category.
type IngestFn = fn(&mut Catalog, &mut Vec<RejectedEntry>, &Value);

/// Registry entry binding a top-level key to its ingest routine.
struct CategorySpec {
    /// Top-level JSON key for the category.
    key: &'static str,
    /// Ingest routine for the category's raw value.
    ingest: IngestFn,
}

/// Dispatch registry for recognized top-level configuration keys; keys
/// absent from this table are ignored. Adding a category is a table entry.
const CATEGORIES: &[CategorySpec] = &[
    CategorySpec {
        key: "services",
        ingest: ingest_services,
    },
    CategorySpec {
        key: "serviceGroups",
        ingest: ingest_service_groups,
    },
    CategorySpec {
        key: "locators",
        ingest: ingest_locators,
    },
    CategorySpec {
        key: "bandwidthTestEndpoints",
        ingest: ingest_bandwidth_test_endpoints,
    },
    CategorySpec {
        key: "extents",
        ingest: ingest_extents,
    },
    CategorySpec {
        key: "tasks",
        ingest: ingest_tasks,
    },
    CategorySpec {
        key: "tools",
        ingest: ingest_tools,
    },
    CategorySpec {
        key: "mapConfig",
        ingest: ingest_map_settings,
    },
    CategorySpec {
        key: "layoutConfig",
        ingest: ingest_layout,
    },
    CategorySpec {
        key: "infoWindowConfig",
        ingest: ingest_info_window,
    },
    CategorySpec {
        key: "searchConfig",
        ingest: ingest_search,
    },
    CategorySpec {
        key: "routerConfig",
        ingest: ingest_router,
    },
    CategorySpec {
        key: "selectionResultsConfig",
        ingest: ingest_selection_results,
    },
    CategorySpec {
        key: "nsseEventEntryConfig",
        ingest: ingest_nsse_event_entry,
    },
    CategorySpec {
        key: "nsseEventListConfig",
        ingest: ingest_nsse_event_list,
    },
    CategorySpec {
        key: "dynamicUserServicesConfig",
        ingest: ingest_dynamic_user_services,
    },
    CategorySpec {
        key: "gmtiConfig",
        ingest: ingest_gmti,
    },
    CategorySpec {
        key: "editUtilConfig",
        ingest: ingest_edit_util,
    },
    CategorySpec {
        key: "previousSearchDataStore",
        ingest: ingest_previous_search_store,
    },
    CategorySpec {
        key: "wmsErrorConfig",
        ingest: ingest_wms_error,
    },
];

// ============================================================================
// SECTION: Ingest Helpers
// ============================================================================

/// Ingests a map-shaped category entry by entry.
fn ingest_keyed<T: CatalogNode>(
    category: &'static str,
    target: &mut BTreeMap<String, T>,
    rejected: &mut Vec<RejectedEntry>,
    raw: &Value,
) {
    let Value::Object(entries) = raw else {
        rejected.push(RejectedEntry {
            category,
            key: None,
            reason: "category value must be a json object".to_string(),
        });
        return;
    };
    for (key, entry) in entries {
        match T::construct(key, entry) {
            Ok(node) if node.is_valid() => {
                target.insert(key.clone(), node);
            }
            Ok(_) => rejected.push(RejectedEntry {
                category,
                key: Some(key.clone()),
                reason: "entry failed validity check".to_string(),
            }),
            Err(err) => rejected.push(RejectedEntry {
                category,
                key: Some(key.clone()),
                reason: err.to_string(),
            }),
        }
    }
}

/// Ingests a singleton section.
fn ingest_singleton<T: CatalogNode>(
    category: &'static str,
    slot: &mut Option<T>,
    rejected: &mut Vec<RejectedEntry>,
    raw: &Value,
) {
    match T::construct(category, raw) {
        Ok(node) if node.is_valid() => *slot = Some(node),
        Ok(_) => rejected.push(RejectedEntry {
            category,
            key: None,
            reason: "section failed validity check".to_string(),
        }),
        Err(err) => rejected.push(RejectedEntry {
            category,
            key: None,
            reason: err.to_string(),
        }),
    }
}

/// Ingests the `services` category.
fn ingest_services(catalog: &mut Catalog, rejected: &mut Vec<RejectedEntry>, raw: &Value) {
    ingest_keyed("services", &mut catalog.services, rejected, raw);
}

/// Ingests the `serviceGroups` category.
fn ingest_service_groups(catalog: &mut Catalog, rejected: &mut Vec<RejectedEntry>, raw: &Value) {
    ingest_keyed("serviceGroups", &mut catalog.service_groups, rejected, raw);
}

/// Ingests the `locators` category.
fn ingest_locators(catalog: &mut Catalog, rejected: &mut Vec<RejectedEntry>, raw: &Value) {
    ingest_keyed("locators", &mut catalog.locators, rejected, raw);
}

/// Ingests the `bandwidthTestEndpoints` category.
fn ingest_bandwidth_test_endpoints(
    catalog: &mut Catalog,
    rejected: &mut Vec<RejectedEntry>,
    raw: &Value,
) {
    ingest_keyed("bandwidthTestEndpoints", &mut catalog.bandwidth_test_endpoints, rejected, raw);
}

/// Ingests the `extents` category.
fn ingest_extents(catalog: &mut Catalog, rejected: &mut Vec<RejectedEntry>, raw: &Value) {
    ingest_keyed("extents", &mut catalog.extents, rejected, raw);
}

/// Ingests the `tasks` category.
fn ingest_tasks(catalog: &mut Catalog, rejected: &mut Vec<RejectedEntry>, raw: &Value) {
    ingest_keyed("tasks", &mut catalog.tasks, rejected, raw);
}

/// Ingests the list-shaped `tools` category, preserving declaration order.
fn ingest_tools(catalog: &mut Catalog, rejected: &mut Vec<RejectedEntry>, raw: &Value) {
    let Value::Array(entries) = raw else {
        rejected.push(RejectedEntry {
            category: "tools",
            key: None,
            reason: "category value must be a json array".to_string(),
        });
        return;
    };
    for (index, entry) in entries.iter().enumerate() {
        match ToolGroup::construct(&index.to_string(), entry) {
            Ok(node) if node.is_valid() => catalog.tools.push(node),
            Ok(_) => rejected.push(RejectedEntry {
                category: "tools",
                key: Some(index.to_string()),
                reason: "entry failed validity check".to_string(),
            }),
            Err(err) => rejected.push(RejectedEntry {
                category: "tools",
                key: Some(index.to_string()),
                reason: err.to_string(),
            }),
        }
    }
}

/// Ingests the `mapConfig` section.
fn ingest_map_settings(catalog: &mut Catalog, rejected: &mut Vec<RejectedEntry>, raw: &Value) {
    ingest_singleton("mapConfig", &mut catalog.map, rejected, raw);
}

/// Ingests the `layoutConfig` section.
fn ingest_layout(catalog: &mut Catalog, rejected: &mut Vec<RejectedEntry>, raw: &Value) {
    ingest_singleton("layoutConfig", &mut catalog.layout, rejected, raw);
}

/// Ingests the `infoWindowConfig` section.
fn ingest_info_window(catalog: &mut Catalog, rejected: &mut Vec<RejectedEntry>, raw: &Value) {
    ingest_singleton("infoWindowConfig", &mut catalog.info_window, rejected, raw);
}

/// Ingests the `searchConfig` section.
fn ingest_search(catalog: &mut Catalog, rejected: &mut Vec<RejectedEntry>, raw: &Value) {
    ingest_singleton("searchConfig", &mut catalog.search, rejected, raw);
}

/// Ingests the `routerConfig` section.
fn ingest_router(catalog: &mut Catalog, rejected: &mut Vec<RejectedEntry>, raw: &Value) {
    ingest_singleton("routerConfig", &mut catalog.router, rejected, raw);
}

/// Ingests the `selectionResultsConfig` section.
fn ingest_selection_results(
    catalog: &mut Catalog,
    rejected: &mut Vec<RejectedEntry>,
    raw: &Value,
) {
    ingest_singleton("selectionResultsConfig", &mut catalog.selection_results, rejected, raw);
}

/// Ingests the `nsseEventEntryConfig` section.
fn ingest_nsse_event_entry(catalog: &mut Catalog, rejected: &mut Vec<RejectedEntry>, raw: &Value) {
    ingest_singleton("nsseEventEntryConfig", &mut catalog.nsse_event_entry, rejected, raw);
}

/// Ingests the `nsseEventListConfig` section.
fn ingest_nsse_event_list(catalog: &mut Catalog, rejected: &mut Vec<RejectedEntry>, raw: &Value) {
    ingest_singleton("nsseEventListConfig", &mut catalog.nsse_event_list, rejected, raw);
}

/// Ingests the `dynamicUserServicesConfig` section.
fn ingest_dynamic_user_services(
    catalog: &mut Catalog,
    rejected: &mut Vec<RejectedEntry>,
    raw: &Value,
) {
    ingest_singleton("dynamicUserServicesConfig", &mut catalog.dynamic_user_services, rejected, raw);
}

/// Ingests the `gmtiConfig` section.
fn ingest_gmti(catalog: &mut Catalog, rejected: &mut Vec<RejectedEntry>, raw: &Value) {
    ingest_singleton("gmtiConfig", &mut catalog.gmti, rejected, raw);
}

/// Ingests the `editUtilConfig` section.
fn ingest_edit_util(catalog: &mut Catalog, rejected: &mut Vec<RejectedEntry>, raw: &Value) {
    ingest_singleton("editUtilConfig", &mut catalog.edit_util, rejected, raw);
}

/// Ingests the `previousSearchDataStore` section.
fn ingest_previous_search_store(
    catalog: &mut Catalog,
    rejected: &mut Vec<RejectedEntry>,
    raw: &Value,
) {
    ingest_singleton("previousSearchDataStore", &mut catalog.previous_search_store, rejected, raw);
}

/// Ingests the `wmsErrorConfig` section.
fn ingest_wms_error(catalog: &mut Catalog, rejected: &mut Vec<RejectedEntry>, raw: &Value) {
    ingest_singleton("wmsErrorConfig", &mut catalog.wms_error, rejected, raw);
}
