// crates/geoatlas-config/src/examples.rs
// ============================================================================
// Module: Catalog Examples
// Description: Canonical example catalog payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical examples for catalog configuration. Outputs are deterministic
//! and kept in sync with the model types.

/// Returns a canonical example catalog JSON payload.
#[must_use]
pub fn catalog_json_example() -> String {
    String::from(
        r#"{
  "services": {
    "basemapImagery": {
      "id": "basemapImagery",
      "url": "https://maps.example.com/arcgis/rest/services/Imagery/MapServer",
      "type": "tiled",
      "displayName": "Imagery",
      "drawOrder": 1,
      "opacity": 1.0
    },
    "hydrography": {
      "id": "hydrography",
      "url": "https://maps.example.com/arcgis/rest/services/Hydro/MapServer",
      "type": "dynamic",
      "displayName": "Hydrography",
      "drawOrder": 5,
      "opacity": 0.8,
      "layers": {
        "0": { "identifiable": true }
      }
    }
  },
  "serviceGroups": {
    "basemaps": ["basemapImagery", "hydrography"]
  },
  "locators": {
    "places": {
      "url": "https://maps.example.com/arcgis/rest/services/Places/GeocodeServer",
      "spatialReference": "EPSG:4326",
      "version": "10"
    }
  },
  "extents": {
    "conus": {
      "spatialReference": "EPSG:4326",
      "xmin": -125.0,
      "ymin": 24.0,
      "xmax": -66.0,
      "ymax": 50.0
    }
  },
  "tools": [
    { "id": "measure" },
    { "id": "draw" }
  ],
  "mapConfig": {
    "fullExtentId": "conus",
    "initialExtentId": "conus",
    "backgroundMaps": [
      { "serviceGroupId": "basemaps", "displayName": "Base Data" }
    ]
  },
  "layoutConfig": {
    "displaySecurityBanners": false
  },
  "searchConfig": {
    "defaultLocatorId": "places"
  }
}
"#,
    )
}
