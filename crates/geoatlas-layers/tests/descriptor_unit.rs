// crates/geoatlas-layers/tests/descriptor_unit.rs
// ============================================================================
// Module: Layer Descriptor Unit Tests
// Description: Validate the tiled/dynamic factory branches and the bare
//              descriptor path.
// Purpose: Ensure descriptors carry correct endpoints, pyramids, and flags.
// ============================================================================

//! Unit tests for single-service descriptor synthesis.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::float_cmp,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use geoatlas_config::CatalogNode;
use geoatlas_config::Service;
use geoatlas_layers::DescriptorError;
use geoatlas_layers::DescriptorOptions;
use geoatlas_layers::FALLBACK_MAX_ZOOM;
use geoatlas_layers::LayerDescriptorFactory;
use geoatlas_layers::NO_SCALE_LIMIT;
use geoatlas_layers::RemoteCapabilities;
use serde_json::json;

fn service(id: &str, kind: &str) -> Service {
    let raw = json!({
        "url": format!("https://maps.example.com/{id}/MapServer"),
        "type": kind,
        "displayName": format!("{id} display"),
        "drawOrder": 3,
        "opacity": 0.5
    });
    Service::construct(id, &raw).unwrap()
}

fn tiled_capabilities() -> RemoteCapabilities {
    serde_json::from_value(json!({
        "fullExtent": { "xmin": -120.0, "ymin": 20.0, "xmax": -60.0, "ymax": 55.0 },
        "spatialReference": { "wkid": 3857 },
        "documentInfo": { "Title": "Cached Imagery" },
        "tileInfo": {
            "cols": 256,
            "rows": 256,
            "origin": { "x": -2.0037508e7, "y": 2.0037508e7 },
            "lods": [
                { "scale": 4000.0, "resolution": 1128.5 },
                { "scale": 2000.0, "resolution": 564.25 },
                { "scale": 1000.0, "resolution": 282.12 }
            ]
        },
        "layers": [
            { "id": 0, "minScale": 4000.0, "maxScale": 1000.0 }
        ]
    }))
    .unwrap()
}

fn dynamic_capabilities() -> RemoteCapabilities {
    serde_json::from_value(json!({
        "fullExtent": { "xmin": -120.0, "ymin": 20.0, "xmax": -60.0, "ymax": 55.0 },
        "spatialReference": { "wkid": 4326 },
        "documentInfo": { "Title": "Hydrography" },
        "layers": [
            { "id": 0, "minScale": 100.0, "maxScale": 50.0 },
            { "id": 1, "minScale": 0, "maxScale": 25.0 },
            { "id": 2 }
        ]
    }))
    .unwrap()
}

#[test]
fn bare_descriptor_carries_service_fields_only() {
    let service = service("eager", "dynamic");
    let descriptor =
        LayerDescriptorFactory::build(&service, None, &DescriptorOptions::default()).unwrap();
    assert_eq!(descriptor.service_id, "eager");
    assert_eq!(descriptor.endpoint, "https://maps.example.com/eager/MapServer/export");
    assert_eq!(descriptor.opacity, 0.5);
    assert_eq!(descriptor.draw_order, 3);
    assert!(descriptor.bounds.is_none());
    assert!(descriptor.spatial_reference.is_none());
    assert!(descriptor.pyramid.is_empty());
    assert!(descriptor.sub_layer_ids.is_empty());
    assert_eq!(descriptor.layer_filter(), None);
}

#[test]
fn dynamic_descriptor_uses_export_endpoint_and_show_filter() {
    let service = service("hydro", "dynamic");
    let capabilities = dynamic_capabilities();
    let descriptor =
        LayerDescriptorFactory::build(&service, Some(&capabilities), &DescriptorOptions::default())
            .unwrap();
    assert_eq!(descriptor.endpoint, "https://maps.example.com/hydro/MapServer/export");
    assert_eq!(descriptor.sub_layer_list(), "0,1,2");
    assert_eq!(descriptor.layer_filter().as_deref(), Some("show:0,1,2"));
    assert!(!descriptor.base_layer);
    assert!(descriptor.visibility);
    assert_eq!(descriptor.spatial_reference.as_deref(), Some("EPSG:4326"));
    assert_eq!(descriptor.min_zoom, None);
    assert_eq!(descriptor.max_zoom, None);
}

#[test]
fn dynamic_descriptor_without_resolutions_addresses_by_scale() {
    let service = service("hydro", "dynamic");
    let capabilities = dynamic_capabilities();
    let descriptor =
        LayerDescriptorFactory::build(&service, Some(&capabilities), &DescriptorOptions::default())
            .unwrap();
    assert!(descriptor.uses_scales());
    // Sub-layer bounds plus the single no-limit sentinel shared by every
    // unbounded entry.
    assert_eq!(descriptor.pyramid.scales(), &[NO_SCALE_LIMIT, 25.0, 50.0, 100.0]);
}

#[test]
fn tiled_descriptor_derives_zoom_range_from_lods() {
    let service = service("imagery", "tiled");
    let capabilities = tiled_capabilities();
    let descriptor =
        LayerDescriptorFactory::build(&service, Some(&capabilities), &DescriptorOptions::default())
            .unwrap();
    assert_eq!(descriptor.endpoint, "https://maps.example.com/imagery/MapServer");
    assert_eq!(descriptor.min_zoom, Some(0));
    assert_eq!(descriptor.max_zoom, Some(2));
    assert_eq!(descriptor.tile_size, Some((256, 256)));
    assert_eq!(descriptor.tile_origin, Some((-2.0037508e7, 2.0037508e7)));
    assert_eq!(descriptor.title.as_deref(), Some("Cached Imagery"));
    assert!(!descriptor.visibility);
    assert!(descriptor.base_layer);
    assert_eq!(descriptor.pyramid.resolutions().len(), 3);
}

#[test]
fn tiled_descriptor_prefers_tile_endpoint_on_request() {
    let service = service("imagery", "tiled");
    let capabilities = tiled_capabilities();
    let options = DescriptorOptions {
        prefer_tiled_variant: true,
        auto_parse_cache: true,
    };
    let descriptor =
        LayerDescriptorFactory::build(&service, Some(&capabilities), &options).unwrap();
    assert_eq!(descriptor.endpoint, "https://maps.example.com/imagery/MapServer/tile");
    assert!(!descriptor.base_layer);
}

#[test]
fn tiled_descriptor_without_resolutions_falls_back_to_constant() {
    let service = service("imagery", "tiled");
    let capabilities: RemoteCapabilities = serde_json::from_value(json!({
        "fullExtent": { "xmin": 0.0, "ymin": 0.0, "xmax": 1.0, "ymax": 1.0 },
        "spatialReference": { "wkid": 3857 },
        "documentInfo": { "Title": "No Tiles Yet" },
        "layers": []
    }))
    .unwrap();
    let descriptor =
        LayerDescriptorFactory::build(&service, Some(&capabilities), &DescriptorOptions::default())
            .unwrap();
    assert_eq!(descriptor.max_zoom, Some(FALLBACK_MAX_ZOOM));
    assert!(descriptor.tile_size.is_none());
}

#[test]
fn unsupported_kind_is_rejected_by_name() {
    let service = service("weird", "wms");
    let result = LayerDescriptorFactory::build(&service, None, &DescriptorOptions::default());
    assert_eq!(
        result,
        Err(DescriptorError::UnsupportedKind {
            service_id: "weird".to_string(),
            kind: "other".to_string(),
        })
    );
}
