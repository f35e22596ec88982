// crates/geoatlas-layers/src/descriptor.rs
// ============================================================================
// Module: Layer Descriptors
// Description: Single-service rendering definitions.
// Purpose: Turn a service node plus an optional capabilities document into
//          a descriptor the rendering engine can consume.
// Dependencies: geoatlas-config, thiserror
// ============================================================================

//! ## Overview
//! A layer descriptor carries everything the rendering consumer needs for
//! one service: endpoint, sub-layer list, scale pyramid, spatial reference,
//! bounds, and presentation flags. Without a capabilities document only the
//! service-level fields are known — the bare path used when layers are
//! synthesized eagerly without group compositing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use geoatlas_config::Service;
use geoatlas_config::ServiceKind;
use thiserror::Error;

use crate::capabilities::Bounds;
use crate::capabilities::RemoteCapabilities;
use crate::pyramid::ScalePyramid;
use crate::pyramid::ScalePyramidBuilder;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum zoom level assumed for a tiled service when no resolutions were
/// derived from its capabilities.
pub const FALLBACK_MAX_ZOOM: usize = 18;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Variant selection for descriptor synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorOptions {
    /// Address tiled services through the `tile` endpoint instead of the
    /// auto-parsed cache at the base URL.
    pub prefer_tiled_variant: bool,
    /// Let the consumer parse an existing tile cache from the base URL.
    pub auto_parse_cache: bool,
}

impl Default for DescriptorOptions {
    fn default() -> Self {
        Self {
            prefer_tiled_variant: false,
            auto_parse_cache: true,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure while synthesizing a layer descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// The service's declared kind has no rendering branch.
    #[error("service {service_id} has unsupported kind {kind}")]
    UnsupportedKind {
        /// Id of the offending service.
        service_id: String,
        /// The declared kind label.
        kind: String,
    },
}

// ============================================================================
// SECTION: Descriptor
// ============================================================================

/// Rendering definition for one remote map service.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDescriptor {
    /// Backing service id.
    pub service_id: String,
    /// Rendering protocol of the backing service.
    pub kind: ServiceKind,
    /// Request endpoint for the rendering consumer.
    pub endpoint: String,
    /// Title from the capabilities document, else the service display name.
    pub title: Option<String>,
    /// Advertised sub-layer ids in server order.
    pub sub_layer_ids: Vec<i64>,
    /// Derived scale pyramid.
    pub pyramid: ScalePyramid,
    /// `EPSG`-style identifier of the service's coordinate system.
    pub spatial_reference: Option<String>,
    /// Full extent of the service's data.
    pub bounds: Option<Bounds>,
    /// Layer opacity copied from the service.
    pub opacity: f64,
    /// Whether the layer starts visible.
    pub visibility: bool,
    /// Whether the layer participates as a base layer.
    pub base_layer: bool,
    /// Stacking order copied from the service.
    pub draw_order: i64,
    /// Lowest zoom level served; tiled descriptors only.
    pub min_zoom: Option<usize>,
    /// Highest zoom level served; tiled descriptors only.
    pub max_zoom: Option<usize>,
    /// Tile width and height in pixels, when tile metadata was present.
    pub tile_size: Option<(u32, u32)>,
    /// Tile grid origin, when tile metadata was present.
    pub tile_origin: Option<(f64, f64)>,
}

impl LayerDescriptor {
    /// Returns the comma-joined sub-layer id list with no trailing
    /// separator.
    #[must_use]
    pub fn sub_layer_list(&self) -> String {
        let mut joined = String::new();
        for id in &self.sub_layer_ids {
            if !joined.is_empty() {
                joined.push(',');
            }
            joined.push_str(&id.to_string());
        }
        joined
    }

    /// Returns the `show:`-prefixed sub-layer filter for dynamic
    /// descriptors with a non-empty sub-layer list.
    #[must_use]
    pub fn layer_filter(&self) -> Option<String> {
        if self.kind != ServiceKind::Dynamic || self.sub_layer_ids.is_empty() {
            return None;
        }
        Some(format!("show:{}", self.sub_layer_list()))
    }

    /// Returns true when the descriptor addresses zoom by scale values
    /// because no resolutions were derived.
    #[must_use]
    pub fn uses_scales(&self) -> bool {
        self.pyramid.resolutions().is_empty() && !self.pyramid.scales().is_empty()
    }
}

// ============================================================================
// SECTION: Factory
// ============================================================================

/// Builds [`LayerDescriptor`]s from services and capability documents.
pub struct LayerDescriptorFactory;

impl LayerDescriptorFactory {
    /// Builds the descriptor for one service.
    ///
    /// Without `capabilities` the result is a bare descriptor: no bounds,
    /// spatial reference, or resolutions — only service-level fields.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::UnsupportedKind`] when the service kind
    /// has no rendering branch.
    pub fn build(
        service: &Service,
        capabilities: Option<&RemoteCapabilities>,
        options: &DescriptorOptions,
    ) -> Result<LayerDescriptor, DescriptorError> {
        let mut builder = ScalePyramidBuilder::new();
        let mut sub_layer_ids = Vec::new();
        let mut bounds = None;
        let mut spatial_reference = None;
        let mut title = service.display_name.clone();
        let mut tile_size = None;
        let mut tile_origin = None;

        if let Some(document) = capabilities {
            bounds = Some(document.full_extent);
            spatial_reference = Some(format!("EPSG:{}", document.spatial_reference.wkid));
            title = Some(document.document_info.title.clone());
            if let Some(tile_info) = &document.tile_info {
                tile_size = Some((tile_info.cols, tile_info.rows));
                tile_origin = Some((tile_info.origin.x, tile_info.origin.y));
                if service.kind == ServiceKind::Tiled {
                    for lod in &tile_info.lods {
                        builder.push_lod(lod.scale, lod.resolution);
                    }
                }
            }
            for layer in &document.layers {
                sub_layer_ids.push(layer.id);
                builder.push_sub_layer_scales(layer.min_scale, layer.max_scale);
            }
        }
        let pyramid = builder.build();

        let descriptor = match service.kind {
            ServiceKind::Dynamic => LayerDescriptor {
                service_id: service.id.clone(),
                kind: service.kind,
                endpoint: format!("{}/export", service.url),
                title: service.display_name.clone().or(title),
                sub_layer_ids,
                pyramid,
                spatial_reference,
                bounds,
                opacity: service.opacity,
                visibility: true,
                base_layer: false,
                draw_order: service.draw_order,
                min_zoom: None,
                max_zoom: None,
                tile_size: None,
                tile_origin: None,
            },
            ServiceKind::Tiled => {
                let max_zoom = if pyramid.resolutions().is_empty() {
                    FALLBACK_MAX_ZOOM
                } else {
                    pyramid.resolutions().len() - 1
                };
                let endpoint = if options.prefer_tiled_variant {
                    format!("{}/tile", service.url)
                } else {
                    service.url.clone()
                };
                LayerDescriptor {
                    service_id: service.id.clone(),
                    kind: service.kind,
                    endpoint,
                    title,
                    sub_layer_ids,
                    pyramid,
                    spatial_reference,
                    bounds,
                    opacity: service.opacity,
                    visibility: false,
                    base_layer: !options.prefer_tiled_variant && options.auto_parse_cache,
                    draw_order: service.draw_order,
                    min_zoom: Some(0),
                    max_zoom: Some(max_zoom),
                    tile_size,
                    tile_origin,
                }
            }
            ServiceKind::Other => {
                return Err(DescriptorError::UnsupportedKind {
                    service_id: service.id.clone(),
                    kind: service.kind.as_str().to_string(),
                });
            }
        };
        Ok(descriptor)
    }
}
