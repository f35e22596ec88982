// crates/geoatlas-layers/src/lib.rs
// ============================================================================
// Module: Geoatlas Layers Library
// Description: Layer-descriptor synthesis over a catalog.
// Purpose: Derive per-service and composite rendering definitions, fetching
//          remote capabilities where required.
// Dependencies: geoatlas-config, reqwest, serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! `geoatlas-layers` turns catalog service nodes into layer descriptors:
//! scale pyramids derived from tile metadata and sub-layer scale bounds,
//! single-service tiled/dynamic descriptors, and composite basemaps whose
//! members are zoom-aligned against a unified pyramid. Where a descriptor
//! needs a remote capabilities document, the fetch sequencer retrieves the
//! documents strictly one at a time and hands the accumulated mapping to
//! the caller only at completion.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod capabilities;
pub mod composite;
pub mod descriptor;
pub mod pyramid;
pub mod sequencer;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use capabilities::Bounds;
pub use capabilities::CapabilitiesFetchConfig;
pub use capabilities::CapabilitiesSource;
pub use capabilities::FetchError;
pub use capabilities::HttpCapabilitiesSource;
pub use capabilities::RemoteCapabilities;
pub use composite::CompositeLayerDescriptor;
pub use composite::CompositeLayerSynthesizer;
pub use composite::CompositeMember;
pub use composite::MissingMemberError;
pub use descriptor::DescriptorError;
pub use descriptor::DescriptorOptions;
pub use descriptor::FALLBACK_MAX_ZOOM;
pub use descriptor::LayerDescriptor;
pub use descriptor::LayerDescriptorFactory;
pub use pyramid::NO_SCALE_LIMIT;
pub use pyramid::ScalePyramid;
pub use pyramid::ScalePyramidBuilder;
pub use sequencer::BackgroundMaps;
pub use sequencer::CapabilitiesFetchSequencer;
pub use sequencer::GroupSynthesisError;
pub use sequencer::SequenceError;
pub use sequencer::SequencerState;
pub use sequencer::build_background_maps;
pub use sequencer::service_layer_descriptors;
