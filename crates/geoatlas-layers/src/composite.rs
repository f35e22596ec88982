// crates/geoatlas-layers/src/composite.rs
// ============================================================================
// Module: Composite Layer Synthesis
// Description: Multi-service basemap assembly with zoom alignment.
// Purpose: Merge the descriptors of one service group into a single
//          composite with a unified scale pyramid.
// Dependencies: geoatlas-config, thiserror
// ============================================================================

//! ## Overview
//! Member services may have been tiled at different native resolutions; the
//! composite's unified scale pyramid is the deduplicated, ascending union of
//! the members', and each member without native zoom data is assigned a zoom
//! window by locating its own scale range inside the unified pyramid. This
//! is the one place a dangling cross-category reference is caught: a group
//! member with no fetched descriptor fails the merge for that group alone.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use geoatlas_config::ServiceGroup;
use thiserror::Error;

use crate::descriptor::LayerDescriptor;
use crate::pyramid::ScalePyramid;
use crate::pyramid::ScalePyramidBuilder;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// A group member had no descriptor to merge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("service group {group_id} references service {service_id} with no descriptor")]
pub struct MissingMemberError {
    /// Group whose merge was aborted.
    pub group_id: String,
    /// The member id with no descriptor.
    pub service_id: String,
}

// ============================================================================
// SECTION: Composite Descriptors
// ============================================================================

/// One member layer inside a composite, with its resolved zoom window.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeMember {
    /// Backing service id.
    pub service_id: String,
    /// The member's own descriptor.
    pub descriptor: LayerDescriptor,
    /// Lowest zoom level the member serves, as an index into the unified
    /// pyramid.
    pub min_zoom: Option<usize>,
    /// Highest zoom level the member serves, as an index into the unified
    /// pyramid.
    pub max_zoom: Option<usize>,
    /// Smallest scale of the member's own pyramid, when alignment applied.
    pub min_scale: Option<f64>,
    /// Largest scale of the member's own pyramid, when alignment applied.
    pub max_scale: Option<f64>,
}

/// Composite rendering definition assembled from one service group.
///
/// # Invariants
/// - `scales` is the deduplicated ascending union of the members' pyramids.
/// - `zoom_level_count` equals `scales.len()`.
/// - `members` follows the group's declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeLayerDescriptor {
    /// Backing service group id.
    pub group_id: String,
    /// Name shown for the composite basemap.
    pub display_name: Option<String>,
    /// Unified ascending scale set across all members.
    pub scales: Vec<f64>,
    /// Number of distinct zoom levels implied by the unified scale set.
    pub zoom_level_count: usize,
    /// Member layers in group declaration order.
    pub members: Vec<CompositeMember>,
}

// ============================================================================
// SECTION: Synthesizer
// ============================================================================

/// Merges per-service descriptors into composite descriptors.
pub struct CompositeLayerSynthesizer;

impl CompositeLayerSynthesizer {
    /// Merges the group's member descriptors into one composite.
    ///
    /// # Errors
    ///
    /// Returns [`MissingMemberError`] naming the first group member absent
    /// from `per_service`; other groups remain mergeable.
    pub fn merge(
        group: &ServiceGroup,
        display_name: Option<&str>,
        per_service: &BTreeMap<String, LayerDescriptor>,
    ) -> Result<CompositeLayerDescriptor, MissingMemberError> {
        let mut resolved = Vec::with_capacity(group.service_ids.len());
        for service_id in &group.service_ids {
            let Some(descriptor) = per_service.get(service_id) else {
                return Err(MissingMemberError {
                    group_id: group.id.clone(),
                    service_id: service_id.clone(),
                });
            };
            resolved.push(descriptor);
        }

        let mut builder = ScalePyramidBuilder::new();
        for descriptor in &resolved {
            builder.push_pyramid(&descriptor.pyramid);
        }
        let unified = builder.build();

        let mut members = Vec::with_capacity(resolved.len());
        for descriptor in resolved {
            members.push(align_member(descriptor, &unified));
        }

        Ok(CompositeLayerDescriptor {
            group_id: group.id.clone(),
            display_name: display_name.map(ToString::to_string),
            zoom_level_count: unified.zoom_level_count(),
            scales: unified.scales().to_vec(),
            members,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves one member's zoom window against the unified pyramid.
///
/// Members carrying native zoom data or resolutions keep them; only members
/// whose sole zoom information is a scale pyramid are aligned.
fn align_member(descriptor: &LayerDescriptor, unified: &ScalePyramid) -> CompositeMember {
    let mut member = CompositeMember {
        service_id: descriptor.service_id.clone(),
        descriptor: descriptor.clone(),
        min_zoom: descriptor.min_zoom,
        max_zoom: descriptor.max_zoom,
        min_scale: None,
        max_scale: None,
    };
    let needs_alignment = descriptor.min_zoom.is_none()
        && descriptor.max_zoom.is_none()
        && descriptor.pyramid.resolutions().is_empty()
        && !descriptor.pyramid.scales().is_empty();
    if !needs_alignment {
        return member;
    }
    let Some(min_scale) = descriptor.pyramid.min_scale() else {
        return member;
    };
    let Some(max_scale) = descriptor.pyramid.max_scale() else {
        return member;
    };
    member.min_scale = Some(min_scale);
    member.max_scale = Some(max_scale);
    member.min_zoom = Some(unified.position_of(min_scale).unwrap_or(0));
    member.max_zoom = Some(
        unified
            .position_of(max_scale)
            .unwrap_or_else(|| unified.zoom_level_count().saturating_sub(1)),
    );
    member
}
