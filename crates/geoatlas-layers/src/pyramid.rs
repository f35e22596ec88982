// crates/geoatlas-layers/src/pyramid.rs
// ============================================================================
// Module: Scale Pyramids
// Description: Ordered, deduplicated scale sets with positional resolutions.
// Purpose: Derive the zoomable range of a layer from tile metadata and
//          sub-layer scale bounds.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Scale values recur across many sub-layers, so the scale set is
//! deduplicated before sorting; resolutions stay positional because they
//! index directly into a zoom level and must follow level-of-detail order.
//! An absent sub-layer scale bound is the wire's "no limit" and enters the
//! set as the [`NO_SCALE_LIMIT`] sentinel rather than being filtered out.

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Sentinel scale meaning "no limit"; sorts to position zero.
pub const NO_SCALE_LIMIT: f64 = 0.0;

// ============================================================================
// SECTION: Scale Pyramid
// ============================================================================

/// Deduplicated ascending scale set with a parallel resolution sequence.
///
/// # Invariants
/// - `scales` is sorted ascending and contains no duplicate values.
/// - `resolutions` preserves level-of-detail order and is not deduplicated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScalePyramid {
    /// Ascending, deduplicated scale denominators.
    scales: Vec<f64>,
    /// Ground resolutions in level-of-detail order.
    resolutions: Vec<f64>,
}

impl ScalePyramid {
    /// Returns the ascending scale set.
    #[must_use]
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Returns the positional resolution sequence.
    #[must_use]
    pub fn resolutions(&self) -> &[f64] {
        &self.resolutions
    }

    /// Returns true when neither scales nor resolutions were derived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scales.is_empty() && self.resolutions.is_empty()
    }

    /// Returns the number of distinct zoom levels implied by the scale set.
    #[must_use]
    pub fn zoom_level_count(&self) -> usize {
        self.scales.len()
    }

    /// Returns the position of `scale` in the set by exact value match.
    #[must_use]
    pub fn position_of(&self, scale: f64) -> Option<usize> {
        self.scales.iter().position(|candidate| *candidate == scale)
    }

    /// Returns the first (smallest) scale in the set.
    #[must_use]
    pub fn min_scale(&self) -> Option<f64> {
        self.scales.first().copied()
    }

    /// Returns the last (largest) scale in the set.
    #[must_use]
    pub fn max_scale(&self) -> Option<f64> {
        self.scales.last().copied()
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Accumulates scale and resolution contributions into a [`ScalePyramid`].
#[derive(Debug, Clone, Default)]
pub struct ScalePyramidBuilder {
    /// Scale set under construction, insertion order, deduplicated.
    scales: Vec<f64>,
    /// Resolution sequence under construction, level-of-detail order.
    resolutions: Vec<f64>,
}

impl ScalePyramidBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scales: Vec::new(),
            resolutions: Vec::new(),
        }
    }

    /// Adds a scale to the set unless an equal value is already present.
    pub fn push_scale(&mut self, scale: f64) {
        if !self.scales.iter().any(|existing| *existing == scale) {
            self.scales.push(scale);
        }
    }

    /// Records one level-of-detail entry: the resolution is appended
    /// unconditionally, the scale deduplicated.
    pub fn push_lod(&mut self, scale: f64, resolution: f64) {
        self.push_scale(scale);
        self.resolutions.push(resolution);
    }

    /// Records one sub-layer's declared scale bounds; an absent bound
    /// contributes [`NO_SCALE_LIMIT`].
    pub fn push_sub_layer_scales(&mut self, min_scale: Option<f64>, max_scale: Option<f64>) {
        self.push_scale(max_scale.unwrap_or(NO_SCALE_LIMIT));
        self.push_scale(min_scale.unwrap_or(NO_SCALE_LIMIT));
    }

    /// Adds every scale of an existing pyramid to the set.
    pub fn push_pyramid(&mut self, pyramid: &ScalePyramid) {
        for scale in pyramid.scales() {
            self.push_scale(*scale);
        }
    }

    /// Finalizes the pyramid: scales sorted ascending by total numeric
    /// order, resolutions kept positional.
    #[must_use]
    pub fn build(mut self) -> ScalePyramid {
        self.scales.sort_by(f64::total_cmp);
        ScalePyramid {
            scales: self.scales,
            resolutions: self.resolutions,
        }
    }
}
