// crates/geoatlas-config/src/lib.rs
// ============================================================================
// Module: Geoatlas Config Library
// Description: Canonical catalog model, builder, and validation.
// Purpose: Single source of truth for catalog JSON semantics.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `geoatlas-config` ingests the hierarchical JSON configuration describing
//! a web-mapping application's catalog — remote map services, service
//! groupings, geocoding locators, spatial extents, and the pass-through UI
//! sections — into a validated, strongly-typed tree. Structural failures
//! abort the build; individually invalid entries are dropped best-effort
//! and reported through [`BuildReport`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod examples;
pub mod model;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::BuildReport;
pub use catalog::Catalog;
pub use catalog::ParseError;
pub use catalog::RejectedEntry;
pub use examples::catalog_json_example;
pub use model::*;
