// crates/geoatlas-layers/tests/sequencer_unit.rs
// ============================================================================
// Module: Fetch Sequencer Unit Tests
// Description: Validate one-at-a-time ordering, accumulation, and halting.
// Purpose: Ensure the sequence fetches strictly in first-seen order and
//          stalls in place on failure.
// ============================================================================

//! Unit tests for the capabilities fetch sequencer over a scripted source.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::cell::Cell;
use std::cell::RefCell;

use geoatlas_config::Catalog;
use geoatlas_config::Service;
use geoatlas_layers::CapabilitiesFetchSequencer;
use geoatlas_layers::CapabilitiesSource;
use geoatlas_layers::DescriptorOptions;
use geoatlas_layers::FetchError;
use geoatlas_layers::RemoteCapabilities;
use geoatlas_layers::SequenceError;
use geoatlas_layers::SequencerState;
use geoatlas_layers::build_background_maps;
use serde_json::json;

/// Capabilities source that answers from a canned document and records
/// every fetch, optionally failing for one service id.
struct ScriptedSource {
    /// Service ids fetched so far, in call order.
    log: RefCell<Vec<String>>,
    /// Service id whose fetch fails, when set.
    fail_for: Option<String>,
}

impl ScriptedSource {
    fn new() -> Self {
        Self {
            log: RefCell::new(Vec::new()),
            fail_for: None,
        }
    }

    fn failing_for(service_id: &str) -> Self {
        Self {
            log: RefCell::new(Vec::new()),
            fail_for: Some(service_id.to_string()),
        }
    }

    fn fetched(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl CapabilitiesSource for ScriptedSource {
    fn fetch(&self, service: &Service) -> Result<RemoteCapabilities, FetchError> {
        self.log.borrow_mut().push(service.id.clone());
        if self.fail_for.as_deref() == Some(service.id.as_str()) {
            return Err(FetchError::Status(503));
        }
        let document = serde_json::from_value(json!({
            "fullExtent": { "xmin": 0.0, "ymin": 0.0, "xmax": 1.0, "ymax": 1.0 },
            "spatialReference": { "wkid": 3857 },
            "documentInfo": { "Title": service.id },
            "layers": [ { "id": 0, "minScale": 100.0, "maxScale": 50.0 } ]
        }))
        .map_err(|err| FetchError::Decode(err.to_string()))?;
        Ok(document)
    }
}

fn three_service_catalog() -> Catalog {
    let raw = json!({
        "services": {
            "alpha": { "url": "https://maps.example.com/alpha", "type": "dynamic" },
            "beta": { "url": "https://maps.example.com/beta", "type": "dynamic" },
            "gamma": { "url": "https://maps.example.com/gamma", "type": "dynamic" }
        },
        "serviceGroups": {
            "g1": ["alpha", "beta"],
            "g2": ["beta", "gamma"]
        },
        "mapConfig": {
            "backgroundMaps": [
                { "serviceGroupId": "g1", "displayName": "First" },
                { "serviceGroupId": "g2", "displayName": "Second" }
            ]
        }
    });
    Catalog::from_value(&raw).unwrap()
}

#[test]
fn run_fetches_each_service_once_in_first_seen_order() {
    let catalog = three_service_catalog();
    let source = ScriptedSource::new();
    let sequencer =
        CapabilitiesFetchSequencer::new(&catalog, &source, DescriptorOptions::default());

    let completions = Cell::new(0_u32);
    let accumulated = sequencer
        .run(|mapping| {
            completions.set(completions.get() + 1);
            assert_eq!(mapping.len(), 3);
        })
        .unwrap();

    assert_eq!(completions.get(), 1);
    assert_eq!(accumulated.len(), 3);
    assert_eq!(source.fetched(), vec!["alpha", "beta", "gamma"]);
}

#[test]
fn step_transitions_through_states_to_done() {
    let catalog = three_service_catalog();
    let source = ScriptedSource::new();
    let mut sequencer =
        CapabilitiesFetchSequencer::new(&catalog, &source, DescriptorOptions::default());

    assert_eq!(sequencer.state(), &SequencerState::Idle);
    sequencer.step().unwrap();
    assert_eq!(sequencer.state(), &SequencerState::Idle);
    sequencer.step().unwrap();
    sequencer.step().unwrap();
    assert_eq!(sequencer.state(), &SequencerState::Done);
}

#[test]
fn fetch_failure_halts_the_sequence_in_place() {
    let catalog = three_service_catalog();
    let source = ScriptedSource::failing_for("beta");
    let mut sequencer =
        CapabilitiesFetchSequencer::new(&catalog, &source, DescriptorOptions::default());

    sequencer.step().unwrap();
    let error = sequencer.step().unwrap_err();
    assert_eq!(
        error,
        SequenceError::Fetch {
            service_id: "beta".to_string(),
            source: FetchError::Status(503),
        }
    );
    // The failed service is still at the head of the queue and the state
    // still names it.
    assert_eq!(sequencer.pending().next(), Some("beta"));
    assert_eq!(sequencer.state(), &SequencerState::Fetching("beta".to_string()));
    // Nothing was retried or skipped behind the caller's back.
    assert_eq!(source.fetched(), vec!["alpha", "beta"]);
}

#[test]
fn failed_run_does_not_invoke_completion() {
    let catalog = three_service_catalog();
    let source = ScriptedSource::failing_for("alpha");
    let sequencer =
        CapabilitiesFetchSequencer::new(&catalog, &source, DescriptorOptions::default());

    let completions = Cell::new(0_u32);
    let result = sequencer.run(|_| completions.set(completions.get() + 1));
    assert!(result.is_err());
    assert_eq!(completions.get(), 0);
}

#[test]
fn unknown_background_service_is_a_sequence_error() {
    let raw = json!({
        "services": {},
        "serviceGroups": { "g": ["phantom"] },
        "mapConfig": { "backgroundMaps": [ { "serviceGroupId": "g" } ] }
    });
    let catalog = Catalog::from_value(&raw).unwrap();
    let source = ScriptedSource::new();
    let sequencer =
        CapabilitiesFetchSequencer::new(&catalog, &source, DescriptorOptions::default());

    let error = sequencer.run(|_| {}).unwrap_err();
    assert_eq!(
        error,
        SequenceError::UnknownService {
            service_id: "phantom".to_string(),
        }
    );
    assert!(source.fetched().is_empty());
}

#[test]
fn empty_background_queue_completes_immediately() {
    let catalog = Catalog::from_value(&json!({})).unwrap();
    let source = ScriptedSource::new();
    let sequencer =
        CapabilitiesFetchSequencer::new(&catalog, &source, DescriptorOptions::default());

    let completions = Cell::new(0_u32);
    let accumulated = sequencer.run(|_| completions.set(completions.get() + 1)).unwrap();
    assert_eq!(completions.get(), 1);
    assert!(accumulated.is_empty());
    assert!(source.fetched().is_empty());
}

#[test]
fn background_maps_compose_per_group_with_shared_members() {
    let catalog = three_service_catalog();
    let source = ScriptedSource::new();

    let outcome =
        build_background_maps(&catalog, &source, DescriptorOptions::default()).unwrap();

    assert_eq!(outcome.composites.len(), 2);
    assert!(outcome.skipped.is_empty());
    assert_eq!(outcome.descriptors.len(), 3);
    // Shared member fetched once despite appearing in both groups.
    assert_eq!(source.fetched(), vec!["alpha", "beta", "gamma"]);
    assert_eq!(outcome.composites[0].display_name.as_deref(), Some("First"));
    assert_eq!(outcome.composites[0].members.len(), 2);
    assert_eq!(outcome.composites[1].members.len(), 2);
}

#[test]
fn undefined_group_is_skipped_without_aborting_others() {
    let raw = json!({
        "services": {
            "alpha": { "url": "https://maps.example.com/alpha", "type": "dynamic" }
        },
        "serviceGroups": { "good": ["alpha"] },
        "mapConfig": {
            "backgroundMaps": [
                { "serviceGroupId": "missing" },
                { "serviceGroupId": "good" }
            ]
        }
    });
    let catalog = Catalog::from_value(&raw).unwrap();
    let source = ScriptedSource::new();

    let outcome =
        build_background_maps(&catalog, &source, DescriptorOptions::default()).unwrap();
    assert_eq!(outcome.composites.len(), 1);
    assert_eq!(outcome.composites[0].group_id, "good");
    assert_eq!(outcome.skipped.len(), 1);
}
