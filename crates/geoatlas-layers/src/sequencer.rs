// crates/geoatlas-layers/src/sequencer.rs
// ============================================================================
// Module: Capabilities Fetch Sequencer
// Description: One-at-a-time fetch orchestration for background services.
// Purpose: Drive the fetch → descriptor-build step per service and hand the
//          accumulated mapping to the caller only at completion.
// Dependencies: geoatlas-config, tracing
// ============================================================================

//! ## Overview
//! Background services are fetched strictly in the first-seen order of the
//! ids collected across the background basemap groups, one request at a
//! time — total latency is the sum of per-service round trips. A fetch
//! failure halts the sequence in place: the queue never advances past the
//! failed service, nothing is retried or skipped, and the halt is surfaced
//! to the caller as an error naming the service. There is no cancellation
//! and no timeout at this layer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::VecDeque;

use geoatlas_config::Catalog;
use thiserror::Error;

use crate::capabilities::CapabilitiesSource;
use crate::capabilities::FetchError;
use crate::composite::CompositeLayerDescriptor;
use crate::composite::CompositeLayerSynthesizer;
use crate::composite::MissingMemberError;
use crate::descriptor::DescriptorError;
use crate::descriptor::DescriptorOptions;
use crate::descriptor::LayerDescriptor;
use crate::descriptor::LayerDescriptorFactory;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Terminal failure of a fetch sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// A background group referenced a service the catalog does not define.
    #[error("background service not defined: {service_id}")]
    UnknownService {
        /// The unresolvable service id.
        service_id: String,
    },
    /// A capabilities fetch failed; the sequence is halted at this service.
    #[error("capabilities fetch for {service_id} failed: {source}")]
    Fetch {
        /// Service whose fetch failed.
        service_id: String,
        /// The underlying fetch failure.
        source: FetchError,
    },
    /// Descriptor synthesis failed for a fetched service.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// Why one background group produced no composite.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupSynthesisError {
    /// The background entry named a group the catalog does not define.
    #[error("background service group not defined: {group_id}")]
    UnknownGroup {
        /// The unresolvable group id.
        group_id: String,
    },
    /// A group member had no descriptor to merge.
    #[error(transparent)]
    MissingMember(#[from] MissingMemberError),
}

// ============================================================================
// SECTION: Sequencer
// ============================================================================

/// Observable state of a fetch sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerState {
    /// No fetch is outstanding; the queue has not drained.
    Idle,
    /// The identified service's capabilities request is outstanding; a
    /// failed sequence remains in this state at the failed service.
    Fetching(String),
    /// Every queued service has a stored descriptor.
    Done,
}

/// Drives the remote-fetch → descriptor-build step one service at a time.
///
/// # Invariants
/// - At most one fetch is outstanding, ever.
/// - The accumulator is owned by the sequencer until completion; callers
///   observe it only through [`CapabilitiesFetchSequencer::run`].
pub struct CapabilitiesFetchSequencer<'a, S: CapabilitiesSource> {
    /// Catalog the service ids resolve against.
    catalog: &'a Catalog,
    /// Source of capabilities documents.
    source: &'a S,
    /// Variant selection forwarded to the descriptor factory.
    options: DescriptorOptions,
    /// Service ids still awaiting a descriptor, in fetch order.
    queue: VecDeque<String>,
    /// Descriptors stored so far, keyed by service id.
    accumulated: BTreeMap<String, LayerDescriptor>,
    /// Current sequence state.
    state: SequencerState,
}

impl<'a, S: CapabilitiesSource> CapabilitiesFetchSequencer<'a, S> {
    /// Creates a sequencer over the catalog's background service ids, in
    /// first-seen order with duplicates removed.
    #[must_use]
    pub fn new(catalog: &'a Catalog, source: &'a S, options: DescriptorOptions) -> Self {
        Self {
            catalog,
            source,
            options,
            queue: catalog.background_layer_names().into(),
            accumulated: BTreeMap::new(),
            state: SequencerState::Idle,
        }
    }

    /// Returns the current sequence state.
    #[must_use]
    pub const fn state(&self) -> &SequencerState {
        &self.state
    }

    /// Returns the ids still awaiting a descriptor, in fetch order.
    #[must_use]
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }

    /// Fetches and stores the descriptor for the next queued service.
    ///
    /// An empty queue transitions straight to [`SequencerState::Done`].
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError`] when the service cannot be resolved,
    /// fetched, or synthesized; the queue does not advance past the failed
    /// service.
    pub fn step(&mut self) -> Result<(), SequenceError> {
        let Some(service_id) = self.queue.front().cloned() else {
            self.state = SequencerState::Done;
            return Ok(());
        };
        self.state = SequencerState::Fetching(service_id.clone());
        let Some(service) = self.catalog.services.get(&service_id) else {
            return Err(SequenceError::UnknownService {
                service_id,
            });
        };
        let capabilities = self.source.fetch(service).map_err(|source| {
            tracing::warn!(
                service_id = %service_id,
                error = %source,
                "capabilities fetch failed; sequence halted"
            );
            SequenceError::Fetch {
                service_id: service_id.clone(),
                source,
            }
        })?;
        let descriptor =
            LayerDescriptorFactory::build(service, Some(&capabilities), &self.options)?;
        self.accumulated.insert(service_id, descriptor);
        self.queue.pop_front();
        self.state = if self.queue.is_empty() {
            SequencerState::Done
        } else {
            SequencerState::Idle
        };
        Ok(())
    }

    /// Drives the sequence to completion and invokes `on_complete` exactly
    /// once with the full accumulated mapping, which is then returned.
    ///
    /// # Errors
    ///
    /// Returns the first [`SequenceError`]; the completion callback is not
    /// invoked on failure.
    pub fn run<F>(mut self, on_complete: F) -> Result<BTreeMap<String, LayerDescriptor>, SequenceError>
    where
        F: FnOnce(&BTreeMap<String, LayerDescriptor>),
    {
        while self.state != SequencerState::Done {
            self.step()?;
        }
        on_complete(&self.accumulated);
        Ok(self.accumulated)
    }
}

// ============================================================================
// SECTION: Synthesis Drivers
// ============================================================================

/// Outcome of end-to-end background basemap synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundMaps {
    /// Composite descriptors in background declaration order.
    pub composites: Vec<CompositeLayerDescriptor>,
    /// Per-service descriptors accumulated by the fetch sequence.
    pub descriptors: BTreeMap<String, LayerDescriptor>,
    /// Groups that produced no composite, in declaration order.
    pub skipped: Vec<GroupSynthesisError>,
}

/// Fetches every background service's capabilities and assembles one
/// composite per background basemap group.
///
/// A group whose merge fails is logged and recorded in the outcome's
/// `skipped` list without aborting the remaining groups.
///
/// # Errors
///
/// Returns [`SequenceError`] when the fetch sequence halts before every
/// background service has a descriptor.
pub fn build_background_maps<S: CapabilitiesSource>(
    catalog: &Catalog,
    source: &S,
    options: DescriptorOptions,
) -> Result<BackgroundMaps, SequenceError> {
    let sequencer = CapabilitiesFetchSequencer::new(catalog, source, options);
    let descriptors = sequencer.run(|_| {})?;
    let mut composites = Vec::new();
    let mut skipped = Vec::new();
    for background in catalog.background_maps() {
        let Some(group) = catalog.service_groups.get(&background.service_group_id) else {
            tracing::warn!(
                group_id = %background.service_group_id,
                "background service group not defined; composite skipped"
            );
            skipped.push(GroupSynthesisError::UnknownGroup {
                group_id: background.service_group_id.clone(),
            });
            continue;
        };
        match CompositeLayerSynthesizer::merge(
            group,
            background.display_name.as_deref(),
            &descriptors,
        ) {
            Ok(composite) => composites.push(composite),
            Err(err) => {
                tracing::warn!(
                    group_id = %err.group_id,
                    service_id = %err.service_id,
                    "composite merge failed; group skipped"
                );
                skipped.push(err.into());
            }
        }
    }
    Ok(BackgroundMaps {
        composites,
        descriptors,
        skipped,
    })
}

/// Builds a bare descriptor per catalog service, keyed by service id.
///
/// Services whose kind has no rendering branch are skipped with a debug
/// log.
#[must_use]
pub fn service_layer_descriptors(
    catalog: &Catalog,
    options: &DescriptorOptions,
) -> BTreeMap<String, LayerDescriptor> {
    let mut result = BTreeMap::new();
    for (service_id, service) in &catalog.services {
        match LayerDescriptorFactory::build(service, None, options) {
            Ok(descriptor) => {
                result.insert(service_id.clone(), descriptor);
            }
            Err(err) => {
                tracing::debug!(
                    service_id = %service_id,
                    error = %err,
                    "service skipped during eager layer synthesis"
                );
            }
        }
    }
    result
}
