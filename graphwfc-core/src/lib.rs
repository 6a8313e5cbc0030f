//! Graph-WFC core library: labeled-graph pattern extraction, compatibility
//! tables, and entropy-guided generation.

mod builder;
mod cell;
mod compatibility;
mod entropy;
mod error;
mod expander;
mod generator;
mod graph;
mod pattern;
mod pattern_extractor;
mod propagator;
mod stub_connector;

pub use crate::{
    builder::{GenerationConfig, GenerationConfigBuilder},
    cell::{Cell, CellId},
    compatibility::CompatibilityTable,
    entropy::EntropyIndex,
    error::{GraphWfcError, GraphWfcErrorCode, Result},
    generator::{GenerationReport, Generator},
    graph::{Graph, Label, NodeId},
    pattern::{Pattern, PatternId},
    pattern_extractor::{Extraction, PatternExtractor},
    propagator::ConstraintPropagator,
    stub_connector::StubConnector,
};

use std::collections::HashMap;

/// Extracts and deduplicates ego-network patterns from `graph` at `radius`.
///
/// Thin wrapper over [`PatternExtractor::extract`], named to match the
/// core API surface consumed by external collaborators.
///
/// # Errors
/// See [`PatternExtractor::extract`].
pub fn extract_patterns(graph: &Graph, radius: usize) -> Result<Extraction> {
    PatternExtractor::extract(graph, radius)
}

/// Builds a multi-radius [`CompatibilityTable`] for `graph` over
/// `1..=max_radius`.
///
/// Thin wrapper over [`CompatibilityTable::build`].
///
/// # Errors
/// See [`CompatibilityTable::build`].
pub fn build_compatibility(graph: &Graph, max_radius: usize) -> Result<CompatibilityTable> {
    CompatibilityTable::build(graph, max_radius)
}

/// Runs a full generation pass over `training_graph` under `config`,
/// returning the resulting cells and their adjacency.
///
/// Thin wrapper over [`Generator::run`], returning just the two core
/// collections an exporter needs; use [`Generator::run`] directly for the
/// richer [`GenerationReport`] (open-stub and collapse-completeness stats).
///
/// # Errors
/// See [`Generator::run`].
pub fn run_generation(
    training_graph: &Graph,
    config: GenerationConfig,
) -> Result<(Vec<Cell>, HashMap<CellId, Vec<CellId>>)> {
    Generator::run(training_graph, config).map(GenerationReport::into_parts)
}
