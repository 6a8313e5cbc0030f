//! Orchestrates pattern extraction, entropy-guided collapse, constraint
//! propagation, stub wiring, and frontier expansion into one generation run.

use std::collections::{BTreeSet, HashMap};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{info, instrument, warn};

use crate::builder::GenerationConfig;
use crate::cell::{Cell, CellId};
use crate::compatibility::CompatibilityTable;
use crate::entropy::EntropyIndex;
use crate::error::Result;
use crate::expander;
use crate::graph::Graph;
use crate::pattern::PatternId;
use crate::propagator::ConstraintPropagator;
use crate::stub_connector::StubConnector;

/// Output of a completed [`Generator::run`].
#[derive(Debug, Clone)]
pub struct GenerationReport {
    cells: Vec<Cell>,
    adjacency: HashMap<CellId, Vec<CellId>>,
    open_stubs_remaining: usize,
    all_collapsed: bool,
}

impl GenerationReport {
    /// Every collapsed cell the run produced, re-keyed to `0..len()` in the
    /// order each was settled. Cells left stuck by an unresolved
    /// contradiction are not included.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Symmetric adjacency between the re-keyed cell ids [`Self::cells`]
    /// uses. Edges to a cell that was never settled are dropped.
    #[must_use]
    pub fn adjacency(&self) -> &HashMap<CellId, Vec<CellId>> {
        &self.adjacency
    }

    /// Total unfilled edge slots left across every collapsed cell.
    #[must_use]
    pub fn open_stubs_remaining(&self) -> usize {
        self.open_stubs_remaining
    }

    /// Whether every cell in the arena reached the collapsed state.
    #[must_use]
    pub fn all_collapsed(&self) -> bool {
        self.all_collapsed
    }

    /// Consumes the report, returning its cells and adjacency map for an
    /// exporter.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Cell>, HashMap<CellId, Vec<CellId>>) {
        (self.cells, self.adjacency)
    }
}

/// Drives one labeled-graph synthesis run.
///
/// Holds all mutable generation state on the stack for the duration of a
/// run; independent calls to [`Generator::run`] share no state.
pub struct Generator {
    config: GenerationConfig,
    table: CompatibilityTable,
    cells: Vec<Cell>,
    adjacency: HashMap<CellId, Vec<CellId>>,
    entropy: EntropyIndex,
    settled: Vec<CellId>,
    rng: SmallRng,
    expansion_cap: i64,
    target_size: f64,
    hard_upper: usize,
}

impl Generator {
    /// Runs pattern extraction, compatibility-table construction, and the
    /// full growth/cleanup/final-phase generation loop against `graph`.
    ///
    /// # Errors
    /// Returns [`crate::error::GraphWfcError::EmptyGraph`] or
    /// [`crate::error::GraphWfcError::InvalidRadius`] if `graph` or
    /// `config.radius()` fail the preconditions of pattern extraction.
    /// Contradictions encountered during propagation are recovered from
    /// internally and do not surface as an error.
    ///
    /// # Examples
    /// ```
    /// use graphwfc_core::{GenerationConfigBuilder, Generator, Graph};
    ///
    /// let mut graph = Graph::new();
    /// graph.add_edge(0, 1);
    /// graph.add_edge(1, 2);
    ///
    /// let config = GenerationConfigBuilder::new()
    ///     .with_radius(1)
    ///     .with_size_factor(1)
    ///     .with_rng_seed(1)
    ///     .build()
    ///     .unwrap();
    /// let report = Generator::run(&graph, config).unwrap();
    /// assert!(report.cells().iter().all(|c| c.is_collapsed()));
    /// ```
    #[instrument(skip(graph), fields(node_count = graph.node_count(), radius = config.radius()))]
    pub fn run(graph: &Graph, config: GenerationConfig) -> Result<GenerationReport> {
        let table = CompatibilityTable::build(graph, config.radius())?;
        let frequencies: Vec<u64> = table.patterns().iter().map(crate::pattern::Pattern::frequency).collect();
        let all_pids: BTreeSet<PatternId> = (0..table.patterns().len()).collect();

        let target_size = config.target_size(graph.node_count()) as f64;
        let hard_upper = config.hard_upper(graph.node_count());
        let expansion_cap = compute_expansion_cap(graph, config.expansion_percentile(), config.expansion_slack());

        let mut entropy = EntropyIndex::new(frequencies);
        entropy.insert(0);

        let mut generator = Self {
            config,
            table,
            cells: vec![Cell::new(all_pids)],
            adjacency: HashMap::from([(0, Vec::new())]),
            entropy,
            settled: Vec::new(),
            rng: SmallRng::seed_from_u64(config.rng_seed()),
            expansion_cap,
            target_size,
            hard_upper,
        };

        generator.run_growth_loop();
        generator.run_cleanup_loop();
        generator.run_final_phase();

        let open_stubs = generator.open_stubs_total();
        let all_collapsed = generator.cells.iter().all(Cell::is_collapsed);
        info!(open_stubs_remaining = open_stubs, all_collapsed, "generation run complete");

        // Re-key onto zero-based indices in settled (collapse) order: this
        // is the order the text exporter writes, and it silently drops any
        // cell that was never collapsed (e.g. left stuck by an
        // unresolved contradiction) along with dangling edges to it.
        let index_of: HashMap<CellId, usize> = generator
            .settled
            .iter()
            .enumerate()
            .map(|(new_id, &old_id)| (old_id, new_id))
            .collect();
        let cells: Vec<Cell> = generator
            .settled
            .iter()
            .map(|&old_id| generator.cells[old_id].clone())
            .collect();
        let mut adjacency: HashMap<CellId, Vec<CellId>> = HashMap::with_capacity(cells.len());
        for (new_id, &old_id) in generator.settled.iter().enumerate() {
            let neighbors = generator
                .adjacency
                .get(&old_id)
                .into_iter()
                .flatten()
                .filter_map(|old_neighbor| index_of.get(old_neighbor).copied())
                .collect();
            adjacency.insert(new_id, neighbors);
        }

        Ok(GenerationReport {
            cells,
            adjacency,
            open_stubs_remaining: open_stubs,
            all_collapsed,
        })
    }

    fn run_growth_loop(&mut self) {
        loop {
            if self.entropy.frontier().is_empty() {
                break;
            }
            let progress = self.settled.len() as f64 / self.target_size;
            if progress >= self.config.lower_cap() {
                break;
            }

            let Some(select) = self.collapse_lowest_entropy() else {
                break;
            };

            let remaining = self.expansion_cap - self.entropy.frontier().len() as i64;
            if remaining > 0 {
                self.expand_from(&[select], remaining);
            }

            if self.propagate_with_cascade(&[select], true).is_err() {
                warn!(cell = select, "contradiction during growth-phase propagation");
                break;
            }

            let connector = StubConnector::new(&self.table);
            connector.connect(&self.settled, &self.cells, &mut self.adjacency);

            let settled_snapshot = self.settled.clone();
            if self.propagate_with_cascade(&settled_snapshot, true).is_err() {
                warn!("contradiction during growth-phase settled-set propagation");
                break;
            }
        }
    }

    fn run_cleanup_loop(&mut self) {
        loop {
            let open_stubs = self.open_stubs_total();
            if (open_stubs == 0 && self.entropy.frontier().is_empty())
                || self.settled.len() >= self.hard_upper
            {
                break;
            }

            let progress = self.settled.len() as f64 / self.target_size;
            let decayed = self.decay(progress);
            let raw_allowance = (decayed * self.expansion_cap as f64).ceil() as i64;
            let stub_room = open_stubs as i64 - self.entropy.frontier().len() as i64;
            let allowance = raw_allowance.min(stub_room).max(0);

            if self.entropy.frontier().is_empty() && open_stubs > 0 && allowance > 0 {
                self.attach_stub_cells(allowance);
                continue;
            }

            let connector = StubConnector::new(&self.table);
            let added = connector.connect(&self.settled, &self.cells, &mut self.adjacency);
            if added > 0 {
                let settled_snapshot = self.settled.clone();
                if self.propagate_with_cascade(&settled_snapshot, true).is_err() {
                    warn!("contradiction during cleanup-phase propagation");
                    break;
                }
                continue;
            }

            if !self.entropy.frontier().is_empty() {
                if let Some(select) = self.collapse_lowest_entropy() {
                    let connector = StubConnector::new(&self.table);
                    connector.connect(&self.settled, &self.cells, &mut self.adjacency);
                    if allowance > 0 {
                        self.expand_from(&[select], allowance);
                    }
                    if self.propagate_with_cascade(&[select], true).is_err() {
                        warn!(cell = select, "contradiction during cleanup-phase collapse propagation");
                    }
                    continue;
                }
            }

            break;
        }
    }

    fn run_final_phase(&mut self) {
        while !self.entropy.frontier().is_empty() {
            let Some(select) = self.collapse_lowest_entropy() else {
                break;
            };

            let connector = StubConnector::new(&self.table);
            connector.connect(&self.settled, &self.cells, &mut self.adjacency);

            if self.propagate_with_cascade(&[select], false).is_err() {
                warn!(cell = select, "contradiction during final-phase propagation");
                break;
            }
        }
        let connector = StubConnector::new(&self.table);
        connector.connect(&self.settled, &self.cells, &mut self.adjacency);
    }

    /// Picks the lowest-entropy frontier cell, collapses it by weighted
    /// sample, and moves it to `settled`. Returns its id, or `None` if no
    /// frontier cell has positive entropy or collapse fails.
    fn collapse_lowest_entropy(&mut self) -> Option<CellId> {
        let select = self.entropy.pick_lowest(&self.cells)?;
        self.collapse_cell(select)
    }

    fn collapse_cell(&mut self, id: CellId) -> Option<CellId> {
        let domain = self.cells[id].domain().clone();
        let pid = self.entropy.weighted_sample(&domain, &mut self.rng)?;
        let pattern = &self.table.patterns()[pid];
        let (label, degree) = (pattern.center_label(), pattern.center_degree());
        self.cells[id].collapse_to(id, pid, label, degree).ok()?;
        self.entropy.remove(id);
        self.settled.push(id);
        Some(id)
    }

    /// Propagates outward from `initial_seed_ids`, collapsing each wave of
    /// forced cells and recursing on the newly-collapsed wave until no
    /// further cells are forced. When `allow_expansion` is false the
    /// per-wave expansion allowance is ignored (used in the final phase).
    fn propagate_with_cascade(&mut self, initial_seed_ids: &[CellId], allow_expansion: bool) -> Result<()> {
        let mut current_seeds: Vec<CellId> = initial_seed_ids.to_vec();
        while !current_seeds.is_empty() {
            let seed_pairs: Vec<(CellId, PatternId)> = current_seeds
                .iter()
                .filter_map(|&id| self.cells[id].collapsed_pid().map(|pid| (id, pid)))
                .collect();
            if seed_pairs.is_empty() {
                break;
            }

            let forced = {
                let propagator = ConstraintPropagator::new(&self.table);
                propagator.propagate(&seed_pairs, &mut self.cells, &self.adjacency, self.entropy.frontier())?
            };
            if forced.is_empty() {
                break;
            }

            let wave_size = forced.len() as f64;
            let allowance = if allow_expansion {
                (wave_size.sqrt().ceil() * self.expansion_cap as f64) as i64
                    - self.entropy.frontier().len() as i64
            } else {
                0
            };
            let allowance = allowance.max(0);

            let mut newly_collapsed = Vec::with_capacity(forced.len());
            for id in forced {
                if let Some(collapsed) = self.collapse_cell(id) {
                    newly_collapsed.push(collapsed);
                }
            }

            if allowance > 0 {
                self.expand_from(&newly_collapsed, allowance);
            }

            current_seeds = newly_collapsed;
        }
        Ok(())
    }

    fn expand_from(&mut self, parent_ids: &[CellId], budget: i64) {
        let parents: Vec<(CellId, usize)> = parent_ids
            .iter()
            .map(|&id| (id, self.cells[id].target_degree()))
            .collect();
        let allocations = expander::allocate(&parents, budget);
        let all_pids: BTreeSet<PatternId> = (0..self.table.patterns().len()).collect();

        for (parent, count) in allocations {
            for _ in 0..count {
                let child_id = self.cells.len();
                self.cells.push(Cell::new(all_pids.clone()));
                self.adjacency.entry(parent).or_default().push(child_id);
                self.adjacency.entry(child_id).or_default().push(parent);
                self.entropy.insert(child_id);
            }
        }
    }

    fn attach_stub_cells(&mut self, budget: i64) {
        let mut remaining = budget;
        let all_pids: BTreeSet<PatternId> = (0..self.table.patterns().len()).collect();
        let settled_snapshot = self.settled.clone();

        for settled_id in settled_snapshot {
            if remaining <= 0 {
                break;
            }
            let degree = self.adjacency.get(&settled_id).map_or(0, Vec::len);
            let stub = self.cells[settled_id].target_degree().saturating_sub(degree);
            let remaining_usize = usize::try_from(remaining).unwrap_or(0);
            let attach = stub.min(remaining_usize);
            for _ in 0..attach {
                let child_id = self.cells.len();
                self.cells.push(Cell::new(all_pids.clone()));
                self.adjacency.entry(settled_id).or_default().push(child_id);
                self.adjacency.entry(child_id).or_default().push(settled_id);
                self.entropy.insert(child_id);
                remaining -= 1;
            }
        }
    }

    fn open_stubs_total(&self) -> usize {
        self.settled
            .iter()
            .map(|&id| {
                let degree = self.adjacency.get(&id).map_or(0, Vec::len);
                self.cells[id].target_degree().saturating_sub(degree)
            })
            .sum()
    }

    fn decay(&self, progress: f64) -> f64 {
        let upper = self.config.upper_cap();
        if progress <= 1.0 {
            1.0
        } else if progress >= upper {
            0.0
        } else {
            (upper - progress) / (upper - 1.0)
        }
    }
}

/// The 90th-percentile (by default; see [`GenerationConfig::expansion_percentile`])
/// training-graph degree, scaled by [`GenerationConfig::expansion_slack`],
/// used as the per-collapse frontier expansion budget.
fn compute_expansion_cap(graph: &Graph, percentile: f64, slack: f64) -> i64 {
    let mut degrees = graph.degree_sequence();
    degrees.sort_unstable();
    if degrees.is_empty() {
        return 1;
    }
    let rank = ((degrees.len() - 1) as f64 * percentile).round();
    let index = (rank as usize).min(degrees.len() - 1);
    let base = degrees[index] as f64;
    let cap = (base * slack).ceil() as i64;
    cap.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GenerationConfigBuilder;

    fn triangle_graph() -> Graph {
        let mut graph = Graph::new();
        graph.set_label(0, 9);
        graph.set_label(1, 9);
        graph.set_label(2, 9);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        graph.add_edge(0, 2);
        graph
    }

    #[test]
    fn run_produces_only_collapsed_cells_and_symmetric_adjacency() {
        let graph = triangle_graph();
        let config = GenerationConfigBuilder::new()
            .with_radius(1)
            .with_size_factor(1)
            .with_rng_seed(7)
            .build()
            .unwrap();
        let report = Generator::run(&graph, config).unwrap();

        for cell in report.cells() {
            assert!(cell.is_collapsed());
        }
        for (&cell, neighbors) in report.adjacency() {
            for &neighbor in neighbors {
                assert!(!(neighbor == cell), "no self-edges");
                let back = report.adjacency().get(&neighbor).expect("symmetric entry exists");
                assert!(back.contains(&cell), "adjacency must be symmetric");
            }
        }
    }

    #[test]
    fn run_respects_hard_upper_bound() {
        let graph = triangle_graph();
        let config = GenerationConfigBuilder::new()
            .with_radius(1)
            .with_size_factor(2)
            .with_upper_cap(1.0)
            .with_rng_seed(3)
            .build()
            .unwrap();
        let report = Generator::run(&graph, config).unwrap();
        assert!(report.cells().len() <= config.hard_upper(graph.node_count()));
    }

    #[test]
    fn run_is_deterministic_under_fixed_seed() {
        let graph = triangle_graph();
        let config = GenerationConfigBuilder::new()
            .with_radius(1)
            .with_size_factor(2)
            .with_rng_seed(42)
            .build()
            .unwrap();

        let a = Generator::run(&graph, config).unwrap();
        let b = Generator::run(&graph, config).unwrap();

        let pids_a: Vec<_> = a.cells().iter().map(Cell::collapsed_pid).collect();
        let pids_b: Vec<_> = b.cells().iter().map(Cell::collapsed_pid).collect();
        assert_eq!(pids_a, pids_b);
    }

    #[test]
    fn single_node_training_graph_produces_one_cell() {
        let mut graph = Graph::new();
        graph.set_label(0, 1);
        let config = GenerationConfigBuilder::new()
            .with_radius(1)
            .with_size_factor(1)
            .with_rng_seed(1)
            .build()
            .unwrap();
        let report = Generator::run(&graph, config).unwrap();
        assert_eq!(report.cells().len(), 1);
        assert!(report.cells()[0].is_collapsed());
    }
}
