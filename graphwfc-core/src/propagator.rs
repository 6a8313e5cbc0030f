//! Outward constraint propagation from newly-collapsed cells.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::instrument;

use crate::cell::{Cell, CellId};
use crate::compatibility::CompatibilityTable;
use crate::error::{GraphWfcError, Result};
use crate::pattern::PatternId;

/// Propagates a collapsed cell's pattern outward through the compatibility
/// table, pruning uncollapsed neighbors' domains.
pub struct ConstraintPropagator<'a> {
    table: &'a CompatibilityTable,
}

impl<'a> ConstraintPropagator<'a> {
    /// Borrows the compatibility table this propagator prunes against.
    #[must_use]
    pub fn new(table: &'a CompatibilityTable) -> Self {
        Self { table }
    }

    /// Propagates every `(cell, collapsed_pid)` seed outward through
    /// `adjacency`, pruning uncollapsed cells reachable within
    /// `table.max_radius()` hops. Returns every cell in `frontier` whose
    /// domain is now a singleton (newly forced).
    ///
    /// # Errors
    /// Returns [`GraphWfcError::Contradiction`] as soon as any cell's domain
    /// is pruned to empty.
    #[instrument(skip(self, cells, adjacency, frontier), fields(seed_count = seeds.len()))]
    pub fn propagate(
        &self,
        seeds: &[(CellId, PatternId)],
        cells: &mut [Cell],
        adjacency: &HashMap<CellId, Vec<CellId>>,
        frontier: &[CellId],
    ) -> Result<Vec<CellId>> {
        let radius = self.table.max_radius();
        for &(seed, pid) in seeds {
            self.propagate_one(seed, pid, radius, cells, adjacency)?;
        }
        let forced = frontier
            .iter()
            .copied()
            .filter(|&id| {
                cells
                    .get(id)
                    .is_some_and(|cell| !cell.is_collapsed() && cell.domain().len() == 1)
            })
            .collect();
        Ok(forced)
    }

    fn propagate_one(
        &self,
        seed: CellId,
        pid: PatternId,
        radius: usize,
        cells: &mut [Cell],
        adjacency: &HashMap<CellId, Vec<CellId>>,
    ) -> Result<()> {
        let empty: HashSet<PatternId> = HashSet::new();
        let mut visited: HashSet<CellId> = HashSet::new();
        let mut queue: VecDeque<(CellId, usize)> = VecDeque::new();
        visited.insert(seed);
        queue.push_back((seed, 0));

        while let Some((current, depth)) = queue.pop_front() {
            if depth == radius {
                continue;
            }
            let Some(neighbors) = adjacency.get(&current) else {
                continue;
            };
            for &neighbor in neighbors {
                if !visited.insert(neighbor) {
                    continue;
                }
                let next_depth = depth + 1;
                let neighbor_collapsed = cells.get(neighbor).is_some_and(Cell::is_collapsed);
                if !neighbor_collapsed {
                    let allowed = self.table.compatible_at(next_depth, pid).unwrap_or(&empty);
                    if let Some(cell) = cells.get_mut(neighbor) {
                        cell.prune(neighbor, allowed)?;
                        if cell.domain().is_empty() {
                            return Err(GraphWfcError::Contradiction { cell: neighbor });
                        }
                    }
                }
                queue.push_back((neighbor, next_depth));
            }
        }
        Ok(())
    }
}
