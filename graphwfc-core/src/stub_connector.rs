//! Greedy stub-wiring: closes open edge slots on collapsed cells by
//! Resource-Allocation score, subject to multi-hop compatibility.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::instrument;

use crate::cell::{Cell, CellId};
use crate::compatibility::CompatibilityTable;
use crate::pattern::PatternId;

/// Wires open stubs between collapsed cells.
pub struct StubConnector<'a> {
    table: &'a CompatibilityTable,
}

impl<'a> StubConnector<'a> {
    /// Borrows the compatibility table used for candidate validation and
    /// scoring.
    #[must_use]
    pub fn new(table: &'a CompatibilityTable) -> Self {
        Self { table }
    }

    /// Greedily adds edges between stub-having cells in `settled`, in
    /// descending Resource-Allocation score, ties broken by candidate
    /// generation order. Returns the number of edges added.
    #[instrument(skip(self, cells, adjacency), fields(settled_count = settled.len()))]
    pub fn connect(
        &self,
        settled: &[CellId],
        cells: &[Cell],
        adjacency: &mut HashMap<CellId, Vec<CellId>>,
    ) -> usize {
        let radius = self.table.max_radius();
        let mut stubs: HashMap<CellId, usize> = HashMap::new();
        for &c in settled {
            let Some(cell) = cells.get(c) else { continue };
            let degree = adjacency.get(&c).map_or(0, Vec::len);
            let stub = cell.target_degree().saturating_sub(degree);
            if stub > 0 {
                stubs.insert(c, stub);
            }
        }
        let participants: Vec<CellId> = settled
            .iter()
            .copied()
            .filter(|c| stubs.contains_key(c))
            .collect();

        let mut candidates: Vec<(CellId, CellId, f64)> = Vec::new();
        for i in 0..participants.len() {
            for j in (i + 1)..participants.len() {
                let u = participants[i];
                let v = participants[j];
                if already_adjacent(adjacency, u, v) {
                    continue;
                }
                let (Some(pid_u), Some(pid_v)) = (cells[u].collapsed_pid(), cells[v].collapsed_pid()) else {
                    continue;
                };
                if !self.direct_compatible(pid_u, pid_v) {
                    continue;
                }
                if !self.multi_hop_compatible(u, v, pid_u, pid_v, radius, cells, adjacency) {
                    continue;
                }
                candidates.push((u, v, self.ra_score(pid_u, pid_v)));
            }
        }

        candidates.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));

        let mut added = 0;
        for (u, v, _) in candidates {
            let su = stubs.get(&u).copied().unwrap_or(0);
            let sv = stubs.get(&v).copied().unwrap_or(0);
            if su == 0 || sv == 0 || already_adjacent(adjacency, u, v) {
                continue;
            }
            adjacency.entry(u).or_default().push(v);
            adjacency.entry(v).or_default().push(u);
            stubs.insert(u, su - 1);
            stubs.insert(v, sv - 1);
            added += 1;
        }
        added
    }

    fn direct_compatible(&self, a: PatternId, b: PatternId) -> bool {
        self.table
            .compatible_at(1, a)
            .is_some_and(|set| set.contains(&b))
    }

    #[allow(clippy::too_many_arguments)]
    fn multi_hop_compatible(
        &self,
        u: CellId,
        v: CellId,
        pid_u: PatternId,
        pid_v: PatternId,
        radius: usize,
        cells: &[Cell],
        adjacency: &HashMap<CellId, Vec<CellId>>,
    ) -> bool {
        let max_depth = radius.saturating_sub(1);
        bfs_layers(u, max_depth, adjacency)
            .into_iter()
            .all(|(w, d)| self.layer_compatible(w, d, pid_v, cells))
            && bfs_layers(v, max_depth, adjacency)
                .into_iter()
                .all(|(w, d)| self.layer_compatible(w, d, pid_u, cells))
    }

    fn layer_compatible(&self, w: CellId, depth: usize, required_partner: PatternId, cells: &[Cell]) -> bool {
        let Some(cell) = cells.get(w) else { return true };
        let Some(pid_w) = cell.collapsed_pid() else {
            return true;
        };
        self.table
            .compatible_at(depth + 1, pid_w)
            .is_some_and(|set| set.contains(&required_partner))
    }

    fn ra_score(&self, a: PatternId, b: PatternId) -> f64 {
        let empty: HashSet<PatternId> = HashSet::new();
        let na = self.table.compatible_at(1, a).unwrap_or(&empty);
        let nb = self.table.compatible_at(1, b).unwrap_or(&empty);
        na.intersection(nb)
            .map(|&m| {
                let degree = self.table.compatible_at(1, m).map_or(0, HashSet::len);
                if degree == 0 { 0.0 } else { 1.0 / degree as f64 }
            })
            .sum()
    }
}

fn already_adjacent(adjacency: &HashMap<CellId, Vec<CellId>>, u: CellId, v: CellId) -> bool {
    adjacency.get(&u).is_some_and(|n| n.contains(&v))
}

/// Breadth-first layers from `start` up to `max_depth`, as `(cell, depth)`
/// pairs for depth `1..=max_depth`. Empty when `max_depth == 0`.
fn bfs_layers(
    start: CellId,
    max_depth: usize,
    adjacency: &HashMap<CellId, Vec<CellId>>,
) -> Vec<(CellId, usize)> {
    if max_depth == 0 {
        return Vec::new();
    }
    let mut visited: HashSet<CellId> = HashSet::from([start]);
    let mut queue: VecDeque<(CellId, usize)> = VecDeque::from([(start, 0)]);
    let mut result = Vec::new();

    while let Some((node, depth)) = queue.pop_front() {
        if depth == max_depth {
            continue;
        }
        let Some(neighbors) = adjacency.get(&node) else {
            continue;
        };
        for &neighbor in neighbors {
            if visited.insert(neighbor) {
                let next_depth = depth + 1;
                result.push((neighbor, next_depth));
                queue.push_back((neighbor, next_depth));
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use std::collections::BTreeSet;

    fn triangle_table() -> CompatibilityTable {
        let mut graph = Graph::new();
        graph.set_label(0, 9);
        graph.set_label(1, 9);
        graph.set_label(2, 9);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        graph.add_edge(0, 2);
        CompatibilityTable::build(&graph, 1).unwrap()
    }

    #[test]
    fn closes_stubs_between_compatible_collapsed_cells() {
        let table = triangle_table();
        let pid = table.pattern_of_node()[&0];
        let full: BTreeSet<PatternId> = (0..table.patterns().len()).collect();

        let mut cells = vec![Cell::new(full.clone()), Cell::new(full.clone()), Cell::new(full)];
        for (i, cell) in cells.iter_mut().enumerate() {
            cell.collapse_to(i, pid, table.patterns()[pid].center_label(), 2).unwrap();
        }
        let mut adjacency: HashMap<CellId, Vec<CellId>> = HashMap::new();

        let connector = StubConnector::new(&table);
        let added = connector.connect(&[0, 1, 2], &cells, &mut adjacency);

        assert!(added > 0);
        for (&cell, neighbors) in &adjacency {
            assert!(!neighbors.contains(&cell), "no self-edges");
        }
    }

    #[test]
    fn does_not_exceed_target_degree() {
        let table = triangle_table();
        let pid = table.pattern_of_node()[&0];
        let full: BTreeSet<PatternId> = (0..table.patterns().len()).collect();

        let mut cells = vec![Cell::new(full.clone()), Cell::new(full.clone()), Cell::new(full)];
        for (i, cell) in cells.iter_mut().enumerate() {
            cell.collapse_to(i, pid, table.patterns()[pid].center_label(), 1).unwrap();
        }
        let mut adjacency: HashMap<CellId, Vec<CellId>> = HashMap::new();
        let connector = StubConnector::new(&table);
        connector.connect(&[0, 1, 2], &cells, &mut adjacency);

        for &c in &[0usize, 1, 2] {
            let degree = adjacency.get(&c).map_or(0, Vec::len);
            assert!(degree <= cells[c].target_degree());
        }
    }
}
