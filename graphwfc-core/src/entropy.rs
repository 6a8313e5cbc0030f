//! Tracks frontier cells and selects the next one to collapse by Shannon
//! entropy over each cell's frequency-weighted domain.

use std::collections::BTreeSet;

use rand::Rng;

use crate::cell::{Cell, CellId};
use crate::pattern::PatternId;

/// Frontier-cell entropy tracker.
///
/// Holds the pattern frequency table once (shared read-only across every
/// cell) and the insertion order of frontier cell ids, which is also the
/// tie-breaking order for [`EntropyIndex::pick_lowest`].
///
/// Entropy is recomputed on demand from each cell's current domain rather
/// than cached: domains mutate frequently during propagation, and a cache
/// would need explicit invalidation on every prune.
#[derive(Debug, Clone)]
pub struct EntropyIndex {
    frequencies: Vec<u64>,
    frontier: Vec<CellId>,
}

impl EntropyIndex {
    /// Creates an index over `frequencies`, indexed by [`PatternId`]. A pid
    /// beyond the end of `frequencies` is treated as frequency 1.
    #[must_use]
    pub fn new(frequencies: Vec<u64>) -> Self {
        Self {
            frequencies,
            frontier: Vec::new(),
        }
    }

    /// Adds `cell_id` to the tracked frontier, if not already present.
    pub fn insert(&mut self, cell_id: CellId) {
        if !self.frontier.contains(&cell_id) {
            self.frontier.push(cell_id);
        }
    }

    /// Removes `cell_id` from the tracked frontier (e.g. once collapsed).
    pub fn remove(&mut self, cell_id: CellId) {
        self.frontier.retain(|&id| id != cell_id);
    }

    /// Currently tracked frontier cell ids, in insertion order.
    #[must_use]
    pub fn frontier(&self) -> &[CellId] {
        &self.frontier
    }

    fn frequency(&self, pid: PatternId) -> u64 {
        self.frequencies.get(pid).copied().unwrap_or(1)
    }

    /// Shannon entropy of `domain` under this index's frequency table.
    /// Zero when the domain has at most one candidate or zero total weight.
    #[must_use]
    pub fn entropy(&self, domain: &BTreeSet<PatternId>) -> f64 {
        if domain.len() <= 1 {
            return 0.0;
        }
        let weights: Vec<f64> = domain.iter().map(|&pid| self.frequency(pid) as f64).collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        -weights
            .iter()
            .map(|&w| {
                let p = w / total;
                if p > 0.0 { p * p.log2() } else { 0.0 }
            })
            .sum::<f64>()
    }

    /// Returns the tracked frontier cell with the smallest *positive*
    /// entropy, or `None` if no tracked cell has positive entropy. Ties are
    /// broken by insertion order.
    #[must_use]
    pub fn pick_lowest(&self, cells: &[Cell]) -> Option<CellId> {
        let mut best: Option<(CellId, f64)> = None;
        for &id in &self.frontier {
            let Some(cell) = cells.get(id) else { continue };
            let h = self.entropy(cell.domain());
            if h <= 0.0 {
                continue;
            }
            match best {
                Some((_, best_h)) if h >= best_h => {}
                _ => best = Some((id, h)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Draws one pattern from `domain`, weighted by frequency, using a
    /// uniform draw over `[0, W)` against cumulative sums. Deterministic
    /// under a seeded `rng`.
    #[must_use]
    pub fn weighted_sample<R: Rng + ?Sized>(
        &self,
        domain: &BTreeSet<PatternId>,
        rng: &mut R,
    ) -> Option<PatternId> {
        let weights: Vec<(PatternId, f64)> = domain
            .iter()
            .map(|&pid| (pid, self.frequency(pid) as f64))
            .collect();
        let total: f64 = weights.iter().map(|&(_, w)| w).sum();
        if weights.is_empty() {
            return None;
        }
        if total <= 0.0 {
            return domain.iter().next().copied();
        }
        let draw = rng.gen_range(0.0..total);
        let mut cumulative = 0.0;
        for &(pid, w) in &weights {
            cumulative += w;
            if cumulative >= draw {
                return Some(pid);
            }
        }
        weights.last().map(|&(pid, _)| pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn domain(pids: impl IntoIterator<Item = PatternId>) -> BTreeSet<PatternId> {
        pids.into_iter().collect()
    }

    #[test]
    fn singleton_domain_has_zero_entropy() {
        let index = EntropyIndex::new(vec![3, 2, 1]);
        assert_eq!(index.entropy(&domain([0])), 0.0);
    }

    #[test]
    fn uniform_two_way_domain_has_entropy_one() {
        let index = EntropyIndex::new(vec![1, 1]);
        let h = index.entropy(&domain([0, 1]));
        assert!((h - 1.0).abs() < 1e-9);
    }

    #[test]
    fn pick_lowest_breaks_ties_by_insertion_order() {
        let index_frequencies = vec![1, 1, 1, 1];
        let mut index = EntropyIndex::new(index_frequencies);
        let cells = vec![Cell::new(domain([0, 1])), Cell::new(domain([2, 3]))];
        index.insert(0);
        index.insert(1);
        // Both cells have identical (uniform, two-way) entropy; the first
        // inserted wins.
        assert_eq!(index.pick_lowest(&cells), Some(0));
    }

    #[test]
    fn pick_lowest_skips_cells_with_zero_entropy() {
        let mut index = EntropyIndex::new(vec![1, 1, 1]);
        let cells = vec![Cell::new(domain([0])), Cell::new(domain([1, 2]))];
        index.insert(0);
        index.insert(1);
        assert_eq!(index.pick_lowest(&cells), Some(1));
    }

    #[test]
    fn pick_lowest_returns_none_when_all_zero_entropy() {
        let mut index = EntropyIndex::new(vec![1, 1]);
        let cells = vec![Cell::new(domain([0]))];
        index.insert(0);
        assert_eq!(index.pick_lowest(&cells), None);
    }

    #[test]
    fn weighted_sample_is_deterministic_under_fixed_seed() {
        let index = EntropyIndex::new(vec![3, 2, 1]);
        let d = domain([0, 1, 2]);
        let mut rng_a = SmallRng::seed_from_u64(42);
        let mut rng_b = SmallRng::seed_from_u64(42);
        let sequence_a: Vec<_> = (0..10).map(|_| index.weighted_sample(&d, &mut rng_a)).collect();
        let sequence_b: Vec<_> = (0..10).map(|_| index.weighted_sample(&d, &mut rng_b)).collect();
        assert_eq!(sequence_a, sequence_b);
    }

    #[test]
    fn weighted_sample_never_returns_pid_outside_domain() {
        let index = EntropyIndex::new(vec![5, 1]);
        let d = domain([0, 1]);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let pid = index.weighted_sample(&d, &mut rng).unwrap();
            assert!(d.contains(&pid));
        }
    }
}
