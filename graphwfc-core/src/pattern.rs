//! Immutable ego-network records and their canonical form.
//!
//! A [`Pattern`] captures one node's neighborhood up to a fixed radius. Two
//! patterns are the same pattern, for deduplication purposes, iff their
//! [`Pattern::canonical_form`] strings are byte-equal; the canonical form is
//! computed once, at construction, via two rounds of 1-dimensional
//! Weisfeiler-Lehman color refinement.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::graph::{Label, NodeId};

/// Stable integer identifier of a unique pattern, assigned by
/// [`crate::PatternExtractor`] as an index into its first-seen-order list.
pub type PatternId = usize;

/// An immutable value capturing one node's ego-network up to radius `R`.
///
/// # Examples
/// ```
/// use graphwfc_core::{Graph, PatternExtractor};
///
/// let mut graph = Graph::new();
/// graph.set_label(0, 1);
/// graph.set_label(1, 2);
/// graph.add_edge(0, 1);
///
/// let extraction = PatternExtractor::extract(&graph, 1).expect("radius >= 1");
/// let pattern = &extraction.patterns[0];
/// assert_eq!(pattern.radius(), 1);
/// assert_eq!(pattern.frequency(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Pattern {
    center_id: NodeId,
    center_label: Label,
    radius: usize,
    labels: HashMap<NodeId, Label>,
    adjacency: HashMap<NodeId, Vec<NodeId>>,
    layers: Vec<Vec<NodeId>>,
    depths: HashMap<NodeId, usize>,
    frequency: u64,
    center_degree: usize,
    canonical_form: String,
}

impl Pattern {
    pub(crate) fn build(
        center_id: NodeId,
        center_label: Label,
        radius: usize,
        labels: HashMap<NodeId, Label>,
        adjacency: HashMap<NodeId, Vec<NodeId>>,
        layers: Vec<Vec<NodeId>>,
        depths: HashMap<NodeId, usize>,
        center_degree: usize,
    ) -> Self {
        let canonical_form = canonicalize(&labels, &adjacency, &depths);
        Self {
            center_id,
            center_label,
            radius,
            labels,
            adjacency,
            layers,
            depths,
            frequency: 1,
            center_degree,
            canonical_form,
        }
    }

    /// Source node id in the training graph. Identity/debug only: it plays
    /// no part in equality or canonicalization.
    #[must_use]
    pub fn center_id(&self) -> NodeId {
        self.center_id
    }

    /// Integer label at the center.
    #[must_use]
    pub fn center_label(&self) -> Label {
        self.center_label
    }

    /// The hop bound this pattern was extracted at.
    #[must_use]
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Labels of every node within distance `<= radius`, including the
    /// center.
    #[must_use]
    pub fn labels(&self) -> &HashMap<NodeId, Label> {
        &self.labels
    }

    /// Adjacency restricted to the induced subgraph on the reached set.
    #[must_use]
    pub fn adjacency(&self) -> &HashMap<NodeId, Vec<NodeId>> {
        &self.adjacency
    }

    /// Layer `k - 1` holds exactly the node ids at distance `k` from the
    /// center, for `k` in `1..=radius`.
    #[must_use]
    pub fn layers(&self) -> &[Vec<NodeId>] {
        &self.layers
    }

    /// Exact distance of every reached node from the center.
    #[must_use]
    pub fn depths(&self) -> &HashMap<NodeId, usize> {
        &self.depths
    }

    /// Occurrence count after deduplication by canonical form.
    #[must_use]
    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    pub(crate) fn bump_frequency(&mut self) {
        self.frequency += 1;
    }

    /// Degree of the center in the original training graph. May exceed the
    /// in-pattern degree when the radius truncates the ego-network.
    #[must_use]
    pub fn center_degree(&self) -> usize {
        self.center_degree
    }

    /// Deterministic string determined solely by the pattern's structure
    /// (depths, labels, adjacency), invariant under relabeling of node ids.
    #[must_use]
    pub fn canonical_form(&self) -> &str {
        &self.canonical_form
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_form == other.canonical_form
    }
}

impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_form.hash(state);
    }
}

/// Computes the canonical form of an ego-network via two rounds of
/// Weisfeiler-Lehman color refinement followed by a stable reindexing.
fn canonicalize(
    labels: &HashMap<NodeId, Label>,
    adjacency: &HashMap<NodeId, Vec<NodeId>>,
    depths: &HashMap<NodeId, usize>,
) -> String {
    // Stable node order for this computation only; unrelated to the
    // identifiers emitted in the final tokens.
    let mut nodes: Vec<NodeId> = labels.keys().copied().collect();
    nodes.sort_unstable();

    let mut colors: HashMap<NodeId, u64> = nodes
        .iter()
        .map(|&n| (n, hash_u64(&(depths[&n], labels[&n]))))
        .collect();

    for _round in 0..2 {
        let mut next = HashMap::with_capacity(colors.len());
        for &n in &nodes {
            let mut neighbor_colors: Vec<u64> = adjacency
                .get(&n)
                .into_iter()
                .flatten()
                .filter_map(|neighbor| colors.get(neighbor).copied())
                .collect();
            neighbor_colors.sort_unstable();
            next.insert(n, hash_u64(&(colors[&n], neighbor_colors)));
        }
        colors = next;
    }

    let mut ordered = nodes.clone();
    ordered.sort_by(|&a, &b| {
        (colors[&a], depths[&a], labels[&a]).cmp(&(colors[&b], depths[&b], labels[&b]))
    });

    let mut reindex: HashMap<NodeId, usize> = HashMap::with_capacity(ordered.len());
    for (new_idx, &n) in ordered.iter().enumerate() {
        reindex.insert(n, new_idx);
    }

    let mut tokens = Vec::with_capacity(ordered.len());
    for (new_idx, &n) in ordered.iter().enumerate() {
        let mut neighbor_indices: Vec<usize> = adjacency
            .get(&n)
            .into_iter()
            .flatten()
            .filter_map(|neighbor| reindex.get(neighbor).copied())
            .collect();
        neighbor_indices.sort_unstable();
        let neighbor_list = neighbor_indices
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(",");
        tokens.push(format!(
            "({new_idx}:c={},d={},l={}->[{neighbor_list}])",
            colors[&n], depths[&n], labels[&n]
        ));
    }

    tokens.join(";")
}

fn hash_u64<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern_extractor::PatternExtractor;
    use crate::Graph;

    #[test]
    fn canonical_form_invariant_under_node_id_relabeling() {
        let mut a = Graph::new();
        a.set_label(0, 1);
        a.set_label(1, 2);
        a.add_edge(0, 1);

        let mut b = Graph::new();
        b.set_label(100, 1);
        b.set_label(200, 2);
        b.add_edge(100, 200);

        let ea = PatternExtractor::extract(&a, 1).expect("radius >= 1");
        let eb = PatternExtractor::extract(&b, 1).expect("radius >= 1");

        let mut forms_a: Vec<_> = ea.patterns.iter().map(|p| p.canonical_form().to_owned()).collect();
        let mut forms_b: Vec<_> = eb.patterns.iter().map(|p| p.canonical_form().to_owned()).collect();
        forms_a.sort();
        forms_b.sort();
        assert_eq!(forms_a, forms_b);
    }

    #[test]
    fn canonical_form_changes_under_label_permutation() {
        let mut a = Graph::new();
        a.set_label(0, 1);
        a.set_label(1, 2);
        a.add_edge(0, 1);

        let mut b = Graph::new();
        b.set_label(0, 2);
        b.set_label(1, 1);
        b.add_edge(0, 1);

        let ea = PatternExtractor::extract(&a, 1).expect("radius >= 1");
        let eb = PatternExtractor::extract(&b, 1).expect("radius >= 1");

        let mut forms_a: Vec<_> = ea.patterns.iter().map(|p| p.canonical_form().to_owned()).collect();
        let mut forms_b: Vec<_> = eb.patterns.iter().map(|p| p.canonical_form().to_owned()).collect();
        forms_a.sort();
        forms_b.sort();
        // Both graphs have the same multiset of (depth, label) pairs overall,
        // but the per-center-label pattern records differ.
        assert_ne!(ea.patterns[0].canonical_form(), eb.patterns[0].canonical_form());
        let _ = (forms_a, forms_b);
    }

    use proptest::prelude::*;
    use test_strategy::proptest;

    fn arbitrary_small_graph_spec() -> impl Strategy<Value = (Vec<(u64, u64)>, Vec<i64>)> {
        (1_usize..6)
            .prop_flat_map(|n| {
                let labels = prop::collection::vec(-3_i64..3, n);
                let max_pairs = n * n.saturating_sub(1) / 2;
                let edges = prop::collection::vec((0_usize..n, 0_usize..n), 0..=max_pairs.min(8));
                (labels, edges)
            })
            .prop_map(|(labels, edges)| {
                let edges = edges
                    .into_iter()
                    .filter(|&(a, b)| a != b)
                    .map(|(a, b)| (a as u64, b as u64))
                    .collect();
                (edges, labels)
            })
    }

    #[proptest]
    fn canonical_form_is_invariant_under_node_id_relabeling(
        #[strategy(arbitrary_small_graph_spec())] spec: (Vec<(u64, u64)>, Vec<i64>),
    ) {
        let (edges, labels) = spec;

        let mut graph = Graph::new();
        for (idx, &label) in labels.iter().enumerate() {
            graph.set_label(idx as u64, label);
        }
        for (a, b) in &edges {
            graph.add_edge(*a, *b);
        }

        let mut relabeled = Graph::new();
        for (idx, &label) in labels.iter().enumerate() {
            relabeled.set_label(idx as u64 * 1000 + 7, label);
        }
        for (a, b) in &edges {
            relabeled.add_edge(a * 1000 + 7, b * 1000 + 7);
        }

        let base = PatternExtractor::extract(&graph, 1).expect("radius >= 1");
        let shifted = PatternExtractor::extract(&relabeled, 1).expect("radius >= 1");

        let mut base_forms: Vec<_> = base
            .patterns
            .iter()
            .map(|p| p.canonical_form().to_owned())
            .collect();
        let mut shifted_forms: Vec<_> = shifted
            .patterns
            .iter()
            .map(|p| p.canonical_form().to_owned())
            .collect();
        base_forms.sort();
        shifted_forms.sort();
        prop_assert_eq!(base_forms, shifted_forms);
    }
}
