//! Ego-network extraction: walks every node of a training graph out to a
//! fixed radius and deduplicates the resulting patterns by canonical form.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::instrument;

use crate::error::{GraphWfcError, Result};
use crate::graph::{Graph, NodeId};
use crate::pattern::{Pattern, PatternId};

/// Output of [`PatternExtractor::extract`]: the deduplicated pattern list
/// plus the per-source-node mapping back into it.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Deduplicated patterns, in first-seen order. Index into this vector is
    /// the pattern's [`PatternId`].
    pub patterns: Vec<Pattern>,
    /// For each node in [`Graph::all_nodes`] order, the id of the pattern its
    /// ego-network canonicalized to.
    pub pattern_of_node: HashMap<NodeId, PatternId>,
}

/// Extracts and deduplicates ego-network patterns from a training graph.
pub struct PatternExtractor;

impl PatternExtractor {
    /// Extracts one ego-network per node of `graph`, out to `radius` hops,
    /// and deduplicates them by canonical form.
    ///
    /// # Errors
    /// Returns [`GraphWfcError::InvalidRadius`] if `radius == 0`, and
    /// [`GraphWfcError::EmptyGraph`] if `graph` has no nodes.
    ///
    /// # Examples
    /// ```
    /// use graphwfc_core::{Graph, PatternExtractor};
    ///
    /// let mut graph = Graph::new();
    /// graph.add_edge(0, 1);
    /// graph.add_edge(1, 2);
    /// let extraction = PatternExtractor::extract(&graph, 2).unwrap();
    /// assert_eq!(extraction.pattern_of_node.len(), 3);
    /// ```
    #[instrument(skip(graph), fields(node_count = graph.node_count(), radius))]
    pub fn extract(graph: &Graph, radius: usize) -> Result<Extraction> {
        if radius == 0 {
            return Err(GraphWfcError::InvalidRadius { got: radius });
        }
        if graph.is_empty() {
            return Err(GraphWfcError::EmptyGraph);
        }

        let mut patterns: Vec<Pattern> = Vec::new();
        let mut by_canonical_form: HashMap<String, PatternId> = HashMap::new();
        let mut pattern_of_node = HashMap::with_capacity(graph.node_count());

        for &center in graph.all_nodes() {
            let candidate = extract_ego_network(graph, center, radius);
            let pid = match by_canonical_form.get(candidate.canonical_form()) {
                Some(&existing) => {
                    patterns[existing].bump_frequency();
                    existing
                }
                None => {
                    let pid = patterns.len();
                    by_canonical_form.insert(candidate.canonical_form().to_owned(), pid);
                    patterns.push(candidate);
                    pid
                }
            };
            pattern_of_node.insert(center, pid);
        }

        Ok(Extraction {
            patterns,
            pattern_of_node,
        })
    }
}

/// Breadth-first walk out to `radius` hops from `center`, collecting labels,
/// the induced-subgraph adjacency, and per-node depths.
fn extract_ego_network(graph: &Graph, center: NodeId, radius: usize) -> Pattern {
    let mut depths: HashMap<NodeId, usize> = HashMap::new();
    let mut layers: Vec<Vec<NodeId>> = vec![Vec::new(); radius];
    let mut queue = VecDeque::new();

    depths.insert(center, 0);
    queue.push_back(center);

    while let Some(node) = queue.pop_front() {
        let depth = depths[&node];
        if depth == radius {
            continue;
        }
        for &neighbor in graph.neighbors(node) {
            if depths.contains_key(&neighbor) {
                continue;
            }
            let next_depth = depth + 1;
            depths.insert(neighbor, next_depth);
            layers[next_depth - 1].push(neighbor);
            queue.push_back(neighbor);
        }
    }

    let reached: HashSet<NodeId> = depths.keys().copied().collect();
    let mut labels = HashMap::with_capacity(reached.len());
    let mut adjacency = HashMap::with_capacity(reached.len());
    for &node in &reached {
        labels.insert(node, graph.label(node));
        let induced: Vec<NodeId> = graph
            .neighbors(node)
            .iter()
            .copied()
            .filter(|neighbor| reached.contains(neighbor))
            .collect();
        adjacency.insert(node, induced);
    }

    Pattern::build(
        center,
        graph.label(center),
        radius,
        labels,
        adjacency,
        layers,
        depths,
        graph.degree(center),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_radius() {
        let mut graph = Graph::new();
        graph.add_edge(0, 1);
        let err = PatternExtractor::extract(&graph, 0).unwrap_err();
        assert_eq!(err, GraphWfcError::InvalidRadius { got: 0 });
    }

    #[test]
    fn rejects_empty_graph() {
        let graph = Graph::new();
        let err = PatternExtractor::extract(&graph, 1).unwrap_err();
        assert_eq!(err, GraphWfcError::EmptyGraph);
    }

    #[test]
    fn isolated_identical_label_nodes_share_one_pattern() {
        let mut graph = Graph::new();
        graph.set_label(0, 5);
        graph.set_label(1, 5);
        graph.set_label(2, 5);
        let extraction = PatternExtractor::extract(&graph, 1).unwrap();
        assert_eq!(extraction.patterns.len(), 1);
        assert_eq!(extraction.patterns[0].frequency(), 3);
    }

    #[test]
    fn line_graph_endpoints_share_a_pattern_distinct_from_the_middle() {
        let mut graph = Graph::new();
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        let extraction = PatternExtractor::extract(&graph, 1).unwrap();
        assert_eq!(extraction.patterns.len(), 2);
        let end_pid = extraction.pattern_of_node[&0];
        assert_eq!(extraction.pattern_of_node[&2], end_pid);
        assert_ne!(extraction.pattern_of_node[&1], end_pid);
    }

    #[test]
    fn radius_bounds_the_reached_set() {
        let mut graph = Graph::new();
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        graph.add_edge(2, 3);
        let extraction = PatternExtractor::extract(&graph, 1).unwrap();
        let pid = extraction.pattern_of_node[&0];
        assert_eq!(extraction.patterns[pid].labels().len(), 2);
    }
}
