//! Multi-radius compatibility tables: which patterns were observed at each
//! hop distance from instances of which other patterns.

use std::collections::{HashMap, HashSet};

use tracing::instrument;

use crate::error::{GraphWfcError, Result};
use crate::graph::{Graph, Label, NodeId};
use crate::pattern::{Pattern, PatternId};
use crate::pattern_extractor::PatternExtractor;

/// `radius -> (pid -> set of compatible pid)`, one independently-built table
/// per hop distance `1..=max_radius`.
///
/// Also retains the deduplicated pattern list from the `radius = max_radius`
/// extraction, since the generator reuses it as the domain seed.
#[derive(Debug, Clone)]
pub struct CompatibilityTable {
    max_radius: usize,
    tables: Vec<HashMap<PatternId, HashSet<PatternId>>>,
    patterns: Vec<Pattern>,
    pattern_of_node: HashMap<NodeId, PatternId>,
}

impl CompatibilityTable {
    /// Builds a compatibility table covering radii `1..=max_radius`.
    ///
    /// # Errors
    /// Returns [`GraphWfcError::InvalidRadius`] if `max_radius == 0`, and
    /// [`GraphWfcError::EmptyGraph`] if `graph` has no nodes.
    ///
    /// # Examples
    /// ```
    /// use graphwfc_core::{CompatibilityTable, Graph};
    ///
    /// let mut graph = Graph::new();
    /// graph.add_edge(0, 1);
    /// let table = CompatibilityTable::build(&graph, 1).unwrap();
    /// assert_eq!(table.max_radius(), 1);
    /// ```
    #[instrument(skip(graph), fields(node_count = graph.node_count(), max_radius))]
    pub fn build(graph: &Graph, max_radius: usize) -> Result<Self> {
        if max_radius == 0 {
            return Err(GraphWfcError::InvalidRadius { got: max_radius });
        }
        if graph.is_empty() {
            return Err(GraphWfcError::EmptyGraph);
        }

        let mut tables = Vec::with_capacity(max_radius);
        let mut top_extraction = None;
        for radius in 1..=max_radius {
            let extraction = PatternExtractor::extract(graph, radius)?;
            tables.push(build_table_for_radius(&extraction.patterns, radius));
            top_extraction = Some(extraction);
        }

        // top_extraction is always populated: the loop runs at least once
        // because max_radius >= 1 was checked above.
        let extraction = top_extraction.unwrap_or_else(|| {
            unreachable!("loop over 1..=max_radius with max_radius >= 1 runs at least once")
        });

        Ok(Self {
            max_radius,
            tables,
            patterns: extraction.patterns,
            pattern_of_node: extraction.pattern_of_node,
        })
    }

    /// Greatest radius this table was built over.
    #[must_use]
    pub fn max_radius(&self) -> usize {
        self.max_radius
    }

    /// Deduplicated patterns from the `radius = max_radius` extraction.
    #[must_use]
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Maps each training-graph node to the id of its radius-`max_radius`
    /// pattern.
    #[must_use]
    pub fn pattern_of_node(&self) -> &HashMap<NodeId, PatternId> {
        &self.pattern_of_node
    }

    /// Patterns compatible with `pid` at hop distance `k`, or `None` if `k`
    /// is out of `1..=max_radius` or `pid` was never observed with any
    /// compatible partner at that radius.
    #[must_use]
    pub fn compatible_at(&self, k: usize, pid: PatternId) -> Option<&HashSet<PatternId>> {
        if k == 0 {
            return None;
        }
        self.tables.get(k - 1).and_then(|table| table.get(&pid))
    }
}

fn build_table_for_radius(
    patterns: &[Pattern],
    radius: usize,
) -> HashMap<PatternId, HashSet<PatternId>> {
    let path_sets: Vec<HashSet<Vec<Label>>> = patterns
        .iter()
        .map(|pattern| outward_paths(pattern, radius).into_iter().collect())
        .collect();
    let reversed_sets: Vec<HashSet<Vec<Label>>> = path_sets
        .iter()
        .map(|paths| {
            paths
                .iter()
                .map(|path| path.iter().rev().copied().collect())
                .collect()
        })
        .collect();

    let mut table: HashMap<PatternId, HashSet<PatternId>> = HashMap::new();
    for i in 0..patterns.len() {
        for j in 0..patterns.len() {
            let compatible = path_sets[i].iter().any(|path| reversed_sets[j].contains(path));
            if compatible {
                table.entry(i).or_default().insert(j);
                table.entry(j).or_default().insert(i);
            }
        }
    }
    table
}

/// Enumerates every outward label-path of length `radius + 1` starting at
/// the pattern's center, stepping strictly outward (each hop increases
/// depth by exactly one). Traversals that cannot reach `radius` yield no
/// path.
fn outward_paths(pattern: &Pattern, radius: usize) -> Vec<Vec<Label>> {
    let mut paths = Vec::new();
    let mut current = vec![pattern.center_label()];
    walk_outward(pattern, pattern.center_id(), 0, radius, &mut current, &mut paths);
    paths
}

fn walk_outward(
    pattern: &Pattern,
    node: NodeId,
    depth: usize,
    radius: usize,
    current: &mut Vec<Label>,
    paths: &mut Vec<Vec<Label>>,
) {
    if depth == radius {
        paths.push(current.clone());
        return;
    }
    let Some(neighbors) = pattern.adjacency().get(&node) else {
        return;
    };
    for &neighbor in neighbors {
        if pattern.depths().get(&neighbor) == Some(&(depth + 1)) {
            current.push(pattern.labels()[&neighbor]);
            walk_outward(pattern, neighbor, depth + 1, radius, current, paths);
            current.pop();
        }
    }
}
