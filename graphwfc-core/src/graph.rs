//! The training/output graph entity: integer node ids, integer labels, and
//! adjacency, with no weights and no directionality.

use std::collections::HashMap;

/// Integer identifier for a node, as supplied by callers (e.g. a line number
/// from an edge-list file).
pub type NodeId = u64;

/// Integer label attached to a node.
pub type Label = i64;

/// An undirected graph over integer node identifiers.
///
/// Nodes are assigned a dense internal index in first-seen order; this order
/// is what [`Graph::all_nodes`] exposes, and it is the basis for every
/// "stable iteration order" guarantee downstream components rely on.
///
/// # Examples
/// ```
/// use graphwfc_core::Graph;
///
/// let mut graph = Graph::new();
/// graph.set_label(1, 7);
/// graph.add_edge(1, 2);
/// assert_eq!(graph.neighbors(1), &[2]);
/// assert_eq!(graph.label(1), 7);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Graph {
    order: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    labels: Vec<Label>,
    /// Neighbor node ids, in edge-insertion order, parallel to `order`.
    adjacency: Vec<Vec<NodeId>>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the dense internal index for `id`, creating the node (with
    /// label `0`) if it does not already exist.
    pub fn get_or_create_node(&mut self, id: NodeId) -> usize {
        if let Some(&idx) = self.index.get(&id) {
            return idx;
        }
        let idx = self.order.len();
        self.order.push(id);
        self.index.insert(id, idx);
        self.labels.push(0);
        self.adjacency.push(Vec::new());
        idx
    }

    /// Adds an undirected edge between `u` and `v`, creating either endpoint
    /// if necessary.
    ///
    /// Self-loops (`u == v`) are rejected. Duplicate edges are detected by
    /// unordered-pair equality and are idempotent no-ops. Returns whether a
    /// new edge was added.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId) -> bool {
        if u == v {
            return false;
        }
        let ui = self.get_or_create_node(u);
        let vi = self.get_or_create_node(v);
        if self.adjacency[ui].contains(&v) {
            return false;
        }
        self.adjacency[ui].push(v);
        self.adjacency[vi].push(u);
        true
    }

    /// Sets the integer label of `id`, creating the node if necessary.
    pub fn set_label(&mut self, id: NodeId, label: Label) {
        let idx = self.get_or_create_node(id);
        self.labels[idx] = label;
    }

    /// Returns the label of `id`, or `0` if the node does not exist.
    #[must_use]
    pub fn label(&self, id: NodeId) -> Label {
        self.index_of(id)
            .map_or(0, |idx| self.labels[idx])
    }

    /// Returns the neighbor ids of `id` in edge-insertion order, or an empty
    /// slice if the node does not exist.
    #[must_use]
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        match self.index_of(id) {
            Some(idx) => &self.adjacency[idx],
            None => &[],
        }
    }

    /// Returns the dense internal index of `id`, if present.
    #[must_use]
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Returns the degree of `id` (0 if the node does not exist).
    #[must_use]
    pub fn degree(&self, id: NodeId) -> usize {
        self.neighbors(id).len()
    }

    /// Returns all node ids in first-seen (stable) order.
    #[must_use]
    pub fn all_nodes(&self) -> &[NodeId] {
        &self.order
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Returns whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the degree of every node, in first-seen order.
    ///
    /// Used by [`crate::Generator`] to derive the expansion cap from the
    /// 90th-percentile training degree.
    #[must_use]
    pub fn degree_sequence(&self) -> Vec<usize> {
        self.adjacency.iter().map(Vec::len).collect()
    }
}
