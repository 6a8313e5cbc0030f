//! Output-graph vertices with a pruneable domain of candidate patterns.

use std::collections::{BTreeSet, HashSet};

use crate::error::{GraphWfcError, Result};
use crate::graph::Label;
use crate::pattern::PatternId;

/// Stable arena index of a [`Cell`], assigned by [`crate::Generator`]'s cell
/// arena in allocation order.
pub type CellId = usize;

/// An output-graph vertex. *Open* while `domain.len() > 1`, *forced* once
/// pruning reduces it to exactly one candidate, *collapsed* once
/// [`Cell::collapse_to`] has fixed a single pid.
///
/// A [`BTreeSet`] backs the domain rather than a hash set so that iteration
/// order is deterministic and independent of any hasher's seed, which
/// matters for reproducible weighted sampling.
#[derive(Debug, Clone)]
pub struct Cell {
    domain: BTreeSet<PatternId>,
    collapsed_pid: Option<PatternId>,
    center_label: Label,
    target_degree: usize,
}

impl Cell {
    /// Creates an open cell with the given candidate domain.
    #[must_use]
    pub fn new(domain: BTreeSet<PatternId>) -> Self {
        Self {
            domain,
            collapsed_pid: None,
            center_label: 0,
            target_degree: 0,
        }
    }

    /// Retains only `domain ∩ allowed`.
    ///
    /// `id` is the cell's own arena index, used only to label the error
    /// returned when this cell is already collapsed.
    ///
    /// # Errors
    /// Returns [`GraphWfcError::IllegalState`] if this cell is already
    /// collapsed.
    pub fn prune(&mut self, id: CellId, allowed: &HashSet<PatternId>) -> Result<()> {
        if self.is_collapsed() {
            return Err(GraphWfcError::IllegalState {
                cell: id,
                reason: "cannot prune a collapsed cell",
            });
        }
        self.domain.retain(|pid| allowed.contains(pid));
        Ok(())
    }

    /// Fixes this cell's domain to the single pattern `pid`, recording
    /// `center_label` and `target_degree` from the pattern table.
    ///
    /// # Errors
    /// Returns [`GraphWfcError::IllegalState`] if `pid` is not in the
    /// current domain, or if this cell is already collapsed.
    pub fn collapse_to(
        &mut self,
        id: CellId,
        pid: PatternId,
        center_label: Label,
        target_degree: usize,
    ) -> Result<()> {
        if self.is_collapsed() {
            return Err(GraphWfcError::IllegalState {
                cell: id,
                reason: "cell is already collapsed",
            });
        }
        if !self.domain.contains(&pid) {
            return Err(GraphWfcError::IllegalState {
                cell: id,
                reason: "pid is not a member of the cell's domain",
            });
        }
        self.domain = BTreeSet::from([pid]);
        self.collapsed_pid = Some(pid);
        self.center_label = center_label;
        self.target_degree = target_degree;
        Ok(())
    }

    /// Current candidate set. A singleton domain on an uncollapsed cell
    /// marks it *forced*.
    #[must_use]
    pub fn domain(&self) -> &BTreeSet<PatternId> {
        &self.domain
    }

    /// Whether [`Cell::collapse_to`] has been called successfully.
    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.collapsed_pid.is_some()
    }

    /// Whether this cell is uncollapsed with a singleton domain.
    #[must_use]
    pub fn is_forced(&self) -> bool {
        !self.is_collapsed() && self.domain.len() == 1
    }

    /// The pid fixed by [`Cell::collapse_to`], or `None` before collapse.
    #[must_use]
    pub fn collapsed_pid(&self) -> Option<PatternId> {
        self.collapsed_pid
    }

    /// Center label recorded at collapse time, or `0` before collapse.
    #[must_use]
    pub fn center_label(&self) -> Label {
        self.center_label
    }

    /// Target degree recorded at collapse time, or `0` before collapse.
    #[must_use]
    pub fn target_degree(&self) -> usize {
        self.target_degree
    }
}
