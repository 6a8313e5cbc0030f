//! Writes collapsed cells and their adjacency as the two-file text format
//! [`crate::Reader`] consumes.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tracing::instrument;

use graphwfc_core::{Cell, CellId, GraphWfcError};

use crate::errors::GraphWfcIoError;

/// Writes a generated output graph to an edges file and a labels file.
pub struct Exporter;

impl Exporter {
    /// Writes `cells` and `adjacency` to `edges_path` and `labels_path`.
    ///
    /// `cells` is expected to already be indexed in the caller's desired
    /// export order (e.g. [`graphwfc_core::Generator::run`]'s settled order,
    /// re-keyed to `0..cells.len()`); the written node ids are simply the
    /// slice index. Each undirected edge is written once, as `u v` with
    /// `u < v`, sorted for reproducible output; each label line is `index
    /// center_label`.
    ///
    /// # Errors
    /// Returns [`GraphWfcIoError::Core`] (wrapping
    /// [`GraphWfcError::IllegalState`]) if any cell is not collapsed, and
    /// [`GraphWfcIoError::Io`] if either file cannot be written.
    #[instrument(skip(cells, adjacency), fields(cell_count = cells.len()))]
    pub fn export(
        cells: &[Cell],
        adjacency: &HashMap<CellId, Vec<CellId>>,
        edges_path: &Path,
        labels_path: &Path,
    ) -> Result<(), GraphWfcIoError> {
        for (id, cell) in cells.iter().enumerate() {
            if !cell.is_collapsed() {
                return Err(GraphWfcError::IllegalState {
                    cell: id,
                    reason: "cannot export an uncollapsed cell",
                }
                .into());
            }
        }

        let mut edge_list: Vec<(CellId, CellId)> = Vec::new();
        for (&u, neighbors) in adjacency {
            for &v in neighbors {
                if u < v {
                    edge_list.push((u, v));
                }
            }
        }
        edge_list.sort_unstable();

        let mut edges = String::new();
        for (u, v) in edge_list {
            writeln!(edges, "{u} {v}").expect("writing to a String never fails");
        }
        fs::write(edges_path, edges)?;

        let mut labels = String::new();
        for (id, cell) in cells.iter().enumerate() {
            writeln!(labels, "{id} {}", cell.center_label()).expect("writing to a String never fails");
        }
        fs::write(labels_path, labels)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn collapsed_cell(label: i64, target_degree: usize) -> Cell {
        let mut cell = Cell::new(BTreeSet::from([0]));
        cell.collapse_to(0, 0, label, target_degree).unwrap();
        cell
    }

    #[test]
    fn writes_sorted_edges_and_labels() {
        let cells = vec![collapsed_cell(5, 1), collapsed_cell(6, 2), collapsed_cell(7, 1)];
        let mut adjacency: HashMap<CellId, Vec<CellId>> = HashMap::new();
        adjacency.insert(1, vec![0, 2]);
        adjacency.insert(0, vec![1]);
        adjacency.insert(2, vec![1]);

        let edges_file = tempfile::NamedTempFile::new().unwrap();
        let labels_file = tempfile::NamedTempFile::new().unwrap();
        Exporter::export(&cells, &adjacency, edges_file.path(), labels_file.path()).unwrap();

        let edges = fs::read_to_string(edges_file.path()).unwrap();
        assert_eq!(edges, "0 1\n1 2\n");

        let labels = fs::read_to_string(labels_file.path()).unwrap();
        assert_eq!(labels, "0 5\n1 6\n2 7\n");
    }

    #[test]
    fn rejects_an_uncollapsed_cell() {
        let cells = vec![Cell::new(BTreeSet::from([0, 1]))];
        let adjacency: HashMap<CellId, Vec<CellId>> = HashMap::new();
        let edges_file = tempfile::NamedTempFile::new().unwrap();
        let labels_file = tempfile::NamedTempFile::new().unwrap();
        let err = Exporter::export(&cells, &adjacency, edges_file.path(), labels_file.path()).unwrap_err();
        assert!(matches!(err, GraphWfcIoError::Core(GraphWfcError::IllegalState { cell: 0, .. })));
    }
}
