//! Parses the whitespace-delimited edge/label text format into a [`Graph`].

use std::fs;
use std::path::Path;

use tracing::instrument;

use graphwfc_core::{Graph, Label, NodeId};

use crate::errors::GraphWfcIoError;

/// Loads a [`Graph`] from an edges file and a labels file.
pub struct Reader;

impl Reader {
    /// Parses `edges_path` and `labels_path` into a [`Graph`].
    ///
    /// Each non-comment, non-blank line of `edges_path` holds two
    /// whitespace-separated node ids forming an undirected edge; self-loops
    /// are silently dropped, matching [`Graph::add_edge`]. Each such line of
    /// `labels_path` holds a node id followed by its integer label; a node
    /// with no matching line keeps the default label of `0`. On both files,
    /// everything from the first `#` or `//` to end of line is a comment,
    /// and blank lines are skipped.
    ///
    /// # Examples
    /// ```
    /// use std::io::Write;
    ///
    /// let mut edges = tempfile::NamedTempFile::new().unwrap();
    /// writeln!(edges, "0 1\n1 2  # comment").unwrap();
    /// let mut labels = tempfile::NamedTempFile::new().unwrap();
    /// writeln!(labels, "0 7").unwrap();
    ///
    /// let graph = graphwfc_io::Reader::load(edges.path(), labels.path()).unwrap();
    /// assert_eq!(graph.node_count(), 3);
    /// assert_eq!(graph.label(0), 7);
    /// assert_eq!(graph.label(1), 0);
    /// ```
    ///
    /// # Errors
    /// Returns [`GraphWfcIoError::Malformed`] for a line that is not a pair
    /// of integers, and [`GraphWfcIoError::Io`] if either file cannot be
    /// read.
    #[instrument(fields(edges_path = %edges_path.display(), labels_path = %labels_path.display()))]
    pub fn load(edges_path: &Path, labels_path: &Path) -> Result<Graph, GraphWfcIoError> {
        let mut graph = Graph::new();
        parse_edges(&mut graph, edges_path)?;
        parse_labels(&mut graph, labels_path)?;
        Ok(graph)
    }
}

fn strip_comment(line: &str) -> &str {
    let hash = line.find('#');
    let slash = line.find("//");
    let end = match (hash, slash) {
        (Some(h), Some(s)) => h.min(s),
        (Some(h), None) => h,
        (None, Some(s)) => s,
        (None, None) => line.len(),
    };
    &line[..end]
}

fn malformed(path: &Path, line: usize, reason: &str) -> GraphWfcIoError {
    GraphWfcIoError::Malformed {
        path: path.display().to_string(),
        line,
        reason: reason.to_owned(),
    }
}

fn parse_edges(graph: &mut Graph, path: &Path) -> Result<(), GraphWfcIoError> {
    let content = fs::read_to_string(path)?;
    for (offset, raw) in content.lines().enumerate() {
        let line_no = offset + 1;
        let body = strip_comment(raw).trim();
        if body.is_empty() {
            continue;
        }
        let mut fields = body.split_whitespace();
        let u = fields
            .next()
            .ok_or_else(|| malformed(path, line_no, "expected two node ids"))?;
        let v = fields
            .next()
            .ok_or_else(|| malformed(path, line_no, "expected two node ids"))?;
        if fields.next().is_some() {
            return Err(malformed(path, line_no, "expected exactly two node ids"));
        }
        let u: NodeId = u
            .parse()
            .map_err(|_| malformed(path, line_no, "node id is not a non-negative integer"))?;
        let v: NodeId = v
            .parse()
            .map_err(|_| malformed(path, line_no, "node id is not a non-negative integer"))?;
        graph.add_edge(u, v);
    }
    Ok(())
}

fn parse_labels(graph: &mut Graph, path: &Path) -> Result<(), GraphWfcIoError> {
    let content = fs::read_to_string(path)?;
    for (offset, raw) in content.lines().enumerate() {
        let line_no = offset + 1;
        let body = strip_comment(raw).trim();
        if body.is_empty() {
            continue;
        }
        let mut fields = body.split_whitespace();
        let id = fields
            .next()
            .ok_or_else(|| malformed(path, line_no, "expected a node id and a label"))?;
        let label = fields
            .next()
            .ok_or_else(|| malformed(path, line_no, "expected a node id and a label"))?;
        if fields.next().is_some() {
            return Err(malformed(path, line_no, "expected exactly a node id and a label"));
        }
        let id: NodeId = id
            .parse()
            .map_err(|_| malformed(path, line_no, "node id is not a non-negative integer"))?;
        let label: Label = label
            .parse()
            .map_err(|_| malformed(path, line_no, "label is not an integer"))?;
        graph.set_label(id, label);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    use rstest::rstest;

    fn file_with(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn parses_edges_and_labels() {
        let edges = file_with("0 1\n1 2\n");
        let labels = file_with("0 5\n1 6\n2 7\n");
        let graph = Reader::load(edges.path(), labels.path()).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.neighbors(1), &[0, 2]);
        assert_eq!(graph.label(2), 7);
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let edges = file_with("# full line comment\n0 1  // trailing comment\n\n1 2\n");
        let labels = file_with("// no labels here\n");
        let graph = Reader::load(edges.path(), labels.path()).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.label(0), 0);
    }

    #[test]
    fn missing_labels_default_to_zero() {
        let edges = file_with("0 1\n");
        let labels = file_with("");
        let graph = Reader::load(edges.path(), labels.path()).unwrap();
        assert_eq!(graph.label(0), 0);
        assert_eq!(graph.label(1), 0);
    }

    #[test]
    fn self_loops_are_dropped() {
        let edges = file_with("0 0\n0 1\n");
        let labels = file_with("");
        let graph = Reader::load(edges.path(), labels.path()).unwrap();
        assert_eq!(graph.neighbors(0), &[1]);
    }

    #[rstest]
    #[case::one_field("0\n")]
    #[case::three_fields("0 1 2\n")]
    #[case::non_integer_id("a b\n")]
    #[case::negative_id("-1 2\n")]
    #[case::trailing_garbage("0 1 extra\n")]
    fn rejects_a_malformed_edges_line(#[case] edges_contents: &str) {
        let edges = file_with(edges_contents);
        let labels = file_with("");
        let err = Reader::load(edges.path(), labels.path()).unwrap_err();
        assert!(matches!(err, GraphWfcIoError::Malformed { .. }));
    }

    #[rstest]
    #[case::one_field("0\n", "expected a node id and a label")]
    #[case::non_integer_label("0 x\n", "label is not an integer")]
    fn rejects_a_malformed_labels_line(#[case] labels_contents: &str, #[case] reason_fragment: &str) {
        let edges = file_with("");
        let labels = file_with(labels_contents);
        let err = Reader::load(edges.path(), labels.path()).unwrap_err();
        match err {
            GraphWfcIoError::Malformed { reason, .. } => {
                assert!(reason.contains(reason_fragment), "unexpected reason: {reason}");
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[rstest]
    fn rejects_a_line_with_only_one_field_reports_line_number() {
        let edges = file_with("0\n");
        let labels = file_with("");
        let err = Reader::load(edges.path(), labels.path()).unwrap_err();
        assert!(matches!(err, GraphWfcIoError::Malformed { line: 1, .. }));
    }
}
