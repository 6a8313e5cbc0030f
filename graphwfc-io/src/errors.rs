//! Errors emitted by the whitespace-delimited edge/label text format.

use thiserror::Error;

/// Failures from [`crate::Reader::load`] and [`crate::Exporter::export`].
#[derive(Debug, Error)]
pub enum GraphWfcIoError {
    /// A line in an edges or labels file did not match the expected shape.
    #[error("{path}:{line}: {reason}")]
    Malformed {
        /// Path of the file containing the offending line.
        path: String,
        /// One-based line number within `path`.
        line: usize,
        /// Human-readable description of what was wrong with the line.
        reason: String,
    },
    /// A core invariant was violated, e.g. exporting an uncollapsed cell.
    #[error(transparent)]
    Core(#[from] graphwfc_core::GraphWfcError),
    /// The underlying file could not be read or written.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
