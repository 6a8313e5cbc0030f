//! Error types for the graph synthesis core.
//!
//! Defines the error enum exposed by the public API and a convenient result
//! alias, following the same stable-code pattern used throughout this crate's
//! boundaries.

use std::fmt;

use thiserror::Error;

/// Stable codes describing [`GraphWfcError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum GraphWfcErrorCode {
    /// A configuration value or input graph violated a precondition.
    InvalidInput,
    /// Constraint propagation reduced a cell's domain to the empty set.
    Contradiction,
    /// An operation was attempted against a cell in the wrong lifecycle state.
    IllegalState,
    /// An external reader or exporter failed.
    IoFailure,
}

impl GraphWfcErrorCode {
    /// Return the stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "GRAPHWFC_INVALID_INPUT",
            Self::Contradiction => "GRAPHWFC_CONTRADICTION",
            Self::IllegalState => "GRAPHWFC_ILLEGAL_STATE",
            Self::IoFailure => "GRAPHWFC_IO_FAILURE",
        }
    }
}

impl fmt::Display for GraphWfcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type produced by the pattern extraction, compatibility, and
/// generation components.
///
/// `Contradiction` is expected and recoverable: [`crate::Generator`] catches
/// it to end the current phase and fall through to cleanup, rather than
/// treating it as a fatal error. `IllegalState` and `IoFailure` are
/// programming/environment errors that callers should not attempt to
/// recover from.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphWfcError {
    /// The radius must be at least 1.
    #[error("radius must be at least 1 (got {got})")]
    InvalidRadius {
        /// The radius value that was rejected.
        got: usize,
    },
    /// `size_factor` must be at least 1.
    #[error("size_factor must be at least 1 (got {got})")]
    InvalidSizeFactor {
        /// The size factor value that was rejected.
        got: usize,
    },
    /// `lower_cap` must be in `(0, 1]`.
    #[error("lower_cap must be in (0, 1] (got {got})")]
    InvalidLowerCap {
        /// The lower cap value that was rejected.
        got: f64,
    },
    /// `upper_cap` must be `>= 1`.
    #[error("upper_cap must be >= 1 (got {got})")]
    InvalidUpperCap {
        /// The upper cap value that was rejected.
        got: f64,
    },
    /// `expansion_percentile` must be in `[0, 1]`.
    #[error("expansion_percentile must be in [0, 1] (got {got})")]
    InvalidExpansionPercentile {
        /// The percentile value that was rejected.
        got: f64,
    },
    /// `expansion_slack` must be `>= 1`.
    #[error("expansion_slack must be >= 1 (got {got})")]
    InvalidExpansionSlack {
        /// The slack value that was rejected.
        got: f64,
    },
    /// The training graph contained no nodes.
    #[error("training graph is empty")]
    EmptyGraph,
    /// Constraint propagation emptied a cell's candidate domain.
    #[error("propagation emptied the domain of cell {cell}")]
    Contradiction {
        /// Stable arena index of the cell whose domain became empty.
        cell: usize,
    },
    /// An operation was attempted against a cell that was already collapsed,
    /// or an uncollapsed cell was exported.
    #[error("illegal operation on cell {cell}: {reason}")]
    IllegalState {
        /// Stable arena index of the offending cell.
        cell: usize,
        /// Human-readable description of the violated lifecycle rule.
        reason: &'static str,
    },
    /// An external `Reader` or `Exporter` implementation failed.
    #[error("I/O failure: {message}")]
    IoFailure {
        /// Description of the underlying failure, supplied by the caller.
        message: String,
    },
}

impl GraphWfcError {
    /// Retrieve the stable [`GraphWfcErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> GraphWfcErrorCode {
        match self {
            Self::InvalidRadius { .. }
            | Self::InvalidSizeFactor { .. }
            | Self::InvalidLowerCap { .. }
            | Self::InvalidUpperCap { .. }
            | Self::InvalidExpansionPercentile { .. }
            | Self::InvalidExpansionSlack { .. }
            | Self::EmptyGraph => GraphWfcErrorCode::InvalidInput,
            Self::Contradiction { .. } => GraphWfcErrorCode::Contradiction,
            Self::IllegalState { .. } => GraphWfcErrorCode::IllegalState,
            Self::IoFailure { .. } => GraphWfcErrorCode::IoFailure,
        }
    }

    /// Returns `true` when this error is a recoverable [`Self::Contradiction`].
    #[must_use]
    pub const fn is_contradiction(&self) -> bool {
        matches!(self, Self::Contradiction { .. })
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, GraphWfcError>;
