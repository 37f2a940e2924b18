//! Error types shared across the math modules.

use thiserror::Error;

/// Failures raised by the math types.
///
/// Every variant is raised synchronously at the call site and leaves the
/// receiver untouched: preconditions are checked before any mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    /// An element or component index is outside the valid range.
    #[error("index {index} out of range (len {len})")]
    OutOfRange {
        /// The rejected index.
        index: usize,
        /// Number of valid indices.
        len: usize,
    },

    /// An elementwise operation or product between incompatible matrix shapes.
    #[error("incompatible matrix shapes {lhs:?} and {rhs:?}")]
    IncompatibleShape {
        /// Left-hand shape as (rows, cols).
        lhs: (usize, usize),
        /// Right-hand shape as (rows, cols).
        rhs: (usize, usize),
    },

    /// A square-only operation was called on a rectangular matrix.
    #[error("non-square matrix ({rows}x{cols})")]
    NonSquare {
        /// Row count of the offending matrix.
        rows: usize,
        /// Column count of the offending matrix.
        cols: usize,
    },

    /// Inversion was attempted on a matrix whose determinant is
    /// tolerance-zero.
    #[error("non-invertible matrix")]
    NonInvertible,

    /// A structurally invalid argument, e.g. a zero-sized matrix shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}
