//! Typed error surface for the crate.
//!
//! Every fallible entry point returns `Result<_, CellListError>`. Nothing
//! here is boxed or type-erased: callers embedding this as a library get the
//! full matched enum.

use thiserror::Error;

/// Errors produced by box construction, cell list construction/refresh, and
/// pair traversal.
#[derive(Debug, Error)]
pub enum CellListError {
    #[error("invalid box: {reason}")]
    InvalidBox { reason: String },

    #[error("invalid cutoff {cutoff}: {reason}")]
    InvalidCutoff { cutoff: f64, reason: String },

    #[error(
        "dimension mismatch: box is {box_dim}-dimensional, positions are {position_dim}-dimensional"
    )]
    DimensionMismatch { box_dim: usize, position_dim: usize },

    #[error("cell list capacity exceeded while growing {what} to {requested} entries")]
    CapacityExceeded { what: &'static str, requested: usize },

    #[error("pair traversal aborted on worker {worker} (pair = {pair:?})")]
    TraversalAborted {
        worker: usize,
        pair: Option<(u32, u32)>,
    },
}
