//! Particle records and scratch types used by `CellList` and the dense-cell
//! traversal.

use crate::math::{CellCoord, Point, Scalar};

/// A single particle copy (original or periodic image) stored inside a
/// `CellList` chain.
#[derive(Clone, Copy, Debug)]
pub struct AtomRecord<T: Scalar, const N: usize> {
    /// 1-based slot within the padded storage; `0` is the chain terminator
    /// and never appears as a real record's `index`.
    pub index: u32,
    /// 1-based user-facing particle id. Several `AtomRecord`s (one original,
    /// zero or more periodic images) may share the same `original_index`.
    pub original_index: u32,
    pub position: Point<T, N>,
    /// `true` for the particle's own (unwrapped-image, zero-translation)
    /// copy, `false` for a periodic-image replica. Traversal requires at
    /// least one endpoint of a pair to be real, so that a boundary pair and
    /// its periodic-image copy (translated by the same lattice vector) are
    /// not both reported.
    pub is_real: bool,
}

/// A non-empty cell, as tracked by `CellList`'s compact occupied-cell list.
#[derive(Clone, Copy, Debug)]
pub struct Cell<T: Scalar, const N: usize> {
    pub linear_index: usize,
    pub cartesian_index: CellCoord<N>,
    pub center: Point<T, N>,
}

/// Scratch record used by the dense-cell projection-pruning traversal: a
/// particle's position alongside its projection onto the cross-cell axis.
#[derive(Clone, Copy, Debug)]
pub struct ProjectedParticle<T: Scalar, const N: usize> {
    pub original_index: u32,
    pub x_proj: T,
    pub position: Point<T, N>,
    pub is_real: bool,
}
