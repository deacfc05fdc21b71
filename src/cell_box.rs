//! Simulation-cell geometry: the periodic box, its cell grid, wrapping, and
//! periodic-image enumeration.

use crate::cell_index::CellIndex;
use crate::error::CellListError;
use crate::math::{
    scalar_from_f64, scalar_from_i64, scalar_from_usize, scalar_to_f64, floor_to_i64, CellCoord,
    LatticeMatrix, Point, Scalar,
};

/// Options controlling how a [`CellBox`] subdivides its cutoff into cells.
#[derive(Clone, Copy, Debug)]
pub struct CellBoxOptions {
    /// Integer subdivision factor: cell edge = `cutoff / lcell`. Must be >= 1.
    pub lcell: u32,
}

impl Default for CellBoxOptions {
    fn default() -> Self {
        Self { lcell: 1 }
    }
}

/// Immutable description of a (possibly periodic) simulation cell and the
/// grid of cutoff-sized cells used to bin particles inside it.
#[derive(Clone, Debug)]
pub struct CellBox<T: Scalar, const N: usize> {
    unit_cell: LatticeMatrix<T, N>,
    unit_cell_inv: Option<LatticeMatrix<T, N>>,
    unit_cell_max: Point<T, N>,
    cutoff: T,
    cutoff_sq: T,
    lcell: u32,
    nc: CellCoord<N>,
    image_ranges: [(i64, i64); N],
    image_translations: Vec<Point<T, N>>,
    cell_index: CellIndex<N>,
    periodic: bool,
}

impl<T: Scalar, const N: usize> CellBox<T, N> {
    /// Builds a periodic box from an explicit matrix of lattice column
    /// vectors; supports general triclinic cells (subject to the diagonal
    /// dominance check in [`validate_triclinic`]).
    pub fn new(
        unit_cell: LatticeMatrix<T, N>,
        cutoff: T,
        options: CellBoxOptions,
    ) -> Result<Self, CellListError> {
        Self::build(unit_cell, cutoff, options, true)
    }

    /// Orthorhombic shortcut: builds a periodic box from per-axis side
    /// lengths.
    pub fn from_sides(
        sides: Point<T, N>,
        cutoff: T,
        options: CellBoxOptions,
    ) -> Result<Self, CellListError> {
        let unit_cell = LatticeMatrix::<T, N>::from_diagonal(&sides);
        Self::build(unit_cell, cutoff, options, true)
    }

    /// Builds a non-periodic box: `bounding_sides` must cover every input
    /// position with no wrap-around and no periodic images.
    pub fn non_periodic(
        bounding_sides: Point<T, N>,
        cutoff: T,
        options: CellBoxOptions,
    ) -> Result<Self, CellListError> {
        let unit_cell = LatticeMatrix::<T, N>::from_diagonal(&bounding_sides);
        Self::build(unit_cell, cutoff, options, false)
    }

    fn build(
        unit_cell: LatticeMatrix<T, N>,
        cutoff: T,
        options: CellBoxOptions,
        periodic: bool,
    ) -> Result<Self, CellListError> {
        validate_cutoff(cutoff, options.lcell)?;
        validate_triclinic(&unit_cell)?;
        if periodic {
            validate_cutoff_vs_box(&unit_cell, cutoff)?;
        }

        let unit_cell_inv = if periodic {
            Some(unit_cell.try_inverse().ok_or_else(|| CellListError::InvalidBox {
                reason: "unit cell matrix is not invertible".to_string(),
            })?)
        } else {
            None
        };

        let unit_cell_max = unit_cell.column_sum();
        let edge = cutoff / scalar_from_usize::<T>(options.lcell as usize);
        let nc = compute_cell_counts::<T, N>(&unit_cell_max, cutoff, edge);
        let image_ranges = compute_image_ranges::<T, N>(&unit_cell, cutoff, periodic)?;
        let image_offsets = image_offsets_for_ranges(&image_ranges);
        let image_translations = image_offsets
            .iter()
            .map(|c| {
                let r = Point::<T, N>::from_fn(|axis, _| scalar_from_i64::<T>(c.get(axis)));
                unit_cell * r
            })
            .collect();
        let cell_index = CellIndex::new(nc, options.lcell);

        Ok(Self {
            unit_cell,
            unit_cell_inv,
            unit_cell_max,
            cutoff,
            cutoff_sq: cutoff * cutoff,
            lcell: options.lcell,
            nc,
            image_ranges,
            image_translations,
            cell_index,
            periodic,
        })
    }

    pub fn cutoff(&self) -> T {
        self.cutoff
    }

    pub fn cutoff_sq(&self) -> T {
        self.cutoff_sq
    }

    pub fn lcell(&self) -> u32 {
        self.lcell
    }

    pub fn is_periodic(&self) -> bool {
        self.periodic
    }

    pub fn unit_cell(&self) -> &LatticeMatrix<T, N> {
        &self.unit_cell
    }

    pub fn unit_cell_max(&self) -> &Point<T, N> {
        &self.unit_cell_max
    }

    pub fn image_ranges(&self) -> &[(i64, i64); N] {
        &self.image_ranges
    }

    pub(crate) fn cell_index(&self) -> &CellIndex<N> {
        &self.cell_index
    }

    pub fn forward_neighbor_cells(&self, c: CellCoord<N>) -> impl Iterator<Item = CellCoord<N>> + '_ {
        self.cell_index.forward_neighbors(c)
    }

    pub fn all_neighbor_cells(&self, c: CellCoord<N>) -> impl Iterator<Item = CellCoord<N>> + '_ {
        self.cell_index.all_neighbors(c)
    }

    fn cell_edge(&self) -> T {
        self.cutoff / scalar_from_usize::<T>(self.lcell as usize)
    }

    /// Reduces `point` into the primary unit cell. A no-op for non-periodic
    /// boxes.
    pub fn wrap(&self, point: &Point<T, N>) -> Point<T, N> {
        let Some(inv) = self.unit_cell_inv else {
            return *point;
        };
        let frac = inv * point;
        let wrapped_frac = frac.map(|f| f - f.floor());
        self.unit_cell * wrapped_frac
    }

    /// Maps a (typically already-wrapped) point to its grid cell. The origin
    /// cell spans `[-cutoff, -cutoff + edge)` along every axis.
    pub(crate) fn cell_of(&self, point: &Point<T, N>) -> CellCoord<N> {
        let edge = self.cell_edge();
        CellCoord::from_fn(|axis| {
            let v = point[axis];
            floor_to_i64((v + self.cutoff) / edge)
        })
    }

    pub(crate) fn cell_center(&self, c: &CellCoord<N>) -> Point<T, N> {
        let edge = self.cell_edge();
        let half = scalar_from_f64::<T>(0.5);
        Point::from_fn(|axis, _| {
            let idx = scalar_from_i64::<T>(c.get(axis));
            (idx + half) * edge - self.cutoff
        })
    }

    pub(crate) fn contains_padded(&self, p: &Point<T, N>) -> bool {
        (0..N).all(|axis| {
            let v = p[axis];
            v >= -self.cutoff && v <= self.unit_cell_max[axis] + self.cutoff
        })
    }

    /// Wraps `p` and returns every periodic-image copy that falls within the
    /// padded region `[-cutoff, unit_cell_max + cutoff]` per axis: the
    /// candidates that must actually be inserted into a `CellList`, each
    /// tagged `true` for the zero-translation (real) copy and `false` for a
    /// periodic-image replica.
    pub(crate) fn expand(&self, p: &Point<T, N>) -> Vec<(Point<T, N>, bool)> {
        let wrapped = self.wrap(p);
        self.image_translations
            .iter()
            .map(|t| (wrapped + *t, is_zero(t)))
            .filter(|(candidate, _)| self.contains_padded(candidate))
            .collect()
    }
}

/// `true` when `t` is the zero-offset (identity) lattice translation. Built
/// as an exact sum of zero integer multiples of the unit-cell columns, so
/// it compares bit-for-bit equal to the zero vector with no tolerance.
fn is_zero<T: Scalar, const N: usize>(t: &Point<T, N>) -> bool {
    (0..N).all(|axis| t[axis] == T::zero())
}

fn validate_cutoff<T: Scalar>(cutoff: T, lcell: u32) -> Result<(), CellListError> {
    if lcell == 0 {
        return Err(CellListError::InvalidCutoff {
            cutoff: scalar_to_f64(cutoff),
            reason: "lcell must be >= 1".to_string(),
        });
    }
    if cutoff <= T::zero() {
        return Err(CellListError::InvalidCutoff {
            cutoff: scalar_to_f64(cutoff),
            reason: "cutoff must be positive".to_string(),
        });
    }
    Ok(())
}

/// Requires the matrix to be diagonally dominant by column: each diagonal
/// entry must be at least the sum of that column's off-diagonal entries.
/// Diagonal (orthorhombic) matrices satisfy this trivially.
fn validate_triclinic<T: Scalar, const N: usize>(
    unit_cell: &LatticeMatrix<T, N>,
) -> Result<(), CellListError> {
    for row in 0..N {
        for col in 0..N {
            if unit_cell[(row, col)] < T::zero() {
                return Err(CellListError::InvalidBox {
                    reason: format!("unit cell entry ({row}, {col}) is negative"),
                });
            }
        }
    }
    for col in 0..N {
        let diag = unit_cell[(col, col)];
        let mut off_diag_sum = T::zero();
        for row in 0..N {
            if row != col {
                off_diag_sum += unit_cell[(row, col)];
            }
        }
        if diag < off_diag_sum {
            return Err(CellListError::InvalidBox {
                reason: format!(
                    "triclinic cell invalid: column {col} diagonal {} is smaller than off-diagonal sum {}",
                    scalar_to_f64(diag),
                    scalar_to_f64(off_diag_sum)
                ),
            });
        }
    }
    Ok(())
}

/// Rejects cutoffs larger than half the minimum-image spacing along any
/// axis, where wrap-based minimum-image reduction becomes ambiguous.
fn validate_cutoff_vs_box<T: Scalar, const N: usize>(
    unit_cell: &LatticeMatrix<T, N>,
    cutoff: T,
) -> Result<(), CellListError> {
    let inv = unit_cell.try_inverse().ok_or_else(|| CellListError::InvalidBox {
        reason: "unit cell matrix is not invertible".to_string(),
    })?;
    for axis in 0..N {
        let row_norm = inv.row(axis).norm();
        if row_norm <= T::zero() {
            continue;
        }
        let spacing = T::one() / row_norm;
        let half = spacing / scalar_from_f64::<T>(2.0);
        if cutoff > half {
            return Err(CellListError::InvalidCutoff {
                cutoff: scalar_to_f64(cutoff),
                reason: format!("cutoff exceeds half the minimum-image spacing along axis {axis}"),
            });
        }
    }
    Ok(())
}

fn compute_cell_counts<T: Scalar, const N: usize>(
    unit_cell_max: &Point<T, N>,
    cutoff: T,
    edge: T,
) -> CellCoord<N> {
    CellCoord::from_fn(|axis| {
        let span = unit_cell_max[axis] + cutoff + cutoff;
        let ratio = span / edge;
        let clamped = if ratio < T::one() { T::one() } else { ratio };
        floor_to_i64(clamped.ceil())
    })
}

/// Conservative (symmetric) per-axis image-translation range: large enough
/// that every point within `cutoff` of the unit cell has at least one
/// candidate image inside it, possibly with some redundant candidates that
/// `contains_padded` filters back out.
fn compute_image_ranges<T: Scalar, const N: usize>(
    unit_cell: &LatticeMatrix<T, N>,
    cutoff: T,
    periodic: bool,
) -> Result<[(i64, i64); N], CellListError> {
    if !periodic {
        return Ok([(0, 0); N]);
    }
    let inv = unit_cell.try_inverse().ok_or_else(|| CellListError::InvalidBox {
        reason: "unit cell matrix is not invertible".to_string(),
    })?;
    let mut ranges = [(0i64, 0i64); N];
    for axis in 0..N {
        let row_norm = inv.row(axis).norm();
        let margin = scalar_to_f64(cutoff * row_norm);
        let bound = margin.ceil() as i64;
        ranges[axis] = (-bound, bound);
    }
    Ok(ranges)
}

fn image_offsets_for_ranges<const N: usize>(ranges: &[(i64, i64); N]) -> Vec<CellCoord<N>> {
    if ranges.iter().any(|&(lo, hi)| lo > hi) {
        return Vec::new();
    }
    let mut offsets = Vec::new();
    let mut current: [i64; N] = std::array::from_fn(|axis| ranges[axis].0);
    loop {
        offsets.push(CellCoord(current));
        let mut axis = 0;
        loop {
            current[axis] += 1;
            if current[axis] > ranges[axis].1 {
                current[axis] = ranges[axis].0;
                axis += 1;
                if axis == N {
                    return offsets;
                }
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Vector2, Vector3};

    #[test]
    fn rejects_nonpositive_cutoff() {
        let err = CellBox::<f64, 2>::from_sides(Vector2::new(10.0, 10.0), 0.0, CellBoxOptions::default());
        assert!(matches!(err, Err(CellListError::InvalidCutoff { .. })));
    }

    #[test]
    fn rejects_cutoff_exceeding_half_box() {
        let err = CellBox::<f64, 2>::from_sides(Vector2::new(2.0, 2.0), 1.5, CellBoxOptions::default());
        assert!(matches!(err, Err(CellListError::InvalidCutoff { .. })));
    }

    #[test]
    fn wrap_folds_into_primary_cell() {
        let cell_box =
            CellBox::<f64, 2>::from_sides(Vector2::new(10.0, 10.0), 1.0, CellBoxOptions::default())
                .unwrap();
        let wrapped = cell_box.wrap(&Vector2::new(12.5, -1.0));
        assert!((wrapped.x - 2.5).abs() < 1e-9);
        assert!((wrapped.y - 9.0).abs() < 1e-9);
    }

    #[test]
    fn non_periodic_wrap_is_identity() {
        let cell_box =
            CellBox::<f64, 2>::non_periodic(Vector2::new(10.0, 10.0), 1.0, CellBoxOptions::default())
                .unwrap();
        let p = Vector2::new(-3.0, 15.0);
        assert_eq!(cell_box.wrap(&p), p);
        assert_eq!(cell_box.image_ranges(), &[(0, 0), (0, 0)]);
    }

    #[test]
    fn expand_produces_images_near_boundary() {
        let cell_box =
            CellBox::<f64, 2>::from_sides(Vector2::new(10.0, 10.0), 1.0, CellBoxOptions::default())
                .unwrap();
        // A point near the low edge should produce an image near the high edge.
        let candidates = cell_box.expand(&Vector2::new(0.2, 5.0));
        assert!(candidates
            .iter()
            .any(|(c, is_real)| (c.x - 10.2).abs() < 1e-9 && (c.y - 5.0).abs() < 1e-9 && !is_real));
        assert_eq!(candidates.iter().filter(|(_, is_real)| *is_real).count(), 1);
    }

    #[test]
    fn rejects_non_diagonally_dominant_triclinic_cell() {
        let unit_cell = nalgebra::Matrix3::new(1.0, 5.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        let err = CellBox::<f64, 3>::new(unit_cell, 0.1, CellBoxOptions::default());
        assert!(matches!(err, Err(CellListError::InvalidBox { .. })));
    }

    #[test]
    fn triclinic_cell_accepts_diagonally_dominant_skew() {
        let unit_cell = Vector3::new(10.0, 10.0, 10.0);
        let cell_box = CellBox::<f64, 3>::from_sides(unit_cell, 1.0, CellBoxOptions::default());
        assert!(cell_box.is_ok());
    }
}
