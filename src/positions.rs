//! Input adapters so both `&[Point<T, N>]` and a column-major flat matrix map
//! onto the same internal representation.

use crate::error::CellListError;
use crate::math::{Point, Scalar};

/// A source of `N`-dimensional points, abstracting over the two accepted
/// input shapes: an array of vectors, or a column-major `N`x`M` matrix.
pub trait PositionSource<T: Scalar, const N: usize> {
    fn len(&self) -> usize;
    fn point(&self, i: usize) -> Point<T, N>;

    /// Runtime-checked invariants that the type system can't express (e.g.
    /// the row count of a [`ColumnMajorMatrix`] matching `N`).
    fn validate(&self) -> Result<(), CellListError> {
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn to_vec(&self) -> Vec<Point<T, N>> {
        (0..self.len()).map(|i| self.point(i)).collect()
    }
}

impl<T: Scalar, const N: usize> PositionSource<T, N> for [Point<T, N>] {
    fn len(&self) -> usize {
        <[_]>::len(self)
    }

    fn point(&self, i: usize) -> Point<T, N> {
        self[i]
    }
}

impl<T: Scalar, const N: usize> PositionSource<T, N> for Vec<Point<T, N>> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn point(&self, i: usize) -> Point<T, N> {
        self[i]
    }
}

/// A column-major `N`x`M` matrix of coordinates: a flat slice of length
/// `rows * cols`, with `data[col * rows + row]`.
pub struct ColumnMajorMatrix<'a, T> {
    data: &'a [T],
    rows: usize,
    cols: usize,
}

impl<'a, T: Scalar> ColumnMajorMatrix<'a, T> {
    pub fn new(data: &'a [T], rows: usize, cols: usize) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "column-major matrix data length mismatch"
        );
        Self { data, rows, cols }
    }
}

impl<'a, T: Scalar, const N: usize> PositionSource<T, N> for ColumnMajorMatrix<'a, T> {
    fn len(&self) -> usize {
        self.cols
    }

    fn point(&self, i: usize) -> Point<T, N> {
        Point::<T, N>::from_fn(|row, _col| self.data[i * self.rows + row])
    }

    fn validate(&self) -> Result<(), CellListError> {
        if self.rows != N {
            return Err(CellListError::DimensionMismatch {
                box_dim: N,
                position_dim: self.rows,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;

    #[test]
    fn column_major_matches_vector_layout() {
        // Two 2D columns: (1,2) and (3,4).
        let data = [1.0, 2.0, 3.0, 4.0];
        let matrix = ColumnMajorMatrix::new(&data, 2, 2);
        let source: &dyn PositionSource<f64, 2> = &matrix;
        assert_eq!(source.point(0), Vector2::new(1.0, 2.0));
        assert_eq!(source.point(1), Vector2::new(3.0, 4.0));
    }

    #[test]
    fn column_major_rejects_dimension_mismatch() {
        let data = [1.0, 2.0, 3.0];
        let matrix = ColumnMajorMatrix::new(&data, 3, 1);
        let result: Result<(), CellListError> = PositionSource::<f64, 2>::validate(&matrix);
        assert!(matches!(
            result,
            Err(CellListError::DimensionMismatch {
                box_dim: 2,
                position_dim: 3
            })
        ));
    }
}
