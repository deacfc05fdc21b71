//! Scalar and vector type machinery shared across the crate.
//!
//! Everything here is generic over a spatial dimension `N` (a const generic)
//! and a floating scalar `T`. `T` is deliberately left open rather than
//! hardcoded to `f64` so callers can trade precision for memory exactly like
//! `nalgebra` itself does.

use nalgebra::{SMatrix, SVector};
use num_traits::{NumCast, ToPrimitive};

/// Floating scalar usable as a coordinate type.
///
/// Blanket-implemented for `f32` and `f64`; callers should never need to
/// implement this themselves.
pub trait Scalar: nalgebra::RealField + Copy + Send + Sync + 'static + NumCast + ToPrimitive {}

impl<T> Scalar for T where
    T: nalgebra::RealField + Copy + Send + Sync + 'static + NumCast + ToPrimitive
{
}

/// A point or displacement in `N`-dimensional space.
pub type Point<T, const N: usize> = SVector<T, N>;

/// An `N`x`N` matrix of lattice column vectors.
pub type LatticeMatrix<T, const N: usize> = SMatrix<T, N, N>;

/// Integer cell coordinates, one component per axis.
///
/// Kept as a plain array rather than an `nalgebra` vector: cell coordinates
/// only ever need equality, ordering, and component-wise addition, none of
/// which benefit from `nalgebra`'s linear-algebra machinery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord<const N: usize>(pub [i64; N]);

impl<const N: usize> CellCoord<N> {
    pub fn zero() -> Self {
        Self([0; N])
    }

    pub fn from_fn(f: impl FnMut(usize) -> i64) -> Self {
        Self(std::array::from_fn(f))
    }

    #[inline]
    pub fn get(&self, axis: usize) -> i64 {
        self.0[axis]
    }

    pub fn checked_add(&self, other: &Self) -> Self {
        let mut out = [0i64; N];
        for axis in 0..N {
            out[axis] = self.0[axis] + other.0[axis];
        }
        Self(out)
    }
}

impl<const N: usize> std::ops::Index<usize> for CellCoord<N> {
    type Output = i64;
    fn index(&self, axis: usize) -> &i64 {
        &self.0[axis]
    }
}

pub fn scalar_from_usize<T: Scalar>(value: usize) -> T {
    T::from(value).expect("usize value out of range for scalar type")
}

pub fn scalar_from_i64<T: Scalar>(value: i64) -> T {
    T::from(value).expect("i64 value out of range for scalar type")
}

pub fn scalar_from_f64<T: Scalar>(value: f64) -> T {
    T::from(value).expect("f64 value out of range for scalar type")
}

pub fn scalar_to_f64<T: Scalar>(value: T) -> f64 {
    value.to_f64().expect("scalar value out of range for f64")
}

pub fn floor_to_i64<T: Scalar>(value: T) -> i64 {
    value
        .floor()
        .to_i64()
        .expect("floored scalar out of range for i64")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_coord_add() {
        let a = CellCoord::<3>([1, 2, 3]);
        let b = CellCoord::<3>([-1, 0, 4]);
        assert_eq!(a.checked_add(&b), CellCoord([0, 2, 7]));
    }

    #[test]
    fn scalar_round_trip() {
        let v: f64 = scalar_from_i64(-3);
        assert_eq!(v, -3.0);
        assert_eq!(floor_to_i64(2.9_f64), 2);
        assert_eq!(floor_to_i64(-2.1_f64), -3);
    }
}
