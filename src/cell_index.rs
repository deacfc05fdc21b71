//! Linear/Cartesian cell indexing and neighbor-offset enumeration.

use crate::math::CellCoord;

/// Converts between linear and Cartesian cell indices for a grid of shape
/// `nc` (cell counts per axis), and enumerates the neighbor offsets used by
/// traversal: "forward" offsets (each unordered cell pair visited exactly
/// once) for the single-set case, and the full offset set for the two-set
/// case, which has no such symmetry to exploit.
#[derive(Clone, Debug)]
pub struct CellIndex<const N: usize> {
    nc: CellCoord<N>,
    strides: CellCoord<N>,
    forward_offsets: Vec<CellCoord<N>>,
    all_offsets: Vec<CellCoord<N>>,
}

impl<const N: usize> CellIndex<N> {
    pub fn new(nc: CellCoord<N>, lcell: u32) -> Self {
        let mut strides = [0i64; N];
        let mut acc = 1i64;
        for axis in 0..N {
            strides[axis] = acc;
            acc *= nc.get(axis).max(1);
        }
        Self {
            nc,
            strides: CellCoord(strides),
            forward_offsets: forward_neighbor_offsets::<N>(lcell),
            all_offsets: all_neighbor_offsets::<N>(lcell),
        }
    }

    pub fn nc(&self) -> CellCoord<N> {
        self.nc
    }

    pub fn total_cells(&self) -> usize {
        (0..N)
            .map(|axis| self.nc.get(axis).max(1) as usize)
            .product()
    }

    pub fn linear_index(&self, c: &CellCoord<N>) -> usize {
        let mut idx = 0i64;
        for axis in 0..N {
            idx += c.get(axis) * self.strides.get(axis);
        }
        idx as usize
    }

    pub fn in_bounds(&self, c: &CellCoord<N>) -> bool {
        (0..N).all(|axis| c.get(axis) >= 0 && c.get(axis) < self.nc.get(axis).max(1))
    }

    /// Forward neighbors of `c` (including `c` itself, first): enumerating
    /// `(c, forward_neighbor)` for every non-empty `c` visits each unordered
    /// cell pair exactly once.
    pub fn forward_neighbors(&self, c: CellCoord<N>) -> impl Iterator<Item = CellCoord<N>> + '_ {
        std::iter::once(c).chain(
            self.forward_offsets
                .iter()
                .map(move |offset| c.checked_add(offset))
                .filter(move |nb| self.in_bounds(nb)),
        )
    }

    /// All neighbors of `c` (including `c` itself, first), both forward and
    /// backward. Used by the two-set traversal, which has no ordering
    /// symmetry to exploit since the two sets are disjoint.
    pub fn all_neighbors(&self, c: CellCoord<N>) -> impl Iterator<Item = CellCoord<N>> + '_ {
        std::iter::once(c).chain(
            self.all_offsets
                .iter()
                .map(move |offset| c.checked_add(offset))
                .filter(move |nb| self.in_bounds(nb)),
        )
    }
}

/// An offset is "forward" if it is lexicographically greater than the zero
/// offset, under axis order `0, 1, ..., N-1`.
fn is_forward<const N: usize>(c: &CellCoord<N>) -> bool {
    for axis in 0..N {
        let v = c.get(axis);
        if v > 0 {
            return true;
        }
        if v < 0 {
            return false;
        }
    }
    false
}

fn forward_neighbor_offsets<const N: usize>(lcell: u32) -> Vec<CellCoord<N>> {
    let radius = lcell as i64 + 1;
    let mut offsets = Vec::new();
    let mut current = [-radius; N];
    loop {
        let coord = CellCoord(current);
        if is_forward(&coord) {
            offsets.push(coord);
        }
        let mut axis = 0;
        loop {
            current[axis] += 1;
            if current[axis] > radius {
                current[axis] = -radius;
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

fn all_neighbor_offsets<const N: usize>(lcell: u32) -> Vec<CellCoord<N>> {
    let radius = lcell as i64 + 1;
    let mut offsets = Vec::new();
    let mut current = [-radius; N];
    loop {
        let coord = CellCoord(current);
        if (0..N).any(|axis| coord.get(axis) != 0) {
            offsets.push(coord);
        }
        let mut axis = 0;
        loop {
            current[axis] += 1;
            if current[axis] > radius {
                current[axis] = -radius;
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

    #[test]
    fn forward_offsets_exclude_zero_and_cover_expected_count() {
        // lcell = 1 in 2D: radius 2, full window is 5x5 = 25, minus the zero
        // offset = 24, half of which (12) are forward.
        let offsets = forward_neighbor_offsets::<2>(1);
        assert_eq!(offsets.len(), 12);
        assert!(offsets.iter().all(is_forward));
    }

    #[test]
    fn all_offsets_exclude_only_zero() {
        let offsets = all_neighbor_offsets::<2>(1);
        assert_eq!(offsets.len(), 24);
        assert!(offsets.iter().all(|o| o.get(0) != 0 || o.get(1) != 0));
    }

    #[test]
    fn linear_index_round_trips_through_strides() {
        let index = CellIndex::<3>::new(CellCoord([4, 5, 6]), 1);
        let c = CellCoord([2, 3, 1]);
        let linear = index.linear_index(&c);
        assert_eq!(linear, 2 + 4 * 3 + 4 * 5 * 1);
    }

    #[test]
    fn forward_neighbors_each_pair_once() {
        let index = CellIndex::<1>::new(CellCoord([4]), 1);
        let mut seen = std::collections::HashSet::new();
        for c0 in 0..4i64 {
            for nb in index.forward_neighbors(CellCoord([c0])) {
                let pair = (c0.min(nb.get(0)), c0.max(nb.get(0)));
                assert!(seen.insert(pair), "pair {pair:?} visited twice");
            }
        }
    }
}
