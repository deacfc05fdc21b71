//! The cell list itself: build, in-place refresh, and the singly-linked
//! chain representation that traversal walks.

use rayon::prelude::*;

use crate::cell_box::CellBox;
use crate::error::CellListError;
use crate::math::{Point, Scalar};
use crate::positions::PositionSource;
use crate::records::{AtomRecord, Cell};

/// Options controlling how [`CellList::new`]/[`CellList::update`] build the
/// chain representation.
#[derive(Clone, Copy, Debug)]
pub struct CellListOptions {
    /// Build across the Rayon thread pool instead of a single thread.
    pub parallel: bool,
    /// `(map, _)` batch count for the parallel build; `0` picks a heuristic
    /// default. The second slot is reserved for symmetry with
    /// [`crate::parallel::MapPairwiseOptions`] and currently unused here,
    /// since the build's merge phase is already a cheap sequential pass.
    pub nbatches: (usize, usize),
}

impl Default for CellListOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            nbatches: (0, 0),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct PendingInsertion<T: Scalar, const N: usize> {
    pub original_index: u32,
    pub position: Point<T, N>,
    pub is_real: bool,
}

/// Per-worker scratch buffers that [`CellList::update`] can reuse across
/// repeated parallel refreshes instead of reallocating on every call.
#[derive(Clone, Debug, Default)]
pub struct AuxThreaded<T: Scalar, const N: usize> {
    scratch: Vec<Vec<PendingInsertion<T, N>>>,
}

impl<T: Scalar, const N: usize> AuxThreaded<T, N> {
    pub fn new() -> Self {
        Self {
            scratch: Vec::new(),
        }
    }

    fn ensure_workers(&mut self, n: usize) {
        if self.scratch.len() < n {
            self.scratch.resize_with(n, Vec::new);
        }
    }
}

/// A singly-linked cell list over a single set of points.
///
/// Particles (and, for periodic boxes, their periodic images) are stored in
/// a flat `atoms` array; `fp` holds one head-of-chain slot per grid cell and
/// `np` holds each atom's next-slot pointer, with slot `0` used as both
/// arrays' terminator/sentinel. This mirrors a classic linked cell list:
/// O(1) insertion, O(particles in cell) traversal per cell, no wasted
/// per-cell capacity.
pub struct CellList<T: Scalar, const N: usize> {
    cell_box: CellBox<T, N>,
    ncwp: usize,
    ncp: usize,
    cwp: Vec<Cell<T, N>>,
    fp: Vec<u32>,
    np: Vec<u32>,
    npcell: Vec<u32>,
    atoms: Vec<AtomRecord<T, N>>,
}

impl<T: Scalar, const N: usize> CellList<T, N> {
    pub fn new<P>(
        positions: &P,
        cell_box: CellBox<T, N>,
        options: CellListOptions,
    ) -> Result<Self, CellListError>
    where
        P: PositionSource<T, N> + Sync + ?Sized,
    {
        positions.validate()?;
        let mut list = Self::empty(cell_box);
        list.rebuild(positions, options, None)?;
        Ok(list)
    }

    /// Builds a two-set pair: the smaller input becomes a flat array walked
    /// directly, the larger becomes a full `CellList`. `swap` records
    /// whether `(x, y)` had to be reversed internally to achieve that.
    pub fn new_pair<Px, Py>(
        x: &Px,
        y: &Py,
        cell_box: CellBox<T, N>,
        options: CellListOptions,
    ) -> Result<CellListPair<T, N>, CellListError>
    where
        Px: PositionSource<T, N> + Sync + ?Sized,
        Py: PositionSource<T, N> + Sync + ?Sized,
    {
        x.validate()?;
        y.validate()?;
        let (small, large, swap) = if x.len() <= y.len() {
            (x.to_vec(), CellList::new(y, cell_box, options)?, false)
        } else {
            (y.to_vec(), CellList::new(x, cell_box, options)?, true)
        };
        Ok(CellListPair { small, large, swap })
    }

    /// Refreshes positions in place, optionally with a new box (if the cell
    /// grid's shape changes, storage is fully reallocated; otherwise only
    /// previously-occupied cells are cleared, not the whole grid).
    pub fn update<P>(
        &mut self,
        positions: &P,
        new_box: Option<CellBox<T, N>>,
        options: CellListOptions,
        aux: Option<&mut AuxThreaded<T, N>>,
    ) -> Result<(), CellListError>
    where
        P: PositionSource<T, N> + Sync + ?Sized,
    {
        positions.validate()?;
        if let Some(b) = new_box {
            if b.cell_index().total_cells() != self.cell_box.cell_index().total_cells() {
                *self = Self::empty(b);
            } else {
                self.cell_box = b;
            }
        }
        self.rebuild(positions, options, aux)
    }

    pub fn cell_box(&self) -> &CellBox<T, N> {
        &self.cell_box
    }

    pub fn particle_count(&self) -> usize {
        self.ncp
    }

    pub fn non_empty_cells(&self) -> &[Cell<T, N>] {
        debug_assert_eq!(self.cwp.len(), self.ncwp);
        &self.cwp
    }

    pub(crate) fn npcell(&self, linear: usize) -> u32 {
        self.npcell[linear]
    }

    pub(crate) fn chain(&self, linear: usize) -> ChainIter<'_, T, N> {
        ChainIter {
            list: self,
            next: self.fp[linear],
        }
    }

    fn empty(cell_box: CellBox<T, N>) -> Self {
        let total = cell_box.cell_index().total_cells();
        Self {
            fp: vec![0; total],
            npcell: vec![0; total],
            atoms: vec![AtomRecord {
                index: 0,
                original_index: 0,
                position: Point::zeros(),
                is_real: false,
            }],
            np: vec![0],
            cwp: Vec::new(),
            ncwp: 0,
            ncp: 0,
            cell_box,
        }
    }

    fn rebuild<P>(
        &mut self,
        positions: &P,
        options: CellListOptions,
        aux: Option<&mut AuxThreaded<T, N>>,
    ) -> Result<(), CellListError>
    where
        P: PositionSource<T, N> + Sync + ?Sized,
    {
        self.clear_occupied();
        self.atoms.truncate(1);
        self.np.truncate(1);
        self.ncp = 0;

        if options.parallel {
            self.rebuild_parallel(positions, options, aux)
        } else {
            for i in 0..positions.len() {
                let p = positions.point(i);
                self.insert_particle((i + 1) as u32, &p);
            }
            Ok(())
        }
    }

    fn rebuild_parallel<P>(
        &mut self,
        positions: &P,
        options: CellListOptions,
        aux: Option<&mut AuxThreaded<T, N>>,
    ) -> Result<(), CellListError>
    where
        P: PositionSource<T, N> + Sync + ?Sized,
    {
        let n = positions.len();
        if n == 0 {
            return Ok(());
        }
        let chunk_count = crate::system_class::default_map_batches(n)
            .max(options.nbatches.0)
            .min(n);
        let chunk_count = chunk_count.max(1);
        let indices: Vec<usize> = (0..n).collect();
        let chunk_size = n.div_ceil(chunk_count).max(1);
        let chunks: Vec<&[usize]> = indices.chunks(chunk_size).collect();

        let cell_box = &self.cell_box;

        let mut owned_scratch;
        let scratch: &mut Vec<Vec<PendingInsertion<T, N>>> = match aux {
            Some(a) => {
                a.ensure_workers(chunks.len());
                &mut a.scratch
            }
            None => {
                owned_scratch = vec![Vec::new(); chunks.len()];
                &mut owned_scratch
            }
        };
        scratch.truncate(chunks.len());
        while scratch.len() < chunks.len() {
            scratch.push(Vec::new());
        }

        scratch
            .par_iter_mut()
            .zip(chunks.par_iter())
            .for_each(|(buf, chunk)| {
                buf.clear();
                for &i in *chunk {
                    let p = positions.point(i);
                    for (translated, is_real) in cell_box.expand(&p) {
                        buf.push(PendingInsertion {
                            original_index: (i + 1) as u32,
                            position: translated,
                            is_real,
                        });
                    }
                }
            });

        for buf in scratch.iter() {
            for item in buf {
                self.push_record(item.original_index, item.position, item.is_real);
            }
        }
        Ok(())
    }

    fn insert_particle(&mut self, original_index: u32, p: &Point<T, N>) {
        let candidates = self.cell_box.expand(p);
        for (translated, is_real) in candidates {
            self.push_record(original_index, translated, is_real);
        }
    }

    fn push_record(&mut self, original_index: u32, position: Point<T, N>, is_real: bool) {
        let c = self.cell_box.cell_of(&position);
        let linear = self.cell_box.cell_index().linear_index(&c);
        self.ncp += 1;
        let slot = self.ncp as u32;
        if self.npcell[linear] == 0 {
            self.cwp.push(Cell {
                linear_index: linear,
                cartesian_index: c,
                center: self.cell_box.cell_center(&c),
            });
            self.ncwp += 1;
        }
        self.atoms.push(AtomRecord {
            index: slot,
            original_index,
            position,
            is_real,
        });
        self.np.push(self.fp[linear]);
        self.fp[linear] = slot;
        self.npcell[linear] += 1;
    }

    /// Clears only previously-occupied cells (`O(ncwp)`), never the whole
    /// grid (`O(total cells)`), matching the refresh cost the build promises.
    fn clear_occupied(&mut self) {
        for cell in self.cwp.drain(..) {
            self.fp[cell.linear_index] = 0;
            self.npcell[cell.linear_index] = 0;
        }
        self.ncwp = 0;
    }
}

pub(crate) struct ChainIter<'a, T: Scalar, const N: usize> {
    list: &'a CellList<T, N>,
    next: u32,
}

impl<'a, T: Scalar, const N: usize> Iterator for ChainIter<'a, T, N> {
    type Item = AtomRecord<T, N>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == 0 {
            return None;
        }
        let rec = self.list.atoms[self.next as usize];
        self.next = self.list.np[rec.index as usize];
        Some(rec)
    }
}

/// A two-disjoint-set cell list pair: the smaller set kept flat, the larger
/// set binned into a full [`CellList`].
pub struct CellListPair<T: Scalar, const N: usize> {
    small: Vec<Point<T, N>>,
    large: CellList<T, N>,
    swap: bool,
}

impl<T: Scalar, const N: usize> CellListPair<T, N> {
    pub fn small(&self) -> &[Point<T, N>] {
        &self.small
    }

    pub fn large(&self) -> &CellList<T, N> {
        &self.large
    }

    /// `true` if the user's `(x, y)` ordering was reversed internally
    /// (because `x` was larger than `y`); the traversal restores it before
    /// invoking the caller's callback.
    pub fn swap(&self) -> bool {
        self.swap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_box::CellBoxOptions;
    use nalgebra::Vector2;

    fn small_box() -> CellBox<f64, 2> {
        CellBox::from_sides(Vector2::new(10.0, 10.0), 1.0, CellBoxOptions::default()).unwrap()
    }

    #[test]
    fn build_places_every_particle() {
        // All three points sit far enough from every boundary (cutoff = 1,
        // box side = 10) that none of them gets a periodic image, so
        // `particle_count` (which counts image copies too) equals `len()`.
        let points = vec![
            Vector2::new(2.0, 2.0),
            Vector2::new(5.0, 5.0),
            Vector2::new(8.0, 8.0),
        ];
        let list = CellList::new(&points, small_box(), CellListOptions::default()).unwrap();
        assert_eq!(list.particle_count(), points.len());
    }

    #[test]
    fn build_counts_periodic_image_copies() {
        // (0.5, 0.5) and (9.9, 9.9) are each within `cutoff` of two box
        // edges, so each contributes 4 copies (1 real + 3 images); the
        // interior point contributes exactly 1.
        let points = vec![
            Vector2::new(0.5, 0.5),
            Vector2::new(5.0, 5.0),
            Vector2::new(9.9, 9.9),
        ];
        let list = CellList::new(&points, small_box(), CellListOptions::default()).unwrap();
        assert_eq!(list.particle_count(), 4 + 1 + 4);
    }

    #[test]
    fn interior_particle_has_no_periodic_images() {
        let points = vec![Vector2::new(5.0, 5.0)];
        let list = CellList::new(&points, small_box(), CellListOptions::default()).unwrap();
        assert_eq!(list.particle_count(), 1);
    }

    #[test]
    fn boundary_particle_gets_periodic_images() {
        let points = vec![Vector2::new(0.05, 5.0)];
        let list = CellList::new(&points, small_box(), CellListOptions::default()).unwrap();
        assert!(list.particle_count() > 1);
    }

    #[test]
    fn update_with_fewer_particles_resets_state() {
        let mut list = CellList::new(
            &vec![Vector2::new(1.0, 1.0), Vector2::new(2.0, 2.0)],
            small_box(),
            CellListOptions::default(),
        )
        .unwrap();
        list.update(
            &vec![Vector2::new(3.0, 3.0)],
            None,
            CellListOptions::default(),
            None,
        )
        .unwrap();
        assert_eq!(list.particle_count(), 1);
    }

    #[test]
    fn parallel_build_matches_serial_particle_count() {
        let points: Vec<_> = (0..500)
            .map(|i| Vector2::new((i % 10) as f64, (i / 10) as f64 % 10.0))
            .collect();
        let serial = CellList::new(&points, small_box(), CellListOptions::default()).unwrap();
        let parallel = CellList::new(
            &points,
            small_box(),
            CellListOptions {
                parallel: true,
                nbatches: (4, 0),
            },
        )
        .unwrap();
        assert_eq!(serial.particle_count(), parallel.particle_count());
    }

    #[test]
    fn new_pair_picks_smaller_set_as_flat_array() {
        let x: Vec<_> = (0..3).map(|i| Vector2::new(i as f64, 0.0)).collect();
        let y: Vec<_> = (0..10).map(|i| Vector2::new(0.0, i as f64)).collect();
        let pair = CellList::new_pair(&x, &y, small_box(), CellListOptions::default()).unwrap();
        assert_eq!(pair.small().len(), 3);
        assert_eq!(pair.large().particle_count(), 10);
        assert!(!pair.swap());

        let pair_swapped =
            CellList::new_pair(&y, &x, small_box(), CellListOptions::default()).unwrap();
        assert_eq!(pair_swapped.small().len(), 3);
        assert!(pair_swapped.swap());
    }
}
