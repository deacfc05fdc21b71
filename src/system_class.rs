//! Heuristic dispatch between inner-loop strategies.
//!
//! A cell list's scale and density determine whether projection-pruning the
//! cross-cell inner loop pays for the sort it requires, and whether a
//! traversal is worth handing to the thread pool at all. The thresholds
//! below are `pub const` so callers who profile their own workload can
//! reimplement the dispatch; `CellListOptions`/`MapPairwiseOptions` do not
//! currently expose them directly, since overriding them is an escape hatch
//! rather than everyday tuning.

/// Coarse classification of a cell list's scale and density.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystemClass {
    Tiny,
    MediumSparse,
    MediumDense,
    LargeSparse,
    LargeDense,
}

/// Below this many non-empty cells, parallel dispatch overhead outweighs the
/// benefit; traversal runs serially regardless of the `parallel` option.
pub const PARALLEL_CELL_THRESHOLD: usize = 64;

/// Particle count boundary between "medium" and "large" system classes.
pub const LARGE_PARTICLE_THRESHOLD: usize = 50_000;

/// Particle count boundary between "tiny" and "medium" system classes.
pub const TINY_PARTICLE_THRESHOLD: usize = 256;

/// Average particles-per-occupied-cell boundary between "sparse" and
/// "dense".
pub const DENSE_OCCUPANCY_THRESHOLD: f64 = 4.0;

/// Minimum `|A| * |B|` product for a cross-cell pair before projection
/// pruning is worth the sort it requires.
pub const DENSE_PAIR_THRESHOLD: usize = 48;

impl SystemClass {
    pub fn use_dense_pruning(self) -> bool {
        matches!(self, SystemClass::MediumDense | SystemClass::LargeDense)
    }

    pub fn parallel_friendly(self) -> bool {
        !matches!(self, SystemClass::Tiny)
    }
}

/// Classifies a cell list from its particle count and occupied-cell count.
pub fn classify(particle_count: usize, occupied_cells: usize) -> SystemClass {
    if particle_count < TINY_PARTICLE_THRESHOLD {
        return SystemClass::Tiny;
    }
    let occupancy = if occupied_cells == 0 {
        0.0
    } else {
        particle_count as f64 / occupied_cells as f64
    };
    let dense = occupancy >= DENSE_OCCUPANCY_THRESHOLD;
    if particle_count >= LARGE_PARTICLE_THRESHOLD {
        if dense {
            SystemClass::LargeDense
        } else {
            SystemClass::LargeSparse
        }
    } else if dense {
        SystemClass::MediumDense
    } else {
        SystemClass::MediumSparse
    }
}

/// Picks a default number of map-phase batches for `work_items` units of
/// work, aiming for a handful of batches per thread so that late-finishing
/// threads can steal more work.
pub fn default_map_batches(work_items: usize) -> usize {
    let threads = rayon::current_num_threads().max(1);
    (work_items / 64).clamp(1, threads * 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_systems_never_use_dense_pruning() {
        assert_eq!(classify(10, 5), SystemClass::Tiny);
        assert!(!SystemClass::Tiny.use_dense_pruning());
    }

    #[test]
    fn dense_occupancy_crosses_into_dense_class() {
        assert_eq!(classify(1_000, 10), SystemClass::MediumDense);
        assert_eq!(classify(1_000, 1_000), SystemClass::MediumSparse);
    }

    #[test]
    fn large_particle_count_crosses_into_large_class() {
        assert_eq!(classify(100_000, 100_000), SystemClass::LargeSparse);
        assert_eq!(classify(100_000, 1_000), SystemClass::LargeDense);
    }
}
