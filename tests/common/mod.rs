//! Naive O(M^2) reference used to cross-check the cell-list traversal.

use cellpair::math::{scalar_from_i64, scalar_to_f64};
use cellpair::{CellBox, Scalar};
use nalgebra::SVector;

/// All within-cutoff pairs `(i, j, d2)` with `i < j`, computed by brute force
/// against the minimum-image displacement under `cell_box`. Indices are
/// 1-based, matching the callback convention used by [`cellpair::map_pairwise`].
///
/// Returned as a sorted `Vec`, not a set: every distinct unordered particle
/// pair appears at most once by construction (the loop below never visits
/// the same `(i, j)` twice), so this is already the correct ground-truth
/// multiset to compare a traversal's output against. Callers comparing
/// against traversal output must also keep duplicates (sort a `Vec`, don't
/// dedup into a set) — collapsing into a set would hide a traversal that
/// double-reports a pair.
pub fn naive_pairs<T: Scalar, const N: usize>(
    points: &[SVector<T, N>],
    cell_box: &CellBox<T, N>,
) -> Vec<(u32, u32, u64)> {
    let cutoff_sq = cell_box.cutoff_sq();
    let wrapped: Vec<_> = points.iter().map(|p| cell_box.wrap(p)).collect();
    let mut out = Vec::new();
    for i in 0..wrapped.len() {
        for j in (i + 1)..wrapped.len() {
            let d2 = min_image_dist_sq(&wrapped[i], &wrapped[j], cell_box);
            if d2 <= cutoff_sq {
                out.push((i as u32 + 1, j as u32 + 1, quantize(d2)));
            }
        }
    }
    out.sort();
    out
}

/// Brute-force minimum-image distance: tries every periodic translation
/// within the box's image range and keeps the closest.
fn min_image_dist_sq<T: Scalar, const N: usize>(
    a: &SVector<T, N>,
    b: &SVector<T, N>,
    cell_box: &CellBox<T, N>,
) -> T {
    if !cell_box.is_periodic() {
        return (a - b).norm_squared();
    }
    let mut best = (a - b).norm_squared();
    for translated in translations(b, cell_box) {
        let d2 = (a - translated).norm_squared();
        if d2 < best {
            best = d2;
        }
    }
    best
}

/// Every lattice translation of `p` across the box's conservative image
/// range, one integer shift per axis combined via direct summation (not
/// matrix multiplication, since `unit_cell` columns are the lattice vectors).
fn translations<T: Scalar, const N: usize>(
    p: &SVector<T, N>,
    cell_box: &CellBox<T, N>,
) -> Vec<SVector<T, N>> {
    let ranges = cell_box.image_ranges();
    let mut out = vec![*p];
    for axis in 0..N {
        let (lo, hi) = ranges[axis];
        let col: SVector<T, N> = cell_box.unit_cell().column(axis).into_owned();
        let mut expanded = Vec::new();
        for base in &out {
            for k in lo..=hi {
                let scale: T = scalar_from_i64(k);
                expanded.push(base + col * scale);
            }
        }
        out = expanded;
    }
    out
}

/// Quantizes a squared distance for set membership comparisons that should
/// be insensitive to last-bit floating point noise.
fn quantize<T: Scalar>(d2: T) -> u64 {
    (scalar_to_f64(d2) * 1e9).round() as u64
}
