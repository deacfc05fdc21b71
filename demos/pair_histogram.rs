//! Builds a radial pair-distance histogram for a random 3D point cloud under
//! periodic boundary conditions, the way a radial distribution function (RDF)
//! pass over a simulation trajectory would.

use cellpair::{CellBox, CellBoxOptions, CellList, CellListOptions, MapPairwiseOptions};
use nalgebra::Vector3;
use rand::Rng;

const NBINS: usize = 20;

fn main() {
    let mut rng = rand::rng();
    let side = 20.0;
    let cutoff = 2.5;
    let n_particles = 5_000;

    let points: Vec<Vector3<f64>> = (0..n_particles)
        .map(|_| {
            Vector3::new(
                rng.random_range(0.0..side),
                rng.random_range(0.0..side),
                rng.random_range(0.0..side),
            )
        })
        .collect();

    let cell_box = CellBox::from_sides(
        Vector3::new(side, side, side),
        cutoff,
        CellBoxOptions::default(),
    )
    .unwrap();
    let cell_list = CellList::new(&points, cell_box.clone(), CellListOptions::default()).unwrap();

    let bin_width = cutoff / NBINS as f64;
    let histogram = cellpair::map_pairwise(
        &cell_box,
        &cell_list,
        vec![0u64; NBINS],
        |_x, _y, _i, _j, d2, mut acc| {
            let d = d2.sqrt();
            let bin = ((d / bin_width) as usize).min(NBINS - 1);
            acc[bin] += 1;
            acc
        },
        |mut a, b| {
            for k in 0..NBINS {
                a[k] += b[k];
            }
            a
        },
        MapPairwiseOptions::default(),
    )
    .unwrap();

    println!("radial pair histogram ({n_particles} particles, cutoff {cutoff}):");
    for (bin, count) in histogram.iter().enumerate() {
        let r_lo = bin as f64 * bin_width;
        let r_hi = r_lo + bin_width;
        println!("  [{r_lo:.2}, {r_hi:.2}): {count}");
    }
}
