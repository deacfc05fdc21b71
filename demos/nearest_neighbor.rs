//! Finds, for every point in a small query set, its nearest neighbor among a
//! larger reference set, using the two-disjoint-set traversal.

use cellpair::{CellBox, CellBoxOptions, CellList, CellListOptions, MapPairwiseOptions};
use nalgebra::Vector2;
use rand::Rng;

fn main() {
    let mut rng = rand::rng();
    let side = 50.0;
    let cutoff = 3.0;

    let reference: Vec<Vector2<f64>> = (0..20_000)
        .map(|_| Vector2::new(rng.random_range(0.0..side), rng.random_range(0.0..side)))
        .collect();
    let query: Vec<Vector2<f64>> = (0..10)
        .map(|_| Vector2::new(rng.random_range(0.0..side), rng.random_range(0.0..side)))
        .collect();

    let cell_box = CellBox::from_sides(Vector2::new(side, side), cutoff, CellBoxOptions::default())
        .unwrap();
    let pair = CellList::new_pair(
        &query,
        &reference,
        cell_box.clone(),
        CellListOptions::default(),
    )
    .unwrap();

    let nearest: Vec<Option<(u32, f64)>> = cellpair::map_pairwise_pair(
        &cell_box,
        &pair,
        vec![None; query.len()],
        |_x, _y, i, j, d2, mut acc| {
            let idx = (i - 1) as usize;
            let d = d2.sqrt();
            match acc[idx] {
                Some((_, best)) if best <= d => {}
                _ => acc[idx] = Some((j - 1, d)),
            }
            acc
        },
        |mut a, b| {
            for k in 0..a.len() {
                match (a[k], b[k]) {
                    (Some((_, da)), Some((jb, db))) if db < da => a[k] = Some((jb, db)),
                    (None, Some(nb)) => a[k] = Some(nb),
                    _ => {}
                }
            }
            a
        },
        MapPairwiseOptions::default(),
    )
    .unwrap();

    for (q, best) in nearest.iter().enumerate() {
        match best {
            Some((ref_idx, dist)) => println!("query {q}: nearest reference point {ref_idx} at distance {dist:.3}"),
            None => println!("query {q}: no reference point within cutoff"),
        }
    }
}
