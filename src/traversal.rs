//! Per-cell and per-particle pairwise visiting logic shared by the serial
//! and parallel drivers in [`crate::parallel`].

use crate::cell_box::CellBox;
use crate::cell_list::{CellList, CellListPair};
use crate::math::{Point, Scalar};
use crate::records::{AtomRecord, Cell, ProjectedParticle};
use crate::system_class;

/// Visits every within-cutoff pair reachable from `cell`'s forward
/// neighborhood (including `cell` itself), folding `f` into `acc`.
pub(crate) fn process_cell<T, const N: usize, O, F>(
    cell_box: &CellBox<T, N>,
    cell_list: &CellList<T, N>,
    cell: &Cell<T, N>,
    use_dense: bool,
    mut acc: O,
    f: &F,
) -> O
where
    T: Scalar,
    F: Fn(Point<T, N>, Point<T, N>, u32, u32, T, O) -> O,
{
    let cutoff = cell_box.cutoff();
    let cutoff_sq = cell_box.cutoff_sq();
    for neighbor in cell_box.forward_neighbor_cells(cell.cartesian_index) {
        let neighbor_linear = cell_box.cell_index().linear_index(&neighbor);
        if cell_list.npcell(neighbor_linear) == 0 {
            continue;
        }
        acc = if neighbor_linear == cell.linear_index {
            visit_same_cell(cell_list, cell.linear_index, cutoff_sq, acc, f)
        } else {
            let axis = (cell_box.cell_center(&neighbor) - cell.center).normalize();
            visit_cross_cell(
                cell_list,
                cutoff,
                cutoff_sq,
                cell.linear_index,
                neighbor_linear,
                use_dense,
                &axis,
                acc,
                f,
            )
        };
    }
    acc
}

fn visit_same_cell<T, const N: usize, O, F>(
    cell_list: &CellList<T, N>,
    linear: usize,
    cutoff_sq: T,
    mut acc: O,
    f: &F,
) -> O
where
    T: Scalar,
    F: Fn(Point<T, N>, Point<T, N>, u32, u32, T, O) -> O,
{
    let records: Vec<AtomRecord<T, N>> = cell_list.chain(linear).collect();
    for i in 0..records.len() {
        for j in (i + 1)..records.len() {
            let u = records[i];
            let v = records[j];
            if u.original_index == v.original_index || !(u.is_real || v.is_real) {
                continue;
            }
            let d2 = (u.position - v.position).norm_squared();
            if d2 > cutoff_sq {
                continue;
            }
            acc = f(u.position, v.position, u.original_index, v.original_index, d2, acc);
        }
    }
    acc
}

#[allow(clippy::too_many_arguments)]
fn visit_cross_cell<T, const N: usize, O, F>(
    cell_list: &CellList<T, N>,
    cutoff: T,
    cutoff_sq: T,
    a: usize,
    b: usize,
    use_dense: bool,
    axis: &Point<T, N>,
    mut acc: O,
    f: &F,
) -> O
where
    T: Scalar,
    F: Fn(Point<T, N>, Point<T, N>, u32, u32, T, O) -> O,
{
    let a_records: Vec<AtomRecord<T, N>> = cell_list.chain(a).collect();
    let b_records: Vec<AtomRecord<T, N>> = cell_list.chain(b).collect();

    if use_dense && a_records.len() * b_records.len() >= system_class::DENSE_PAIR_THRESHOLD {
        return visit_cross_cell_dense(cutoff, cutoff_sq, axis, &a_records, &b_records, acc, f);
    }

    for u in &a_records {
        for v in &b_records {
            if u.original_index == v.original_index || !(u.is_real || v.is_real) {
                continue;
            }
            let d2 = (u.position - v.position).norm_squared();
            if d2 > cutoff_sq {
                continue;
            }
            acc = f(u.position, v.position, u.original_index, v.original_index, d2, acc);
        }
    }
    acc
}

/// Cross-cell traversal pruned by sorting the second cell's particles along
/// the axis joining the two cell centers, then binary-searching each window
/// of width `2 * cutoff` instead of scanning every pair.
fn visit_cross_cell_dense<T, const N: usize, O, F>(
    cutoff: T,
    cutoff_sq: T,
    axis: &Point<T, N>,
    a_records: &[AtomRecord<T, N>],
    b_records: &[AtomRecord<T, N>],
    mut acc: O,
    f: &F,
) -> O
where
    T: Scalar,
    F: Fn(Point<T, N>, Point<T, N>, u32, u32, T, O) -> O,
{
    let mut projected: Vec<ProjectedParticle<T, N>> = b_records
        .iter()
        .map(|r| ProjectedParticle {
            original_index: r.original_index,
            x_proj: r.position.dot(axis),
            position: r.position,
            is_real: r.is_real,
        })
        .collect();
    projected.sort_by(|p, q| p.x_proj.partial_cmp(&q.x_proj).unwrap());
    let proj_values: Vec<T> = projected.iter().map(|p| p.x_proj).collect();

    for u in a_records {
        let u_proj = u.position.dot(axis);
        let lo = proj_values.partition_point(|&p| p < u_proj - cutoff);
        let hi = proj_values.partition_point(|&p| p <= u_proj + cutoff);
        for v in &projected[lo..hi] {
            if u.original_index == v.original_index || !(u.is_real || v.is_real) {
                continue;
            }
            let d2 = (u.position - v.position).norm_squared();
            if d2 > cutoff_sq {
                continue;
            }
            acc = f(u.position, v.position, u.original_index, v.original_index, d2, acc);
        }
    }
    acc
}

/// Visits every within-cutoff pair between small-set particle `i0` and the
/// large set's neighborhood, restoring the caller's original `(x, y)`
/// ordering via `pair.swap()`.
pub(crate) fn process_small_particle<T, const N: usize, O, F>(
    cell_box: &CellBox<T, N>,
    pair: &CellListPair<T, N>,
    i0: usize,
    mut acc: O,
    f: &F,
) -> O
where
    T: Scalar,
    F: Fn(Point<T, N>, Point<T, N>, u32, u32, T, O) -> O,
{
    let cutoff_sq = cell_box.cutoff_sq();
    let x = pair.small()[i0];
    let i = (i0 + 1) as u32;
    let wrapped = cell_box.wrap(&x);
    let c = cell_box.cell_of(&wrapped);
    for neighbor in cell_box.all_neighbor_cells(c) {
        let linear = cell_box.cell_index().linear_index(&neighbor);
        if pair.large().npcell(linear) == 0 {
            continue;
        }
        for v in pair.large().chain(linear) {
            let d2 = (wrapped - v.position).norm_squared();
            if d2 > cutoff_sq {
                continue;
            }
            let j = v.original_index;
            acc = if pair.swap() {
                f(v.position, wrapped, j, i, d2, acc)
            } else {
                f(wrapped, v.position, i, j, d2, acc)
            };
        }
    }
    acc
}
