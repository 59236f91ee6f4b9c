//! Turning the relaxed solution vector into a discrete selection.

use nalgebra::{DMatrix, DVector};
use ordered_float::OrderedFloat;

use crate::settings::RoundingType;

/// Selected filtered-candidate indices, ascending.
///
/// `Nonzero` returns the support of `u` when it is pairwise compatible. A
/// support that still holds conflicting candidates, as left behind when the
/// penalty loop runs out of outer iterations, is reduced with the greedy pass.
pub fn round(
    u: &DVector<f64>,
    constraint: &DMatrix<f64>,
    rounding: RoundingType,
    tolerance: f64,
) -> Vec<usize> {
    let mut selected = match rounding {
        RoundingType::Nonzero => {
            let support: Vec<usize> = (0..u.len()).filter(|&i| u[i] > tolerance).collect();
            if is_compatible(&support, constraint) {
                support
            } else {
                greedy(u, constraint, tolerance)
            }
        }
        RoundingType::Greedy => greedy(u, constraint, tolerance),
    };
    selected.sort_unstable();
    selected
}

fn is_compatible(nodes: &[usize], constraint: &DMatrix<f64>) -> bool {
    nodes
        .iter()
        .enumerate()
        .all(|(a, &i)| nodes[a + 1..].iter().all(|&j| constraint[(i, j)] != 0.0))
}

fn greedy(u: &DVector<f64>, constraint: &DMatrix<f64>, tolerance: f64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..u.len()).collect();
    // Highest value first, ties by index for determinism.
    order.sort_by_key(|&i| (std::cmp::Reverse(OrderedFloat(u[i])), i));

    let mut kept: Vec<usize> = Vec::new();
    for i in order {
        if u[i] <= tolerance {
            break;
        }
        if kept.iter().all(|&j| constraint[(i, j)] != 0.0) {
            kept.push(i);
        }
    }
    kept
}
