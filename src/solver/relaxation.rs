//! Continuous relaxation of the densest consistent subgraph problem.
//!
//! Maximises `u' (M - d C̄) u` over the non-negative unit sphere, where `M`
//! is the affinity matrix and `C̄` marks incompatible pairs. The inner loop
//! is projected gradient ascent with backtracking; the outer loop grows the
//! penalty `d` until the support of `u` contains no incompatible pair.

use nalgebra::{DMatrix, DVector};
use tracing::trace;

use crate::settings::SolverSettings;

/// Result of the relaxation.
#[derive(Debug, Clone)]
pub struct Relaxed {
    pub u: DVector<f64>,
    pub objective: f64,
    pub penalty: f64,
    pub outer_iterations: usize,
    pub inner_iterations: usize,
}

fn objective(m: &DMatrix<f64>, cbar: &DMatrix<f64>, d: f64, u: &DVector<f64>) -> f64 {
    u.dot(&(m * u)) - d * u.dot(&(cbar * u))
}

/// Clamp to the non-negative orthant and renormalise.
fn project(mut v: DVector<f64>) -> Option<DVector<f64>> {
    v.iter_mut().for_each(|x| {
        if !(*x > 0.0) {
            *x = 0.0;
        }
    });
    let norm = v.norm();
    if norm > 0.0 && norm.is_finite() {
        Some(v / norm)
    } else {
        None
    }
}

/// Indicator of incompatible pairs (zero diagonal).
pub(crate) fn incompatibility(constraint: &DMatrix<f64>) -> DMatrix<f64> {
    let n = constraint.nrows();
    DMatrix::from_fn(n, n, |i, j| {
        if i != j && constraint[(i, j)] == 0.0 {
            1.0
        } else {
            0.0
        }
    })
}

fn support_is_consistent(u: &DVector<f64>, cbar: &DMatrix<f64>, tol: f64) -> bool {
    let support: Vec<usize> = (0..u.len()).filter(|&i| u[i] > tol).collect();
    for (a, &i) in support.iter().enumerate() {
        for &j in &support[a + 1..] {
            if cbar[(i, j)] != 0.0 {
                return false;
            }
        }
    }
    true
}

pub fn relax(
    affinity: &DMatrix<f64>,
    constraint: &DMatrix<f64>,
    settings: &SolverSettings,
) -> Relaxed {
    let n = affinity.nrows();
    if n == 0 {
        return Relaxed {
            u: DVector::zeros(0),
            objective: 0.0,
            penalty: 0.0,
            outer_iterations: 0,
            inner_iterations: 0,
        };
    }

    let cbar = incompatibility(constraint);
    let mut u = DVector::from_element(n, 1.0 / (n as f64).sqrt());
    let mut d = 0.0;
    let mut f = objective(affinity, &cbar, d, &u);
    let mut outer_iterations = 0;
    let mut inner_iterations = 0;

    for _ in 0..settings.max_outer_iterations {
        outer_iterations += 1;

        for _ in 0..settings.max_inner_iterations {
            inner_iterations += 1;
            let grad = (affinity * &u - &cbar * &u * d) * 2.0;

            let mut alpha = 1.0;
            let mut accepted = None;
            for _ in 0..settings.max_line_search {
                if let Some(next) = project(&u + &grad * alpha) {
                    let f_next = objective(affinity, &cbar, d, &next);
                    if f_next >= f {
                        accepted = Some((next, f_next));
                        break;
                    }
                }
                alpha *= settings.beta;
            }

            let Some((next, f_next)) = accepted else {
                break;
            };
            let du = (&next - &u).norm();
            let df = (f_next - f).abs();
            u = next;
            f = f_next;
            if du < settings.tol_u || df < settings.tol_f {
                break;
            }
        }

        if support_is_consistent(&u, &cbar, settings.support_tolerance) {
            break;
        }
        d = if d == 0.0 {
            settings.initial_penalty
        } else {
            d * settings.penalty_growth
        };
        f = objective(affinity, &cbar, d, &u);
        trace!(penalty = d, objective = f, "raising incompatibility penalty");
    }

    Relaxed {
        u,
        objective: f,
        penalty: d,
        outer_iterations,
        inner_iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_problem_is_trivial() {
        let m = DMatrix::<f64>::zeros(0, 0);
        let r = relax(&m, &m, &SolverSettings::default());
        assert_eq!(r.u.len(), 0);
        assert_eq!(r.outer_iterations, 0);
    }

    #[test]
    fn solution_is_non_negative_unit_vector() {
        let n = 4;
        let m = DMatrix::from_fn(n, n, |i, j| if i == j { 1.0 } else { 0.5 });
        let c = DMatrix::from_element(n, n, 1.0);
        let r = relax(&m, &c, &SolverSettings::default());
        assert!((r.u.norm() - 1.0).abs() < 1e-9);
        assert!(r.u.iter().all(|&x| x >= 0.0));
    }

    #[test]
    fn mass_concentrates_on_the_larger_clique() {
        // 0-1-2 form a clique; 3-4 form another; the cliques are incompatible.
        let n = 5;
        let clique = |i: usize, j: usize| (i < 3 && j < 3) || (i >= 3 && j >= 3);
        let m = DMatrix::from_fn(n, n, |i, j| if clique(i, j) { 1.0 } else { 0.0 });
        let c = DMatrix::from_fn(n, n, |i, j| if clique(i, j) { 1.0 } else { 0.0 });
        let r = relax(&m, &c, &SolverSettings::default());
        assert!(r.u[0] > r.u[3]);
        assert!(r.u[1] > r.u[4]);
        assert!(support_is_consistent(&r.u, &incompatibility(&c), 1e-8));
    }

    #[test]
    fn incompatibility_has_zero_diagonal() {
        let c = DMatrix::<f64>::zeros(3, 3);
        let cbar = incompatibility(&c);
        for i in 0..3 {
            assert_eq!(cbar[(i, i)], 0.0);
        }
        assert_eq!(cbar[(0, 1)], 1.0);
    }
}
