//! Reference pairwise-consistency solver.
//!
//! [`ClipperSolver`] is a compact, dependency-free stand-in for the CLIPPER
//! graph solver. It implements the [`ConsistencySolver`] protocol used by the
//! matcher: configure an invariant, score candidates, accept replacement
//! matrices, solve, report the selection. Any other solver implementing the
//! trait can be plugged in instead.

pub mod invariant;
pub mod relaxation;
pub mod rounding;

pub use invariant::EuclideanDistance;
pub use relaxation::Relaxed;

use tracing::debug;

use crate::core::ConsistencySolver;
use crate::error::SolverError;
use crate::settings::{Invariant, SolverSettings};
use crate::types::{AffinityMatrix, Candidate, ConstraintMatrix, DataMatrix};

/// Outcome of a solve, in filtered-candidate index space.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Indices into the scored candidate list, ascending.
    pub nodes: Vec<usize>,
    pub relaxed: Relaxed,
}

/// Dense-subgraph solver over a Euclidean-distance consistency graph.
#[derive(Debug, Clone, Default)]
pub struct ClipperSolver {
    settings: SolverSettings,
    invariant: Option<EuclideanDistance>,
    candidates: Vec<Candidate>,
    affinity: Option<AffinityMatrix>,
    constraint: Option<ConstraintMatrix>,
    solution: Option<Solution>,
}

impl ClipperSolver {
    pub fn new(settings: SolverSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    pub fn affinity_matrix(&self) -> Option<&AffinityMatrix> {
        self.affinity.as_ref()
    }

    pub fn constraint_matrix(&self) -> Option<&ConstraintMatrix> {
        self.constraint.as_ref()
    }

    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }
}

impl ConsistencySolver for ClipperSolver {
    fn configure(&mut self, invariant: Invariant) -> Result<(), SolverError> {
        let Invariant::EuclideanDistance(params) = invariant;
        if !(params.epsilon > 0.0 && params.sigma > 0.0) {
            return Err(SolverError::Failed(format!(
                "invariant needs positive epsilon and sigma, got {} and {}",
                params.epsilon, params.sigma
            )));
        }
        self.invariant = Some(EuclideanDistance::new(params));
        Ok(())
    }

    fn score_pairwise_consistency(
        &mut self,
        points1: &DataMatrix,
        points2: &DataMatrix,
        candidates: &[Candidate],
    ) -> Result<(AffinityMatrix, ConstraintMatrix), SolverError> {
        let invariant = self.invariant.ok_or(SolverError::NotConfigured)?;
        let (affinity, constraint) = invariant.score(points1, points2, candidates)?;
        self.candidates = candidates.to_vec();
        self.affinity = Some(affinity.clone());
        self.constraint = Some(constraint.clone());
        self.solution = None;
        Ok((affinity, constraint))
    }

    fn set_matrix_data(
        &mut self,
        affinity: AffinityMatrix,
        constraint: ConstraintMatrix,
    ) -> Result<(), SolverError> {
        let k = self.candidates.len();
        for (name, m) in [("affinity", &affinity), ("constraint", &constraint)] {
            if m.nrows() != k || m.ncols() != k {
                return Err(SolverError::DimensionMismatch(format!(
                    "{name} matrix is {}x{}, expected {k}x{k}",
                    m.nrows(),
                    m.ncols()
                )));
            }
        }
        self.affinity = Some(affinity);
        self.constraint = Some(constraint);
        self.solution = None;
        Ok(())
    }

    fn solve(&mut self) -> Result<(), SolverError> {
        let (Some(affinity), Some(constraint)) = (&self.affinity, &self.constraint) else {
            return Err(SolverError::NotScored);
        };
        let relaxed = relaxation::relax(affinity, constraint, &self.settings);
        let nodes = rounding::round(
            &relaxed.u,
            constraint,
            self.settings.rounding,
            self.settings.support_tolerance,
        );
        debug!(
            candidates = self.candidates.len(),
            selected = nodes.len(),
            outer_iterations = relaxed.outer_iterations,
            inner_iterations = relaxed.inner_iterations,
            "consistency graph solved"
        );
        self.solution = Some(Solution { nodes, relaxed });
        Ok(())
    }

    fn selected_associations(&self) -> Vec<Candidate> {
        self.solution
            .as_ref()
            .map(|s| s.nodes.iter().map(|&i| self.candidates[i]).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidates::generate_candidates;
    use crate::settings::{EuclideanDistanceParams, RoundingType, SolverSettings};
    use crate::synthetic::{SyntheticConfig, make_synthetic_landmarks};

    fn invariant() -> Invariant {
        Invariant::EuclideanDistance(EuclideanDistanceParams {
            epsilon: 0.05,
            sigma: 0.025,
        })
    }

    fn triangle() -> DataMatrix {
        DataMatrix::from_column_slice(3, 3, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0, 0.0])
    }

    #[test]
    fn scoring_before_configure_fails() {
        let mut solver = ClipperSolver::default();
        let pts = triangle();
        let err = solver
            .score_pairwise_consistency(&pts, &pts, &[Candidate::new(0, 0)])
            .unwrap_err();
        assert!(matches!(err, SolverError::NotConfigured));
    }

    #[test]
    fn solving_before_scoring_fails() {
        let mut solver = ClipperSolver::default();
        assert!(matches!(solver.solve(), Err(SolverError::NotScored)));
        assert!(solver.selected_associations().is_empty());
    }

    #[test]
    fn set_matrix_data_checks_dimensions() {
        let mut solver = ClipperSolver::default();
        solver.configure(invariant()).unwrap();
        let pts = triangle();
        let candidates = generate_candidates(3, 3);
        solver.score_pairwise_consistency(&pts, &pts, &candidates).unwrap();
        let err = solver
            .set_matrix_data(DataMatrix::zeros(2, 2), DataMatrix::zeros(9, 9))
            .unwrap_err();
        assert!(matches!(err, SolverError::DimensionMismatch(_)));
    }

    #[test]
    fn recovers_identity_on_identical_sets() {
        let mut solver = ClipperSolver::default();
        solver.configure(invariant()).unwrap();
        let pts = triangle();
        let candidates = generate_candidates(3, 3);
        let (a, c) = solver.score_pairwise_consistency(&pts, &pts, &candidates).unwrap();
        solver.set_matrix_data(a, c).unwrap();
        solver.solve().unwrap();
        assert_eq!(
            solver.selected_associations(),
            vec![Candidate::new(0, 0), Candidate::new(1, 1), Candidate::new(2, 2)]
        );
    }

    #[test]
    fn empty_problem_solves_to_empty_selection() {
        let mut solver = ClipperSolver::default();
        solver.configure(invariant()).unwrap();
        let pts = triangle();
        let (a, c) = solver.score_pairwise_consistency(&pts, &pts, &[]).unwrap();
        solver.set_matrix_data(a, c).unwrap();
        solver.solve().unwrap();
        assert!(solver.selected_associations().is_empty());
    }

    #[test]
    fn selection_is_pairwise_compatible() {
        let mut solver = ClipperSolver::default();
        solver.configure(invariant()).unwrap();
        let pts1 = triangle();
        let pts2 = DataMatrix::from_column_slice(
            3,
            4,
            &[5.0, 5.0, 5.0, 6.0, 5.0, 5.0, 5.0, 7.0, 5.0, 9.0, 9.0, 9.0],
        );
        let candidates = generate_candidates(3, 4);
        let (a, c) = solver.score_pairwise_consistency(&pts1, &pts2, &candidates).unwrap();
        solver.set_matrix_data(a, c.clone()).unwrap();
        solver.solve().unwrap();
        let nodes = &solver.solution().unwrap().nodes;
        assert_eq!(nodes.len(), 3);
        for &i in nodes {
            for &j in nodes {
                assert_eq!(c[(i, j)], 1.0);
            }
        }
        assert_eq!(
            solver.selected_associations(),
            vec![Candidate::new(0, 0), Candidate::new(1, 1), Candidate::new(2, 2)]
        );
    }

    #[test]
    fn nonzero_rounding_stays_consistent_when_penalty_loop_is_cut_short() {
        let scene = make_synthetic_landmarks(&SyntheticConfig::default()).unwrap();
        let settings = SolverSettings {
            rounding: RoundingType::Nonzero,
            max_outer_iterations: 1,
            ..SolverSettings::default()
        };
        let mut solver = ClipperSolver::new(settings);
        solver.configure(invariant()).unwrap();
        let candidates = generate_candidates(scene.set1.len(), scene.set2.len());
        let (a, c) = solver
            .score_pairwise_consistency(
                &scene.set1.column_points(),
                &scene.set2.column_points(),
                &candidates,
            )
            .unwrap();
        solver.set_matrix_data(a, c.clone()).unwrap();
        solver.solve().unwrap();

        let nodes = &solver.solution().unwrap().nodes;
        assert!(!nodes.is_empty());
        for &i in nodes {
            for &j in nodes {
                assert_eq!(c[(i, j)], 1.0, "candidates {i} and {j} conflict");
            }
        }
        let selected = solver.selected_associations();
        for (n, a) in selected.iter().enumerate() {
            assert!(selected[n + 1..].iter().all(|b| !a.shares_index(b)));
        }
    }
}
