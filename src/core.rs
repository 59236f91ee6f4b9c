//! Core traits and the scored/weighted solver session.
//!
//! The solver is an external collaborator: it scores pairwise consistency,
//! accepts replacement matrices and solves. The matcher drives it through a
//! small typestate machine so that the required order
//! (score, then inject weights, then solve) cannot be violated:
//!
//! ```text
//! solver --score--> ScoredSession --inject_weights--> WeightedSession --solve--> selection
//! ```
//!
//! Each transition consumes the previous state, and each session owns its
//! solver, so one solver instance never serves two match requests.

use tracing::{debug, trace};

use crate::error::{MatchError, SolverError};
use crate::settings::Invariant;
use crate::types::{AffinityMatrix, Candidate, ConstraintMatrix, DataMatrix};

/// Maps a normalized size difference to a confidence weight.
pub trait WeightFunction {
    /// Weight for `metric` given the configured `size_limit`.
    ///
    /// Implementations must be non-increasing in `metric`, maximal at
    /// `metric = 0`, finite and minimal at `metric = +inf`, and must not
    /// assume `metric < size_limit`.
    fn weight(&self, metric: f64, size_limit: f64) -> f64;
}

impl<W: WeightFunction + ?Sized> WeightFunction for &W {
    fn weight(&self, metric: f64, size_limit: f64) -> f64 {
        (**self).weight(metric, size_limit)
    }
}

impl<W: WeightFunction + ?Sized> WeightFunction for Box<W> {
    fn weight(&self, metric: f64, size_limit: f64) -> f64 {
        (**self).weight(metric, size_limit)
    }
}

/// Pairwise-consistency graph solver.
pub trait ConsistencySolver {
    /// Select the geometric invariant and its tolerances.
    fn configure(&mut self, invariant: Invariant) -> Result<(), SolverError>;

    /// Compute the base affinity and constraint matrices for `candidates`.
    ///
    /// Points are given in the `3 x N` column layout. Both returned matrices
    /// are `K x K` with `K = candidates.len()`.
    fn score_pairwise_consistency(
        &mut self,
        points1: &DataMatrix,
        points2: &DataMatrix,
        candidates: &[Candidate],
    ) -> Result<(AffinityMatrix, ConstraintMatrix), SolverError>;

    /// Replace the solver's working matrices.
    fn set_matrix_data(
        &mut self,
        affinity: AffinityMatrix,
        constraint: ConstraintMatrix,
    ) -> Result<(), SolverError>;

    /// Run the optimisation on the working matrices.
    fn solve(&mut self) -> Result<(), SolverError>;

    /// Selected candidates, in landmark index space.
    fn selected_associations(&self) -> Vec<Candidate>;
}

impl<S: ConsistencySolver + ?Sized> ConsistencySolver for &mut S {
    fn configure(&mut self, invariant: Invariant) -> Result<(), SolverError> {
        (**self).configure(invariant)
    }

    fn score_pairwise_consistency(
        &mut self,
        points1: &DataMatrix,
        points2: &DataMatrix,
        candidates: &[Candidate],
    ) -> Result<(AffinityMatrix, ConstraintMatrix), SolverError> {
        (**self).score_pairwise_consistency(points1, points2, candidates)
    }

    fn set_matrix_data(
        &mut self,
        affinity: AffinityMatrix,
        constraint: ConstraintMatrix,
    ) -> Result<(), SolverError> {
        (**self).set_matrix_data(affinity, constraint)
    }

    fn solve(&mut self) -> Result<(), SolverError> {
        (**self).solve()
    }

    fn selected_associations(&self) -> Vec<Candidate> {
        (**self).selected_associations()
    }
}

/// Overwrite the diagonal of `affinity` with `weights`, entry `i` with
/// `weights[i]`. Off-diagonal entries are untouched.
pub fn inject_diagonal(affinity: &mut AffinityMatrix, weights: &[f64]) -> Result<(), MatchError> {
    if !affinity.is_square() {
        return Err(MatchError::ShapeMismatch {
            what: "affinity columns",
            expected: affinity.nrows(),
            actual: affinity.ncols(),
        });
    }
    if weights.len() != affinity.nrows() {
        return Err(MatchError::ShapeMismatch {
            what: "diagonal weights",
            expected: affinity.nrows(),
            actual: weights.len(),
        });
    }
    for (i, &w) in weights.iter().enumerate() {
        affinity[(i, i)] = w;
    }
    Ok(())
}

fn check_square(m: &DataMatrix, k: usize, what: &'static str) -> Result<(), MatchError> {
    if m.nrows() != k {
        return Err(MatchError::ShapeMismatch {
            what,
            expected: k,
            actual: m.nrows(),
        });
    }
    if m.ncols() != k {
        return Err(MatchError::ShapeMismatch {
            what,
            expected: k,
            actual: m.ncols(),
        });
    }
    Ok(())
}

/// A solver that has scored a candidate list. Holds the base matrices.
pub struct ScoredSession<S> {
    solver: S,
    candidates: Vec<Candidate>,
    affinity: AffinityMatrix,
    constraint: ConstraintMatrix,
}

impl<S: ConsistencySolver> ScoredSession<S> {
    /// Configure `solver` and score `candidates` against the two point sets
    /// (`3 x N` layout).
    pub fn score(
        mut solver: S,
        invariant: Invariant,
        points1: &DataMatrix,
        points2: &DataMatrix,
        candidates: Vec<Candidate>,
    ) -> Result<Self, MatchError> {
        solver.configure(invariant)?;
        let (affinity, constraint) =
            solver.score_pairwise_consistency(points1, points2, &candidates)?;
        let k = candidates.len();
        check_square(&affinity, k, "affinity matrix")?;
        check_square(&constraint, k, "constraint matrix")?;
        trace!(candidates = k, "scored pairwise consistency");
        Ok(Self {
            solver,
            candidates,
            affinity,
            constraint,
        })
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn affinity(&self) -> &AffinityMatrix {
        &self.affinity
    }

    pub fn constraint(&self) -> &ConstraintMatrix {
        &self.constraint
    }

    /// Put `weights[i]` on the affinity diagonal for the `i`-th scored
    /// candidate. The constraint matrix passes through unchanged.
    pub fn inject_weights(self, weights: &[f64]) -> Result<WeightedSession<S>, MatchError> {
        let Self {
            solver,
            candidates,
            mut affinity,
            constraint,
        } = self;
        inject_diagonal(&mut affinity, weights)?;
        debug!(candidates = candidates.len(), "injected diagonal weights");
        Ok(WeightedSession {
            solver,
            candidates,
            affinity,
            constraint,
        })
    }
}

/// A scored session whose affinity diagonal carries external weights.
pub struct WeightedSession<S> {
    solver: S,
    candidates: Vec<Candidate>,
    affinity: AffinityMatrix,
    constraint: ConstraintMatrix,
}

impl<S: ConsistencySolver> WeightedSession<S> {
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn affinity(&self) -> &AffinityMatrix {
        &self.affinity
    }

    pub fn constraint(&self) -> &ConstraintMatrix {
        &self.constraint
    }

    /// Hand the modified matrices back to the solver, solve, and return the
    /// selected associations.
    pub fn solve(self) -> Result<Vec<Candidate>, MatchError> {
        let Self {
            mut solver,
            affinity,
            constraint,
            ..
        } = self;
        solver.set_matrix_data(affinity, constraint)?;
        solver.solve()?;
        Ok(solver.selected_associations())
    }
}
