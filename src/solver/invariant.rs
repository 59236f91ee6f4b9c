//! Euclidean-distance pairwise consistency.

use crate::error::SolverError;
use crate::settings::EuclideanDistanceParams;
use crate::types::{AffinityMatrix, Candidate, ConstraintMatrix, DataMatrix};

/// Scores two candidates by how well they preserve the distance between
/// their landmarks.
#[derive(Debug, Clone, Copy)]
pub struct EuclideanDistance {
    params: EuclideanDistanceParams,
}

impl EuclideanDistance {
    pub fn new(params: EuclideanDistanceParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> EuclideanDistanceParams {
        self.params
    }

    /// Affinity for a pair of distances, `None` when they differ by
    /// `epsilon` or more.
    pub fn consistency(&self, d1: f64, d2: f64) -> Option<f64> {
        let c = (d1 - d2).abs();
        if c < self.params.epsilon {
            let sigma = self.params.sigma;
            Some((-0.5 * c * c / (sigma * sigma)).exp())
        } else {
            None
        }
    }

    /// Build the `K x K` affinity and constraint matrices.
    ///
    /// `points1` and `points2` are `3 x N` column matrices. Candidates that
    /// reuse a landmark are incompatible. Both diagonals are one.
    pub fn score(
        &self,
        points1: &DataMatrix,
        points2: &DataMatrix,
        candidates: &[Candidate],
    ) -> Result<(AffinityMatrix, ConstraintMatrix), SolverError> {
        if points1.nrows() != 3 || points2.nrows() != 3 {
            return Err(SolverError::DimensionMismatch(format!(
                "points must be 3xN, got {}x{} and {}x{}",
                points1.nrows(),
                points1.ncols(),
                points2.nrows(),
                points2.ncols()
            )));
        }
        if let Some(bad) = candidates
            .iter()
            .find(|c| c.first >= points1.ncols() || c.second >= points2.ncols())
        {
            return Err(SolverError::DimensionMismatch(format!(
                "candidate ({}, {}) out of bounds for {} and {} points",
                bad.first,
                bad.second,
                points1.ncols(),
                points2.ncols()
            )));
        }

        let k = candidates.len();
        let mut affinity = AffinityMatrix::identity(k, k);
        let mut constraint = ConstraintMatrix::identity(k, k);

        for a in 0..k {
            let ca = candidates[a];
            for b in (a + 1)..k {
                let cb = candidates[b];
                if ca.shares_index(&cb) {
                    continue;
                }
                let d1 = (points1.column(ca.first) - points1.column(cb.first)).norm();
                let d2 = (points2.column(ca.second) - points2.column(cb.second)).norm();
                if let Some(s) = self.consistency(d1, d2) {
                    affinity[(a, b)] = s;
                    affinity[(b, a)] = s;
                    constraint[(a, b)] = 1.0;
                    constraint[(b, a)] = 1.0;
                }
            }
        }

        Ok((affinity, constraint))
    }
}
