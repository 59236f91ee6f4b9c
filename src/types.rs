//! Core shared types for landmark association.
//!
//! Positions are stored the way callers usually hold them: one landmark per
//! row (`N x 3`). The consistency solver works on the transposed `3 x N`
//! column layout, see [`LandmarkSet::column_points`].

use nalgebra::{DMatrix, Matrix3};

use crate::error::MatchError;

/// Dynamic matrix of `f64` used for point sets and solver matrices.
pub type DataMatrix = DMatrix<f64>;

/// Square `K x K` pairwise affinity matrix over the filtered candidates.
pub type AffinityMatrix = DMatrix<f64>;

/// Square `K x K` binary compatibility matrix over the filtered candidates.
pub type ConstraintMatrix = DMatrix<f64>;

/// A proposed correspondence between landmark `first` of set 1 and landmark
/// `second` of set 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Candidate {
    pub first: usize,
    pub second: usize,
}

impl Candidate {
    pub fn new(first: usize, second: usize) -> Self {
        Self { first, second }
    }

    /// True if the two candidates reuse a landmark from either set.
    pub fn shares_index(&self, other: &Candidate) -> bool {
        self.first == other.first || self.second == other.second
    }
}

impl From<(usize, usize)> for Candidate {
    fn from((first, second): (usize, usize)) -> Self {
        Self::new(first, second)
    }
}

impl From<Candidate> for (usize, usize) {
    fn from(c: Candidate) -> Self {
        (c.first, c.second)
    }
}

/// An immutable, shape-checked set of landmarks.
///
/// Covariances are carried for API compatibility with upstream producers but
/// are never read by the matcher.
#[derive(Debug, Clone)]
pub struct LandmarkSet {
    positions: DataMatrix,
    sizes: Vec<f64>,
    covariances: Option<Vec<Matrix3<f64>>>,
}

impl LandmarkSet {
    /// Build a landmark set from an `N x 3` position matrix and `N` sizes.
    pub fn new(positions: DataMatrix, sizes: Vec<f64>) -> Result<Self, MatchError> {
        if positions.ncols() != 3 {
            return Err(MatchError::ShapeMismatch {
                what: "position columns",
                expected: 3,
                actual: positions.ncols(),
            });
        }
        if sizes.len() != positions.nrows() {
            return Err(MatchError::ShapeMismatch {
                what: "landmark sizes",
                expected: positions.nrows(),
                actual: sizes.len(),
            });
        }
        Ok(Self {
            positions,
            sizes,
            covariances: None,
        })
    }

    /// Build a landmark set from row tuples, mostly convenient in tests.
    pub fn from_rows(points: &[[f64; 3]], sizes: &[f64]) -> Result<Self, MatchError> {
        let flat: Vec<f64> = points.iter().flatten().copied().collect();
        let positions = DataMatrix::from_row_slice(points.len(), 3, &flat);
        Self::new(positions, sizes.to_vec())
    }

    /// Attach per-landmark position covariances.
    pub fn with_covariances(mut self, covariances: Vec<Matrix3<f64>>) -> Result<Self, MatchError> {
        if covariances.len() != self.len() {
            return Err(MatchError::ShapeMismatch {
                what: "landmark covariances",
                expected: self.len(),
                actual: covariances.len(),
            });
        }
        self.covariances = Some(covariances);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Row-major `N x 3` positions.
    pub fn positions(&self) -> &DataMatrix {
        &self.positions
    }

    pub fn sizes(&self) -> &[f64] {
        &self.sizes
    }

    pub fn covariances(&self) -> Option<&[Matrix3<f64>]> {
        self.covariances.as_deref()
    }

    /// Positions in the `3 x N` column layout expected by the solver.
    pub fn column_points(&self) -> DataMatrix {
        self.positions.transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landmark_set_rejects_size_count_mismatch() {
        let positions = DataMatrix::zeros(3, 3);
        let err = LandmarkSet::new(positions, vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            MatchError::ShapeMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn landmark_set_rejects_non_3d_positions() {
        let positions = DataMatrix::zeros(2, 2);
        assert!(LandmarkSet::new(positions, vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn landmark_set_rejects_covariance_count_mismatch() {
        let set = LandmarkSet::from_rows(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]], &[1.0, 1.0]).unwrap();
        assert!(set.with_covariances(vec![Matrix3::zeros()]).is_err());
    }

    #[test]
    fn column_points_transposes_rows() {
        let set = LandmarkSet::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], &[1.0, 1.0]).unwrap();
        let cols = set.column_points();
        assert_eq!(cols.nrows(), 3);
        assert_eq!(cols.ncols(), 2);
        assert_eq!(cols[(0, 1)], 4.0);
        assert_eq!(cols[(2, 0)], 3.0);
    }

    #[test]
    fn candidates_sharing_an_index_are_detected() {
        let a = Candidate::new(0, 1);
        assert!(a.shares_index(&Candidate::new(0, 2)));
        assert!(a.shares_index(&Candidate::new(3, 1)));
        assert!(!a.shares_index(&Candidate::new(2, 0)));
    }
}
