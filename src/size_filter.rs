//! Size-consistency pre-filter.
//!
//! Each candidate is scored by the normalized size difference
//! `2 |s1 - s2| / (s1 + s2)` of its two landmarks. The metric is evaluated
//! once per candidate, the weight is derived from it before filtering, and
//! only candidates strictly below the size limit survive.

use crate::core::WeightFunction;
use crate::error::MatchError;
use crate::types::Candidate;

/// Size sums at or below this value are considered degenerate.
pub const DEFAULT_SIZE_TOLERANCE: f64 = 1e-12;

/// Normalized size difference, `+inf` when the size sum is (near) zero.
pub fn size_metric(size1: f64, size2: f64, tolerance: f64) -> f64 {
    let denom = size1 + size2;
    if denom > tolerance {
        2.0 * (size1 - size2).abs() / denom
    } else {
        f64::INFINITY
    }
}

/// Strict comparison: a metric equal to the limit is not viable.
pub fn is_viable(metric: f64, size_limit: f64) -> bool {
    metric < size_limit
}

/// Per-candidate outcome of the filter pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeEvaluation {
    pub candidate: Candidate,
    pub metric: f64,
    pub viable: bool,
    pub weight: f64,
}

/// Viable candidates together with their weights, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredCandidates {
    pub candidates: Vec<Candidate>,
    pub weights: Vec<f64>,
}

impl FilteredCandidates {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Classifies candidates by size consistency and weights them.
pub struct SizeConsistencyFilter<W> {
    size_limit: f64,
    tolerance: f64,
    weight_fn: W,
}

impl<W: WeightFunction> SizeConsistencyFilter<W> {
    pub fn new(size_limit: f64, tolerance: f64, weight_fn: W) -> Self {
        Self {
            size_limit,
            tolerance,
            weight_fn,
        }
    }

    pub fn size_limit(&self) -> f64 {
        self.size_limit
    }

    /// Evaluate metric, viability and weight for every candidate in one pass.
    pub fn evaluate(
        &self,
        candidates: &[Candidate],
        sizes1: &[f64],
        sizes2: &[f64],
    ) -> Result<Vec<SizeEvaluation>, MatchError> {
        let mut out = Vec::with_capacity(candidates.len());
        for &candidate in candidates {
            let size1 = lookup(sizes1, candidate.first, "candidate index into set 1")?;
            let size2 = lookup(sizes2, candidate.second, "candidate index into set 2")?;
            let metric = size_metric(size1, size2, self.tolerance);
            out.push(SizeEvaluation {
                candidate,
                metric,
                viable: is_viable(metric, self.size_limit),
                weight: self.weight_fn.weight(metric, self.size_limit),
            });
        }
        Ok(out)
    }

    /// Keep the viable candidates and their weights, preserving order.
    pub fn filter(
        &self,
        candidates: &[Candidate],
        sizes1: &[f64],
        sizes2: &[f64],
    ) -> Result<FilteredCandidates, MatchError> {
        let evaluations = self.evaluate(candidates, sizes1, sizes2)?;
        let mut filtered = FilteredCandidates::default();
        for eval in evaluations.into_iter().filter(|e| e.viable) {
            filtered.candidates.push(eval.candidate);
            filtered.weights.push(eval.weight);
        }
        Ok(filtered)
    }
}

fn lookup(sizes: &[f64], idx: usize, what: &'static str) -> Result<f64, MatchError> {
    sizes.get(idx).copied().ok_or(MatchError::ShapeMismatch {
        what,
        expected: sizes.len(),
        actual: idx + 1,
    })
}
