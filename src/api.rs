//! High-level landmark matching API.
//!
//! [`EuclideanLandmarkMatcher`] runs the full pipeline: dense candidates,
//! size filtering and weighting, consistency scoring, diagonal weight
//! injection, and solving.

use tracing::{debug, info};

use crate::candidates::generate_candidates;
use crate::choices::WeightChoice;
use crate::core::{ConsistencySolver, ScoredSession, WeightFunction};
use crate::error::MatchError;
use crate::settings::MatcherSettings;
use crate::size_filter::{FilteredCandidates, SizeConsistencyFilter};
use crate::solver::ClipperSolver;
use crate::types::{Candidate, LandmarkSet};

/// Result of a landmark match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchResult {
    /// Mutually consistent associations, as landmark index pairs.
    pub selected: Vec<Candidate>,
    /// Candidates that passed the size filter, in scoring order.
    pub viable: Vec<Candidate>,
    /// Weights injected on the affinity diagonal, aligned with `viable`.
    pub weights: Vec<f64>,
    /// Size of the dense candidate list before filtering.
    pub candidate_count: usize,
}

impl MatchResult {
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        self.selected.iter().map(|&c| c.into()).collect()
    }
}

/// Matches two landmark sets using size-weighted pairwise consistency.
pub struct EuclideanLandmarkMatcher<W = WeightChoice> {
    settings: MatcherSettings,
    weight_fn: W,
}

impl EuclideanLandmarkMatcher<WeightChoice> {
    /// Build a matcher using the weight policy named in `settings`.
    pub fn new(settings: MatcherSettings) -> Result<Self, MatchError> {
        let weight_fn = WeightChoice::from(settings.weighting);
        Self::with_weight_function(settings, weight_fn)
    }
}

impl<W: WeightFunction> EuclideanLandmarkMatcher<W> {
    /// Build a matcher with a custom weight policy. `settings.weighting` is
    /// ignored.
    pub fn with_weight_function(settings: MatcherSettings, weight_fn: W) -> Result<Self, MatchError> {
        settings.validate()?;
        Ok(Self {
            settings,
            weight_fn,
        })
    }

    pub fn settings(&self) -> &MatcherSettings {
        &self.settings
    }

    /// Candidates that survive the size filter, with their weights.
    pub fn viable_candidates(
        &self,
        set1: &LandmarkSet,
        set2: &LandmarkSet,
    ) -> Result<FilteredCandidates, MatchError> {
        let candidates = generate_candidates(set1.len(), set2.len());
        let filter = SizeConsistencyFilter::new(
            self.settings.size_limit,
            self.settings.size_tolerance,
            &self.weight_fn,
        );
        filter.filter(&candidates, set1.sizes(), set2.sizes())
    }

    /// Match using a fresh [`ClipperSolver`] built from the settings.
    pub fn find_associations(
        &self,
        set1: &LandmarkSet,
        set2: &LandmarkSet,
    ) -> Result<MatchResult, MatchError> {
        let solver = ClipperSolver::new(self.settings.solver.clone());
        self.find_associations_with(solver, set1, set2)
    }

    /// Match using the given solver. The solver is consumed so that a single
    /// instance cannot serve two requests.
    pub fn find_associations_with<S: ConsistencySolver>(
        &self,
        solver: S,
        set1: &LandmarkSet,
        set2: &LandmarkSet,
    ) -> Result<MatchResult, MatchError> {
        let candidate_count = set1.len() * set2.len();
        let FilteredCandidates {
            candidates: viable,
            weights,
        } = self.viable_candidates(set1, set2)?;

        debug!(
            candidates = candidate_count,
            viable = viable.len(),
            size_limit = self.settings.size_limit,
            "size filter applied"
        );

        if viable.is_empty() {
            info!(event = "match_end", selected = 0, "no viable candidates");
            return Ok(MatchResult {
                candidate_count,
                ..MatchResult::default()
            });
        }

        let session = ScoredSession::score(
            solver,
            self.settings.invariant(),
            &set1.column_points(),
            &set2.column_points(),
            viable.clone(),
        )?;
        let selected = session.inject_weights(&weights)?.solve()?;

        info!(
            event = "match_end",
            candidates = candidate_count,
            viable = viable.len(),
            selected = selected.len(),
        );

        Ok(MatchResult {
            selected,
            viable,
            weights,
            candidate_count,
        })
    }
}

/// Match two landmark sets with default solver settings and the linear ramp
/// weight policy.
pub fn find_associations(
    set1: &LandmarkSet,
    set2: &LandmarkSet,
    epsilon: f64,
    size_limit: f64,
) -> Result<MatchResult, MatchError> {
    EuclideanLandmarkMatcher::new(MatcherSettings::new(epsilon, size_limit))?
        .find_associations(set1, set2)
}
