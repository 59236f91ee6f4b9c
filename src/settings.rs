//! Configuration types for the landmark matcher and the reference solver.
//!
//! Settings can be built in code or loaded from TOML:
//!
//! ```
//! use weighted_clipper::settings::{MatcherSettings, RoundingType, WeightingType};
//!
//! let settings = MatcherSettings::from_toml_str(r#"
//!     epsilon = 0.05
//!     size_limit = 0.4
//!     weighting = "exponential"
//!
//!     [solver]
//!     rounding = "nonzero"
//! "#).unwrap();
//!
//! assert_eq!(settings.weighting, WeightingType::Exponential);
//! assert_eq!(settings.solver.rounding, RoundingType::Nonzero);
//! assert!((settings.sigma() - 0.025).abs() < 1e-12);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MatchError;
use crate::size_filter::DEFAULT_SIZE_TOLERANCE;

/// Weight policy applied to the normalized size difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightingType {
    /// `1 - metric / size_limit`, clipped to `[0, 1]`.
    #[default]
    LinearRamp,
    /// `exp(-decay * metric / size_limit)`.
    Exponential,
    /// Every finite metric weighs the same; only the size filter applies.
    Constant,
}

/// How the relaxed solution vector is turned into a discrete selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingType {
    /// Every candidate with a non-vanishing entry in the solution vector.
    Nonzero,
    /// Walk candidates by decreasing solution value and keep each one that is
    /// compatible with everything kept so far.
    #[default]
    Greedy,
}

/// Parameters of the Euclidean-distance consistency invariant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EuclideanDistanceParams {
    /// Maximum allowed difference between paired distances.
    pub epsilon: f64,
    /// Width of the Gaussian turning distance differences into affinities.
    pub sigma: f64,
}

/// Geometric invariant the solver scores candidate pairs with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Invariant {
    EuclideanDistance(EuclideanDistanceParams),
}

/// Knobs of the reference dense-subgraph solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub rounding: RoundingType,
    /// Stop the inner ascent once the solution vector moves less than this.
    pub tol_u: f64,
    /// Stop the inner ascent once the objective changes less than this.
    pub tol_f: f64,
    pub max_inner_iterations: usize,
    pub max_outer_iterations: usize,
    /// Backtracking factor for the line search, in `(0, 1)`.
    pub beta: f64,
    pub max_line_search: usize,
    /// Penalty applied to incompatible pairs after the first outer iteration.
    pub initial_penalty: f64,
    pub penalty_growth: f64,
    /// Entries at or below this value are treated as outside the support.
    pub support_tolerance: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            rounding: RoundingType::Greedy,
            tol_u: 1e-8,
            tol_f: 1e-9,
            max_inner_iterations: 200,
            max_outer_iterations: 30,
            beta: 0.25,
            max_line_search: 20,
            initial_penalty: 1.0,
            penalty_growth: 2.0,
            support_tolerance: 1e-8,
        }
    }
}

impl SolverSettings {
    pub fn validate(&self) -> Result<(), MatchError> {
        if !(self.beta > 0.0 && self.beta < 1.0) {
            return Err(invalid(format!("solver beta must lie in (0, 1), got {}", self.beta)));
        }
        if !(self.tol_u >= 0.0 && self.tol_f >= 0.0 && self.support_tolerance >= 0.0) {
            return Err(invalid("solver tolerances must be non-negative".to_string()));
        }
        if !(self.initial_penalty > 0.0 && self.initial_penalty.is_finite()) {
            return Err(invalid(format!(
                "solver initial_penalty must be positive, got {}",
                self.initial_penalty
            )));
        }
        if !(self.penalty_growth > 1.0 && self.penalty_growth.is_finite()) {
            return Err(invalid(format!(
                "solver penalty_growth must exceed 1, got {}",
                self.penalty_growth
            )));
        }
        if self.max_inner_iterations == 0 || self.max_outer_iterations == 0 {
            return Err(invalid("solver iteration limits must be positive".to_string()));
        }
        Ok(())
    }
}

fn default_size_tolerance() -> f64 {
    DEFAULT_SIZE_TOLERANCE
}

/// Main configuration of a [`EuclideanLandmarkMatcher`](crate::api::EuclideanLandmarkMatcher).
///
/// `size_limit` is required and has no default. A non-positive limit is legal
/// and rejects nearly every candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherSettings {
    /// Euclidean invariant tolerance.
    pub epsilon: f64,
    /// Optional override; defaults to half of `epsilon`.
    #[serde(default)]
    pub sigma: Option<f64>,
    /// Upper bound (exclusive) on the normalized size difference.
    pub size_limit: f64,
    /// Size sums at or below this are treated as degenerate.
    #[serde(default = "default_size_tolerance")]
    pub size_tolerance: f64,
    #[serde(default)]
    pub weighting: WeightingType,
    #[serde(default)]
    pub solver: SolverSettings,
}

impl MatcherSettings {
    pub fn new(epsilon: f64, size_limit: f64) -> Self {
        Self {
            epsilon,
            sigma: None,
            size_limit,
            size_tolerance: DEFAULT_SIZE_TOLERANCE,
            weighting: WeightingType::default(),
            solver: SolverSettings::default(),
        }
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = Some(sigma);
        self
    }

    pub fn with_weighting(mut self, weighting: WeightingType) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn with_solver(mut self, solver: SolverSettings) -> Self {
        self.solver = solver;
        self
    }

    /// Effective sigma: the override, or half of `epsilon`.
    pub fn sigma(&self) -> f64 {
        self.sigma.unwrap_or(0.5 * self.epsilon)
    }

    pub fn invariant(&self) -> Invariant {
        Invariant::EuclideanDistance(EuclideanDistanceParams {
            epsilon: self.epsilon,
            sigma: self.sigma(),
        })
    }

    /// Reject settings that cannot produce a meaningful match.
    pub fn validate(&self) -> Result<(), MatchError> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(invalid(format!(
                "epsilon must be finite and positive, got {}",
                self.epsilon
            )));
        }
        if let Some(sigma) = self.sigma {
            if !(sigma.is_finite() && sigma > 0.0) {
                return Err(invalid(format!("sigma must be finite and positive, got {sigma}")));
            }
        }
        if self.size_limit.is_nan() {
            return Err(invalid("size_limit must not be NaN".to_string()));
        }
        if !(self.size_tolerance.is_finite() && self.size_tolerance >= 0.0) {
            return Err(invalid(format!(
                "size_tolerance must be finite and non-negative, got {}",
                self.size_tolerance
            )));
        }
        self.solver.validate()
    }

    /// Loads settings from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, MatchError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses settings from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, MatchError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, MatchError> {
        Ok(toml::to_string(self)?)
    }
}

fn invalid(msg: String) -> MatchError {
    MatchError::InvalidConfig(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigma_defaults_to_half_epsilon() {
        let settings = MatcherSettings::new(0.05, 0.4);
        assert!((settings.sigma() - 0.025).abs() < 1e-15);
        let Invariant::EuclideanDistance(params) = settings.invariant();
        assert!((params.epsilon - 0.05).abs() < 1e-15);
        assert!((params.sigma - 0.025).abs() < 1e-15);
    }

    #[test]
    fn sigma_override_wins() {
        let settings = MatcherSettings::new(0.05, 0.4).with_sigma(0.01);
        assert!((settings.sigma() - 0.01).abs() < 1e-15);
    }

    #[test]
    fn negative_epsilon_is_rejected() {
        let err = MatcherSettings::new(-0.1, 0.4).validate().unwrap_err();
        assert!(matches!(err, MatchError::InvalidConfig(_)));
    }

    #[test]
    fn nan_size_limit_is_rejected() {
        assert!(MatcherSettings::new(0.05, f64::NAN).validate().is_err());
    }

    #[test]
    fn non_positive_size_limit_is_legal() {
        assert!(MatcherSettings::new(0.05, 0.0).validate().is_ok());
        assert!(MatcherSettings::new(0.05, -1.0).validate().is_ok());
    }

    #[test]
    fn zero_sigma_override_is_rejected() {
        assert!(MatcherSettings::new(0.05, 0.4).with_sigma(0.0).validate().is_err());
    }

    #[test]
    fn bad_solver_settings_are_rejected() {
        let solver = SolverSettings {
            beta: 1.5,
            ..SolverSettings::default()
        };
        assert!(MatcherSettings::new(0.05, 0.4).with_solver(solver).validate().is_err());
    }

    #[test]
    fn toml_requires_size_limit() {
        let err = MatcherSettings::from_toml_str("epsilon = 0.05").unwrap_err();
        assert!(matches!(err, MatchError::Toml(_)));
    }

    #[test]
    fn toml_fills_defaults() {
        let settings = MatcherSettings::from_toml_str("epsilon = 0.1\nsize_limit = 0.3").unwrap();
        assert_eq!(settings.sigma, None);
        assert_eq!(settings.size_tolerance, DEFAULT_SIZE_TOLERANCE);
        assert_eq!(settings.weighting, WeightingType::LinearRamp);
        assert_eq!(settings.solver, SolverSettings::default());
    }

    #[test]
    fn toml_round_trips_through_string() {
        let settings = MatcherSettings::new(0.05, 0.4)
            .with_sigma(0.02)
            .with_weighting(WeightingType::Constant);
        let text = settings.to_toml_string().unwrap();
        assert_eq!(MatcherSettings::from_toml_str(&text).unwrap(), settings);
    }

    #[test]
    fn serializer_errors_keep_their_kind() {
        // a bare integer has no TOML document form
        let err: MatchError = toml::to_string(&1u8).unwrap_err().into();
        assert!(matches!(err, MatchError::TomlSer(_)));
    }
}
