//! # weighted-clipper - size-weighted landmark association
//!
//! `weighted_clipper` matches two sets of 3D landmarks that carry a scalar
//! "size". It proposes every candidate correspondence, drops those whose
//! sizes disagree, weights the rest by how well their sizes agree, and lets a
//! pairwise-consistency graph solver pick a mutually consistent subset. The
//! weights replace the diagonal of the solver's affinity matrix, so better
//! size matches pull the solution towards them without changing which pairs
//! the solver considers compatible.
//!
//! ## Quick Start
//!
//! ```rust
//! use weighted_clipper::{EuclideanLandmarkMatcher, LandmarkSet, MatcherSettings};
//!
//! let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 2.0, 0.0]];
//! let set1 = LandmarkSet::from_rows(&points, &[0.1, 0.5, 1.0]).unwrap();
//! let set2 = LandmarkSet::from_rows(&points, &[0.1, 0.5, 1.0]).unwrap();
//!
//! let matcher = EuclideanLandmarkMatcher::new(MatcherSettings::new(0.05, 0.4)).unwrap();
//! let result = matcher.find_associations(&set1, &set2).unwrap();
//! assert_eq!(result.pairs(), vec![(0, 0), (1, 1), (2, 2)]);
//! ```
//!
//! ## Plugging in another solver
//!
//! The bundled [`ClipperSolver`](solver::ClipperSolver) is a reference
//! implementation. Any type implementing
//! [`ConsistencySolver`](core::ConsistencySolver) can be used through
//! [`EuclideanLandmarkMatcher::find_associations_with`].
//!
//! ## Modules
//!
//! - **[`api`](api)**: The matcher and its result type
//! - **[`core`](core)**: Weight and solver traits, the scored/weighted solver session
//! - **[`candidates`](candidates)**: Dense candidate generation
//! - **[`size_filter`](size_filter)**: Normalized size difference and viability
//! - **[`weighting`](weighting)**: Built-in weight policies
//! - **[`solver`](solver)**: Reference consistency graph solver
//! - **[`settings`](settings)**: Configuration types, TOML loading
//! - **[`synthetic`](synthetic)**: Synthetic landmark scenes

pub mod api;
pub mod candidates;
pub mod choices;
pub mod core;
pub mod error;
pub mod settings;
pub mod size_filter;
pub mod solver;
pub mod synthetic;
pub mod types;
pub mod weighting;

#[cfg(feature = "python")]
pub mod python;

pub use api::{EuclideanLandmarkMatcher, MatchResult, find_associations};
pub use core::{ConsistencySolver, WeightFunction};
pub use error::{MatchError, SolverError};
pub use settings::MatcherSettings;
pub use types::{Candidate, LandmarkSet};
