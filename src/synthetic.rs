//! Synthetic landmark sets with planted correspondences.
//!
//! Useful for demos and tests: two random landmark clouds where a subset of
//! set 2 is a noisy copy of a subset of set 1.

use nalgebra::Matrix3;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::error::MatchError;
use crate::types::{DataMatrix, LandmarkSet};

/// Parameters of the synthetic generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticConfig {
    pub n1: usize,
    pub n2: usize,
    /// Standard deviation of the position noise on planted landmarks.
    pub position_noise: f64,
    /// Standard deviation of the multiplicative size noise on planted landmarks.
    pub size_noise: f64,
    /// Upper bound on the number of planted correspondences.
    pub max_planted: usize,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            n1: 30,
            n2: 35,
            position_noise: 0.01,
            size_noise: 0.05,
            max_planted: 20,
            seed: 7,
        }
    }
}

/// Two landmark sets and the index pairs that truly correspond.
#[derive(Debug, Clone)]
pub struct SyntheticScene {
    pub set1: LandmarkSet,
    pub set2: LandmarkSet,
    pub planted: Vec<(usize, usize)>,
}

impl SyntheticScene {
    /// Number of `selected` pairs that hit a planted correspondence.
    pub fn hits(&self, selected: &[(usize, usize)]) -> usize {
        selected.iter().filter(|p| self.planted.contains(p)).count()
    }
}

fn random_cloud(rng: &mut StdRng, n: usize) -> (DataMatrix, Vec<f64>) {
    let positions = DataMatrix::from_fn(n, 3, |_, _| rng.gen_range(-1.0..1.0));
    let sizes = (0..n).map(|_| rng.gen_range(0.05..0.20)).collect();
    (positions, sizes)
}

fn check_noise(what: &str, std_dev: f64) -> Result<(), MatchError> {
    if !std_dev.is_finite() || std_dev < 0.0 {
        return Err(MatchError::InvalidConfig(format!(
            "{what} must be finite and non-negative, got {std_dev}"
        )));
    }
    Ok(())
}

/// Generate a scene. Deterministic for a given config.
pub fn make_synthetic_landmarks(config: &SyntheticConfig) -> Result<SyntheticScene, MatchError> {
    check_noise("position noise", config.position_noise)?;
    check_noise("size noise", config.size_noise)?;

    let mut rng = StdRng::seed_from_u64(config.seed);

    let (positions1, sizes1) = random_cloud(&mut rng, config.n1);

    let planted_count = config.n1.min(config.n2).min(config.max_planted);
    let idx1 = sample(&mut rng, config.n1, planted_count).into_vec();
    let idx2 = sample(&mut rng, config.n2, planted_count).into_vec();

    let (mut positions2, mut sizes2) = random_cloud(&mut rng, config.n2);

    let position_noise = Normal::new(0.0, config.position_noise)
        .map_err(|e| MatchError::InvalidConfig(format!("position noise: {e}")))?;
    let size_noise = Normal::new(0.0, config.size_noise)
        .map_err(|e| MatchError::InvalidConfig(format!("size noise: {e}")))?;

    for (&i1, &i2) in idx1.iter().zip(&idx2) {
        for axis in 0..3 {
            positions2[(i2, axis)] = positions1[(i1, axis)] + position_noise.sample(&mut rng);
        }
        sizes2[i2] = sizes1[i1] * (1.0 + size_noise.sample(&mut rng));
    }

    let set1 = LandmarkSet::new(positions1, sizes1)?
        .with_covariances(vec![Matrix3::zeros(); config.n1])?;
    let set2 = LandmarkSet::new(positions2, sizes2)?
        .with_covariances(vec![Matrix3::zeros(); config.n2])?;

    Ok(SyntheticScene {
        set1,
        set2,
        planted: idx1.into_iter().zip(idx2).collect(),
    })
}
