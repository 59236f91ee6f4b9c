//! Runtime wrappers exposing the built-in weight policies via an enum while
//! the matcher stays generic over [`WeightFunction`]. The `Dyn` variant is the
//! escape hatch for custom policies.

use crate::core::WeightFunction;
use crate::settings::WeightingType;
use crate::weighting::{ConstantWeight, ExponentialWeight, LinearRampWeight};

/// Runtime weight policy selection.
pub enum WeightChoice {
    LinearRamp(LinearRampWeight),
    Exponential(ExponentialWeight),
    Constant(ConstantWeight),
    Dyn(Box<dyn WeightFunction + Send + Sync>),
}

impl Default for WeightChoice {
    fn default() -> Self {
        WeightChoice::LinearRamp(LinearRampWeight)
    }
}

impl From<WeightingType> for WeightChoice {
    fn from(kind: WeightingType) -> Self {
        match kind {
            WeightingType::LinearRamp => WeightChoice::LinearRamp(LinearRampWeight),
            WeightingType::Exponential => WeightChoice::Exponential(ExponentialWeight::default()),
            WeightingType::Constant => WeightChoice::Constant(ConstantWeight),
        }
    }
}

impl WeightFunction for WeightChoice {
    fn weight(&self, metric: f64, size_limit: f64) -> f64 {
        match self {
            WeightChoice::LinearRamp(w) => w.weight(metric, size_limit),
            WeightChoice::Exponential(w) => w.weight(metric, size_limit),
            WeightChoice::Constant(w) => w.weight(metric, size_limit),
            WeightChoice::Dyn(w) => w.weight(metric, size_limit),
        }
    }
}
