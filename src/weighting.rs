//! Built-in weight policies.
//!
//! All policies map the normalized size difference to `[0, 1]`, are maximal
//! at a zero metric, non-increasing, and return their minimum `0.0` for the
//! degenerate `+inf` metric. They are evaluated before the size filter, so
//! metrics at or above the size limit must be handled too.

use crate::core::WeightFunction;

/// Weight for a non-positive (or NaN) size limit: only an exact size match
/// keeps full weight.
fn degenerate_limit_weight(metric: f64) -> f64 {
    if metric <= 0.0 { 1.0 } else { 0.0 }
}

/// Clipped linear ramp, `1 - metric / size_limit` limited to `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearRampWeight;

impl WeightFunction for LinearRampWeight {
    fn weight(&self, metric: f64, size_limit: f64) -> f64 {
        if !metric.is_finite() {
            return 0.0;
        }
        if !(size_limit > 0.0) {
            return degenerate_limit_weight(metric);
        }
        if size_limit.is_infinite() {
            return 1.0;
        }
        (1.0 - metric / size_limit).clamp(0.0, 1.0)
    }
}

/// Exponential decay, `exp(-decay * metric / size_limit)`.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialWeight {
    pub decay: f64,
}

impl Default for ExponentialWeight {
    fn default() -> Self {
        Self { decay: 2.0 }
    }
}

impl ExponentialWeight {
    pub fn new(decay: f64) -> Self {
        Self { decay }
    }
}

impl WeightFunction for ExponentialWeight {
    fn weight(&self, metric: f64, size_limit: f64) -> f64 {
        if !metric.is_finite() {
            return 0.0;
        }
        if !(size_limit > 0.0) {
            return degenerate_limit_weight(metric);
        }
        let decay = self.decay.max(0.0);
        let w = (-decay * metric / size_limit).exp();
        if w.is_nan() { 0.0 } else { w.clamp(0.0, 1.0) }
    }
}

/// Unweighted policy: every finite metric gets full weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantWeight;

impl WeightFunction for ConstantWeight {
    fn weight(&self, metric: f64, _size_limit: f64) -> f64 {
        if metric.is_finite() { 1.0 } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policies() -> Vec<Box<dyn WeightFunction>> {
        vec![
            Box::new(LinearRampWeight),
            Box::new(ExponentialWeight::default()),
            Box::new(ConstantWeight),
        ]
    }

    #[test]
    fn zero_metric_is_maximal_and_non_increasing_towards_limit() {
        let limit = 0.4;
        for policy in policies() {
            let w0 = policy.weight(0.0, limit);
            assert_eq!(w0, 1.0);
            let mut prev = w0;
            for i in 1..100 {
                let m = limit * (i as f64) / 100.0;
                let w = policy.weight(m, limit);
                assert!(w <= w0);
                assert!(w <= prev);
                prev = w;
            }
        }
    }

    #[test]
    fn infinite_metric_returns_minimum() {
        for policy in policies() {
            for limit in [0.4, 0.0, -1.0, f64::INFINITY] {
                let w = policy.weight(f64::INFINITY, limit);
                assert_eq!(w, 0.0);
            }
        }
    }

    #[test]
    fn never_nan_or_negative_for_finite_metrics() {
        for policy in policies() {
            for limit in [0.4, 1e-300, 0.0, -3.0, f64::INFINITY] {
                for m in [0.0, 1e-12, 0.2, 0.4, 0.5, 2.0, 1e300] {
                    let w = policy.weight(m, limit);
                    assert!(!w.is_nan(), "NaN for metric {m}, limit {limit}");
                    assert!((0.0..=1.0).contains(&w));
                }
            }
        }
    }

    #[test]
    fn linear_ramp_values() {
        let w = LinearRampWeight;
        assert!((w.weight(0.1, 0.4) - 0.75).abs() < 1e-12);
        assert_eq!(w.weight(0.4, 0.4), 0.0);
        assert_eq!(w.weight(0.8, 0.4), 0.0);
    }

    #[test]
    fn exponential_values() {
        let w = ExponentialWeight::new(1.0);
        assert!((w.weight(0.4, 0.4) - (-1.0f64).exp()).abs() < 1e-12);
        assert!(w.weight(0.8, 0.4) < w.weight(0.4, 0.4));
    }
}
