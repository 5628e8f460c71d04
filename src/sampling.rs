//! Sampling a formula over an x range and picking a sensible y range to plot it in.
//!
//! The plot window is chosen from the y values that occur most often once rounded to
//! two decimals, so that poles and other spikes do not blow the window up.

use std::collections::HashMap;

use itertools::{Itertools, MinMaxResult};
use log::debug;
use rayon::prelude::*;

use crate::derivations::smart_variable;
use crate::expr::Node;
use crate::types::{Bindings, Sample};

/// Most points a single range is sampled at; finer steps stop short of `x_max`.
pub const MAX_POINTS: usize = 1 << 24;

/// Range and resolution used for sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub x_min: f64,
    pub x_max: f64,
    pub step: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            x_min: -10.0,
            x_max: 10.0,
            step: 0.01,
        }
    }
}

impl SamplingConfig {
    /// Number of points, both ends included, capped at [`MAX_POINTS`]. An inverted range,
    /// non-finite bounds, or a step that is not positive and finite has none.
    pub fn len(&self) -> usize {
        let finite = self.x_min.is_finite() && self.x_max.is_finite() && self.step.is_finite();
        if !finite || self.step <= 0.0 || self.x_max < self.x_min {
            return 0;
        }
        // The epsilon keeps `x_max` itself from being lost to rounding.
        let intervals = ((self.x_max - self.x_min) / self.step + 1e-9).floor();
        if intervals >= (MAX_POINTS - 1) as f64 {
            return MAX_POINTS;
        }
        intervals as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The sampled x values, `x_min + i * step`.
    pub fn xs(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).map(move |i| self.x_min + i as f64 * self.step)
    }
}

/// A y value together with how often it occurred.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedValue {
    pub value: f64,
    pub weight: usize,
}

impl WeightedValue {
    pub fn new(value: f64, weight: usize) -> Self {
        Self { value, weight }
    }
}

impl Default for WeightedValue {
    fn default() -> Self {
        Self::new(0.0, 1)
    }
}

/// Five-number summary of the finite y values of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSummary {
    pub min: f64,
    pub lower_quartile: f64,
    pub median: f64,
    pub upper_quartile: f64,
    pub max: f64,
}

/// Evaluates `node` over the configured range, binding its first variable to x.
pub fn calc_values(node: &Node, config: &SamplingConfig) -> Vec<Sample> {
    let variable = smart_variable(node);
    let mut bindings = Bindings::new();
    let samples: Vec<Sample> = config
        .xs()
        .map(|x| {
            if let Some(variable) = &variable {
                bindings.insert(variable.clone(), x);
            }
            (x, node.evaluate(&bindings))
        })
        .collect();
    debug!("sampled {} points of {node}", samples.len());
    samples
}

/// Samples several formulas in parallel.
pub fn sample_many(nodes: &[Node], config: &SamplingConfig) -> Vec<Vec<Sample>> {
    nodes
        .par_iter()
        .map(|node| calc_values(node, config))
        .collect()
}

/// `y` rounded to two decimals, as the bits of the rounded value. `-0` shares the key of `0`.
fn hundredths(y: f64) -> u64 {
    ((y * 100.0).round() / 100.0 + 0.0).to_bits()
}

/// Distinct finite y values rounded to two decimals, with their counts, in first seen
/// order.
pub fn weighted_values(samples: &[Sample]) -> Vec<WeightedValue> {
    let keys = || {
        samples
            .iter()
            .map(|(_, y)| *y)
            .filter(|y| y.is_finite())
            .map(hundredths)
    };
    let counts: HashMap<u64, usize> = keys().counts();
    keys()
        .unique()
        .map(|key| WeightedValue::new(f64::from_bits(key), counts[&key]))
        .collect()
}

/// The rounded y values with the smallest and largest `value * weight`.
///
/// Only negative products beat the default minimum and only positive ones beat the
/// default maximum, so a formula that never goes below zero keeps `(0, 1)` as its minimum.
pub fn weighted_min_and_max(samples: &[Sample]) -> (WeightedValue, WeightedValue) {
    let mut min = (0.0, WeightedValue::default());
    let mut max = (0.0, WeightedValue::default());
    for weighted in weighted_values(samples) {
        let product = weighted.value * weighted.weight as f64;
        if product > max.0 {
            max = (product, weighted);
        }
        if product < min.0 {
            min = (product, weighted);
        }
    }
    (min.1, max.1)
}

/// Average of the values weighing at least `required_weight`.
///
/// When no value is heavy enough the requirement drops by one until something
/// qualifies; with nothing left at weight one the average is `0`.
pub fn weighted_average(values: &[WeightedValue], required_weight: usize) -> f64 {
    let mut required = required_weight.max(1);
    loop {
        let (sum, weight) = values
            .iter()
            .filter(|value| value.weight >= required)
            .fold((0.0, 0usize), |(sum, weight), value| {
                (sum + value.value * value.weight as f64, weight + value.weight)
            });
        if weight > 0 {
            return sum / weight as f64;
        }
        if required == 1 {
            return 0.0;
        }
        required -= 1;
    }
}

/// Linear interpolation quantile of the finite values, `q` in `[0, 1]`.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let sorted: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .sorted_by(f64::total_cmp)
        .collect();
    let last = sorted.len().checked_sub(1)?;
    let position = q.clamp(0.0, 1.0) * last as f64;
    let below = position.floor() as usize;
    let above = position.ceil() as usize;
    let fraction = position - below as f64;
    Some(sorted[below] + (sorted[above] - sorted[below]) * fraction)
}

/// Five-number summary of the y values, `None` when none is finite.
pub fn summarize(samples: &[Sample]) -> Option<SampleSummary> {
    let ys: Vec<f64> = samples.iter().map(|(_, y)| *y).collect();
    Some(SampleSummary {
        min: quantile(&ys, 0.0)?,
        lower_quartile: quantile(&ys, 0.25)?,
        median: quantile(&ys, 0.5)?,
        upper_quartile: quantile(&ys, 0.75)?,
        max: quantile(&ys, 1.0)?,
    })
}

/// Weight a rounded y value needs to count towards the typical value.
pub const TYPICAL_WEIGHT: usize = 2;

/// The weighted minimum, the typical value and the weighted maximum of a formula.
pub fn important_ys(node: &Node, config: &SamplingConfig) -> [f64; 3] {
    let samples = calc_values(node, config);
    let (min, max) = weighted_min_and_max(&samples);
    let typical = weighted_average(&weighted_values(&samples), TYPICAL_WEIGHT);
    [min.value, typical, max.value]
}

/// The y range to plot, from the important values of every plotted formula.
pub fn y_domain(important: &[f64]) -> (f64, f64) {
    let (min, max) = match important
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .minmax_by(f64::total_cmp)
    {
        MinMaxResult::NoElements => return (-10.0, 10.0),
        MinMaxResult::OneElement(value) => (value, value),
        MinMaxResult::MinMax(min, max) => (min, max),
    };
    if min == 0.0 && max == 0.0 {
        (-10.0, 10.0)
    } else if min == max {
        (min / 1.3, min * 1.3)
    } else if min == 0.0 {
        (-max * 0.3, max * 1.3)
    } else if max == 0.0 {
        (min * 1.3, -min * 0.3)
    } else {
        (min * 1.3, max * 1.3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    #[test]
    fn test_default_range() {
        let config = SamplingConfig::default();
        assert_eq!(config.len(), 2001);
        let xs: Vec<f64> = config.xs().collect();
        assert_eq!(xs[0], -10.0);
        assert!((xs[2000] - 10.0).abs() < 1e-9);
        let empty = SamplingConfig {
            step: 0.0,
            ..SamplingConfig::default()
        };
        assert!(empty.is_empty());
    }

    #[test]
    fn test_len_of_extreme_ranges() {
        let tiny_step = SamplingConfig {
            step: 1e-300,
            ..SamplingConfig::default()
        };
        assert_eq!(tiny_step.len(), MAX_POINTS);
        assert_eq!(tiny_step.xs().last(), Some(-10.0 + (MAX_POINTS - 1) as f64 * 1e-300));
        let unbounded = SamplingConfig {
            x_max: f64::INFINITY,
            ..SamplingConfig::default()
        };
        assert!(unbounded.is_empty());
        let nan_bound = SamplingConfig {
            x_min: f64::NAN,
            ..SamplingConfig::default()
        };
        assert!(nan_bound.is_empty());
        let inverted = SamplingConfig {
            x_min: 1.0,
            x_max: 0.0,
            step: 0.1,
        };
        assert_eq!(inverted.len(), 0);
    }

    #[test]
    fn test_calc_values_uses_first_variable() {
        let config = SamplingConfig {
            x_min: 0.0,
            x_max: 2.0,
            step: 1.0,
        };
        let samples = calc_values(&parse_str("t^2 + 1").unwrap(), &config);
        assert_eq!(samples, vec![(0.0, 1.0), (1.0, 2.0), (2.0, 5.0)]);
        let constant = calc_values(&parse_str("3").unwrap(), &config);
        assert_eq!(constant, vec![(0.0, 3.0), (1.0, 3.0), (2.0, 3.0)]);
    }

    #[test]
    fn test_weighted_min_and_max() {
        let samples = [(0.0, 2.0), (1.0, 2.001), (2.0, -1.0), (3.0, 5.0), (4.0, -1.0)];
        let (min, max) = weighted_min_and_max(&samples);
        assert_eq!(min, WeightedValue::new(-1.0, 2));
        assert_eq!(max, WeightedValue::new(5.0, 1));

        let (min, max) = weighted_min_and_max(&[(0.0, 1.0), (1.0, 2.0)]);
        assert_eq!(min, WeightedValue::default());
        assert_eq!(max, WeightedValue::new(2.0, 1));

        let (min, max) = weighted_min_and_max(&[]);
        assert_eq!((min, max), (WeightedValue::default(), WeightedValue::default()));
    }

    #[test]
    fn test_large_values_keep_their_magnitude() {
        let samples = [(0.0, 1e20), (1.0, 2e20), (2.0, -3e18)];
        let values = weighted_values(&samples);
        assert_eq!(values.len(), 3);
        let (min, max) = weighted_min_and_max(&samples);
        assert_eq!(max, WeightedValue::new(2e20, 1));
        assert_eq!(min, WeightedValue::new(-3e18, 1));

        let [_, _, max] = important_ys(&parse_str("x^20").unwrap(), &SamplingConfig::default());
        assert!((max - 1e20).abs() < 1e15);
    }

    #[test]
    fn test_negative_zero_shares_a_key() {
        let values = weighted_values(&[(0.0, 0.0), (1.0, -0.0), (2.0, -0.001)]);
        assert_eq!(values, vec![WeightedValue::new(0.0, 3)]);
    }

    #[test]
    fn test_weighted_min_and_max_skips_non_finite() {
        let samples = [(0.0, f64::INFINITY), (1.0, f64::NAN), (2.0, 3.0)];
        let (_, max) = weighted_min_and_max(&samples);
        assert_eq!(max, WeightedValue::new(3.0, 1));
    }

    #[test]
    fn test_weighted_average_relaxes_requirement() {
        let values = [WeightedValue::new(2.0, 3), WeightedValue::new(10.0, 1)];
        assert_eq!(weighted_average(&values, 3), 2.0);
        assert_eq!(weighted_average(&values, 1), 4.0);
        assert_eq!(weighted_average(&values, 5), 2.0);
        assert_eq!(weighted_average(&[], 2), 0.0);
    }

    #[test]
    fn test_quantile_and_summary() {
        assert_eq!(quantile(&[3.0, 1.0, 2.0, 4.0], 0.5), Some(2.5));
        assert_eq!(quantile(&[f64::NAN], 0.5), None);
        let samples: Vec<Sample> = (0..=4).map(|i| (i as f64, i as f64)).collect();
        let summary = summarize(&samples).unwrap();
        assert_eq!(summary.min, 0.0);
        assert_eq!(summary.lower_quartile, 1.0);
        assert_eq!(summary.median, 2.0);
        assert_eq!(summary.max, 4.0);
        assert_eq!(summarize(&[]), None);
    }

    #[test]
    fn test_y_domain_heuristic() {
        assert_eq!(y_domain(&[]), (-10.0, 10.0));
        assert_eq!(y_domain(&[0.0, 0.0, 0.0]), (-10.0, 10.0));
        let (low, high) = y_domain(&[2.0, 2.0]);
        assert!((low - 2.0 / 1.3).abs() < 1e-12 && (high - 2.6).abs() < 1e-12);
        let (low, high) = y_domain(&[0.0, 1.0, 10.0]);
        assert!((low + 3.0).abs() < 1e-12 && (high - 13.0).abs() < 1e-12);
        let (low, high) = y_domain(&[-10.0, -1.0, 0.0]);
        assert!((low + 13.0).abs() < 1e-12 && (high - 3.0).abs() < 1e-12);
        let (low, high) = y_domain(&[-1.0, 2.0]);
        assert!((low + 1.3).abs() < 1e-12 && (high - 2.6).abs() < 1e-12);
    }

    #[test]
    fn test_important_ys_of_a_parabola() {
        let node = parse_str("x^2").unwrap();
        let [min, typical, max] = important_ys(&node, &SamplingConfig::default());
        assert_eq!(min, 0.0);
        assert!(max > 0.0 && max <= 100.0);
        assert!(typical > 0.0 && typical < 100.0);
    }

    #[test]
    fn test_sample_many() {
        let nodes = vec![parse_str("x").unwrap(), parse_str("2x").unwrap()];
        let config = SamplingConfig {
            x_min: 0.0,
            x_max: 1.0,
            step: 0.5,
        };
        let sampled = sample_many(&nodes, &config);
        assert_eq!(sampled[1], vec![(0.0, 0.0), (0.5, 1.0), (1.0, 2.0)]);
    }
}
