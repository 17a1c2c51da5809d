use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TractError};

/// How to partition the observed value range into class bins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinStrategy {
    /// Equal-width intervals between the observed min and max.
    #[default]
    EqualWidth,
    /// Intervals holding (roughly) equal numbers of observations.
    Quantile,
}

/// Computed class breaks for a choropleth; `breaks().len() == count() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bins {
    breaks: Vec<f64>,
}

impl Bins {
    /// Compute breaks over the non-null observed values.
    pub fn compute(values: &[f64], bins: usize, strategy: BinStrategy) -> Result<Self> {
        if bins == 0 {
            return Err(TractError::DataSource(anyhow!("bin count must be positive")));
        }
        if values.is_empty() {
            return Err(TractError::DataSource(anyhow!("cannot bin an empty value set")));
        }

        let breaks = match strategy {
            BinStrategy::EqualWidth => {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                (0..=bins)
                    .map(|i| min + (max - min) * i as f64 / bins as f64)
                    .collect()
            }
            BinStrategy::Quantile => {
                let mut sorted = values.to_vec();
                sorted.sort_by(|a, b| a.total_cmp(b));
                (0..=bins)
                    .map(|i| {
                        let pos = (i as f64 / bins as f64) * (sorted.len() - 1) as f64;
                        let lo = pos.floor() as usize;
                        let hi = pos.ceil() as usize;
                        sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
                    })
                    .collect()
            }
        };

        Ok(Self { breaks })
    }

    /// Number of bins.
    #[inline] pub fn count(&self) -> usize { self.breaks.len() - 1 }

    /// Break values, ascending; first is the observed min, last the max.
    #[inline] pub fn breaks(&self) -> &[f64] { &self.breaks }

    /// Bin index for a value, clamped into `[0, count())`. The last bin is
    /// upper-inclusive so the maximum lands inside the scale.
    pub fn classify(&self, value: f64) -> usize {
        let n = self.count();
        for i in 0..n {
            if value < self.breaks[i + 1] {
                return i;
            }
        }
        n - 1
    }

    /// Human-readable bin ranges for legends.
    pub fn labels(&self) -> Vec<String> {
        self.breaks.windows(2)
            .map(|w| format!("{:.2} to {:.2}", w[0], w[1]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_width_classifies_and_clamps() {
        let values = [0.0, 2.0, 4.0, 6.0, 8.0, 10.0];
        let bins = Bins::compute(&values, 5, BinStrategy::EqualWidth).unwrap();

        assert_eq!(bins.count(), 5);
        assert_eq!(bins.breaks(), &[0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);

        assert_eq!(bins.classify(0.0), 0);
        assert_eq!(bins.classify(1.9), 0);
        assert_eq!(bins.classify(2.0), 1);
        // maximum is inside the scale, and out-of-range values clamp
        assert_eq!(bins.classify(10.0), 4);
        assert_eq!(bins.classify(-5.0), 0);
        assert_eq!(bins.classify(99.0), 4);
    }

    #[test]
    fn quantile_breaks_are_monotonic_and_span_the_data() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let bins = Bins::compute(&values, 4, BinStrategy::Quantile).unwrap();

        assert_eq!(bins.count(), 4);
        assert_eq!(bins.breaks()[0], 0.0);
        assert_eq!(*bins.breaks().last().unwrap(), 99.0);
        assert!(bins.breaks().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn constant_values_still_produce_usable_bins() {
        let bins = Bins::compute(&[3.0, 3.0, 3.0], 5, BinStrategy::EqualWidth).unwrap();
        assert_eq!(bins.classify(3.0), 4); // all breaks equal; clamps to last
    }

    #[test]
    fn zero_bins_or_empty_values_are_rejected() {
        assert!(Bins::compute(&[1.0], 0, BinStrategy::EqualWidth).is_err());
        assert!(Bins::compute(&[], 5, BinStrategy::EqualWidth).is_err());
    }

    #[test]
    fn legend_labels_cover_every_bin() {
        let bins = Bins::compute(&[0.0, 10.0], 2, BinStrategy::EqualWidth).unwrap();
        assert_eq!(bins.labels(), vec!["0.00 to 5.00", "5.00 to 10.00"]);
    }
}
