//! Inverse-CDF sampling from a probability vector.
//!
//! The table holds one leading `0.0` followed by the running sum of every
//! bucket, so entry `k` (k ≥ 1) is the upper cumulative bound of value
//! `min_value + k - 1`. The final entry is forced to exactly 1.0 so every
//! draw in `[0, 1]` lands on a bucket.

use crate::density::pmf::ProbabilityVector;
use crate::error::{GrowthError, Result};
use crate::types::Distribution;

#[derive(Clone, Debug, PartialEq)]
pub struct CumulativeSampler {
    /// One below the lowest value.
    offset: i32,
    cumulative: Vec<f64>,
}

impl CumulativeSampler {
    /// Build from a normalized vector.
    pub fn new(dist: &ProbabilityVector) -> Self {
        let mut cumulative = Vec::with_capacity(dist.width() + 1);
        cumulative.push(0.0);
        let mut sum = 0.0;
        for &p in dist.masses() {
            sum += p;
            cumulative.push(sum);
        }
        if let Some(last) = cumulative.last_mut() {
            *last = 1.0;
        }
        Self {
            offset: dist.min_value() - 1,
            cumulative,
        }
    }

    /// Build from an exported sparse distribution; gaps become zero-width buckets.
    pub fn from_distribution(dist: &Distribution) -> Result<Self> {
        let (Some(&min), Some(&max)) = (dist.keys().next(), dist.keys().next_back()) else {
            return Err(GrowthError::InvalidRange { min: 0, max: -1 });
        };
        let mut pmf = ProbabilityVector::new(min, max)?;
        for (&value, &p) in dist {
            pmf.set(value, p)?;
        }
        pmf.normalize()?;
        Ok(Self::new(&pmf))
    }

    /// Value whose cumulative interval contains `p`.
    ///
    /// `p = 0` resolves to the lowest bucket with nonzero mass.
    pub fn sample(&self, p: f64) -> i32 {
        let bounds = &self.cumulative[1..];
        let k = if p <= 0.0 {
            bounds.partition_point(|&c| c <= 0.0)
        } else {
            bounds.partition_point(|&c| c < p)
        };
        self.offset + 1 + k.min(bounds.len() - 1) as i32
    }

    /// `(value, upper cumulative bound)` for every bucket.
    pub fn cumulative_probabilities(&self) -> Vec<(i32, f64)> {
        self.cumulative
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, &c)| (self.offset + i as i32, c))
            .collect()
    }
}
