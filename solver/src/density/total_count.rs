//! Distribution of the number of attributes that increase in one step.
//!
//! The count of successes across independent Bernoulli trials with unequal
//! rates is Poisson-binomial. [`total_count_distribution`] enumerates all
//! 2^9 outcomes, which is a fixed 512 leaves for the fixed attribute count.
//! [`poisson_binomial`] is the equivalent per-trial convolution for rate
//! slices of any length.
//!
//! With the rescue rule, 0 and 1 totals become 2 exactly (not approximately,
//! unlike the per-attribute marginals in [`super::adjustment`]).

use crate::constants::{ATTRIBUTE_COUNT, RESCUE_MINIMUM};
use crate::error::Result;
use crate::types::RateVector;

use super::pmf::ProbabilityVector;

fn enumerate_outcomes(index: usize, prior: f64, count: usize, rates: &RateVector, acc: &mut [f64]) {
    if index == ATTRIBUTE_COUNT {
        acc[count] += prior;
        return;
    }
    let p = rates[index];
    enumerate_outcomes(index + 1, prior * (1.0 - p), count, rates, acc);
    enumerate_outcomes(index + 1, prior * p, count + 1, rates, acc);
}

/// Exact distribution over `[0, 9]` of total increases for one step.
///
/// When `rescue` is set the result is clamped from below at 2, so its
/// domain becomes `[2, 9]`.
pub fn total_count_distribution(rates: &RateVector, rescue: bool) -> Result<ProbabilityVector> {
    let mut acc = [0.0f64; ATTRIBUTE_COUNT + 1];
    enumerate_outcomes(0, 1.0, 0, rates, &mut acc);

    let mut dist = ProbabilityVector::from_masses(0, &acc)?;
    dist.normalize()?;

    if rescue {
        dist = dist.clamp_from_below(RESCUE_MINIMUM);
    }
    Ok(dist)
}

/// Poisson-binomial distribution over `[0, rates.len()]` by iterative convolution.
///
/// Each trial folds `next[k] = prev[k]·(1−p) + prev[k−1]·p` into the running
/// masses. Every rate is used as given, however close to 0 or 1.
pub fn poisson_binomial(rates: &[f64]) -> Result<ProbabilityVector> {
    let mut masses = vec![0.0f64; rates.len() + 1];
    masses[0] = 1.0;
    for (trial, &p) in rates.iter().enumerate() {
        for k in (1..=trial + 1).rev() {
            masses[k] = masses[k] * (1.0 - p) + masses[k - 1] * p;
        }
        masses[0] *= 1.0 - p;
    }

    let mut dist = ProbabilityVector::from_masses(0, &masses)?;
    dist.normalize()?;
    Ok(dist)
}
