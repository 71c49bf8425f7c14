//! Rescue-rule rate adjustment.
//!
//! Under the rescue rule, any step whose realized total increase is 0 or 1 is
//! replaced by [`RESCUE_OUTCOME`]. That couples all attributes within a step,
//! and tracking the coupling across steps would need the full joint
//! distribution. Instead each attribute gets an adjusted independent rate
//! equal to its true single-step marginal under the rule:
//!
//! ```text
//! adjusted[i] = p[i]·(1 − zero_otherwise[i]) + rescue[i]·p_zero_or_one
//! ```
//!
//! where `zero_otherwise[i] = Π_{j≠i}(1 − p[j])` and `p_zero_or_one` is the
//! probability of 0 or 1 total increases. Compounding these marginals over
//! steps as if independent is an approximation; its accuracy is checked
//! against sampled careers in `tests/test_monte_carlo.rs`.

use crate::constants::{ATTRIBUTE_COUNT, RESCUE_OUTCOME};
use crate::types::RateVector;

/// Probability that every attribute other than `i` fails to increase.
pub fn zero_otherwise_probabilities(raw: &RateVector) -> RateVector {
    std::array::from_fn(|i| {
        raw.iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, &p)| 1.0 - p)
            .product()
    })
}

/// Probability of 0 or 1 total increases under independent `raw` rates.
pub fn zero_or_one_probability(raw: &RateVector, zero_otherwise: &RateVector) -> f64 {
    let none: f64 = raw.iter().map(|&p| 1.0 - p).product();
    let exactly_one: f64 = (0..ATTRIBUTE_COUNT)
        .map(|i| raw[i] * zero_otherwise[i])
        .sum();
    none + exactly_one
}

/// Independent per-attribute rates whose single-step marginals match the
/// rescue-rule process.
pub fn adjusted_rates(raw: &RateVector) -> RateVector {
    let zero_otherwise = zero_otherwise_probabilities(raw);
    let p_zero_or_one = zero_or_one_probability(raw, &zero_otherwise);

    std::array::from_fn(|i| {
        raw[i] * (1.0 - zero_otherwise[i]) + RESCUE_OUTCOME[i] as f64 * p_zero_or_one
    })
}
