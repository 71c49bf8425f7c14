//! Read-only statistics over exported distributions.
//!
//! Everything here takes a [`Distribution`] (sparse `value ↦ mass`) as
//! produced by a [`StepSnapshot`], so the same helpers serve analytic and
//! sampled results alike.
//!
//! | Function | Result |
//! |----------|--------|
//! | [`median_of`] | Median bucket and the mass below / through it |
//! | [`split_around`] | Mass below, equal to and above a reference value |
//! | [`percentile`] | Smallest value whose CDF reaches `q` |
//! | [`mean`], [`variance`] | Moments over the distribution's own total mass |
//! | [`luck_rating`] | Weighted summary of nine percentile ranks in `[-1, 1]` |
//! | [`sample_median`] | Median of raw samples, averaging the central pair |

use serde::{Deserialize, Serialize};

use crate::constants::ATTRIBUTE_COUNT;
use crate::types::{AttributeArray, Distribution, StepSnapshot};

/// Per-attribute weights for [`luck_rating`]. Strength and magic count more;
/// luck and charm count less.
pub const LUCK_WEIGHTS: [f64; ATTRIBUTE_COUNT] = [1.0, 1.5, 1.5, 1.0, 1.0, 0.3, 1.0, 1.0, 0.5];

/// Median bucket located by cumulative crossing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MedianDetails {
    pub median: i32,
    /// Mass strictly below the median bucket.
    pub p_lower: f64,
    /// Mass up to and including the median bucket.
    pub p_higher: f64,
    /// Mass of the median bucket itself.
    pub p_median: f64,
}

impl MedianDetails {
    /// Midpoint of the median bucket's cumulative range.
    pub fn display_percentile(&self) -> f64 {
        self.p_lower + 0.5 * self.p_median
    }
}

/// First bucket at which cumulative mass passes half the total.
///
/// `None` when the distribution carries no mass.
pub fn median_of(dist: &Distribution) -> Option<MedianDetails> {
    let target = dist.values().sum::<f64>() * 0.5;

    let mut cumulative = 0.0;
    for (&value, &p) in dist {
        let before = cumulative;
        let after = cumulative + p;
        if before <= target && after > target {
            return Some(MedianDetails {
                median: value,
                p_lower: before,
                p_higher: after,
                p_median: p,
            });
        }
        cumulative = after;
    }
    None
}

/// Total mass partitioned around a reference value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MassSplit {
    pub below: f64,
    pub same: f64,
    pub above: f64,
}

impl MassSplit {
    /// Rank of the reference value, counting ties as half below.
    pub fn percentile_rank(&self) -> f64 {
        self.below + 0.5 * self.same
    }
}

pub fn split_around(dist: &Distribution, reference: i32) -> MassSplit {
    let below = dist.range(..reference).map(|(_, p)| p).sum();
    let same = dist.get(&reference).copied().unwrap_or(0.0);
    let above = dist.range(reference + 1..).map(|(_, p)| p).sum();
    MassSplit { below, same, above }
}

/// Split every attribute of `snapshot` around the matching reference value.
pub fn percentile_ranks(
    snapshot: &StepSnapshot,
    reference: &AttributeArray,
) -> [MassSplit; ATTRIBUTE_COUNT] {
    std::array::from_fn(|i| split_around(&snapshot.attributes[i], reference[i]))
}

/// Smallest value whose cumulative mass reaches `q` (as a fraction of 1).
pub fn percentile(dist: &Distribution, q: f64) -> Option<i32> {
    let mut cumulative = 0.0;
    for (&value, &p) in dist {
        cumulative += p;
        if cumulative >= q {
            return Some(value);
        }
    }
    // Rounding can leave the total a hair under q = 1.0.
    dist.keys().next_back().copied()
}

pub fn mean(dist: &Distribution) -> Option<f64> {
    let total: f64 = dist.values().sum();
    if total <= 0.0 {
        return None;
    }
    Some(dist.iter().map(|(&v, &p)| v as f64 * p).sum::<f64>() / total)
}

pub fn variance(dist: &Distribution) -> Option<f64> {
    let m = mean(dist)?;
    let total: f64 = dist.values().sum();
    Some(
        dist.iter()
            .map(|(&v, &p)| (v as f64 - m).powi(2) * p)
            .sum::<f64>()
            / total,
    )
}

/// Exaggerate ranks far from 0.5: `sign(2r−1)·(2r−1)²`.
fn bias_extremes(rank: f64) -> f64 {
    let centered = rank * 2.0 - 1.0;
    centered.signum() * centered * centered
}

/// Overall luck in `[-1, 1]`, 0 being an average outcome.
///
/// Each attribute's percentile rank is biased toward the extremes, combined
/// with [`LUCK_WEIGHTS`] and squashed by `tanh(2x)`.
pub fn luck_rating(ranks: &[MassSplit; ATTRIBUTE_COUNT]) -> f64 {
    let weighted: f64 = ranks
        .iter()
        .zip(LUCK_WEIGHTS.iter())
        .map(|(split, w)| w * bias_extremes(split.percentile_rank()))
        .sum();
    let normalized = weighted / LUCK_WEIGHTS.iter().sum::<f64>();
    (normalized * 2.0).tanh()
}

/// Median of `values`; an even count averages the two central values.
pub fn sample_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some(0.5 * (sorted[mid - 1] + sorted[mid]))
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(pairs: &[(i32, f64)]) -> Distribution {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_median_crossing() {
        let d = dist(&[(3, 0.2), (4, 0.2), (5, 0.4), (6, 0.2)]);
        let m = median_of(&d).unwrap();
        assert_eq!(m.median, 5);
        assert!((m.p_lower - 0.4).abs() < 1e-12);
        assert!((m.p_higher - 0.8).abs() < 1e-12);
        assert!((m.p_median - 0.4).abs() < 1e-12);
        assert!((m.display_percentile() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_median_exact_half_moves_up() {
        // Cumulative hits exactly 0.5 at 1; crossing requires exceeding it.
        let d = dist(&[(1, 0.5), (2, 0.5)]);
        assert_eq!(median_of(&d).unwrap().median, 2);
    }

    #[test]
    fn test_median_uses_own_total() {
        let d = dist(&[(0, 1.0), (1, 3.0)]);
        assert_eq!(median_of(&d).unwrap().median, 1);
    }

    #[test]
    fn test_median_of_empty_or_zero_mass() {
        assert!(median_of(&Distribution::new()).is_none());
        assert!(median_of(&dist(&[(0, 0.0), (1, 0.0)])).is_none());
    }

    #[test]
    fn test_split_around() {
        let d = dist(&[(3, 0.2), (4, 0.2), (5, 0.4), (6, 0.2)]);
        let s = split_around(&d, 5);
        assert!((s.below - 0.4).abs() < 1e-12);
        assert!((s.same - 0.4).abs() < 1e-12);
        assert!((s.above - 0.2).abs() < 1e-12);
        assert!((s.percentile_rank() - 0.6).abs() < 1e-12);

        let outside = split_around(&d, 10);
        assert_eq!(outside.same, 0.0);
        assert!((outside.below - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_and_moments() {
        let d = dist(&[(0, 0.25), (1, 0.5), (2, 0.25)]);
        assert_eq!(percentile(&d, 0.1), Some(0));
        assert_eq!(percentile(&d, 0.5), Some(1));
        assert_eq!(percentile(&d, 0.99), Some(2));
        assert!((mean(&d).unwrap() - 1.0).abs() < 1e-12);
        assert!((variance(&d).unwrap() - 0.5).abs() < 1e-12);
        assert!(mean(&Distribution::new()).is_none());
    }

    #[test]
    fn test_luck_rating_average_is_zero() {
        let avg = MassSplit {
            below: 0.25,
            same: 0.5,
            above: 0.25,
        };
        assert!(luck_rating(&[avg; ATTRIBUTE_COUNT]).abs() < 1e-12);
    }

    #[test]
    fn test_luck_rating_extremes() {
        let best = MassSplit {
            below: 1.0,
            same: 0.0,
            above: 0.0,
        };
        let worst = MassSplit {
            below: 0.0,
            same: 0.0,
            above: 1.0,
        };
        let top = luck_rating(&[best; ATTRIBUTE_COUNT]);
        let bottom = luck_rating(&[worst; ATTRIBUTE_COUNT]);
        assert!((top - 2.0f64.tanh()).abs() < 1e-12);
        assert!((bottom + 2.0f64.tanh()).abs() < 1e-12);
    }

    #[test]
    fn test_bias_is_odd() {
        assert!((bias_extremes(0.75) - 0.25).abs() < 1e-12);
        assert!((bias_extremes(0.25) + 0.25).abs() < 1e-12);
        assert_eq!(bias_extremes(0.5), 0.0);
    }

    #[test]
    fn test_sample_median() {
        assert_eq!(sample_median(&[]), None);
        assert_eq!(sample_median(&[0.3, -0.1, 0.2]), Some(0.2));
        assert_eq!(sample_median(&[0.4, -0.2, 0.0, 0.2]), Some(0.1));
    }
}
