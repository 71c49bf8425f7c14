//! Attribute layout, numeric tolerances and fixed rule vectors.
//!
//! Every per-entity vector in the crate is a fixed-width array indexed by the
//! attribute constants below:
//! - |A| = [`ATTRIBUTE_COUNT`] = 9
//! - attribute `i` ↦ [`ATTRIBUTE_NAMES`]`[i]`
//!
//! The tolerances guard the two places where floating-point drift is
//! absorbed: [`NORMALIZATION_ERROR_LIMIT`] bounds how far a distribution may
//! stray from total mass 1.0 before normalization refuses to hide it, and
//! [`PROBABILITY_ZERO_LIMIT`] decides when a step probability is treated as
//! exactly 0 or 1.

/// Number of independently tracked attributes per entity.
pub const ATTRIBUTE_COUNT: usize = 9;

/// Attribute indices, used as positions in every per-attribute array.
pub const ATTR_HP: usize = 0;
pub const ATTR_STR: usize = 1;
pub const ATTR_MAG: usize = 2;
pub const ATTR_DEX: usize = 3;
pub const ATTR_SPD: usize = 4;
pub const ATTR_LCK: usize = 5;
pub const ATTR_DEF: usize = 6;
pub const ATTR_RES: usize = 7;
pub const ATTR_CHA: usize = 8;

/// Canonical attribute names.
pub const ATTRIBUTE_NAMES: [&str; ATTRIBUTE_COUNT] =
    ["hp", "str", "mag", "dex", "spd", "lck", "def", "res", "cha"];

/// Name used for the per-step total-increase distribution in reports.
pub const TOTAL_COUNT_NAME: &str = "step-total";

/// Maximum allowed |1 − Σp| for [`crate::density::pmf::ProbabilityVector::normalize`].
pub const NORMALIZATION_ERROR_LIMIT: f64 = 0.01;

/// Step probabilities within this distance of 0 or 1 take the exact fast path.
pub const PROBABILITY_ZERO_LIMIT: f64 = 0.0001;

/// Minimum number of increases per step guaranteed by the rescue rule.
pub const RESCUE_MINIMUM: i32 = 2;

/// Outcome forced by the rescue rule: str and mag increase, nothing else.
pub const RESCUE_OUTCOME: [i32; ATTRIBUTE_COUNT] = [0, 1, 1, 0, 0, 0, 0, 0, 0];

/// Amount a cap modifier raises each attribute of its pair.
pub const CAP_MODIFIER_BONUS: i32 = 5;

/// Ceiling used when an attribute is effectively uncapped.
pub const UNCAPPED: i32 = 1000;

/// Look up an attribute index by its canonical name.
pub fn attribute_index(name: &str) -> Option<usize> {
    ATTRIBUTE_NAMES.iter().position(|&n| n == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_names_round_trip() {
        for (i, name) in ATTRIBUTE_NAMES.iter().enumerate() {
            assert_eq!(attribute_index(name), Some(i));
        }
        assert_eq!(attribute_index("luck"), None);
    }

    #[test]
    fn test_rescue_outcome_meets_minimum() {
        let total: i32 = RESCUE_OUTCOME.iter().sum();
        assert_eq!(total, RESCUE_MINIMUM);
        assert_eq!(RESCUE_OUTCOME[ATTR_STR], 1);
        assert_eq!(RESCUE_OUTCOME[ATTR_MAG], 1);
    }
}
