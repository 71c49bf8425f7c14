//! Whole-entity transitions over the nine per-attribute distributions.
//!
//! Each function consumes the current set and returns the next one; the
//! per-attribute transforms themselves live on
//! [`ProbabilityVector`](super::pmf::ProbabilityVector).

use crate::constants::ATTRIBUTE_COUNT;
use crate::error::Result;
use crate::tables::RateTables;
use crate::types::{AttributeArray, CategoryId, Distribution, RateVector, StepSnapshot};

use super::pmf::ProbabilityVector;

/// One base-value distribution per attribute.
pub type AttributeDistributions = [ProbabilityVector; ATTRIBUTE_COUNT];

/// Point masses at the given base values.
pub fn initial_distributions(base: &AttributeArray) -> AttributeDistributions {
    std::array::from_fn(|i| ProbabilityVector::point(base[i]))
}

/// Step every attribute forward with its rate, capped at its maximum.
pub fn apply_step(
    mut distributions: AttributeDistributions,
    rates: &RateVector,
    caps: &AttributeArray,
) -> Result<AttributeDistributions> {
    for (i, dist) in distributions.iter_mut().enumerate() {
        *dist = dist.step(rates[i], caps[i])?;
    }
    Ok(distributions)
}

/// Apply category floors in listed order.
///
/// A later change can raise a value an earlier same-step change already set.
pub fn apply_category_changes(
    mut distributions: AttributeDistributions,
    changes: &[CategoryId],
    tables: &RateTables,
) -> Result<AttributeDistributions> {
    for category in changes {
        let floor = &tables.category(category)?.floor;
        for (i, dist) in distributions.iter_mut().enumerate() {
            *dist = dist.clamp_from_below(floor[i]);
        }
    }
    Ok(distributions)
}

/// Normalize copies of the distributions and export them shifted by `bonus`.
pub fn export_snapshot(
    step: i32,
    category: &CategoryId,
    distributions: &AttributeDistributions,
    bonus: &AttributeArray,
    total_count: &ProbabilityVector,
) -> Result<StepSnapshot> {
    let mut attributes: [Distribution; ATTRIBUTE_COUNT] = Default::default();
    for (i, dist) in distributions.iter().enumerate() {
        let mut normalized = dist.clone();
        normalized.normalize()?;
        attributes[i] = normalized.export(bonus[i]);
    }

    Ok(StepSnapshot {
        step,
        category: category.clone(),
        attributes,
        total_count: total_count.export(0),
    })
}
