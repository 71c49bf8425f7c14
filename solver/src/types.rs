//! Core data structures: per-attribute arrays, categories and career descriptions.
//!
//! A [`Career`] is the caller's description of one entity's progression:
//! where it starts (step, category, displayed attribute values), which
//! categories it moves into at which steps, and where it stops. The
//! accumulator consumes it together with [`crate::tables::RateTables`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::ATTRIBUTE_COUNT;
use crate::error::{GrowthError, Result};

/// One integer per attribute (values, floors, bonuses, maxima).
pub type AttributeArray = [i32; ATTRIBUTE_COUNT];

/// One success probability per attribute for a single step.
pub type RateVector = [f64; ATTRIBUTE_COUNT];

/// Identifier of a category an entity can occupy.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub String);

impl CategoryId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// A scheduled move into `category` at `step`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryChange {
    pub step: i32,
    pub category: CategoryId,
}

impl CategoryChange {
    pub fn new(step: i32, category: impl Into<CategoryId>) -> Self {
        Self {
            step,
            category: category.into(),
        }
    }
}

/// Career description for one entity.
///
/// `start_values` are displayed values (base + the starting category's bonus).
/// `changes` must be listed in non-decreasing step order; same-step changes
/// are applied in listed order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Career {
    pub start_step: i32,
    pub start_category: CategoryId,
    pub start_values: AttributeArray,
    pub changes: Vec<CategoryChange>,
    pub end_step: i32,
}

impl Career {
    /// Check the ordering constraints. Does not consult any tables.
    pub fn validate(&self) -> Result<()> {
        if self.start_step > self.end_step {
            return Err(GrowthError::InvalidCareer {
                reason: format!(
                    "start step {} is after end step {}",
                    self.start_step, self.end_step
                ),
            });
        }

        for (i, change) in self.changes.iter().enumerate() {
            if change.step < self.start_step || change.step > self.end_step {
                return Err(GrowthError::InvalidCareer {
                    reason: format!(
                        "change to {} at step {} is outside [{}, {}]",
                        change.category, change.step, self.start_step, self.end_step
                    ),
                });
            }
            if i > 0 && change.step < self.changes[i - 1].step {
                return Err(GrowthError::InvalidCareer {
                    reason: format!(
                        "change to {} at step {} is listed after a change at step {}",
                        change.category,
                        change.step,
                        self.changes[i - 1].step
                    ),
                });
            }
        }

        Ok(())
    }

    /// Number of recorded steps, `end_step - start_step + 1`.
    pub fn step_count(&self) -> usize {
        (self.end_step - self.start_step + 1).max(0) as usize
    }

    /// Every distinct category on the path, start category first, in order of
    /// first appearance.
    pub fn categories(&self) -> Vec<&CategoryId> {
        let mut seen: Vec<&CategoryId> = vec![&self.start_category];
        for change in &self.changes {
            if !seen.contains(&&change.category) {
                seen.push(&change.category);
            }
        }
        seen
    }

    /// Category active after all changes scheduled at or before `step`.
    pub fn category_at(&self, step: i32) -> &CategoryId {
        self.changes
            .iter()
            .take_while(|c| c.step <= step)
            .last()
            .map(|c| &c.category)
            .unwrap_or(&self.start_category)
    }
}

/// Sparse value ↦ probability mapping, as exported from a probability vector.
pub type Distribution = BTreeMap<i32, f64>;

/// Displayed-value distributions for one recorded step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepSnapshot {
    pub step: i32,
    /// Category active after this step's changes; its bonus is included in
    /// `attributes`.
    pub category: CategoryId,
    pub attributes: [Distribution; ATTRIBUTE_COUNT],
    /// Distribution of how many attributes increase on the next step.
    pub total_count: Distribution,
}

impl StepSnapshot {
    pub fn attribute(&self, index: usize) -> Option<&Distribution> {
        self.attributes.get(index)
    }

    /// Look up by canonical attribute name, or the total-count name.
    pub fn by_name(&self, name: &str) -> Option<&Distribution> {
        if name == crate::constants::TOTAL_COUNT_NAME {
            return Some(&self.total_count);
        }
        crate::constants::attribute_index(name).map(|i| &self.attributes[i])
    }
}

/// Raw and rescue-adjusted rates for one category.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatePair {
    /// Base rate + category modifier, clamped to [0, 1].
    pub raw: RateVector,
    /// Rates actually used for stepping (equal to `raw` without the rescue rule).
    pub adjusted: RateVector,
}

/// Element-wise `a + b`.
#[inline]
pub fn add_attributes(a: &AttributeArray, b: &AttributeArray) -> AttributeArray {
    std::array::from_fn(|i| a[i] + b[i])
}

/// Element-wise `a - b`.
#[inline]
pub fn sub_attributes(a: &AttributeArray, b: &AttributeArray) -> AttributeArray {
    std::array::from_fn(|i| a[i] - b[i])
}

/// Element-wise maximum.
#[inline]
pub fn max_attributes(a: &AttributeArray, b: &AttributeArray) -> AttributeArray {
    std::array::from_fn(|i| a[i].max(b[i]))
}

/// Element-wise `a + b`, each sum clamped to [0, 1].
#[inline]
pub fn add_rates(a: &RateVector, b: &RateVector) -> RateVector {
    std::array::from_fn(|i| (a[i] + b[i]).clamp(0.0, 1.0))
}

/// Sum of all attributes.
#[inline]
pub fn attribute_total(a: &AttributeArray) -> i32 {
    a.iter().sum()
}
