//! Externally supplied rate and category tables.
//!
//! [`RateTables`] is built once by whatever loads the data and then passed by
//! reference into [`crate::density::forward::GrowthAccumulator`]. Nothing in
//! the crate mutates it, so one instance can back any number of concurrent
//! computations.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{GrowthError, Result};
use crate::types::{sub_attributes, AttributeArray, CategoryId, RateVector};

/// Per-entity data: base rates, rescue eligibility and attribute maxima.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityProfile {
    /// Per-step success probability for each attribute, before category modifiers.
    pub base_rates: RateVector,
    /// Whether steps with fewer than two increases are replaced by the rescue outcome.
    pub rescue_eligible: bool,
    /// Maximum base (bonus-free) value per attribute, before cap modifiers.
    pub max_base_values: AttributeArray,
}

impl EntityProfile {
    /// Maxima after applying the enabled cap modifiers.
    pub fn max_base_values(&self, mods: &CapModifiers) -> AttributeArray {
        let mut maxima = self.max_base_values;
        for (a, b) in mods.raised_pairs() {
            maxima[a] += CAP_MODIFIER_BONUS;
            maxima[b] += CAP_MODIFIER_BONUS;
        }
        maxima
    }
}

/// Toggles that each raise one fixed pair of maxima by [`CAP_MODIFIER_BONUS`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapModifiers {
    pub str_and_spd: bool,
    pub lck_and_cha: bool,
    pub mag_and_dex: bool,
    pub def_and_res: bool,
}

impl CapModifiers {
    /// Every modifier enabled.
    pub fn all() -> Self {
        Self {
            str_and_spd: true,
            lck_and_cha: true,
            mag_and_dex: true,
            def_and_res: true,
        }
    }

    /// Attribute pairs raised by the enabled toggles.
    pub fn raised_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::with_capacity(4);
        if self.str_and_spd {
            pairs.push((ATTR_STR, ATTR_SPD));
        }
        if self.lck_and_cha {
            pairs.push((ATTR_LCK, ATTR_CHA));
        }
        if self.mag_and_dex {
            pairs.push((ATTR_MAG, ATTR_DEX));
        }
        if self.def_and_res {
            pairs.push((ATTR_DEF, ATTR_RES));
        }
        pairs
    }
}

/// Per-category data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryData {
    /// Added to the entity's base rates, then clamped to [0, 1].
    pub rate_modifier: RateVector,
    /// Minimum base value per attribute while this category is active.
    pub floor: AttributeArray,
    /// Added to base values for display while this category is active.
    pub bonus: AttributeArray,
}

impl CategoryData {
    /// A category with no modifier, floor or bonus.
    pub fn neutral() -> Self {
        Self {
            rate_modifier: [0.0; ATTRIBUTE_COUNT],
            floor: [0; ATTRIBUTE_COUNT],
            bonus: [0; ATTRIBUTE_COUNT],
        }
    }
}

/// Entity and category tables consumed by one or more computations.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RateTables {
    pub categories: HashMap<CategoryId, CategoryData>,
}

impl RateTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_category(mut self, id: impl Into<CategoryId>, data: CategoryData) -> Self {
        self.categories.insert(id.into(), data);
        self
    }

    pub fn insert_category(&mut self, id: impl Into<CategoryId>, data: CategoryData) {
        self.categories.insert(id.into(), data);
    }

    /// Category data, or a configuration error naming the missing category.
    pub fn category(&self, id: &CategoryId) -> Result<&CategoryData> {
        self.categories
            .get(id)
            .ok_or_else(|| GrowthError::MissingCategory {
                category: id.to_string(),
            })
    }

    /// Convert displayed values in category `id` to base values.
    pub fn base_from_displayed(
        &self,
        displayed: &AttributeArray,
        id: &CategoryId,
    ) -> Result<AttributeArray> {
        Ok(sub_attributes(displayed, &self.category(id)?.bonus))
    }
}
