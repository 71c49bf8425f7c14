//! Forward density evolution: propagate exact attribute distributions through a career.
//!
//! Starting from point masses at the career's base values, every step in
//! `[start_step, end_step]` goes through:
//!
//! 1. (all but the first step) one Bernoulli step per attribute, using the
//!    adjusted rates of the category active at the end of the previous step
//!    and the entity's maximum base values as ceilings
//! 2. the category changes scheduled at this step, as floor clamps in listed
//!    order
//! 3. a snapshot: normalized distributions shifted by the active category's
//!    bonus, plus that category's total-count distribution
//!
//! Rates and total-count distributions are computed once per distinct
//! category on the path before stepping begins.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::constants::{ATTRIBUTE_COUNT, ATTRIBUTE_NAMES};
use crate::error::{GrowthError, Result};
use crate::tables::{CapModifiers, EntityProfile, RateTables};
use crate::types::{add_rates, AttributeArray, Career, CategoryId, RatePair, StepSnapshot};

use super::adjustment::adjusted_rates;
use super::pmf::ProbabilityVector;
use super::total_count::total_count_distribution;
use super::transitions::{
    apply_category_changes, apply_step, export_snapshot, initial_distributions,
};

/// Snapshots keyed by step, one per step in `[start_step, end_step]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthResult {
    snapshots: BTreeMap<i32, StepSnapshot>,
}

impl GrowthResult {
    pub fn get(&self, step: i32) -> Result<&StepSnapshot> {
        self.snapshots
            .get(&step)
            .ok_or(GrowthError::MissingStep { step })
    }

    /// Snapshot at the last recorded step.
    pub fn last(&self) -> Option<&StepSnapshot> {
        self.snapshots.values().next_back()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&i32, &StepSnapshot)> {
        self.snapshots.iter()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Categories changed into at each step, indexed by `step - start_step`.
/// Same-step changes keep their listed order.
pub fn build_schedule(career: &Career) -> Result<Vec<Vec<CategoryId>>> {
    let mut schedule = vec![Vec::new(); career.step_count()];
    for change in &career.changes {
        let offset = change.step - career.start_step;
        let slot = usize::try_from(offset)
            .ok()
            .and_then(|o| schedule.get_mut(o))
            .ok_or(GrowthError::MissingStep { step: change.step })?;
        slot.push(change.category.clone());
    }
    Ok(schedule)
}

/// Raw and adjusted rates for every distinct category on the career's path.
pub fn build_rate_cache(
    profile: &EntityProfile,
    career: &Career,
    tables: &RateTables,
) -> Result<HashMap<CategoryId, RatePair>> {
    let mut cache = HashMap::new();
    for category in career.categories() {
        let data = tables.category(category)?;
        let raw = add_rates(&profile.base_rates, &data.rate_modifier);
        let adjusted = if profile.rescue_eligible {
            adjusted_rates(&raw)
        } else {
            raw
        };
        cache.insert(category.clone(), RatePair { raw, adjusted });
    }
    Ok(cache)
}

/// Total-count distribution per cached category, from its raw rates.
pub fn build_total_count_cache(
    rates: &HashMap<CategoryId, RatePair>,
    rescue: bool,
) -> Result<HashMap<CategoryId, ProbabilityVector>> {
    let mut cache = HashMap::with_capacity(rates.len());
    for (category, pair) in rates {
        cache.insert(category.clone(), total_count_distribution(&pair.raw, rescue)?);
    }
    Ok(cache)
}

/// Ceilings must sit at or above the starting values and every floor the
/// career is clamped to.
fn check_ceilings(
    maxima: &AttributeArray,
    start_base: &AttributeArray,
    career: &Career,
    tables: &RateTables,
) -> Result<()> {
    for i in 0..ATTRIBUTE_COUNT {
        if start_base[i] > maxima[i] {
            return Err(GrowthError::InvalidCareer {
                reason: format!(
                    "starting base {} {} exceeds maximum {}",
                    ATTRIBUTE_NAMES[i], start_base[i], maxima[i]
                ),
            });
        }
    }
    // Only entered categories clamp; the start category's floor never applies.
    for change in &career.changes {
        let category = &change.category;
        let floor = &tables.category(category)?.floor;
        for i in 0..ATTRIBUTE_COUNT {
            if floor[i] > maxima[i] {
                return Err(GrowthError::InvalidCareer {
                    reason: format!(
                        "{} floor for {} is {}, above maximum {}",
                        category, ATTRIBUTE_NAMES[i], floor[i], maxima[i]
                    ),
                });
            }
        }
    }
    Ok(())
}

/// Computes step-indexed attribute distributions for one career.
pub struct GrowthAccumulator<'a> {
    career: &'a Career,
    tables: &'a RateTables,
    rescue: bool,
    maxima: AttributeArray,
    start_base: AttributeArray,
    schedule: Vec<Vec<CategoryId>>,
    rates: HashMap<CategoryId, RatePair>,
    total_counts: HashMap<CategoryId, ProbabilityVector>,
}

impl<'a> GrowthAccumulator<'a> {
    /// Validate the career against the tables and precompute per-category data.
    pub fn new(
        profile: &EntityProfile,
        career: &'a Career,
        tables: &'a RateTables,
        mods: &CapModifiers,
    ) -> Result<Self> {
        let built = Self::build(profile, career, tables, mods);
        if let Err(e) = &built {
            warn!(error = %e, "rejecting career configuration");
        }
        built
    }

    fn build(
        profile: &EntityProfile,
        career: &'a Career,
        tables: &'a RateTables,
        mods: &CapModifiers,
    ) -> Result<Self> {
        career.validate()?;

        let maxima = profile.max_base_values(mods);
        let start_base = tables.base_from_displayed(&career.start_values, &career.start_category)?;
        check_ceilings(&maxima, &start_base, career, tables)?;

        let schedule = build_schedule(career)?;
        let rates = build_rate_cache(profile, career, tables)?;
        let total_counts = build_total_count_cache(&rates, profile.rescue_eligible)?;

        Ok(Self {
            career,
            tables,
            rescue: profile.rescue_eligible,
            maxima,
            start_base,
            schedule,
            rates,
            total_counts,
        })
    }

    /// Cached raw and adjusted rates for a category on the path.
    pub fn rate_pair(&self, category: &CategoryId) -> Result<&RatePair> {
        self.rates
            .get(category)
            .ok_or_else(|| GrowthError::MissingCategory {
                category: category.to_string(),
            })
    }

    fn total_count(&self, category: &CategoryId) -> Result<&ProbabilityVector> {
        self.total_counts
            .get(category)
            .ok_or_else(|| GrowthError::MissingCategory {
                category: category.to_string(),
            })
    }

    /// Run the full forward pass.
    pub fn compute(&self) -> Result<GrowthResult> {
        let t0 = Instant::now();
        debug!(
            steps = self.schedule.len(),
            categories = self.rates.len(),
            rescue = self.rescue,
            "starting forward pass"
        );

        let mut distributions = initial_distributions(&self.start_base);
        let mut active = &self.career.start_category;
        let mut snapshots = BTreeMap::new();

        for (offset, changes) in self.schedule.iter().enumerate() {
            let step = self.career.start_step + offset as i32;

            if offset > 0 {
                let pair = self.rate_pair(active)?;
                distributions = apply_step(distributions, &pair.adjusted, &self.maxima)?;
            }

            distributions = apply_category_changes(distributions, changes, self.tables)?;
            if let Some(last) = changes.last() {
                active = last;
            }

            let bonus = &self.tables.category(active)?.bonus;
            let snapshot = export_snapshot(
                step,
                active,
                &distributions,
                bonus,
                self.total_count(active)?,
            )?;
            trace!(step, category = %active, changes = changes.len(), "recorded step");
            snapshots.insert(step, snapshot);
        }

        info!(
            steps = snapshots.len(),
            elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
            "forward pass complete"
        );
        Ok(GrowthResult { snapshots })
    }
}

/// Compute one career's distributions.
pub fn compute(
    profile: &EntityProfile,
    career: &Career,
    tables: &RateTables,
    mods: &CapModifiers,
) -> Result<GrowthResult> {
    GrowthAccumulator::new(profile, career, tables, mods)?.compute()
}

/// One independent career computation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CareerRequest {
    pub profile: EntityProfile,
    pub career: Career,
    #[serde(default)]
    pub cap_modifiers: CapModifiers,
}

/// Compute independent careers in parallel; results keep request order.
pub fn compute_many(tables: &RateTables, requests: &[CareerRequest]) -> Vec<Result<GrowthResult>> {
    requests
        .par_iter()
        .map(|r| compute(&r.profile, &r.career, tables, &r.cap_modifiers))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ATTR_HP, ATTR_STR, UNCAPPED};
    use crate::tables::CategoryData;
    use crate::types::CategoryChange;

    fn profile(rate: f64, rescue: bool) -> EntityProfile {
        EntityProfile {
            base_rates: [rate; ATTRIBUTE_COUNT],
            rescue_eligible: rescue,
            max_base_values: [UNCAPPED; ATTRIBUTE_COUNT],
        }
    }

    fn tables() -> RateTables {
        let mut boosted = CategoryData::neutral();
        boosted.rate_modifier[ATTR_STR] = 0.2;
        boosted.floor[ATTR_HP] = 10;
        boosted.bonus[ATTR_STR] = 3;
        RateTables::new()
            .with_category("Plain", CategoryData::neutral())
            .with_category("Boosted", boosted)
    }

    fn career(changes: Vec<CategoryChange>) -> Career {
        Career {
            start_step: 1,
            start_category: "Plain".into(),
            start_values: [0; ATTRIBUTE_COUNT],
            changes,
            end_step: 10,
        }
    }

    #[test]
    fn test_schedule_keeps_same_step_order() {
        let c = career(vec![
            CategoryChange::new(3, "Boosted"),
            CategoryChange::new(3, "Plain"),
            CategoryChange::new(10, "Boosted"),
        ]);
        let schedule = build_schedule(&c).unwrap();
        assert_eq!(schedule.len(), 10);
        assert_eq!(
            schedule[2],
            vec![CategoryId::from("Boosted"), CategoryId::from("Plain")]
        );
        assert_eq!(schedule[9], vec![CategoryId::from("Boosted")]);
        assert!(schedule[0].is_empty());
    }

    #[test]
    fn test_rate_cache_raw_and_adjusted() {
        let c = career(vec![CategoryChange::new(5, "Boosted")]);
        let cache = build_rate_cache(&profile(0.5, false), &c, &tables()).unwrap();
        assert_eq!(cache.len(), 2);
        let boosted = &cache[&CategoryId::from("Boosted")];
        assert!((boosted.raw[ATTR_STR] - 0.7).abs() < 1e-12);
        assert_eq!(boosted.raw, boosted.adjusted);

        let rescued = build_rate_cache(&profile(0.5, true), &c, &tables()).unwrap();
        let plain = &rescued[&CategoryId::from("Plain")];
        assert_eq!(plain.adjusted, adjusted_rates(&plain.raw));
        assert_ne!(plain.adjusted, plain.raw);
    }

    #[test]
    fn test_rate_cache_missing_category() {
        let c = career(vec![CategoryChange::new(5, "Ghost")]);
        let err = build_rate_cache(&profile(0.5, false), &c, &tables()).unwrap_err();
        assert_eq!(
            err,
            GrowthError::MissingCategory {
                category: "Ghost".to_string()
            }
        );
    }

    #[test]
    fn test_every_step_recorded() {
        let c = career(vec![]);
        let result = compute(&profile(0.5, false), &c, &tables(), &CapModifiers::default()).unwrap();
        assert_eq!(result.len(), 10);
        assert_eq!(result.get(1).unwrap().attributes[0].get(&0), Some(&1.0));
        assert!(result.get(11).is_err());
        assert_eq!(result.last().unwrap().step, 10);
    }

    #[test]
    fn test_change_applies_floor_and_bonus() {
        let c = career(vec![CategoryChange::new(1, "Boosted")]);
        let result = compute(&profile(0.0, false), &c, &tables(), &CapModifiers::default()).unwrap();
        let first = result.get(1).unwrap();
        assert_eq!(first.category.as_str(), "Boosted");
        assert_eq!(first.attributes[ATTR_HP].get(&10), Some(&1.0));
        // Boosted str rate is 0.2 per step, shown with +3 bonus.
        let last = result.get(10).unwrap();
        assert_eq!(*last.attributes[ATTR_STR].keys().next().unwrap(), 3);
    }

    #[test]
    fn test_rejects_floor_above_ceiling() {
        let mut p = profile(0.5, false);
        p.max_base_values = [5; ATTRIBUTE_COUNT];
        let c = career(vec![CategoryChange::new(4, "Boosted")]);
        let err = compute(&p, &c, &tables(), &CapModifiers::default()).unwrap_err();
        assert!(matches!(err, GrowthError::InvalidCareer { .. }));
    }

    #[test]
    fn test_compute_many_keeps_order() {
        let requests = vec![
            CareerRequest {
                profile: profile(0.5, false),
                career: career(vec![]),
                cap_modifiers: CapModifiers::default(),
            },
            CareerRequest {
                profile: profile(0.5, false),
                career: career(vec![CategoryChange::new(2, "Ghost")]),
                cap_modifiers: CapModifiers::default(),
            },
        ];
        let results = compute_many(&tables(), &requests);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
