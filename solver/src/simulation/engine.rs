//! Monte-Carlo career simulation, used to falsify the analytic engine.
//!
//! Each sample plays one career with the true correlated rescue rule: every
//! attribute rolls independently against its raw rate, and a step with fewer
//! than [`RESCUE_MINIMUM`] increases is replaced by [`RESCUE_OUTCOME`]. Base
//! values are capped at the entity's maxima and raised to category floors
//! exactly as [`crate::density::forward`] assumes.
//!
//! Sample `i` uses [`sample_rng`]`(seed, i)`, so results are reproducible
//! regardless of how rayon splits the batch. The base seed is mixed before
//! `i` is added; nearby base seeds draw disjoint sample streams.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::info;

use crate::constants::*;
use crate::density::forward::build_schedule;
use crate::error::{GrowthError, Result};
use crate::statistics::{luck_rating, percentile_ranks};
use crate::tables::{CapModifiers, EntityProfile, RateTables};
use crate::types::{
    add_attributes, add_rates, attribute_total, max_attributes, AttributeArray, Career,
    CategoryId, Distribution, RateVector, StepSnapshot,
};

use super::sampler::CumulativeSampler;

/// Everything one step of a sampled career needs, resolved up front.
#[derive(Clone, Debug)]
struct StepPlan {
    /// Floors of the categories entered at this step, in listed order.
    floors: Vec<AttributeArray>,
    /// Raw rates of the category active after this step's changes.
    rates: RateVector,
    /// Bonus of the category active after this step's changes.
    bonus: AttributeArray,
}

/// Per-attribute value counts.
#[derive(Clone, Debug, Default)]
struct Histograms {
    counts: [BTreeMap<i32, u64>; ATTRIBUTE_COUNT],
}

impl Histograms {
    fn record(&mut self, values: &AttributeArray) {
        for (count, &v) in self.counts.iter_mut().zip(values) {
            *count.entry(v).or_insert(0) += 1;
        }
    }

    fn merge(mut self, other: Self) -> Self {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts) {
            for (v, n) in theirs {
                *mine.entry(v).or_insert(0) += n;
            }
        }
        self
    }

    fn into_distributions(self, samples: usize) -> [Distribution; ATTRIBUTE_COUNT] {
        self.counts.map(|c| normalize_counts(c, samples))
    }
}

fn normalize_counts(counts: BTreeMap<i32, u64>, samples: usize) -> Distribution {
    let n = samples.max(1) as f64;
    counts.into_iter().map(|(v, c)| (v, c as f64 / n)).collect()
}

/// SplitMix64 finalizer.
fn mix_seed(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Generator for sample `index` of a batch run with base `seed`.
#[inline]
pub fn sample_rng(seed: u64, index: u64) -> SmallRng {
    SmallRng::seed_from_u64(mix_seed(seed).wrapping_add(index))
}

/// Roll one step's increases, applying the rescue rule when enabled.
#[inline]
pub fn draw_increases(rates: &RateVector, rescue: bool, rng: &mut SmallRng) -> AttributeArray {
    let mut ups = [0i32; ATTRIBUTE_COUNT];
    for (up, &p) in ups.iter_mut().zip(rates) {
        if rng.random::<f64>() < p {
            *up = 1;
        }
    }
    if rescue && attribute_total(&ups) < RESCUE_MINIMUM {
        ups = RESCUE_OUTCOME;
    }
    ups
}

/// A career resolved against its tables, ready to be sampled repeatedly.
#[derive(Clone, Debug)]
pub struct CareerSimulator {
    start_base: AttributeArray,
    maxima: AttributeArray,
    rescue: bool,
    plans: Vec<StepPlan>,
}

impl CareerSimulator {
    pub fn new(
        profile: &EntityProfile,
        career: &Career,
        tables: &RateTables,
        mods: &CapModifiers,
    ) -> Result<Self> {
        career.validate()?;
        let start_base = tables.base_from_displayed(&career.start_values, &career.start_category)?;
        let schedule = build_schedule(career)?;

        let mut raw_rates: HashMap<&CategoryId, RateVector> = HashMap::new();
        for category in career.categories() {
            let modifier = &tables.category(category)?.rate_modifier;
            raw_rates.insert(category, add_rates(&profile.base_rates, modifier));
        }

        let mut active = &career.start_category;
        let mut plans = Vec::with_capacity(schedule.len());
        for changes in &schedule {
            let mut floors = Vec::with_capacity(changes.len());
            for category in changes {
                floors.push(tables.category(category)?.floor);
                active = category;
            }
            let rates = raw_rates
                .get(active)
                .copied()
                .ok_or_else(|| GrowthError::MissingCategory {
                    category: active.to_string(),
                })?;
            let bonus = tables.category(active)?.bonus;
            plans.push(StepPlan {
                floors,
                rates,
                bonus,
            });
        }

        Ok(Self {
            start_base,
            maxima: profile.max_base_values(mods),
            rescue: profile.rescue_eligible,
            plans,
        })
    }

    /// Play one career and return its final displayed values.
    pub fn simulate_one(&self, rng: &mut SmallRng) -> AttributeArray {
        let mut base = self.start_base;
        let mut previous: Option<&StepPlan> = None;

        for plan in &self.plans {
            if let Some(prev) = previous {
                let ups = draw_increases(&prev.rates, self.rescue, rng);
                for i in 0..ATTRIBUTE_COUNT {
                    base[i] = (base[i] + ups[i]).min(self.maxima[i]);
                }
            }
            for floor in &plan.floors {
                base = max_attributes(&base, floor);
            }
            previous = Some(plan);
        }

        match previous {
            Some(last) => add_attributes(&base, &last.bonus),
            None => base,
        }
    }

    /// Final displayed-value distributions over `samples` careers.
    pub fn simulate_distribution(
        &self,
        samples: usize,
        seed: u64,
    ) -> [Distribution; ATTRIBUTE_COUNT] {
        let t0 = Instant::now();

        let histograms = (0..samples as u64)
            .into_par_iter()
            .fold(Histograms::default, |mut h, i| {
                let mut rng = sample_rng(seed, i);
                h.record(&self.simulate_one(&mut rng));
                h
            })
            .reduce(Histograms::default, Histograms::merge);

        info!(
            samples,
            steps = self.plans.len(),
            elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
            "sampled careers"
        );
        histograms.into_distributions(samples)
    }

    /// Luck rating of each sampled career, ranked against `reference`.
    pub fn simulate_luck(&self, reference: &StepSnapshot, samples: usize, seed: u64) -> Vec<f64> {
        let t0 = Instant::now();
        let ratings: Vec<f64> = (0..samples as u64)
            .into_par_iter()
            .map(|i| {
                let mut rng = sample_rng(seed, i);
                let line = self.simulate_one(&mut rng);
                luck_rating(&percentile_ranks(reference, &line))
            })
            .collect();
        info!(
            samples,
            elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
            "rated sampled careers"
        );
        ratings
    }
}

/// Observed per-attribute increase frequency for one step under `rates`.
pub fn simulate_step_marginals(
    rates: &RateVector,
    rescue: bool,
    samples: usize,
    seed: u64,
) -> RateVector {
    let totals = (0..samples as u64)
        .into_par_iter()
        .fold(
            || [0u64; ATTRIBUTE_COUNT],
            |mut acc, i| {
                let mut rng = sample_rng(seed, i);
                let ups = draw_increases(rates, rescue, &mut rng);
                for (a, &u) in acc.iter_mut().zip(&ups) {
                    *a += u as u64;
                }
                acc
            },
        )
        .reduce(
            || [0u64; ATTRIBUTE_COUNT],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b) {
                    *x += y;
                }
                a
            },
        );

    let n = samples.max(1) as f64;
    totals.map(|t| t as f64 / n)
}

/// Observed distribution of total increases for one step under `rates`.
pub fn simulate_step_totals(
    rates: &RateVector,
    rescue: bool,
    samples: usize,
    seed: u64,
) -> Distribution {
    let counts = (0..samples as u64)
        .into_par_iter()
        .fold(BTreeMap::new, |mut acc: BTreeMap<i32, u64>, i| {
            let mut rng = sample_rng(seed, i);
            let total = attribute_total(&draw_increases(rates, rescue, &mut rng));
            *acc.entry(total).or_insert(0) += 1;
            acc
        })
        .reduce(BTreeMap::new, |mut a, b| {
            for (k, n) in b {
                *a.entry(k).or_insert(0) += n;
            }
            a
        });

    normalize_counts(counts, samples)
}

/// Empirical distribution of `samples` draws from `sampler`.
pub fn draw_histogram(sampler: &CumulativeSampler, samples: usize, seed: u64) -> Distribution {
    let counts = (0..samples as u64)
        .into_par_iter()
        .fold(BTreeMap::new, |mut acc: BTreeMap<i32, u64>, i| {
            let mut rng = sample_rng(seed, i);
            *acc.entry(sampler.sample(rng.random::<f64>())).or_insert(0) += 1;
            acc
        })
        .reduce(BTreeMap::new, |mut a, b| {
            for (k, n) in b {
                *a.entry(k).or_insert(0) += n;
            }
            a
        });

    normalize_counts(counts, samples)
}

/// Largest absolute per-bucket difference; a bucket missing on one side counts as 0.
pub fn max_deviation(a: &Distribution, b: &Distribution) -> f64 {
    a.keys()
        .chain(b.keys())
        .map(|k| {
            let pa = a.get(k).copied().unwrap_or(0.0);
            let pb = b.get(k).copied().unwrap_or(0.0);
            (pa - pb).abs()
        })
        .fold(0.0, f64::max)
}
