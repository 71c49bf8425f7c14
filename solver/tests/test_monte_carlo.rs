//! Analytic results vs sampled careers.
//!
//! For a fixed tolerance, the chance that every bucket of a sampled histogram
//! lands within it of the exact value goes to 1 as the sample count grows.
//! The default cases use a modest sample count and a loose tolerance. The
//! ignored cases hold 0.001 with sample counts that put it at 4.5 standard
//! errors or more per bucket, and are slow.
//!
//! Run with: cargo test --release --test test_monte_carlo -- --ignored

use statgrowth::constants::{ATTRIBUTE_COUNT, ATTRIBUTE_NAMES, RESCUE_OUTCOME, UNCAPPED};
use statgrowth::density::adjustment::adjusted_rates;
use statgrowth::density::total_count::total_count_distribution;
use statgrowth::scenarios::{self, Scenario};
use statgrowth::simulation::{
    draw_histogram, max_deviation, simulate_step_marginals, simulate_step_totals,
    CareerSimulator, CumulativeSampler,
};
use statgrowth::statistics::sample_median;
use statgrowth::types::{add_rates, RateVector};
use statgrowth::compute;

const SEED: u64 = 23_984_619;

fn check_career(scenario: Scenario, samples: usize, delta: f64) {
    let tables = scenarios::demo_tables();
    let r = &scenario.request;

    let analytic = compute(&r.profile, &r.career, &tables, &r.cap_modifiers).unwrap();
    let last = analytic.get(r.career.end_step).unwrap();

    let simulator = CareerSimulator::new(&r.profile, &r.career, &tables, &r.cap_modifiers).unwrap();
    let sampled = simulator.simulate_distribution(samples, SEED);

    for i in 0..ATTRIBUTE_COUNT {
        let dev = max_deviation(&last.attributes[i], &sampled[i]);
        assert!(
            dev < delta,
            "{} {}: max deviation {dev:.5} >= {delta}",
            scenario.name,
            ATTRIBUTE_NAMES[i]
        );
    }
}

/// Raw rates of the student entity in its third category.
fn student_rates() -> RateVector {
    let tables = scenarios::demo_tables();
    let s = scenarios::student();
    let modifier = tables.category(&"Lancer".into()).unwrap().rate_modifier;
    add_rates(&s.request.profile.base_rates, &modifier)
}

fn check_step_marginals(rates: &RateVector, rescue: bool, samples: usize, delta: f64) {
    let expected = if rescue { adjusted_rates(rates) } else { *rates };
    let observed = simulate_step_marginals(rates, rescue, samples, 239_047);
    for i in 0..ATTRIBUTE_COUNT {
        assert!(
            (expected[i] - observed[i]).abs() < delta,
            "{}: {:.5} vs {:.5}",
            ATTRIBUTE_NAMES[i],
            expected[i],
            observed[i]
        );
    }
}

/// Median luck of sampled careers, ranked against the analytic final step.
///
/// Maxima are lifted so no final distribution piles up on a single value.
fn check_median_luck(scenario: Scenario, samples: usize, delta: f64) {
    let tables = scenarios::demo_tables();
    let mut r = scenario.request;
    r.profile.max_base_values = [UNCAPPED; ATTRIBUTE_COUNT];

    let analytic = compute(&r.profile, &r.career, &tables, &r.cap_modifiers).unwrap();
    let last = analytic.get(r.career.end_step).unwrap();

    let simulator = CareerSimulator::new(&r.profile, &r.career, &tables, &r.cap_modifiers).unwrap();
    let ratings = simulator.simulate_luck(last, samples, SEED);
    let median = sample_median(&ratings).unwrap();
    assert!(
        median.abs() <= delta,
        "{}: median luck {median:.5} outside ±{delta}",
        scenario.name
    );
}

fn check_step_totals(rates: &RateVector, rescue: bool, samples: usize, delta: f64) {
    let expected = total_count_distribution(rates, rescue).unwrap().export(0);
    let observed = simulate_step_totals(rates, rescue, samples, 239_047);
    let dev = max_deviation(&expected, &observed);
    assert!(dev < delta, "max deviation {dev:.5} >= {delta}");
}

// ── Smoke (default) ──────────────────────────────────────────────────

#[test]
fn test_student_career_smoke() {
    check_career(scenarios::student(), 200_000, 0.008);
}

#[test]
fn test_veteran_career_smoke() {
    check_career(scenarios::veteran(), 200_000, 0.006);
}

#[test]
fn test_step_marginals_smoke() {
    check_step_marginals(&student_rates(), true, 200_000, 0.006);
    check_step_marginals(&[0.05; ATTRIBUTE_COUNT], true, 200_000, 0.006);
}

#[test]
fn test_step_totals_smoke() {
    check_step_totals(&student_rates(), true, 200_000, 0.006);
    check_step_totals(&student_rates(), false, 200_000, 0.006);
}

#[test]
fn test_median_luck_smoke() {
    check_median_luck(scenarios::student(), 20_000, 0.02);
    check_median_luck(scenarios::veteran(), 20_000, 0.02);
}

#[test]
fn test_sampler_reproduces_snapshot() {
    let tables = scenarios::demo_tables();
    let r = scenarios::veteran().request;
    let analytic = compute(&r.profile, &r.career, &tables, &r.cap_modifiers).unwrap();
    let hp = &analytic.get(r.career.end_step).unwrap().attributes[0];

    let sampler = CumulativeSampler::from_distribution(hp).unwrap();
    let drawn = draw_histogram(&sampler, 200_000, 11);
    assert!(max_deviation(hp, &drawn) < 0.006);
}

// ── Full size ────────────────────────────────────────────────────────

#[test]
#[ignore]
fn test_student_career_matches_simulation() {
    check_career(scenarios::student(), 5_000_000, 0.001);
}

#[test]
#[ignore]
fn test_veteran_career_matches_simulation() {
    check_career(scenarios::veteran(), 5_000_000, 0.001);
}

#[test]
#[ignore]
fn test_adjusted_rates_match_simulation() {
    check_step_marginals(&student_rates(), true, 10_000_000, 0.001);
}

#[test]
#[ignore]
fn test_even_odds_adjusted_rates_match_simulation() {
    let rates = [0.5; ATTRIBUTE_COUNT];
    let adjusted = adjusted_rates(&rates);
    for i in 0..ATTRIBUTE_COUNT {
        if RESCUE_OUTCOME[i] == 1 {
            assert!(adjusted[i] > rates[i], "{}", ATTRIBUTE_NAMES[i]);
        } else {
            assert!(adjusted[i] < rates[i], "{}", ATTRIBUTE_NAMES[i]);
        }
    }
    check_step_marginals(&rates, true, 10_000_000, 0.001);
}

#[test]
#[ignore]
fn test_step_totals_match_simulation() {
    check_step_totals(&student_rates(), true, 10_000_000, 0.001);
    check_step_totals(&student_rates(), false, 10_000_000, 0.001);
}

#[test]
#[ignore]
fn test_median_luck_matches_simulation() {
    check_median_luck(scenarios::student(), 1_000_000, 0.01);
    check_median_luck(scenarios::veteran(), 1_000_000, 0.01);
}
