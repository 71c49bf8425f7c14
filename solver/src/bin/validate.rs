//! Compare analytic distributions against sampled careers.
//!
//! For every built-in scenario: final-step attribute distributions (analytic
//! vs Monte Carlo), single-step adjusted rates vs sampled marginals, and the
//! single-step total-count distribution vs a sampled histogram. Also draws one
//! realized stat line from the analytic result and reports its luck rating,
//! next to the median luck of the sampled careers. Writes a JSON report and
//! prints a summary table.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{error, info};

use statgrowth::constants::{ATTRIBUTE_COUNT, ATTRIBUTE_NAMES};
use statgrowth::density::adjustment::adjusted_rates;
use statgrowth::density::forward::compute;
use statgrowth::density::total_count::total_count_distribution;
use statgrowth::env_config;
use statgrowth::error::GrowthError;
use statgrowth::logging::init_tracing;
use statgrowth::scenarios::{self, Scenario};
use statgrowth::simulation::{
    max_deviation, simulate_step_marginals, simulate_step_totals, CareerSimulator,
    CumulativeSampler,
};
use statgrowth::statistics::{luck_rating, median_of, percentile_ranks, sample_median};
use statgrowth::tables::RateTables;
use statgrowth::types::{add_rates, AttributeArray};

struct Args {
    samples: usize,
    seed: u64,
    output: String,
    scenario: Option<String>,
}

fn print_usage() {
    println!("Usage: statgrowth-validate [--samples N] [--seed S] [--output FILE] [--scenario NAME]");
    println!();
    println!("Options:");
    println!("  --samples N        Monte-Carlo samples per comparison (env STATGROWTH_SAMPLES, default 1000000)");
    println!("  --seed S           Base RNG seed (env STATGROWTH_SEED, default 23984619)");
    println!("  --output FILE      JSON report path (env STATGROWTH_OUTPUT, default outputs/validation.json)");
    println!("  --scenario NAME    Run a single built-in scenario (student, veteran)");
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut samples = env_config::sample_count();
    let mut seed = env_config::seed();
    let mut output = env_config::output_path().display().to_string();
    let mut scenario = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--samples" => {
                i += 1;
                if i < args.len() {
                    samples = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --samples value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --seed value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--output" => {
                i += 1;
                if i < args.len() {
                    output = args[i].clone();
                }
            }
            "--scenario" => {
                i += 1;
                if i < args.len() {
                    scenario = Some(args[i].clone());
                }
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    if samples == 0 {
        eprintln!("Error: --samples must be positive");
        std::process::exit(1);
    }

    Args {
        samples,
        seed,
        output,
        scenario,
    }
}

#[derive(Serialize)]
struct AttributeReport {
    name: &'static str,
    max_deviation: f64,
    analytic_median: Option<i32>,
    median_display_percentile: Option<f64>,
    realized: i32,
    realized_percentile_rank: f64,
}

#[derive(Serialize)]
struct ScenarioReport {
    name: &'static str,
    final_step: i32,
    final_category: String,
    attributes: Vec<AttributeReport>,
    worst_attribute_deviation: f64,
    step_rate_deviation: f64,
    step_total_deviation: f64,
    realized_luck: f64,
    sampled_median_luck: Option<f64>,
    analytic_ms: f64,
    sampled_ms: f64,
}

#[derive(Serialize)]
struct ValidationReport {
    samples: usize,
    seed: u64,
    scenarios: Vec<ScenarioReport>,
}

/// Write `json` to `path`, creating missing parent directories.
fn write_report(path: &Path, json: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, json)
}

fn validate_scenario(
    scenario: &Scenario,
    tables: &RateTables,
    samples: usize,
    seed: u64,
) -> Result<ScenarioReport, GrowthError> {
    let r = &scenario.request;

    let t0 = Instant::now();
    let analytic = compute(&r.profile, &r.career, tables, &r.cap_modifiers)?;
    let analytic_ms = t0.elapsed().as_secs_f64() * 1000.0;
    let last = analytic.get(r.career.end_step)?;

    let t1 = Instant::now();
    let simulator = CareerSimulator::new(&r.profile, &r.career, tables, &r.cap_modifiers)?;
    let sampled = simulator.simulate_distribution(samples, seed);
    let sampled_ms = t1.elapsed().as_secs_f64() * 1000.0;

    // Sampled careers ranked against the analytic result center on zero luck.
    let sampled_median_luck = sample_median(&simulator.simulate_luck(last, samples, seed));

    // One realized stat line drawn from the analytic result.
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut realized: AttributeArray = [0; ATTRIBUTE_COUNT];
    for i in 0..ATTRIBUTE_COUNT {
        let sampler = CumulativeSampler::from_distribution(&last.attributes[i])?;
        realized[i] = sampler.sample(rng.random::<f64>());
    }
    let ranks = percentile_ranks(last, &realized);

    let attributes: Vec<AttributeReport> = (0..ATTRIBUTE_COUNT)
        .map(|i| {
            let median = median_of(&last.attributes[i]);
            AttributeReport {
                name: ATTRIBUTE_NAMES[i],
                max_deviation: max_deviation(&last.attributes[i], &sampled[i]),
                analytic_median: median.map(|m| m.median),
                median_display_percentile: median.map(|m| m.display_percentile()),
                realized: realized[i],
                realized_percentile_rank: ranks[i].percentile_rank(),
            }
        })
        .collect();
    let worst_attribute_deviation = attributes
        .iter()
        .map(|a| a.max_deviation)
        .fold(0.0, f64::max);

    // Single-step checks at the starting category.
    let modifier = &tables.category(&r.career.start_category)?.rate_modifier;
    let raw = add_rates(&r.profile.base_rates, modifier);
    let rescue = r.profile.rescue_eligible;
    let expected_rates = if rescue { adjusted_rates(&raw) } else { raw };
    let observed_rates = simulate_step_marginals(&raw, rescue, samples, seed);
    let step_rate_deviation = expected_rates
        .iter()
        .zip(&observed_rates)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);

    let expected_totals = total_count_distribution(&raw, rescue)?.export(0);
    let observed_totals = simulate_step_totals(&raw, rescue, samples, seed);
    let step_total_deviation = max_deviation(&expected_totals, &observed_totals);

    Ok(ScenarioReport {
        name: scenario.name,
        final_step: last.step,
        final_category: last.category.to_string(),
        attributes,
        worst_attribute_deviation,
        step_rate_deviation,
        step_total_deviation,
        realized_luck: luck_rating(&ranks),
        sampled_median_luck,
        analytic_ms,
        sampled_ms,
    })
}

fn main() {
    init_tracing("info");
    let args = parse_args();
    env_config::init_rayon_threads();

    let tables = scenarios::demo_tables();
    let selected: Vec<Scenario> = scenarios::all()
        .into_iter()
        .filter(|s| args.scenario.as_deref().map_or(true, |name| name == s.name))
        .collect();
    if selected.is_empty() {
        eprintln!(
            "Unknown scenario: '{}'",
            args.scenario.as_deref().unwrap_or_default()
        );
        std::process::exit(1);
    }

    println!(
        "Validating {} scenario(s) with {} samples (seed {})",
        selected.len(),
        args.samples,
        args.seed
    );

    let mut reports = Vec::with_capacity(selected.len());
    for scenario in &selected {
        match validate_scenario(scenario, &tables, args.samples, args.seed) {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!(scenario = scenario.name, error = %e, "validation failed");
                std::process::exit(1);
            }
        }
    }

    println!();
    println!(
        "{:<10} {:>10} {:>10} {:>10} {:>8} {:>10} {:>10} {:>10}",
        "scenario", "attr dev", "rate dev", "total dev", "luck", "mc luck", "exact ms", "mc ms"
    );
    for r in &reports {
        println!(
            "{:<10} {:>10.5} {:>10.5} {:>10.5} {:>8.3} {:>10.4} {:>10.2} {:>10.1}",
            r.name,
            r.worst_attribute_deviation,
            r.step_rate_deviation,
            r.step_total_deviation,
            r.realized_luck,
            r.sampled_median_luck.unwrap_or(f64::NAN),
            r.analytic_ms,
            r.sampled_ms
        );
    }
    for r in &reports {
        let per_attr: BTreeMap<&str, f64> = r
            .attributes
            .iter()
            .map(|a| (a.name, a.max_deviation))
            .collect();
        info!(scenario = r.name, deviations = ?per_attr, "per-attribute deviation");
    }

    let report = ValidationReport {
        samples: args.samples,
        seed: args.seed,
        scenarios: reports,
    };
    let path = Path::new(&args.output);
    let json = match serde_json::to_string_pretty(&report) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Failed to serialize report: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = write_report(path, &json) {
        eprintln!("Failed to write {}: {}", path.display(), e);
        std::process::exit(1);
    }
    println!();
    println!("Report written to {}", path.display());
}
