//! Shared environment configuration for the statgrowth binaries.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `RAYON_NUM_THREADS` (fallback `OMP_NUM_THREADS`) | 8 | worker threads |
//! | `STATGROWTH_SAMPLES` | 1,000,000 | Monte-Carlo samples per comparison |
//! | `STATGROWTH_SEED` | 23984619 | base seed for sampled careers |
//! | `STATGROWTH_OUTPUT` | `outputs/validation.json` | report path |
//!
//! Command-line flags override these; see each binary's usage text.

use std::path::PathBuf;

use tracing::{info, warn};

pub const DEFAULT_THREADS: usize = 8;
pub const DEFAULT_SAMPLES: usize = 1_000_000;
/// Base seed; see [`crate::simulation::sample_rng`] for per-sample streams.
pub const DEFAULT_SEED: u64 = 23_984_619;
pub const DEFAULT_OUTPUT: &str = "outputs/validation.json";

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(var = name, value = %raw, "ignoring unparseable environment value");
            None
        }
    }
}

/// Read `RAYON_NUM_THREADS` (fallback `OMP_NUM_THREADS`, default 8) and
/// build the rayon global pool. Tolerates an already-initialized pool.
/// Returns thread count.
pub fn init_rayon_threads() -> usize {
    let num_threads = parse_env("RAYON_NUM_THREADS")
        .or_else(|| parse_env("OMP_NUM_THREADS"))
        .unwrap_or(DEFAULT_THREADS);
    if rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .is_err()
    {
        warn!("rayon global pool already initialized");
    }
    info!(threads = num_threads, "rayon pool ready");
    num_threads
}

/// `STATGROWTH_SAMPLES`, default 1,000,000.
pub fn sample_count() -> usize {
    parse_env("STATGROWTH_SAMPLES").unwrap_or(DEFAULT_SAMPLES)
}

/// `STATGROWTH_SEED`, default 23984619.
pub fn seed() -> u64 {
    parse_env("STATGROWTH_SEED").unwrap_or(DEFAULT_SEED)
}

/// `STATGROWTH_OUTPUT`, default `outputs/validation.json`.
pub fn output_path() -> PathBuf {
    std::env::var("STATGROWTH_OUTPUT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT))
}
