//! Sampling-based validation of the analytic engine.
//!
//! - [`sampler`]: inverse-CDF draws from a probability vector
//! - [`engine`]: sampled careers and single-step rescue simulations
//!
//! Nothing on the analytic path depends on this module.

pub mod engine;
pub mod sampler;

pub use engine::{
    draw_histogram, draw_increases, max_deviation, sample_rng, simulate_step_marginals,
    simulate_step_totals, CareerSimulator,
};
pub use sampler::CumulativeSampler;
