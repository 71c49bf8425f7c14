//! # statgrowth: exact attribute distributions for stochastic growth
//!
//! An entity owns nine integer attributes. On every step each attribute
//! independently increases by one with a per-attribute probability set by the
//! entity and its current category. Category changes at scheduled steps swap
//! the rates and raise attributes to the new category's floors; per-attribute
//! maxima cap growth. This crate computes the exact probability distribution
//! of every attribute at every step, without sampling.
//!
//! ## Pipeline
//!
//! | Stage | Module | Description |
//! |-------|--------|-------------|
//! | 0 | [`tables`] | Caller-built rate, floor, bonus and maxima tables |
//! | 1 | [`density::forward`] | Per-category rate cache, schedule, ceiling checks |
//! | 2 | [`density::transitions`] | Bernoulli step per attribute, then category floor clamps |
//! | 3 | [`density::forward`] | Normalized, bonus-shifted snapshot per step plus total-count distribution |
//! | 4 | [`statistics`] | Median, percentile rank and luck rating over a snapshot |
//!
//! ## The rescue rule
//!
//! Rescue-eligible entities never gain fewer than two attributes in a step: such
//! steps are replaced by a fixed outcome. That couples all nine attributes.
//! [`density::adjustment`] replaces it with independent rates that reproduce
//! each attribute's single-step marginal, which keeps the per-attribute vectors
//! independent at the cost of an approximation. [`simulation`] samples the
//! true coupled process to measure that approximation.
//!
//! ## Conventions
//!
//! - Distributions are tracked on **base** values and exported as **displayed**
//!   values (base + active category bonus).
//! - Every fallible operation returns [`error::Result`]; nothing is silently
//!   renormalized or defaulted.
//! - [`density::forward::compute_many`] runs independent careers on the rayon pool.

#![allow(clippy::needless_range_loop)]

pub mod constants;
pub mod density;
pub mod env_config;
pub mod error;
pub mod logging;
pub mod scenarios;
pub mod simulation;
pub mod statistics;
pub mod tables;
pub mod types;

pub use density::forward::{compute, compute_many, CareerRequest, GrowthAccumulator, GrowthResult};
pub use error::{GrowthError, Result};
