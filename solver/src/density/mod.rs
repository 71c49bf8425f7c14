//! Exact density evolution: per-attribute value distributions over a career.
//!
//! Instead of sampling careers, this module pushes each attribute's
//! `P(base value)` forward one step at a time. Layers, bottom-up:
//!
//! | Module | Role |
//! |--------|------|
//! | [`pmf`] | Dense probability vector with clamp, step and normalize |
//! | [`adjustment`] | Rescue-rule marginals as independent per-attribute rates |
//! | [`total_count`] | Distribution of the number of attributes increasing per step |
//! | [`transitions`] | The same transforms over all nine attributes at once |
//! | [`forward`] | Career-level accumulator producing per-step snapshots |

pub mod adjustment;
pub mod forward;
pub mod pmf;
pub mod total_count;
pub mod transitions;
