//! Dense probability mass over a contiguous integer domain.
//!
//! `ProbabilityVector { offset, masses }` represents `offset + i ↦ masses[i]`
//! for `i` in `0..masses.len()`. Point writes mutate in place; every transform
//! ([`ProbabilityVector::clamp_from_below`], [`ProbabilityVector::step`])
//! returns a fresh vector so iterative stepping never aliases its input.

use std::collections::BTreeMap;

use crate::constants::{NORMALIZATION_ERROR_LIMIT, PROBABILITY_ZERO_LIMIT};
use crate::error::{GrowthError, Result};

#[inline(always)]
fn is_almost_zero(p: f64) -> bool {
    p.abs() <= PROBABILITY_ZERO_LIMIT
}

/// Probability mass function over `[min_value, max_value]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbabilityVector {
    offset: i32,
    masses: Vec<f64>,
}

impl ProbabilityVector {
    /// Zeroed vector over `[min_value, max_value]`.
    pub fn new(min_value: i32, max_value: i32) -> Result<Self> {
        if max_value < min_value {
            return Err(GrowthError::InvalidRange {
                min: min_value,
                max: max_value,
            });
        }
        Ok(Self {
            offset: min_value,
            masses: vec![0.0; (max_value - min_value + 1) as usize],
        })
    }

    /// All mass at `value`.
    pub fn point(value: i32) -> Self {
        Self {
            offset: value,
            masses: vec![1.0],
        }
    }

    /// Vector whose lowest bucket is `min_value`. Fails on an empty slice.
    pub fn from_masses(min_value: i32, masses: &[f64]) -> Result<Self> {
        if masses.is_empty() {
            return Err(GrowthError::InvalidRange {
                min: min_value,
                max: min_value - 1,
            });
        }
        Ok(Self {
            offset: min_value,
            masses: masses.to_vec(),
        })
    }

    #[inline]
    pub fn min_value(&self) -> i32 {
        self.offset
    }

    #[inline]
    pub fn max_value(&self) -> i32 {
        self.offset + self.masses.len() as i32 - 1
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.masses.len()
    }

    /// Raw masses, lowest value first.
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// Sum of all masses.
    pub fn total(&self) -> f64 {
        self.masses.iter().sum()
    }

    /// `(value, mass)` pairs in increasing value order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.masses
            .iter()
            .enumerate()
            .map(move |(i, &p)| (self.offset + i as i32, p))
    }

    #[inline]
    fn index_of(&self, value: i32) -> Result<usize> {
        let index = value as i64 - self.offset as i64;
        if index < 0 || index >= self.masses.len() as i64 {
            return Err(GrowthError::OutOfBounds {
                value,
                min: self.min_value(),
                max: self.max_value(),
            });
        }
        Ok(index as usize)
    }

    pub fn get(&self, value: i32) -> Result<f64> {
        Ok(self.masses[self.index_of(value)?])
    }

    pub fn set(&mut self, value: i32, probability: f64) -> Result<()> {
        let i = self.index_of(value)?;
        self.masses[i] = probability;
        Ok(())
    }

    pub fn add(&mut self, value: i32, probability: f64) -> Result<()> {
        let i = self.index_of(value)?;
        self.masses[i] += probability;
        Ok(())
    }

    /// Sparse `value + shift ↦ mass` mapping covering the whole domain.
    ///
    /// The shift turns a base-value distribution into a displayed-value one.
    pub fn export(&self, shift: i32) -> BTreeMap<i32, f64> {
        self.iter().map(|(v, p)| (v + shift, p)).collect()
    }

    /// Rescale so the masses sum to 1.0.
    ///
    /// Refuses when the total is [`NORMALIZATION_ERROR_LIMIT`] or more away
    /// from 1.0: that much drift means an upstream bug, not rounding.
    pub fn normalize(&mut self) -> Result<()> {
        let total = self.total();
        if (1.0 - total).abs() >= NORMALIZATION_ERROR_LIMIT {
            return Err(GrowthError::NormalizationDrift { total });
        }
        let scale = 1.0 / total;
        for p in &mut self.masses {
            *p *= scale;
        }
        Ok(())
    }

    /// Collapse all mass at or below `lower_bound` into the `lower_bound` bucket.
    pub fn clamp_from_below(&self, lower_bound: i32) -> Self {
        let clamp_index = lower_bound as i64 - self.offset as i64;

        if clamp_index <= 0 {
            return self.clone();
        }

        if clamp_index >= self.masses.len() as i64 - 1 {
            return Self {
                offset: lower_bound,
                masses: vec![self.total()],
            };
        }

        let clamp_index = clamp_index as usize;
        let mut masses = Vec::with_capacity(self.masses.len() - clamp_index);
        masses.push(self.masses[..=clamp_index].iter().sum());
        masses.extend_from_slice(&self.masses[clamp_index + 1..]);

        Self {
            offset: lower_bound,
            masses,
        }
    }

    /// One Bernoulli step: each value increases by 1 with probability
    /// `p_increase`, never past `ceiling`.
    ///
    /// `P'(x) = P(x)·(1−p) + P(x−1)·p`, with every target index capped at
    /// `ceiling` so mass that would exceed it folds into the ceiling bucket.
    pub fn step(&self, p_increase: f64, ceiling: i32) -> Result<Self> {
        if !(0.0..=1.0).contains(&p_increase) {
            return Err(GrowthError::InvalidProbability { value: p_increase });
        }
        if ceiling < self.min_value() {
            return Err(GrowthError::InvalidRange {
                min: self.min_value(),
                max: ceiling,
            });
        }

        if is_almost_zero(p_increase) {
            return Ok(self.clone());
        }

        let max_value = self.max_value();

        if is_almost_zero(1.0 - p_increase) {
            // Deterministic shift.
            let mut next = Self::new(
                (self.offset + 1).min(ceiling),
                (max_value + 1).min(ceiling),
            )?;
            for (value, p) in self.iter() {
                next.add((value + 1).min(ceiling), p)?;
            }
            return Ok(next);
        }

        let p_same = 1.0 - p_increase;
        let mut next = Self::new(self.offset, (max_value + 1).min(ceiling))?;
        for (value, p) in self.iter() {
            next.add(value.min(ceiling), p * p_same)?;
            next.add((value + 1).min(ceiling), p * p_increase)?;
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vector() -> ProbabilityVector {
        let mut p = ProbabilityVector::new(0, 10).unwrap();
        p.set(1, 0.1).unwrap();
        p.set(2, 0.2).unwrap();
        p.set(4, 0.3).unwrap();
        p.set(6, 0.4).unwrap();
        p
    }

    #[test]
    fn test_new_single_value_width_one() {
        let p = ProbabilityVector::new(5, 5).unwrap();
        assert_eq!(p.width(), 1);
        assert_eq!(p.min_value(), 5);
        assert_eq!(p.max_value(), 5);
    }

    #[test]
    fn test_new_width() {
        assert_eq!(ProbabilityVector::new(5, 10).unwrap().width(), 6);
    }

    #[test]
    fn test_new_rejects_inverted_range() {
        assert_eq!(
            ProbabilityVector::new(2, 1),
            Err(GrowthError::InvalidRange { min: 2, max: 1 })
        );
    }

    #[test]
    fn test_get_set_add() {
        let mut p = ProbabilityVector::new(0, 10).unwrap();
        p.set(5, 0.5).unwrap();
        assert_eq!(p.get(5).unwrap(), 0.5);
        p.set(5, 0.1).unwrap();
        p.add(5, 0.5).unwrap();
        assert!((p.get(5).unwrap() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_bounds_are_strict() {
        let mut p = ProbabilityVector::new(3, 5).unwrap();
        // One past the end must fail, not read a phantom slot.
        assert!(matches!(
            p.get(6),
            Err(GrowthError::OutOfBounds {
                value: 6,
                min: 3,
                max: 5
            })
        ));
        assert!(p.get(2).is_err());
        assert!(p.set(6, 1.0).is_err());
        assert!(p.add(6, 1.0).is_err());
        assert!(p.get(5).is_ok());
    }

    #[test]
    fn test_clone_is_independent() {
        let p = sample_vector();
        let mut c = p.clone();
        for v in 0..=10 {
            assert_eq!(c.get(v).unwrap(), p.get(v).unwrap());
        }
        c.set(1, 0.9).unwrap();
        assert_eq!(p.get(1).unwrap(), 0.1);
    }

    #[test]
    fn test_export_shift_and_idempotence() {
        let p = sample_vector();
        let a = p.export(3);
        let b = p.export(3);
        assert_eq!(a, b);
        assert_eq!(a.len(), 11);
        assert_eq!(a[&4], 0.1);
        assert_eq!(*a.keys().next().unwrap(), 3);
    }

    #[test]
    fn test_normalize_close_to_one() {
        let mut p = ProbabilityVector::new(0, 10).unwrap();
        for v in [1, 2, 4, 6] {
            p.set(v, 0.249).unwrap();
        }
        p.normalize().unwrap();
        assert!((p.total() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_normalize_refuses_large_drift() {
        let mut p = ProbabilityVector::new(0, 1).unwrap();
        p.set(0, 0.5).unwrap();
        p.set(1, 0.3).unwrap();
        assert!(matches!(
            p.normalize(),
            Err(GrowthError::NormalizationDrift { .. })
        ));
        // Unchanged after refusal.
        assert_eq!(p.get(0).unwrap(), 0.5);
    }

    #[test]
    fn test_clamp_interior() {
        let clamped = sample_vector().clamp_from_below(5);
        assert_eq!(clamped.min_value(), 5);
        assert_eq!(clamped.max_value(), 10);
        assert!((clamped.get(5).unwrap() - 0.6).abs() < 1e-4);
        for v in 6..=10 {
            assert_eq!(clamped.get(v).unwrap(), sample_vector().get(v).unwrap());
        }
    }

    #[test]
    fn test_clamp_below_min_is_identity() {
        let p = sample_vector();
        assert_eq!(p.clamp_from_below(0), p);
        assert_eq!(p.clamp_from_below(-4), p);
    }

    #[test]
    fn test_clamp_at_or_above_max_is_point() {
        let p = sample_vector();
        for bound in [10, 14] {
            let c = p.clamp_from_below(bound);
            assert_eq!(c.width(), 1);
            assert_eq!(c.min_value(), bound);
            assert!((c.get(bound).unwrap() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_step_regression() {
        let p = ProbabilityVector::from_masses(0, &[0.25, 0.5, 0.25]).unwrap();
        let next = p.step(0.8, 1000).unwrap();
        assert_eq!(next.min_value(), 0);
        assert_eq!(next.max_value(), 3);
        let expected = [
            0.2 * 0.25,
            0.8 * 0.25 + 0.2 * 0.5,
            0.8 * 0.5 + 0.2 * 0.25,
            0.8 * 0.25,
        ];
        for (v, e) in expected.iter().enumerate() {
            assert!((next.get(v as i32).unwrap() - e).abs() < 1e-9);
        }
    }

    #[test]
    fn test_step_extremes() {
        let p = ProbabilityVector::from_masses(2, &[0.5, 0.5]).unwrap();
        assert_eq!(p.step(0.0, 100).unwrap(), p);

        let shifted = p.step(1.0, 100).unwrap();
        assert_eq!(shifted.min_value(), 3);
        assert_eq!(shifted.max_value(), 4);
        assert_eq!(shifted.get(3).unwrap(), 0.5);
    }

    #[test]
    fn test_step_folds_into_ceiling() {
        let p = ProbabilityVector::from_masses(4, &[0.5, 0.5]).unwrap();
        let next = p.step(0.5, 5).unwrap();
        assert_eq!(next.max_value(), 5);
        assert!((next.get(4).unwrap() - 0.25).abs() < 1e-12);
        assert!((next.get(5).unwrap() - 0.75).abs() < 1e-12);

        // Deterministic step at the ceiling stays put.
        let at_cap = ProbabilityVector::point(5).step(1.0, 5).unwrap();
        assert_eq!(at_cap, ProbabilityVector::point(5));
    }

    #[test]
    fn test_step_rejects_bad_probability() {
        let p = ProbabilityVector::point(0);
        assert!(matches!(
            p.step(1.2, 10),
            Err(GrowthError::InvalidProbability { .. })
        ));
        assert!(p.step(-0.1, 10).is_err());
        assert!(p.step(f64::NAN, 10).is_err());
    }

    #[test]
    fn test_step_rejects_ceiling_below_domain() {
        let p = ProbabilityVector::point(8);
        assert!(p.step(0.5, 7).is_err());
    }
}
