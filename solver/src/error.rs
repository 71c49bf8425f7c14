//! Error taxonomy for the growth engine.
//!
//! Three families, all fatal to the operation that raised them:
//! - configuration: malformed careers, missing category or step entries
//! - numeric consistency: accumulated mass drifted too far to normalize
//! - bounds: value access outside a distribution's domain

/// Errors raised by distribution primitives and the growth accumulator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GrowthError {
    #[error("invalid range: max {max} is below min {min}")]
    InvalidRange { min: i32, max: i32 },

    #[error("value {value} is out of bounds [{min}, {max}]")]
    OutOfBounds { value: i32, min: i32, max: i32 },

    #[error("invalid step probability {value}: not in [0, 1]")]
    InvalidProbability { value: f64 },

    #[error("normalization refused: total probability {total} is too far from 1.0")]
    NormalizationDrift { total: f64 },

    #[error("invalid career: {reason}")]
    InvalidCareer { reason: String },

    #[error("no category data for category {category}")]
    MissingCategory { category: String },

    #[error("step {step} is outside the career's step range")]
    MissingStep { step: i32 },
}

impl GrowthError {
    /// True for errors caused by bad input tables or career descriptions.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GrowthError::InvalidCareer { .. }
                | GrowthError::MissingCategory { .. }
                | GrowthError::MissingStep { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GrowthError>;
