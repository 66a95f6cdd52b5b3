//! Error types for tribunal-consensus.

use thiserror::Error;

/// Result type for policy construction.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building a consensus policy or rank ladder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Threshold must lie in (1/2, 1].
    #[error("threshold {num}/{den} must be above one half and at most one")]
    InvalidThreshold { num: u32, den: u32 },

    /// Threshold text could not be parsed.
    #[error("cannot parse threshold {0:?}")]
    ThresholdParse(String),

    /// Vote bounds are inconsistent.
    #[error("vote bounds invalid: min {min}, max {max} (need 1 <= min <= max)")]
    InvalidVoteBounds { min: u32, max: u32 },

    /// Rank steps are not strictly increasing positive numbers.
    #[error("invalid rank steps: {0}")]
    InvalidRankSteps(String),
}
