//! Error types.
//!
//! Every failure the crate reports falls into one of three classes, exposed via
//! [`Error::kind`]:
//!
//! - **Configuration**: rejected at construction, never at selection time.
//! - **Contract violation**: a caller passed an argument the operation cannot accept
//!   (e.g. a reward outside `[0, 1]`). State is left untouched.
//! - **External failure**: a collaborator (forecaster, executor, mitigation model)
//!   failed or returned an unusable value. A decision cycle aborts without learning.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    ContractViolation,
    ExternalFailure,
}

/// Failure reported by an external collaborator.
///
/// Collaborators return this from their trait methods; the core wraps it in
/// [`Error::External`] and never retries.
#[derive(Debug, Error)]
pub enum ExternalError {
    /// The collaborator failed outright.
    #[error("{collaborator} failed: {message}")]
    Failed {
        collaborator: &'static str,
        message: String,
    },

    /// The collaborator returned a value outside its documented range.
    #[error("{collaborator} returned {value}, expected a finite value in [0, 1]")]
    InvalidValue {
        collaborator: &'static str,
        value: f64,
    },
}

impl ExternalError {
    /// Shorthand for [`ExternalError::Failed`].
    pub fn failed(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self::Failed {
            collaborator,
            message: message.into(),
        }
    }
}

/// Errors returned by bandits, the safety gate and the decision cycle.
#[derive(Debug, Error)]
pub enum Error {
    #[error("strategy pool is empty")]
    EmptyPool,

    #[error("strategy {strategy} appears more than once in the pool")]
    DuplicateStrategy { strategy: String },

    #[error("no safety threshold configured for strategy {strategy}")]
    MissingThreshold { strategy: String },

    #[error("safety threshold {value} for strategy {strategy} is not in [0, 1]")]
    InvalidThreshold { strategy: String, value: f64 },

    #[error("prior ({success}, {failure}) must have finite, strictly positive weights")]
    InvalidPrior { success: f64, failure: f64 },

    #[error("fallback strategy {strategy} is not part of the primary pool")]
    FallbackNotInPool { strategy: String },

    #[error("reward {reward} is outside [0, 1]")]
    RewardOutOfRange { reward: f64 },

    #[error("strategy {strategy} is not part of this bandit's pool")]
    UnknownStrategy { strategy: String },

    #[error(transparent)]
    External(#[from] ExternalError),

    #[error("belief lock poisoned by a panicking writer")]
    LockPoisoned,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyPool
            | Error::DuplicateStrategy { .. }
            | Error::MissingThreshold { .. }
            | Error::InvalidThreshold { .. }
            | Error::InvalidPrior { .. }
            | Error::FallbackNotInPool { .. } => ErrorKind::Configuration,
            Error::RewardOutOfRange { .. } | Error::UnknownStrategy { .. } => {
                ErrorKind::ContractViolation
            }
            Error::External(_) | Error::LockPoisoned => ErrorKind::ExternalFailure,
        }
    }
}

/// Check that `reward` is a finite value in `[0, 1]`.
pub(crate) fn check_reward(reward: f64) -> Result<f64> {
    if reward.is_finite() && (0.0..=1.0).contains(&reward) {
        Ok(reward)
    } else {
        Err(Error::RewardOutOfRange { reward })
    }
}

/// Check a collaborator-supplied unit-interval value.
pub(crate) fn check_unit(collaborator: &'static str, value: f64) -> Result<f64, ExternalError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ExternalError::InvalidValue {
            collaborator,
            value,
        })
    }
}
