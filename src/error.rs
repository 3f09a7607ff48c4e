//! Error types for the experiment analysis engine
//!
//! Creation-time validation errors reject the whole operation synchronously.
//! Computation-time anomalies (zero-participant arms, unparsable impact
//! strings) degrade to neutral values instead and never surface here.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Experiment engine error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Traffic split does not sum to 100
    #[error("invalid traffic split: {a}/{b} must sum to 100")]
    InvalidSplit {
        /// Control arm percentage
        a: u8,
        /// Treatment arm percentage
        b: u8,
    },

    /// Conversions exceed participants for an arm
    #[error("invalid counts: {conversions} conversions exceed {participants} participants")]
    InvalidCounts {
        /// Observed participants
        participants: u64,
        /// Observed conversions
        conversions: u64,
    },

    /// Target metric outside the enumerated set
    #[error("unknown target metric: {0:?}")]
    UnknownMetric(String),

    /// Success criteria outside the allowed domain
    #[error("invalid success criteria: {0}")]
    InvalidCriteria(String),

    /// End date not strictly after start date
    #[error("invalid duration: end date must be after start date")]
    InvalidDuration,

    /// Status transition not on the lifecycle graph
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status
        from: &'static str,
        /// Requested status
        to: &'static str,
    },

    /// Mutation attempted on a completed or stopped experiment
    #[error("experiment {0} is closed; counts are frozen")]
    ExperimentClosed(String),

    /// Experiment ID not present in the store
    #[error("experiment not found: {0}")]
    NotFound(String),
}
