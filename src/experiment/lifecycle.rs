//! Experiment lifecycle: status state machine and duration math
//!
//! Transition graph:
//!
//! ```text
//! Draft ──> Running <──> Paused
//!              │            │
//!              ├────────────┤
//!              v            v
//!          Completed    Stopped      (both terminal)
//! ```
//!
//! `Completed` and `Stopped` freeze the experiment: no further transitions
//! and no further mutation of variant counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const SECONDS_PER_DAY: i64 = 86_400;

/// Status of an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentStatus {
    /// Defined but not yet collecting data.
    Draft,
    /// Actively collecting data.
    Running,
    /// Temporarily halted; may resume.
    Paused,
    /// Closed with a decision recorded. Terminal.
    Completed,
    /// Aborted without a winner. Terminal.
    Stopped,
}

impl ExperimentStatus {
    /// Wire name of the status (matches serde representation).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
        }
    }

    /// Whether this status admits no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Stopped)
    }

    /// Whether `self -> to` is an edge on the lifecycle graph.
    #[must_use]
    pub const fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Draft, Self::Running)
                | (Self::Running, Self::Paused)
                | (Self::Paused, Self::Running)
                | (Self::Running | Self::Paused, Self::Completed | Self::Stopped)
        )
    }

    /// Validate a transition, returning the target status on success.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` for any edge not on the graph.
    pub const fn transition(self, to: Self) -> Result<Self> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(Error::InvalidTransition {
                from: self.as_str(),
                to: to.as_str(),
            })
        }
    }
}

/// Fraction of the planned duration elapsed, clamped to `[0, 1]`.
#[must_use]
pub fn progress(now: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let total = (end - start).num_seconds();
    if total <= 0 {
        return 1.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let fraction = (now - start).num_seconds() as f64 / total as f64;
    fraction.clamp(0.0, 1.0)
}

/// Whole days elapsed since the start, rounded up. Zero before the start.
#[must_use]
pub fn days_running(now: DateTime<Utc>, start: DateTime<Utc>) -> i64 {
    ceil_days(now.signed_duration_since(start).num_seconds())
}

/// Whole days until the end, rounded up. Zero once the end has passed.
#[must_use]
pub fn days_remaining(now: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    ceil_days(end.signed_duration_since(now).num_seconds())
}

const fn ceil_days(seconds: i64) -> i64 {
    if seconds <= 0 {
        0
    } else {
        (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
    }
}
