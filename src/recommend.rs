//! Recommendation engine: a fixed decision table over test outcomes
//!
//! The progress gate comes first and dominates everything else: an experiment
//! under half its planned duration is never called early, no matter how
//! significant the interim numbers look.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Actionable recommendation derived from a test result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Under half the planned duration; keep collecting data
    ContinueRunning,
    /// Significant with a large positive effect; ship it
    ImplementImmediately,
    /// Significant with a modest positive effect; ship with monitoring
    ImplementWithMonitoring,
    /// Significant but flat or negative; keep the control
    KeepControl,
    /// Approaching significance; extend the duration
    ExtendDuration,
    /// No signal; rethink the treatment or run longer
    Redesign,
}

impl Recommendation {
    /// Human-readable recommendation text.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ContinueRunning => "Insufficient data - continue running the experiment",
            Self::ImplementImmediately => "Strong winner detected - implement variant immediately",
            Self::ImplementWithMonitoring => "Positive result - implement variant with monitoring",
            Self::KeepControl => "Negative result - keep the control variant",
            Self::ExtendDuration => "Trending positive - extend the experiment duration",
            Self::Redesign => "Inconclusive - consider a redesign or a longer duration",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Map (significance tier, effect size, progress) to a recommendation.
///
/// Evaluated strictly in order: progress gate, then the significant branch
/// split on effect size, then the trending band, then inconclusive. An
/// undefined effect size (zero control rate) at significance is treated as
/// keep-control: a relative effect that cannot be computed is never grounds
/// to ship the treatment.
#[must_use]
pub fn recommend(significance: u8, effect_size: Option<f64>, progress: f64) -> Recommendation {
    if progress < 0.5 {
        return Recommendation::ContinueRunning;
    }
    if significance >= 95 {
        return match effect_size {
            Some(e) if e > 5.0 => Recommendation::ImplementImmediately,
            Some(e) if e > 0.0 => Recommendation::ImplementWithMonitoring,
            _ => Recommendation::KeepControl,
        };
    }
    if significance >= 80 {
        return Recommendation::ExtendDuration;
    }
    Recommendation::Redesign
}
