//! Variant allocation: two-arm traffic splits and per-arm records
//!
//! Pure validation and normalization. A split must name two percentages that
//! sum to exactly 100; per-arm observation counts must keep conversions at or
//! below participants. Nothing here mutates shared state.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One of the two arms under comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arm {
    /// Control arm
    A,
    /// Treatment arm
    B,
}

/// Validated two-arm traffic split, percentages summing to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficSplit {
    a: u8,
    b: u8,
}

impl TrafficSplit {
    /// Create a split from two percentages.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSplit` unless `a + b == 100`.
    pub const fn new(a: u8, b: u8) -> Result<Self> {
        if a > 100 || b > 100 || (a as u16) + (b as u16) != 100 {
            return Err(Error::InvalidSplit { a, b });
        }
        Ok(Self { a, b })
    }

    /// Control arm percentage.
    #[must_use]
    pub const fn a(self) -> u8 {
        self.a
    }

    /// Treatment arm percentage.
    #[must_use]
    pub const fn b(self) -> u8 {
        self.b
    }

    /// Absolute difference between the two arm percentages.
    ///
    /// Feeds the portfolio "uneven allocation" insight.
    #[must_use]
    pub const fn imbalance(self) -> u8 {
        self.a.abs_diff(self.b)
    }

    /// Percentage allocated to the given arm.
    #[must_use]
    pub const fn percentage(self, arm: Arm) -> u8 {
        match arm {
            Arm::A => self.a,
            Arm::B => self.b,
        }
    }
}

impl Default for TrafficSplit {
    /// The default allocation when none is specified: an even 50/50 split.
    fn default() -> Self {
        Self { a: 50, b: 50 }
    }
}

/// One arm of an experiment: its identity plus accumulated observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    name: String,
    description: String,
    traffic_percentage: u8,
    participants: u64,
    conversions: u64,
    total_value: f64,
}

impl Variant {
    /// Create a variant with zeroed observation counts.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        traffic_percentage: u8,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            traffic_percentage,
            participants: 0,
            conversions: 0,
            total_value: 0.0,
        }
    }

    /// Get the variant name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the variant description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Percentage of traffic routed to this arm.
    #[must_use]
    pub const fn traffic_percentage(&self) -> u8 {
        self.traffic_percentage
    }

    /// Participants observed so far.
    #[must_use]
    pub const fn participants(&self) -> u64 {
        self.participants
    }

    /// Conversions observed so far.
    #[must_use]
    pub const fn conversions(&self) -> u64 {
        self.conversions
    }

    /// Accumulated value (revenue, bookings) attributed to this arm.
    #[must_use]
    pub const fn total_value(&self) -> f64 {
        self.total_value
    }

    /// Replace this arm's observation snapshot.
    ///
    /// The caller hands the engine a consistent aggregate snapshot per
    /// invocation; the counts replace rather than add, so re-supplying the
    /// same snapshot never double-counts.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCounts` if `conversions > participants`.
    pub fn record(&mut self, participants: u64, conversions: u64, total_value: f64) -> Result<()> {
        validate_counts(participants, conversions)?;
        self.participants = participants;
        self.conversions = conversions;
        self.total_value = total_value;
        Ok(())
    }
}

/// Validate a per-arm count pair.
///
/// # Errors
///
/// Returns `Error::InvalidCounts` if `conversions > participants`.
pub const fn validate_counts(participants: u64, conversions: u64) -> Result<()> {
    if conversions > participants {
        return Err(Error::InvalidCounts {
            participants,
            conversions,
        });
    }
    Ok(())
}
