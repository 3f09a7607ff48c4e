//! Significance calculator: two-proportion z-test with discrete tiers
//!
//! The output is a coarse significance tier (99/95/90/heuristic) rather than
//! a continuous p-value, matching the consumer's need for a small badge set.
//! The reported p-value is a fixed lookup keyed by tier, and the confidence
//! interval is a fixed-width display band around the effect size. Both are
//! deliberate simplifications carried over from the product behavior; do not
//! replace them with textbook equivalents.

use serde::{Deserialize, Serialize};

use crate::allocation::{validate_counts, Arm};
use crate::error::Result;
use crate::experiment::SuccessCriteria;

/// z thresholds for the 99/95/90 tiers, checked in priority order.
const Z_99: f64 = 2.58;
const Z_95: f64 = 1.96;
const Z_90: f64 = 1.64;

/// Half-width of the heuristic confidence band, in percentage points.
const CI_HALF_WIDTH: f64 = 3.0;
/// Wider band used by the simplified preview estimation.
const CI_HALF_WIDTH_PREVIEW: f64 = 5.0;

/// Minimum combined sample the preview path considers adequate.
const PREVIEW_MIN_SAMPLE: u64 = 200;

/// Validated participant/conversion counts for both arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmCounts {
    participants_a: u64,
    conversions_a: u64,
    participants_b: u64,
    conversions_b: u64,
}

impl ArmCounts {
    /// Create a count snapshot, validating each arm independently.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCounts` if either arm has more conversions than
    /// participants.
    pub fn new(
        participants_a: u64,
        conversions_a: u64,
        participants_b: u64,
        conversions_b: u64,
    ) -> Result<Self> {
        validate_counts(participants_a, conversions_a)?;
        validate_counts(participants_b, conversions_b)?;
        Ok(Self {
            participants_a,
            conversions_a,
            participants_b,
            conversions_b,
        })
    }

    /// Combined participants across both arms.
    #[must_use]
    pub const fn total_participants(self) -> u64 {
        self.participants_a + self.participants_b
    }
}

/// Per-arm statistics echoed back in a test result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmStats {
    participants: u64,
    conversions: u64,
    rate: f64,
}

impl ArmStats {
    fn from_counts(participants: u64, conversions: u64) -> Self {
        let rate = if participants == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            {
                conversions as f64 / participants as f64
            }
        };
        Self {
            participants,
            conversions,
            rate,
        }
    }

    /// Participants in this arm.
    #[must_use]
    pub const fn participants(&self) -> u64 {
        self.participants
    }

    /// Conversions in this arm.
    #[must_use]
    pub const fn conversions(&self) -> u64 {
        self.conversions
    }

    /// Observed conversion rate (0 when the arm has no participants).
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }
}

/// Full output of a significance computation over one count snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    group_a: ArmStats,
    group_b: ArmStats,
    significance: u8,
    effect_size: Option<f64>,
    confidence_interval: Option<(f64, f64)>,
    p_value: f64,
    winner: Option<Arm>,
    sample_size_adequate: bool,
}

impl TestResult {
    /// Control arm statistics.
    #[must_use]
    pub const fn group_a(&self) -> ArmStats {
        self.group_a
    }

    /// Treatment arm statistics.
    #[must_use]
    pub const fn group_b(&self) -> ArmStats {
        self.group_b
    }

    /// Discrete significance tier: 99, 95, 90, or a 0-80 heuristic.
    #[must_use]
    pub const fn significance(&self) -> u8 {
        self.significance
    }

    /// Relative effect of B versus A, in percent. `None` when the control
    /// rate is zero (relative effect undefined).
    #[must_use]
    pub const fn effect_size(&self) -> Option<f64> {
        self.effect_size
    }

    /// Heuristic display band around the effect size, in percentage points.
    #[must_use]
    pub const fn confidence_interval(&self) -> Option<(f64, f64)> {
        self.confidence_interval
    }

    /// Nominal p-value, a fixed lookup keyed by tier (never CDF-derived).
    #[must_use]
    pub const fn p_value(&self) -> f64 {
        self.p_value
    }

    /// Winning arm, declared only at tier 95 or above.
    #[must_use]
    pub const fn winner(&self) -> Option<Arm> {
        self.winner
    }

    /// Whether the combined sample meets the minimum sample size.
    #[must_use]
    pub const fn sample_size_adequate(&self) -> bool {
        self.sample_size_adequate
    }
}

/// Evaluate a live experiment's counts against its success criteria.
///
/// Either arm with zero participants yields a degenerate result
/// (significance 0, no winner) rather than an error: "no data yet" is a
/// normal running state.
#[must_use]
pub fn evaluate(counts: ArmCounts, criteria: &SuccessCriteria) -> TestResult {
    analyze(counts, criteria.minimum_sample_size(), CI_HALF_WIDTH)
}

/// Simplified estimation variant for previews: fixed minimum sample of 200
/// and a wider ±5 point display band.
#[must_use]
pub fn preview(counts: ArmCounts) -> TestResult {
    analyze(counts, PREVIEW_MIN_SAMPLE, CI_HALF_WIDTH_PREVIEW)
}

fn analyze(counts: ArmCounts, minimum_sample_size: u64, ci_half_width: f64) -> TestResult {
    let group_a = ArmStats::from_counts(counts.participants_a, counts.conversions_a);
    let group_b = ArmStats::from_counts(counts.participants_b, counts.conversions_b);
    let sample_size_adequate = counts.total_participants() >= minimum_sample_size;

    // Insufficient sample: a normal running state, not an error
    if counts.participants_a == 0 || counts.participants_b == 0 {
        return TestResult {
            group_a,
            group_b,
            significance: 0,
            effect_size: None,
            confidence_interval: None,
            p_value: p_value_for_tier(0),
            winner: None,
            sample_size_adequate,
        };
    }

    let rate_a = group_a.rate();
    let rate_b = group_b.rate();

    #[allow(clippy::cast_precision_loss)]
    let pooled = (counts.conversions_a + counts.conversions_b) as f64
        / counts.total_participants() as f64;
    #[allow(clippy::cast_precision_loss)]
    let se = (pooled
        * (1.0 - pooled)
        * (1.0 / counts.participants_a as f64 + 1.0 / counts.participants_b as f64))
        .sqrt();

    // Degenerate pooled rate (everyone or no one converted): no signal
    let significance = if se == 0.0 {
        0
    } else {
        significance_tier((rate_b - rate_a).abs() / se)
    };

    let effect_size = if rate_a == 0.0 {
        None
    } else {
        Some((rate_b - rate_a) / rate_a * 100.0)
    };
    let confidence_interval = effect_size.map(|e| (e - ci_half_width, e + ci_half_width));

    let winner = if significance >= 95 {
        if rate_b > rate_a {
            Some(Arm::B)
        } else if rate_b < rate_a {
            Some(Arm::A)
        } else {
            None
        }
    } else {
        None
    };

    TestResult {
        group_a,
        group_b,
        significance,
        effect_size,
        confidence_interval,
        p_value: p_value_for_tier(significance),
        winner,
        sample_size_adequate,
    }
}

/// Map a z-score onto the discrete tier set. First match wins.
fn significance_tier(z: f64) -> u8 {
    if z > Z_99 {
        99
    } else if z > Z_95 {
        95
    } else if z > Z_90 {
        90
    } else {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            (z * 40.0).min(80.0).round() as u8
        }
    }
}

/// Nominal p-value per tier. A fixed lookup, intentionally not derived from
/// the z statistic.
const fn p_value_for_tier(tier: u8) -> f64 {
    match tier {
        99 => 0.01,
        95 => 0.05,
        90 => 0.10,
        _ => 0.15,
    }
}
