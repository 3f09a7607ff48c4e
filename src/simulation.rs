//! Preview-count synthesis for demos and previews
//!
//! Kept behind the `simulation` feature so the pure analysis core never
//! links `rand`. Nothing here is ever called from the live significance,
//! recommendation, or aggregation paths; callers pass their own RNG, so a
//! seeded generator makes previews reproducible.

use rand::Rng;

use crate::error::Result;
use crate::metrics::TargetMetric;
use crate::stats::{preview, ArmCounts, TestResult};

/// Largest relative treatment lift the simulator will draw.
const MAX_LIFT: f64 = 0.25;
/// Largest relative treatment drop the simulator will draw.
const MAX_DROP: f64 = 0.10;

/// Synthesize plausible per-arm counts for a metric.
///
/// The control rate is drawn from the metric's registered baseline
/// (`base ± variance`); the treatment rate applies a random relative lift
/// in `[-10%, +25%]` on top.
///
/// # Errors
///
/// Infallible in practice (rates are clamped to `[0, 1]` before counts are
/// derived); the `Result` only guards the count invariant.
pub fn simulate_counts<R: Rng + ?Sized>(
    metric: TargetMetric,
    participants_a: u64,
    participants_b: u64,
    rng: &mut R,
) -> Result<ArmCounts> {
    let baseline = metric.baseline();
    let control_rate = (baseline.base + rng.gen_range(-baseline.variance..=baseline.variance))
        .clamp(0.0, 1.0);
    let lift = rng.gen_range(-MAX_DROP..=MAX_LIFT);
    let treatment_rate = (control_rate * (1.0 + lift)).clamp(0.0, 1.0);

    ArmCounts::new(
        participants_a,
        expected_conversions(participants_a, control_rate),
        participants_b,
        expected_conversions(participants_b, treatment_rate),
    )
}

/// Synthesize counts and run the simplified preview analysis over them.
///
/// # Errors
///
/// See [`simulate_counts`].
pub fn simulate_preview<R: Rng + ?Sized>(
    metric: TargetMetric,
    participants_per_arm: u64,
    rng: &mut R,
) -> Result<TestResult> {
    let counts = simulate_counts(metric, participants_per_arm, participants_per_arm, rng)?;
    Ok(preview(counts))
}

fn expected_conversions(participants: u64, rate: f64) -> u64 {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let conversions = (participants as f64 * rate).round() as u64;
    conversions.min(participants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_counts_respect_invariant() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let counts =
                simulate_counts(TargetMetric::BookingCompletion, 500, 500, &mut rng).unwrap();
            assert_eq!(counts.total_participants(), 1000);
        }
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let a = simulate_counts(
            TargetMetric::UserEngagement,
            300,
            300,
            &mut StdRng::seed_from_u64(42),
        )
        .unwrap();
        let b = simulate_counts(
            TargetMetric::UserEngagement,
            300,
            300,
            &mut StdRng::seed_from_u64(42),
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_preview_uses_simplified_thresholds() {
        let mut rng = StdRng::seed_from_u64(3);
        // 160 combined participants sits under the preview minimum of 200
        let result = simulate_preview(TargetMetric::RevenuePerUser, 80, &mut rng).unwrap();
        assert!(!result.sample_size_adequate());

        let result = simulate_preview(TargetMetric::RevenuePerUser, 100, &mut rng).unwrap();
        assert!(result.sample_size_adequate());
    }
}
