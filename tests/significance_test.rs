//! Significance calculator scenarios over realistic count snapshots.

use ab_engine::experiment::SuccessCriteria;
use ab_engine::stats::{evaluate, preview, ArmCounts};
use ab_engine::{Arm, Error};

fn counts(pa: u64, ca: u64, pb: u64, cb: u64) -> ArmCounts {
    ArmCounts::new(pa, ca, pb, cb).expect("valid counts")
}

// =============================================================================
// Worked scenarios
// =============================================================================

#[test]
fn test_scenario_900_participants_per_arm() {
    // rateA = 160/900 ~ 17.8%, rateB = 200/900 ~ 22.2%
    // pooled p = 0.20, se ~ 0.0189, z ~ 2.36
    let result = preview(counts(900, 160, 900, 200));

    assert!((result.group_a().rate() - 0.1778).abs() < 1e-3);
    assert!((result.group_b().rate() - 0.2222).abs() < 1e-3);
    // z = 2.36 clears the 1.96 threshold but not 2.58
    assert_eq!(result.significance(), 95);
    assert_eq!(result.winner(), Some(Arm::B));
    // (0.2222 - 0.1778) / 0.1778 = +25%
    let effect = result.effect_size().expect("control rate is nonzero");
    assert!((effect - 25.0).abs() < 1e-9);
    assert!((result.p_value() - 0.05).abs() < f64::EPSILON);
}

#[test]
fn test_scenario_tier_90_no_winner() {
    // z ~ 1.959: inside the (1.64, 1.96] band, so tier 90 and no winner
    let result = preview(counts(900, 160, 900, 193));

    assert_eq!(result.significance(), 90);
    assert_eq!(result.winner(), None);
    assert!((result.p_value() - 0.10).abs() < f64::EPSILON);
}

#[test]
fn test_scenario_overwhelming_difference() {
    let result = preview(counts(2000, 200, 2000, 400));

    assert_eq!(result.significance(), 99);
    assert_eq!(result.winner(), Some(Arm::B));
    assert!((result.p_value() - 0.01).abs() < f64::EPSILON);
    assert!(result.effect_size().expect("nonzero control") > 99.0);
}

#[test]
fn test_scenario_no_difference() {
    let result = preview(counts(500, 100, 500, 100));

    assert_eq!(result.significance(), 0);
    assert_eq!(result.winner(), None);
    assert_eq!(result.effect_size(), Some(0.0));
}

// =============================================================================
// Confidence interval band
// =============================================================================

#[test]
fn test_preview_band_is_five_points_wide() {
    let result = preview(counts(900, 160, 900, 200));
    let (lo, hi) = result.confidence_interval().expect("effect defined");
    assert!((lo - 20.0).abs() < 1e-9);
    assert!((hi - 30.0).abs() < 1e-9);
}

#[test]
fn test_live_band_is_three_points_wide() {
    let result = evaluate(counts(900, 160, 900, 200), &SuccessCriteria::default());
    let (lo, hi) = result.confidence_interval().expect("effect defined");
    assert!((lo - 22.0).abs() < 1e-9);
    assert!((hi - 28.0).abs() < 1e-9);
}

// =============================================================================
// Sample adequacy duality: live criteria vs preview default
// =============================================================================

#[test]
fn test_live_uses_experiment_minimum_sample() {
    let criteria = SuccessCriteria::new(500, 95, 5.0).expect("valid criteria");
    let snapshot = counts(150, 30, 150, 40);

    assert!(!evaluate(snapshot, &criteria).sample_size_adequate());
    // The same counts clear the default minimum of 100
    assert!(evaluate(snapshot, &SuccessCriteria::default()).sample_size_adequate());
}

#[test]
fn test_preview_uses_fixed_minimum_of_200() {
    assert!(!preview(counts(90, 10, 90, 15)).sample_size_adequate());
    assert!(preview(counts(100, 10, 100, 15)).sample_size_adequate());
}

// =============================================================================
// Degenerate inputs
// =============================================================================

#[test]
fn test_empty_arm_is_not_an_error() {
    // "No data yet" is a normal running state
    let result = preview(counts(0, 0, 0, 0));
    assert_eq!(result.significance(), 0);
    assert_eq!(result.winner(), None);
    assert_eq!(result.effect_size(), None);
    assert!(!result.sample_size_adequate());
}

#[test]
fn test_invalid_counts_rejected_before_any_statistic() {
    let err = ArmCounts::new(10, 11, 10, 5).unwrap_err();
    assert_eq!(
        err,
        Error::InvalidCounts {
            participants: 10,
            conversions: 11
        }
    );
}

#[test]
fn test_results_serialize() {
    let result = preview(counts(900, 160, 900, 200));
    let json = serde_json::to_string(&result).expect("serialization failed");
    let back: ab_engine::TestResult = serde_json::from_str(&json).expect("deserialization failed");
    assert_eq!(result, back);
}
