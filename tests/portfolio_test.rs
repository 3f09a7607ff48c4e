//! Portfolio aggregation: summaries and the fixed insight rule set.

use ab_engine::experiment::{Experiment, ExperimentStatus, Priority};
use ab_engine::portfolio::{insights, summarize, InsightKind};
use ab_engine::{Arm, TargetMetric, TrafficSplit};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()
}

/// A running experiment that ends `days_left` days from `now()`.
fn experiment(id: &str, metric: TargetMetric, days_left: i64) -> Experiment {
    let mut exp = Experiment::builder(id, format!("Experiment {id}"), metric)
        .start_date(now() - Duration::days(7))
        .end_date(now() + Duration::days(days_left))
        .build()
        .expect("valid experiment");
    exp.start().expect("draft starts");
    exp
}

fn observe(exp: &mut Experiment, pa: u64, ca: u64, pb: u64, cb: u64) {
    exp.record_observations(Arm::A, pa, ca, 0.0).unwrap();
    exp.record_observations(Arm::B, pb, cb, 0.0).unwrap();
}

// =============================================================================
// Summaries
// =============================================================================

#[test]
fn test_summary_counts_and_totals() {
    let mut one = experiment("exp-a", TargetMetric::ConversionRate, 10);
    observe(&mut one, 400, 40, 400, 50);
    let mut two = experiment("exp-b", TargetMetric::ConversionRate, 2);
    observe(&mut two, 100, 10, 100, 10);
    let three = experiment("exp-c", TargetMetric::ChurnRate, 8);

    let summary = summarize(&[one, two, three], now());

    assert_eq!(summary.by_priority.get(&Priority::Medium), Some(&3));
    assert_eq!(summary.by_status.get(&ExperimentStatus::Running), Some(&3));
    assert_eq!(summary.by_metric.get("conversion_rate"), Some(&2));
    assert_eq!(summary.by_metric.get("churn_rate"), Some(&1));
    assert_eq!(summary.ending_soon, 1);
    assert_eq!(summary.total_participants, 1000);
}

#[test]
fn test_aggregate_impact_parses_currency() {
    let one = with_impact(experiment("exp-a", TargetMetric::RevenuePerUser, 10), "$12K");
    let two = with_impact(experiment("exp-b", TargetMetric::RevenuePerUser, 10), "+$3.5K");
    // Malformed impact degrades to zero, never aborts the aggregation
    let three = with_impact(experiment("exp-c", TargetMetric::ChurnRate, 10), "TBD");

    let summary = summarize(&[one, two, three], now());
    assert!((summary.aggregate_impact - 15_500.0).abs() < 1e-9);
}

/// Rebuild an experiment with a declared projected impact.
fn with_impact(exp: Experiment, impact: &str) -> Experiment {
    let mut rebuilt = Experiment::builder(exp.id(), exp.name(), exp.target_metric())
        .start_date(exp.start_date())
        .end_date(exp.end_date())
        .projected_impact(impact)
        .build()
        .expect("valid experiment");
    rebuilt.start().expect("draft starts");
    rebuilt
}

#[test]
fn test_unparsable_impact_logs_warning() {
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    let portfolio = vec![with_impact(
        experiment("exp-bad", TargetMetric::ChurnRate, 10),
        "TBD",
    )];
    let summary = tracing::subscriber::with_default(subscriber, || summarize(&portfolio, now()));

    // The malformed value contributes zero and is logged, never propagated
    assert!(summary.aggregate_impact.abs() < f64::EPSILON);
    let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("unparsable projected impact"));
    assert!(output.contains("exp-bad"));
}

#[test]
fn test_empty_portfolio_summary() {
    let summary = summarize(&[], now());
    assert!(summary.by_priority.is_empty());
    assert_eq!(summary.total_participants, 0);
    assert!(summary.aggregate_impact.abs() < f64::EPSILON);
}

// =============================================================================
// Insight rules, in fixed order
// =============================================================================

#[test]
fn test_six_experiments_one_urgent() {
    // Five unremarkable experiments plus one high-priority ending in 3 days
    let mut portfolio: Vec<Experiment> = (0..5)
        .map(|i| experiment(&format!("exp-{i}"), TargetMetric::ConversionRate, 10))
        .collect();
    let urgent = {
        let mut exp = Experiment::builder("exp-hot", "Hot", TargetMetric::ConversionRate)
            .start_date(now() - Duration::days(11))
            .end_date(now() + Duration::days(3))
            .priority(Priority::High)
            .build()
            .unwrap();
        exp.start().unwrap();
        exp
    };
    portfolio.push(urgent);

    let found = insights(&portfolio, now());

    let urgent_entries: Vec<_> = found
        .iter()
        .filter(|i| i.kind == InsightKind::Urgent)
        .collect();
    assert_eq!(urgent_entries.len(), 1);
    assert_eq!(urgent_entries[0].experiment_ids, vec!["exp-hot".to_string()]);

    let capacity_entries: Vec<_> = found
        .iter()
        .filter(|i| i.kind == InsightKind::Capacity)
        .collect();
    assert_eq!(capacity_entries.len(), 1);
    assert_eq!(capacity_entries[0].experiment_ids.len(), 6);
}

#[test]
fn test_opportunity_sums_revenue_impact() {
    let one = with_impact(experiment("exp-r1", TargetMetric::RevenuePerUser, 10), "$10K");
    let two = with_impact(experiment("exp-r2", TargetMetric::RevenuePerUser, 10), "$5K");
    let other = experiment("exp-c", TargetMetric::ConversionRate, 10);

    let found = insights(&[one, two, other], now());
    let opportunity = found
        .iter()
        .find(|i| i.kind == InsightKind::Opportunity)
        .expect("revenue experiments present");

    assert_eq!(opportunity.experiment_ids.len(), 2);
    assert!(opportunity.message.contains("15000"));
}

#[test]
fn test_optimization_flags_uneven_split() {
    let mut uneven = Experiment::builder("exp-u", "Uneven", TargetMetric::UserEngagement)
        .start_date(now() - Duration::days(7))
        .end_date(now() + Duration::days(7))
        .traffic_split(TrafficSplit::new(80, 20).unwrap())
        .build()
        .unwrap();
    uneven.start().unwrap();
    // 55/45 is within the 10-point tolerance
    let mut near_even = Experiment::builder("exp-e", "Near even", TargetMetric::UserEngagement)
        .start_date(now() - Duration::days(7))
        .end_date(now() + Duration::days(7))
        .traffic_split(TrafficSplit::new(55, 45).unwrap())
        .build()
        .unwrap();
    near_even.start().unwrap();

    let found = insights(&[uneven, near_even], now());
    let optimization = found
        .iter()
        .find(|i| i.kind == InsightKind::Optimization)
        .expect("uneven split present");
    assert_eq!(optimization.experiment_ids, vec!["exp-u".to_string()]);
}

#[test]
fn test_insights_follow_rule_order_not_arrival_order() {
    // Arrival order deliberately scrambled: capacity trigger first, urgent last
    let mut portfolio: Vec<Experiment> = (0..6)
        .map(|i| {
            with_impact(
                experiment(&format!("exp-{i}"), TargetMetric::RevenuePerUser, 20),
                "$1K",
            )
        })
        .collect();
    let mut urgent = Experiment::builder("exp-z", "Urgent", TargetMetric::ConversionRate)
        .start_date(now() - Duration::days(10))
        .end_date(now() + Duration::days(2))
        .priority(Priority::High)
        .traffic_split(TrafficSplit::new(90, 10).unwrap())
        .build()
        .unwrap();
    urgent.start().unwrap();
    portfolio.push(urgent);

    let found = insights(&portfolio, now());
    let kinds: Vec<InsightKind> = found.iter().map(|i| i.kind).collect();
    assert_eq!(
        kinds,
        vec![
            InsightKind::Urgent,
            InsightKind::Opportunity,
            InsightKind::Optimization,
            InsightKind::Capacity
        ]
    );
}

#[test]
fn test_quiet_portfolio_has_no_insights() {
    let portfolio = vec![
        experiment("exp-a", TargetMetric::ConversionRate, 10),
        experiment("exp-b", TargetMetric::ChurnRate, 12),
    ];
    assert!(insights(&portfolio, now()).is_empty());
}
