//! Portfolio aggregation: cross-experiment summaries and insights
//!
//! Aggregation never fails outright because of one malformed experiment:
//! unparsable projected-impact strings contribute zero and are logged as
//! warnings.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::experiment::{Experiment, ExperimentStatus, Priority};
use crate::metrics::TargetMetric;

/// Days-remaining threshold for the ending-soon summary count.
const ENDING_SOON_DAYS: i64 = 3;
/// Days-remaining threshold for the urgent insight.
const URGENT_DAYS: i64 = 5;
/// Split imbalance (percentage points) that triggers the optimization insight.
const IMBALANCE_THRESHOLD: u8 = 10;
/// Concurrent experiment count that triggers the capacity insight.
const CAPACITY_LIMIT: usize = 5;

/// Cross-experiment summary counts and totals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Experiment counts keyed by priority.
    pub by_priority: HashMap<Priority, usize>,
    /// Experiment counts keyed by status.
    pub by_status: HashMap<ExperimentStatus, usize>,
    /// Experiment counts keyed by target metric name.
    pub by_metric: HashMap<String, usize>,
    /// Experiments with three or fewer days remaining.
    pub ending_soon: usize,
    /// Total participants across both arms of every experiment.
    pub total_participants: u64,
    /// Sum of parsed projected-impact values, in currency units.
    pub aggregate_impact: f64,
}

/// Category of a portfolio insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    /// High-priority experiments close to their end date
    Urgent,
    /// Revenue experiments with projected upside
    Opportunity,
    /// Uneven traffic allocation worth revisiting
    Optimization,
    /// Too many concurrent experiments
    Capacity,
}

/// A rule-triggered observation about the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// Rule category.
    pub kind: InsightKind,
    /// Short headline.
    pub title: String,
    /// Expanded explanation.
    pub message: String,
    /// Experiments the rule matched.
    pub experiment_ids: Vec<String>,
    /// Suggested follow-up.
    pub action: String,
}

/// Summarize a collection of experiments at a point in time.
#[must_use]
pub fn summarize(experiments: &[Experiment], now: DateTime<Utc>) -> PortfolioSummary {
    let mut summary = PortfolioSummary::default();

    for exp in experiments {
        *summary.by_priority.entry(exp.priority()).or_insert(0) += 1;
        *summary.by_status.entry(exp.status()).or_insert(0) += 1;
        *summary
            .by_metric
            .entry(exp.target_metric().to_string())
            .or_insert(0) += 1;

        if exp.days_remaining(now) <= ENDING_SOON_DAYS {
            summary.ending_soon += 1;
        }
        summary.total_participants +=
            exp.variant_a().participants() + exp.variant_b().participants();
        summary.aggregate_impact += parsed_impact(exp);
    }

    summary
}

/// Generate structured insights over the portfolio.
///
/// Each rule is evaluated independently and appended only when its trigger
/// fires. Output order follows the fixed rule order (urgent, opportunity,
/// optimization, capacity), never arrival order.
#[must_use]
pub fn insights(experiments: &[Experiment], now: DateTime<Utc>) -> Vec<Insight> {
    let mut out = Vec::new();

    let urgent_ids: Vec<String> = experiments
        .iter()
        .filter(|e| e.priority() == Priority::High && e.days_remaining(now) <= URGENT_DAYS)
        .map(|e| e.id().to_string())
        .collect();
    if !urgent_ids.is_empty() {
        out.push(Insight {
            kind: InsightKind::Urgent,
            title: "High-priority experiments ending soon".to_string(),
            message: format!(
                "{} high-priority experiment(s) end within {URGENT_DAYS} days and need a decision",
                urgent_ids.len()
            ),
            experiment_ids: urgent_ids,
            action: "Review results and prepare rollout or rollback decisions".to_string(),
        });
    }

    let revenue: Vec<&Experiment> = experiments
        .iter()
        .filter(|e| e.target_metric() == TargetMetric::RevenuePerUser)
        .collect();
    if !revenue.is_empty() {
        let total: f64 = revenue.iter().map(|e| parsed_impact(e)).sum();
        out.push(Insight {
            kind: InsightKind::Opportunity,
            title: "Revenue upside in flight".to_string(),
            message: format!(
                "{} revenue experiment(s) project a combined impact of {total:.0}",
                revenue.len()
            ),
            experiment_ids: revenue.iter().map(|e| e.id().to_string()).collect(),
            action: "Prioritize sample collection for revenue experiments".to_string(),
        });
    }

    let uneven_ids: Vec<String> = experiments
        .iter()
        .filter(|e| e.traffic_split().imbalance() > IMBALANCE_THRESHOLD)
        .map(|e| e.id().to_string())
        .collect();
    if !uneven_ids.is_empty() {
        out.push(Insight {
            kind: InsightKind::Optimization,
            title: "Uneven traffic allocation".to_string(),
            message: format!(
                "{} experiment(s) split traffic more than {IMBALANCE_THRESHOLD} points apart, \
                 slowing significance",
                uneven_ids.len()
            ),
            experiment_ids: uneven_ids,
            action: "Consider rebalancing toward a 50/50 split".to_string(),
        });
    }

    if experiments.len() > CAPACITY_LIMIT {
        out.push(Insight {
            kind: InsightKind::Capacity,
            title: "Experiment capacity exceeded".to_string(),
            message: format!(
                "{} experiments are running concurrently; interaction effects may confound results",
                experiments.len()
            ),
            experiment_ids: experiments.iter().map(|e| e.id().to_string()).collect(),
            action: "Stagger lower-priority experiments".to_string(),
        });
    }

    out
}

/// Parse a declared projected-impact string into currency units.
///
/// Strips currency decoration, honors a sign, and scales `K`/`M` suffixes.
/// Returns `None` when no numeric value can be extracted.
#[must_use]
pub fn parse_impact(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let scale = match trimmed.chars().rev().find(char::is_ascii_alphabetic) {
        Some('k' | 'K') => 1_000.0,
        Some('m' | 'M') => 1_000_000.0,
        Some(_) => return None,
        None => 1.0,
    };

    let digits: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let value: f64 = digits.parse().ok()?;
    let signed = if trimmed.contains('-') { -value } else { value };
    Some(signed * scale)
}

/// Impact contribution of one experiment: parsed value or zero with a
/// warning. Never aborts the aggregation.
fn parsed_impact(exp: &Experiment) -> f64 {
    let Some(raw) = exp.projected_impact() else {
        return 0.0;
    };
    parse_impact(raw).unwrap_or_else(|| {
        warn!(
            experiment_id = exp.id(),
            raw, "unparsable projected impact, contributing 0"
        );
        0.0
    })
}
