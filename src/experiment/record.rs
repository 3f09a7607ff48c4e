//! Experiment record: the root entity of the analysis engine
//!
//! Constructed only through the validating builder, so every invariant
//! (split sums to 100, end after start, criteria in domain) holds from the
//! moment an `Experiment` exists.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::allocation::{Arm, TrafficSplit, Variant};
use crate::error::{Error, Result};
use crate::metrics::TargetMetric;
use crate::recommend::{recommend, Recommendation};
use crate::stats::{evaluate, ArmCounts, TestResult};

use super::lifecycle::{self, ExperimentStatus};

const DEFAULT_DURATION_DAYS: i64 = 14;

/// Priority of an experiment within the portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Needs a decision first
    High,
    /// Default priority
    Medium,
    /// Nice to know
    Low,
}

impl Priority {
    /// Wire name of the priority (matches serde representation).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Thresholds an experiment must clear before a decision is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuccessCriteria {
    minimum_sample_size: u64,
    significance_threshold: u8,
    minimum_effect_size: f64,
}

impl SuccessCriteria {
    /// Create criteria, validating the significance threshold.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCriteria` unless the threshold is 90, 95,
    /// or 99.
    pub fn new(
        minimum_sample_size: u64,
        significance_threshold: u8,
        minimum_effect_size: f64,
    ) -> Result<Self> {
        if !matches!(significance_threshold, 90 | 95 | 99) {
            return Err(Error::InvalidCriteria(format!(
                "significance threshold must be 90, 95, or 99, got {significance_threshold}"
            )));
        }
        if minimum_effect_size < 0.0 {
            return Err(Error::InvalidCriteria(format!(
                "minimum effect size must be non-negative, got {minimum_effect_size}"
            )));
        }
        Ok(Self {
            minimum_sample_size,
            significance_threshold,
            minimum_effect_size,
        })
    }

    /// Minimum combined participants before the sample is adequate.
    #[must_use]
    pub const fn minimum_sample_size(&self) -> u64 {
        self.minimum_sample_size
    }

    /// Required significance tier (90, 95, or 99).
    #[must_use]
    pub const fn significance_threshold(&self) -> u8 {
        self.significance_threshold
    }

    /// Minimum relative effect size worth acting on, in percent.
    #[must_use]
    pub const fn minimum_effect_size(&self) -> f64 {
        self.minimum_effect_size
    }
}

impl Default for SuccessCriteria {
    /// Defaults: 100 participants, 95 tier, 5 percent effect.
    fn default() -> Self {
        Self {
            minimum_sample_size: 100,
            significance_threshold: 95,
            minimum_effect_size: 5.0,
        }
    }
}

/// Computed analysis output attached to an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResults {
    test: TestResult,
    recommendation: Recommendation,
}

impl ExperimentResults {
    /// The significance computation over the current count snapshot.
    #[must_use]
    pub const fn test(&self) -> &TestResult {
        &self.test
    }

    /// The recommendation derived from significance, effect, and progress.
    #[must_use]
    pub const fn recommendation(&self) -> Recommendation {
        self.recommendation
    }
}

/// A two-arm A/B experiment with its computed results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    id: String,
    name: String,
    description: String,
    hypothesis: String,
    status: ExperimentStatus,
    priority: Priority,
    target_metric: TargetMetric,
    secondary_metrics: Vec<String>,
    target_audience: String,
    traffic_split: TrafficSplit,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    success_criteria: SuccessCriteria,
    variant_a: Variant,
    variant_b: Variant,
    projected_impact: Option<String>,
    completed_winner: Option<Arm>,
    results: Option<ExperimentResults>,
}

impl Experiment {
    /// Create a builder for a new experiment.
    #[must_use]
    pub fn builder(
        id: impl Into<String>,
        name: impl Into<String>,
        target_metric: TargetMetric,
    ) -> ExperimentBuilder {
        ExperimentBuilder::new(id, name, target_metric)
    }

    /// Opaque unique identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-text description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The hypothesis under test.
    #[must_use]
    pub fn hypothesis(&self) -> &str {
        &self.hypothesis
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ExperimentStatus {
        self.status
    }

    /// Portfolio priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// The metric this experiment optimizes for.
    #[must_use]
    pub const fn target_metric(&self) -> TargetMetric {
        self.target_metric
    }

    /// Informational secondary metrics (never used in computation).
    #[must_use]
    pub fn secondary_metrics(&self) -> &[String] {
        &self.secondary_metrics
    }

    /// Audience segment label.
    #[must_use]
    pub fn target_audience(&self) -> &str {
        &self.target_audience
    }

    /// The validated two-arm traffic split.
    #[must_use]
    pub const fn traffic_split(&self) -> TrafficSplit {
        self.traffic_split
    }

    /// When data collection starts.
    #[must_use]
    pub const fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    /// Planned end of data collection.
    #[must_use]
    pub const fn end_date(&self) -> DateTime<Utc> {
        self.end_date
    }

    /// Decision thresholds for this experiment.
    #[must_use]
    pub const fn success_criteria(&self) -> &SuccessCriteria {
        &self.success_criteria
    }

    /// Control arm.
    #[must_use]
    pub const fn variant_a(&self) -> &Variant {
        &self.variant_a
    }

    /// Treatment arm.
    #[must_use]
    pub const fn variant_b(&self) -> &Variant {
        &self.variant_b
    }

    /// Declared projected impact, e.g. `"+$12K"`.
    #[must_use]
    pub fn projected_impact(&self) -> Option<&str> {
        self.projected_impact.as_deref()
    }

    /// Winner recorded when the experiment was completed.
    #[must_use]
    pub const fn completed_winner(&self) -> Option<Arm> {
        self.completed_winner
    }

    /// Latest computed results, if any recomputation has run.
    #[must_use]
    pub const fn results(&self) -> Option<&ExperimentResults> {
        self.results.as_ref()
    }

    /// Fraction of the planned duration elapsed at `now`, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        lifecycle::progress(now, self.start_date, self.end_date)
    }

    /// Whole days elapsed since the start, rounded up.
    #[must_use]
    pub fn days_running(&self, now: DateTime<Utc>) -> i64 {
        lifecycle::days_running(now, self.start_date)
    }

    /// Whole days until the planned end, rounded up.
    #[must_use]
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        lifecycle::days_remaining(now, self.end_date)
    }

    /// Whether the planned end date has passed.
    #[must_use]
    pub fn past_end_date(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_date
    }

    /// Start a draft experiment.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the status is `Draft`.
    pub fn start(&mut self) -> Result<()> {
        self.status = self.status.transition(ExperimentStatus::Running)?;
        Ok(())
    }

    /// Pause a running experiment.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the status is `Running`.
    pub fn pause(&mut self) -> Result<()> {
        self.status = self.status.transition(ExperimentStatus::Paused)?;
        Ok(())
    }

    /// Resume a paused experiment.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the status is `Paused`.
    pub fn resume(&mut self) -> Result<()> {
        self.status = self.status.transition(ExperimentStatus::Running)?;
        Ok(())
    }

    /// Close the experiment, recording the winner (if any) from the latest
    /// results. Terminal.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the status is `Running` or
    /// `Paused`.
    pub fn complete(&mut self) -> Result<()> {
        self.status = self.status.transition(ExperimentStatus::Completed)?;
        self.completed_winner = self.results.and_then(|r| r.test.winner());
        Ok(())
    }

    /// Abort the experiment without a winner. Terminal.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTransition` unless the status is `Running` or
    /// `Paused`.
    pub fn stop(&mut self) -> Result<()> {
        self.status = self.status.transition(ExperimentStatus::Stopped)?;
        Ok(())
    }

    /// Replace one arm's observation snapshot.
    ///
    /// # Errors
    ///
    /// Returns `Error::ExperimentClosed` on a terminal experiment, or
    /// `Error::InvalidCounts` if conversions exceed participants.
    pub fn record_observations(
        &mut self,
        arm: Arm,
        participants: u64,
        conversions: u64,
        total_value: f64,
    ) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::ExperimentClosed(self.id.clone()));
        }
        let variant = match arm {
            Arm::A => &mut self.variant_a,
            Arm::B => &mut self.variant_b,
        };
        variant.record(participants, conversions, total_value)
    }

    /// Recompute `results` from the current count snapshot.
    ///
    /// Idempotent: the same snapshot and the same `now` yield bit-identical
    /// results.
    ///
    /// # Errors
    ///
    /// Infallible in practice (arm counts are validated on entry); the
    /// `Result` only guards against invariant breakage.
    pub fn recompute(&mut self, now: DateTime<Utc>) -> Result<ExperimentResults> {
        let counts = ArmCounts::new(
            self.variant_a.participants(),
            self.variant_a.conversions(),
            self.variant_b.participants(),
            self.variant_b.conversions(),
        )?;
        let test = evaluate(counts, &self.success_criteria);
        let recommendation = recommend(test.significance(), test.effect_size(), self.progress(now));
        let results = ExperimentResults {
            test,
            recommendation,
        };
        self.results = Some(results);
        Ok(results)
    }
}

/// Builder for `Experiment`, applying defaults and validating invariants.
#[derive(Debug)]
pub struct ExperimentBuilder {
    id: String,
    name: String,
    description: String,
    hypothesis: String,
    status: ExperimentStatus,
    priority: Priority,
    target_metric: TargetMetric,
    secondary_metrics: Vec<String>,
    target_audience: String,
    traffic_split: TrafficSplit,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    duration_days: i64,
    success_criteria: SuccessCriteria,
    variant_a: (String, String),
    variant_b: (String, String),
    projected_impact: Option<String>,
}

impl ExperimentBuilder {
    /// Create a builder with required fields and documented defaults.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        target_metric: TargetMetric,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            hypothesis: String::new(),
            status: ExperimentStatus::Draft,
            priority: Priority::Medium,
            target_metric,
            secondary_metrics: Vec::new(),
            target_audience: "all_users".to_string(),
            traffic_split: TrafficSplit::default(),
            start_date: Utc::now(),
            end_date: None,
            duration_days: DEFAULT_DURATION_DAYS,
            success_criteria: SuccessCriteria::default(),
            variant_a: ("Control".to_string(), String::new()),
            variant_b: ("Treatment".to_string(), String::new()),
            projected_impact: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the hypothesis.
    #[must_use]
    pub fn hypothesis(mut self, hypothesis: impl Into<String>) -> Self {
        self.hypothesis = hypothesis.into();
        self
    }

    /// Create the experiment already running instead of in draft.
    #[must_use]
    pub const fn running(mut self) -> Self {
        self.status = ExperimentStatus::Running;
        self
    }

    /// Set the portfolio priority.
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set informational secondary metrics.
    #[must_use]
    pub fn secondary_metrics(mut self, metrics: Vec<String>) -> Self {
        self.secondary_metrics = metrics;
        self
    }

    /// Set the audience segment label.
    #[must_use]
    pub fn target_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = audience.into();
        self
    }

    /// Set a validated traffic split.
    #[must_use]
    pub const fn traffic_split(mut self, split: TrafficSplit) -> Self {
        self.traffic_split = split;
        self
    }

    /// Set an explicit start date (defaults to now).
    #[must_use]
    pub const fn start_date(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = start;
        self
    }

    /// Set an explicit end date, overriding the duration default.
    #[must_use]
    pub const fn end_date(mut self, end: DateTime<Utc>) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Set the planned duration in days (ignored when an end date is set).
    #[must_use]
    pub const fn duration_days(mut self, days: i64) -> Self {
        self.duration_days = days;
        self
    }

    /// Set the success criteria.
    #[must_use]
    pub const fn success_criteria(mut self, criteria: SuccessCriteria) -> Self {
        self.success_criteria = criteria;
        self
    }

    /// Name and describe the control arm.
    #[must_use]
    pub fn variant_a(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.variant_a = (name.into(), description.into());
        self
    }

    /// Name and describe the treatment arm.
    #[must_use]
    pub fn variant_b(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.variant_b = (name.into(), description.into());
        self
    }

    /// Declare a projected impact for portfolio aggregation.
    #[must_use]
    pub fn projected_impact(mut self, impact: impl Into<String>) -> Self {
        self.projected_impact = Some(impact.into());
        self
    }

    /// Build the experiment, deriving the end date and checking invariants.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDuration` if the (derived) end date is not
    /// strictly after the start date.
    pub fn build(self) -> Result<Experiment> {
        let end_date = self
            .end_date
            .unwrap_or(self.start_date + Duration::days(self.duration_days));
        if end_date <= self.start_date {
            return Err(Error::InvalidDuration);
        }

        let (a_name, a_desc) = self.variant_a;
        let (b_name, b_desc) = self.variant_b;
        Ok(Experiment {
            id: self.id,
            name: self.name,
            description: self.description,
            hypothesis: self.hypothesis,
            status: self.status,
            priority: self.priority,
            target_metric: self.target_metric,
            secondary_metrics: self.secondary_metrics,
            target_audience: self.target_audience,
            traffic_split: self.traffic_split,
            start_date: self.start_date,
            end_date,
            success_criteria: self.success_criteria,
            variant_a: Variant::new(a_name, a_desc, self.traffic_split.a()),
            variant_b: Variant::new(b_name, b_desc, self.traffic_split.b()),
            projected_impact: self.projected_impact,
            completed_winner: None,
            results: None,
        })
    }
}
