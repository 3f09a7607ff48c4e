//! Experiment store: the engine's narrow external surface
//!
//! In-memory, insertion-ordered storage exposing the three logical
//! interfaces: create (validating), list (filters plus summary), and
//! recompute (idempotent). Transport framing, persistence, and auth are
//! collaborator concerns, not this store's.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::allocation::{Arm, TrafficSplit};
use crate::error::{Error, Result};
use crate::metrics::TargetMetric;
use crate::portfolio::{insights, summarize, Insight, PortfolioSummary};

use super::lifecycle::ExperimentStatus;
use super::record::{Experiment, ExperimentResults, Priority, SuccessCriteria};

/// Creation request for a new experiment.
///
/// Only the name, the two variant names, and the target metric are required;
/// everything else falls back to the documented defaults (50/50 split,
/// 14 days, criteria 100/95/5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExperiment {
    name: String,
    variant_a: String,
    variant_b: String,
    target_metric: String,
    description: String,
    hypothesis: String,
    priority: Priority,
    target_audience: Option<String>,
    duration_days: Option<i64>,
    traffic_split: Option<(u8, u8)>,
    success_criteria: Option<SuccessCriteria>,
    secondary_metrics: Vec<String>,
    projected_impact: Option<String>,
    start_immediately: bool,
}

impl CreateExperiment {
    /// Create a request with the required fields. The experiment starts
    /// running immediately unless [`Self::draft`] is called.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        variant_a: impl Into<String>,
        variant_b: impl Into<String>,
        target_metric: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            variant_a: variant_a.into(),
            variant_b: variant_b.into(),
            target_metric: target_metric.into(),
            description: String::new(),
            hypothesis: String::new(),
            priority: Priority::Medium,
            target_audience: None,
            duration_days: None,
            traffic_split: None,
            success_criteria: None,
            secondary_metrics: Vec::new(),
            projected_impact: None,
            start_immediately: true,
        }
    }

    /// Create the experiment in draft instead of running.
    #[must_use]
    pub const fn draft(mut self) -> Self {
        self.start_immediately = false;
        self
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

    /// Set the portfolio priority.
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the audience segment label.
    #[must_use]
    pub fn target_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = Some(audience.into());
        self
    }

    /// Set the planned duration in days.
    #[must_use]
    pub const fn duration_days(mut self, days: i64) -> Self {
        self.duration_days = Some(days);
        self
    }

    /// Set an explicit traffic split (validated at creation).
    #[must_use]
    pub const fn traffic_split(mut self, a: u8, b: u8) -> Self {
        self.traffic_split = Some((a, b));
        self
    }

    /// Set explicit success criteria.
    #[must_use]
    pub const fn success_criteria(mut self, criteria: SuccessCriteria) -> Self {
        self.success_criteria = Some(criteria);
        self
    }

    /// Set informational secondary metrics.
    #[must_use]
    pub fn secondary_metrics(mut self, metrics: Vec<String>) -> Self {
        self.secondary_metrics = metrics;
        self
    }

    /// Declare a projected impact for portfolio aggregation.
    #[must_use]
    pub fn projected_impact(mut self, impact: impl Into<String>) -> Self {
        self.projected_impact = Some(impact.into());
        self
    }
}

/// Optional filters for listing experiments.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ListFilter {
    /// Keep only experiments in this status.
    pub status: Option<ExperimentStatus>,
    /// Keep only experiments targeting this metric.
    pub target_metric: Option<TargetMetric>,
    /// Cap the number of experiments returned.
    pub limit: Option<usize>,
}

impl ListFilter {
    fn matches(self, exp: &Experiment) -> bool {
        self.status.map_or(true, |s| exp.status() == s)
            && self.target_metric.map_or(true, |m| exp.target_metric() == m)
    }
}

/// Filtered experiment collection plus its portfolio summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListView {
    /// Matching experiments in insertion order.
    pub experiments: Vec<Experiment>,
    /// Summary over the matching experiments.
    pub summary: PortfolioSummary,
}

/// The running subset with summary and insights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveView {
    /// Running experiments in insertion order.
    pub experiments: Vec<Experiment>,
    /// Summary over the running experiments.
    pub summary: PortfolioSummary,
    /// Rule-triggered insights over the running experiments.
    pub insights: Vec<Insight>,
}

/// In-memory store of experiments, insertion-ordered.
#[derive(Debug, Default)]
pub struct ExperimentStore {
    experiments: Vec<Experiment>,
    next_id: u64,
}

impl ExperimentStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of experiments in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    /// Whether the store holds no experiments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    /// Get an experiment by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Experiment> {
        self.experiments.iter().find(|e| e.id() == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Experiment> {
        self.experiments
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Create an experiment from a request, validating metric, split,
    /// criteria, and duration. Results start zeroed.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownMetric`, `Error::InvalidSplit`, or
    /// `Error::InvalidDuration` when the corresponding input is rejected.
    pub fn create(&mut self, request: CreateExperiment) -> Result<&Experiment> {
        let metric: TargetMetric = request.target_metric.parse()?;
        let split = match request.traffic_split {
            Some((a, b)) => TrafficSplit::new(a, b)?,
            None => TrafficSplit::default(),
        };

        self.next_id += 1;
        let id = format!("exp-{:03}", self.next_id);

        let mut builder = Experiment::builder(&id, request.name, metric)
            .description(request.description)
            .hypothesis(request.hypothesis)
            .priority(request.priority)
            .traffic_split(split)
            .secondary_metrics(request.secondary_metrics)
            .variant_a(request.variant_a, "")
            .variant_b(request.variant_b, "");
        if let Some(audience) = request.target_audience {
            builder = builder.target_audience(audience);
        }
        if let Some(days) = request.duration_days {
            builder = builder.duration_days(days);
        }
        if let Some(criteria) = request.success_criteria {
            builder = builder.success_criteria(criteria);
        }
        if let Some(impact) = request.projected_impact {
            builder = builder.projected_impact(impact);
        }
        if request.start_immediately {
            builder = builder.running();
        }

        let experiment = builder.build()?;
        debug!(id = experiment.id(), "created experiment");
        self.experiments.push(experiment);
        let created = self.experiments.len() - 1;
        Ok(&self.experiments[created])
    }

    /// List experiments matching the filter, with a summary over the match.
    #[must_use]
    pub fn list(&self, filter: ListFilter, now: DateTime<Utc>) -> ListView {
        let mut experiments: Vec<Experiment> = self
            .experiments
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        if let Some(limit) = filter.limit {
            experiments.truncate(limit);
        }
        let summary = summarize(&experiments, now);
        ListView {
            experiments,
            summary,
        }
    }

    /// The running subset, its summary, and its insights.
    #[must_use]
    pub fn active_view(&self, now: DateTime<Utc>) -> ActiveView {
        let experiments: Vec<Experiment> = self
            .experiments
            .iter()
            .filter(|e| e.status() == ExperimentStatus::Running)
            .cloned()
            .collect();
        let summary = summarize(&experiments, now);
        let insights = insights(&experiments, now);
        ActiveView {
            experiments,
            summary,
            insights,
        }
    }

    /// Replace one arm's observation snapshot for an experiment.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound`, `Error::ExperimentClosed`, or
    /// `Error::InvalidCounts`.
    pub fn record_observations(
        &mut self,
        id: &str,
        arm: Arm,
        participants: u64,
        conversions: u64,
        total_value: f64,
    ) -> Result<()> {
        self.get_mut(id)?
            .record_observations(arm, participants, conversions, total_value)
    }

    /// Recompute an experiment's results against its own criteria and
    /// progress at `now`. Idempotent for an unchanged snapshot.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown ID.
    pub fn recompute(&mut self, id: &str, now: DateTime<Utc>) -> Result<ExperimentResults> {
        let experiment = self.get_mut(id)?;
        let results = experiment.recompute(now)?;
        debug!(
            id,
            significance = results.test().significance(),
            "recomputed results"
        );
        Ok(results)
    }

    /// Start a draft experiment.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` or `Error::InvalidTransition`.
    pub fn start(&mut self, id: &str) -> Result<()> {
        self.get_mut(id)?.start()
    }

    /// Pause a running experiment.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` or `Error::InvalidTransition`.
    pub fn pause(&mut self, id: &str) -> Result<()> {
        self.get_mut(id)?.pause()
    }

    /// Resume a paused experiment.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` or `Error::InvalidTransition`.
    pub fn resume(&mut self, id: &str) -> Result<()> {
        self.get_mut(id)?.resume()
    }

    /// Close an experiment, recording the winner from its latest results.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` or `Error::InvalidTransition`.
    pub fn complete(&mut self, id: &str) -> Result<()> {
        self.get_mut(id)?.complete()
    }

    /// Abort an experiment without a winner.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` or `Error::InvalidTransition`.
    pub fn stop(&mut self, id: &str) -> Result<()> {
        self.get_mut(id)?.stop()
    }

    /// Auto-complete running experiments whose end date has passed.
    ///
    /// Returns the IDs of the experiments completed by this tick.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let mut completed = Vec::new();
        for exp in &mut self.experiments {
            if exp.status() == ExperimentStatus::Running && exp.past_end_date(now) {
                // recompute first so the recorded winner reflects final counts
                if exp.recompute(now).is_ok() && exp.complete().is_ok() {
                    debug!(id = exp.id(), "auto-completed past end date");
                    completed.push(exp.id().to_string());
                }
            }
        }
        completed
    }
}
