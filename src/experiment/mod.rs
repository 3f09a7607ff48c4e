//! Experiment domain: records, lifecycle, and the store surface
//!
//! ## Schema Overview
//!
//! ```text
//! Experiment ──┬── TrafficSplit (a + b == 100)
//!              ├── Variant a (control)  ─ participants/conversions
//!              ├── Variant b (treatment)─ participants/conversions
//!              ├── SuccessCriteria
//!              └── ExperimentResults (computed, never user-supplied)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use ab_engine::experiment::{CreateExperiment, ExperimentStore};
//!
//! let mut store = ExperimentStore::new();
//! let experiment = store.create(
//!     CreateExperiment::new("hero-image", "Photo", "Illustration", "user_engagement")
//!         .duration_days(21),
//! )?;
//! assert_eq!(experiment.id(), "exp-001");
//! # Ok::<(), ab_engine::Error>(())
//! ```

mod lifecycle;
mod record;
mod store;

pub use lifecycle::{days_remaining, days_running, progress, ExperimentStatus};
pub use record::{Experiment, ExperimentBuilder, ExperimentResults, Priority, SuccessCriteria};
pub use store::{ActiveView, CreateExperiment, ExperimentStore, ListFilter, ListView};
