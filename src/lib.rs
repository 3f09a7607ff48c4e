//! # AB-Engine: Experiment Analysis Engine
//!
//! AB-Engine defines A/B experiments, enforces two-arm traffic allocation,
//! computes statistical significance and effect size from observed conversion
//! counts, and derives recommendations and portfolio-level insights across
//! concurrently running experiments.
//!
//! The significance math is a fixed-horizon two-proportion z-test with a
//! deliberately coarse tier mapping (99/95/90/heuristic) suited to a small
//! badge set, not a continuous p-value. All analysis paths are pure and
//! synchronous: given the same snapshot of counts, recomputation is
//! idempotent.
//!
//! ## Example Usage
//!
//! ```rust
//! use ab_engine::experiment::{CreateExperiment, ExperimentStore};
//! use chrono::Utc;
//!
//! let mut store = ExperimentStore::new();
//! let id = store
//!     .create(CreateExperiment::new(
//!         "checkout-cta-color",
//!         "Blue CTA",
//!         "Green CTA",
//!         "conversion_rate",
//!     ))?
//!     .id()
//!     .to_string();
//!
//! store.record_observations(&id, ab_engine::Arm::A, 900, 160, 0.0)?;
//! store.record_observations(&id, ab_engine::Arm::B, 900, 200, 0.0)?;
//!
//! let results = store.recompute(&id, Utc::now())?;
//! assert_eq!(results.test().significance(), 95);
//! # Ok::<(), ab_engine::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod allocation;
pub mod error;
pub mod experiment;
pub mod metrics;
pub mod portfolio;
pub mod recommend;
#[cfg(feature = "simulation")]
pub mod simulation;
pub mod stats;

pub use allocation::{Arm, TrafficSplit, Variant};
pub use error::{Error, Result};
pub use metrics::TargetMetric;
pub use recommend::Recommendation;
pub use stats::{ArmCounts, TestResult};
