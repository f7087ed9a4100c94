//! `triage-training`
//!
//! **Responsibility:** offline side of the artifact lifecycle.
//!
//! Loads a tabular dataset, fits standardizer + linear estimator on a seeded
//! training split, evaluates on the held-out split, and writes the artifact
//! set defined in `triage-core`. Nothing here runs inside the service.

pub mod dataset;
pub mod error;
pub mod estimator;
pub mod metrics;
pub mod preprocessing;
pub mod trainer;

pub use dataset::{Dataset, DatasetSource};
pub use error::{TrainError, TrainResult};
pub use estimator::Fit;
pub use trainer::{train, TrainConfig, TrainOutcome};
