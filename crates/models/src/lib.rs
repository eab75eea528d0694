//! Model capability layer.
//!
//! Every model variant is reachable through the [`Predictor`] capability.
//! The set of variants is closed ([`Model`]); callers such as the ensemble
//! and the training objective depend only on the traits.

#![warn(missing_docs, unused_crate_dependencies)]

mod error;
mod dataset;
mod predictor;
mod regression;
mod segmentation;
mod registry;

pub use error::{ModelError, RegistryError};
pub use dataset::{Dataset, mean_absolute_error, mean_squared_error};
pub use predictor::{Model, ModelKind, Predictor, Trainable};
pub use regression::RegressionModel;
pub use segmentation::SegmentationModel;
pub use registry::{ModelInfo, ModelRegistry};
