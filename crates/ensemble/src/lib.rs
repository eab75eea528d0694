//! Ensemble layer - combining and comparing model predictions.

#![warn(missing_docs, unused_crate_dependencies)]

mod error;
mod ensemble;
mod comparator;

pub use error::EnsembleError;
pub use ensemble::{EnsembleMethod, EnsemblePredictor, MetaLearner, UncertainPrediction};
pub use comparator::{Comparison, ModelComparator};
