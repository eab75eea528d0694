//! Evolution layer - genetic-algorithm hyperparameter search.
//!
//! A [`GeneticOptimizer`] evolves a population of parameter vectors inside a
//! [`ParameterSpace`](tuner_core::ParameterSpace), scoring each candidate
//! through a [`FitnessEvaluator`] that never lets an objective failure abort
//! the search.

#![warn(missing_docs, unused_crate_dependencies)]

mod fitness;
mod metrics;
pub mod objectives;
pub mod operators;
mod optimizer;
mod request;

pub use fitness::{EvaluationError, FitnessEvaluator, Objective, SENTINEL_FITNESS};
pub use metrics::PopulationStats;
pub use objectives::{example_bounds, TargetObjective, TrainingObjective};
pub use optimizer::{GeneticOptimizer, OptimizationResult, OptimizerConfig};
pub use request::{OptimizationRequest, OptimizationResponse};
