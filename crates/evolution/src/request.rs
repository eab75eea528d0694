//! JSON request and response shapes for an optimization call.

use crate::{GeneticOptimizer, Objective, OptimizationResult, OptimizerConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tuner_core::{ConfigError, EvolutionHistory, ParameterSet, ParameterSpace, RunId};

fn default_population_size() -> usize {
    OptimizerConfig::default().population_size
}

fn default_generations() -> usize {
    OptimizerConfig::default().generations
}

fn default_mutation_rate() -> f64 {
    OptimizerConfig::default().mutation_rate
}

fn default_crossover_rate() -> f64 {
    OptimizerConfig::default().crossover_rate
}

fn default_model_type() -> String {
    "regression".to_string()
}

/// Client request for a hyperparameter search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    /// `name -> [min, max]`
    pub param_bounds: BTreeMap<String, Vec<f64>>,
    /// Individuals per generation
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Number of generations
    #[serde(default = "default_generations")]
    pub generations: usize,
    /// Per-individual mutation probability
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Per-pair crossover probability
    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f64,
    /// Label of the model family being tuned; echoed back, not interpreted
    #[serde(default = "default_model_type")]
    pub model_type: String,
    /// Optional seed for a reproducible run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl OptimizationRequest {
    /// Validated parameter space.
    pub fn parameter_space(&self) -> Result<ParameterSpace, ConfigError> {
        ParameterSpace::try_from(self.param_bounds.clone())
    }

    /// Optimizer configuration with the request's overrides applied.
    pub fn optimizer_config(&self) -> OptimizerConfig {
        let config = OptimizerConfig::default()
            .with_population_size(self.population_size)
            .with_generations(self.generations)
            .with_rates(self.mutation_rate, self.crossover_rate);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    /// Validate, run to completion and package the response.
    pub fn run<O: Objective>(&self, objective: O) -> Result<OptimizationResponse, ConfigError> {
        let optimizer =
            GeneticOptimizer::new(self.parameter_space()?, objective, self.optimizer_config())?;
        Ok(OptimizationResponse::new(optimizer.optimize(), self.model_type.clone()))
    }
}

/// Result returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResponse {
    /// Always true; configuration failures are reported as errors instead
    pub success: bool,
    /// Run identifier
    pub run_id: RunId,
    /// Model family named in the request
    pub model_type: String,
    /// Best parameters found
    pub best_parameters: ParameterSet,
    /// Fitness of the best parameters
    pub best_fitness: f64,
    /// Per-generation best and average fitness
    pub evolution_history: EvolutionHistory,
}

impl OptimizationResponse {
    /// Package a finished run for the client.
    pub fn new(result: OptimizationResult, model_type: String) -> Self {
        Self {
            success: true,
            run_id: result.run_id,
            model_type,
            best_parameters: result.best_parameters,
            best_fitness: result.best_fitness,
            evolution_history: result.history,
        }
    }
}
