//! Individuals and populations.

use serde::{Deserialize, Serialize};

/// One candidate parameter vector with its cached fitness.
///
/// Genes are stored raw: crossover and mutation may push them outside their
/// bounds. Clamping happens when the individual is decoded for evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// Gene values in parameter-space order
    pub genes: Vec<f64>,
    /// Last evaluated fitness, `None` when it must be (re-)evaluated
    pub fitness: Option<f64>,
}

impl Individual {
    /// Create an unevaluated individual.
    pub fn new(genes: Vec<f64>) -> Self {
        Self { genes, fitness: None }
    }

    /// Whether the cached fitness is usable.
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Drop the cached fitness after the genes changed.
    pub fn invalidate(&mut self) {
        self.fitness = None;
    }

    /// Cached fitness, or negative infinity when unset.
    pub fn fitness_or_worst(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }
}

/// A generation's worth of individuals.
pub type Population = Vec<Individual>;
