//! Population statistics for the evolution history.

use serde::{Deserialize, Serialize};
use tuner_core::Individual;

/// Summary of an evaluated population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    /// Index of the fittest individual (first on ties)
    pub best_index: usize,
    /// Highest fitness
    pub best_fitness: f64,
    /// Mean fitness
    pub average_fitness: f64,
}

impl PopulationStats {
    /// Compute statistics, or `None` for an empty population.
    pub fn of(population: &[Individual]) -> Option<Self> {
        let first = population.first()?;
        let mut best_index = 0;
        let mut best_fitness = first.fitness_or_worst();
        let mut total = 0.0;

        for (i, ind) in population.iter().enumerate() {
            let fitness = ind.fitness_or_worst();
            if fitness > best_fitness {
                best_index = i;
                best_fitness = fitness;
            }
            total += fitness;
        }

        Some(Self {
            best_index,
            best_fitness,
            average_fitness: total / population.len() as f64,
        })
    }
}
