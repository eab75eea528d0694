//! Genetic optimizer - generational search over a bounded parameter space.

use crate::operators::{blend_crossover, gaussian_mutate, tournament_select};
use crate::{FitnessEvaluator, Objective, PopulationStats};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tuner_core::{
    ConfigError, EvolutionHistory, GenerationRecord, Individual, ParameterSet, ParameterSpace,
    Population, RunId, Time,
};

/// Control parameters of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Individuals per generation
    pub population_size: usize,
    /// Number of generations after the initial population
    pub generations: usize,
    /// Probability that an offspring is mutated
    pub mutation_rate: f64,
    /// Probability that a parent pair is recombined
    pub crossover_rate: f64,
    /// Individuals sampled per tournament
    pub tournament_size: usize,
    /// Blend crossover extrapolation factor
    pub blend_alpha: f64,
    /// Standard deviation of the mutation noise
    pub mutation_sigma: f64,
    /// Per-gene probability of noise once an individual is picked for mutation
    pub gene_mutation_probability: f64,
    /// Seed for reproducible runs; entropy when absent
    pub seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 20,
            mutation_rate: 0.2,
            crossover_rate: 0.7,
            tournament_size: 3,
            blend_alpha: 0.5,
            mutation_sigma: 0.1,
            gene_mutation_probability: 0.2,
            seed: None,
        }
    }
}

impl OptimizerConfig {
    /// Set the population size.
    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    /// Set the number of generations.
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Set mutation and crossover probabilities.
    pub fn with_rates(mut self, mutation_rate: f64, crossover_rate: f64) -> Self {
        self.mutation_rate = mutation_rate;
        self.crossover_rate = crossover_rate;
        self
    }

    /// Seed the random source.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::ZeroPopulation);
        }
        if self.tournament_size == 0 {
            return Err(ConfigError::ZeroTournament);
        }
        for (name, value) in [
            ("mutation_rate", self.mutation_rate),
            ("crossover_rate", self.crossover_rate),
            ("gene_mutation_probability", self.gene_mutation_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidRate { name, value });
            }
        }
        let constants = [
            ("blend_alpha", self.blend_alpha),
            ("mutation_sigma", self.mutation_sigma),
        ];
        for (name, value) in constants {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidConstant { name, value });
            }
        }
        Ok(())
    }
}

/// Outcome of [`GeneticOptimizer::optimize`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Run identifier
    pub run_id: RunId,
    /// Best parameters ever observed, clamped into their bounds
    pub best_parameters: ParameterSet,
    /// Fitness of `best_parameters`
    pub best_fitness: f64,
    /// Generation that produced the best, `None` for the initial population
    pub best_generation: Option<usize>,
    /// One record per completed generation
    pub history: EvolutionHistory,
    /// Population after the last generation
    pub final_population: Population,
    /// Objective calls made
    pub evaluations: usize,
    /// Objective calls that ended in the sentinel score
    pub failed_evaluations: usize,
    /// When the run started
    pub started_at: Time,
    /// When the run finished
    pub finished_at: Time,
}

/// Best candidate seen so far.
struct Champion {
    genes: Vec<f64>,
    fitness: f64,
    generation: Option<usize>,
}

impl Champion {
    fn consider(&mut self, candidate: &Individual, generation: Option<usize>) {
        let fitness = candidate.fitness_or_worst();
        if fitness > self.fitness {
            self.genes = candidate.genes.clone();
            self.fitness = fitness;
            self.generation = generation;
        }
    }
}

/// Evolves a population of parameter vectors to maximise an objective.
///
/// Replacement is generational with no elitism; the reported best is the
/// best individual observed in any generation, including the initial one.
pub struct GeneticOptimizer<O> {
    evaluator: FitnessEvaluator<O>,
    config: OptimizerConfig,
    noise: Normal<f64>,
    rng: StdRng,
}

impl<O: Objective> GeneticOptimizer<O> {
    /// Create an optimizer, rejecting invalid configuration up front.
    pub fn new(
        space: ParameterSpace,
        objective: O,
        config: OptimizerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let noise =
            Normal::new(0.0, config.mutation_sigma).map_err(|_| ConfigError::InvalidConstant {
                name: "mutation_sigma",
                value: config.mutation_sigma,
            })?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            evaluator: FitnessEvaluator::new(space, objective),
            config,
            noise,
            rng,
        })
    }

    /// Create an optimizer with default control parameters.
    pub fn with_defaults(space: ParameterSpace, objective: O) -> Result<Self, ConfigError> {
        Self::new(space, objective, OptimizerConfig::default())
    }

    /// The configuration in use.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// The parameter space being searched.
    pub fn space(&self) -> &ParameterSpace {
        self.evaluator.space()
    }

    /// Run the search to completion.
    pub fn optimize(mut self) -> OptimizationResult {
        let run_id = RunId::new();
        let started_at = Utc::now();
        let size = self.config.population_size;

        info!(
            "Starting optimization {} ({} parameters, population {}, {} generations)",
            run_id,
            self.space().len(),
            size,
            self.config.generations
        );

        let mut population: Population = (0..size)
            .map(|_| Individual::new(self.evaluator.space().sample(&mut self.rng)))
            .collect();
        self.evaluate_pending(&mut population);

        let mut champion = Champion {
            genes: population[0].genes.clone(),
            fitness: f64::NEG_INFINITY,
            generation: None,
        };
        if let Some(stats) = PopulationStats::of(&population) {
            champion.consider(&population[stats.best_index], None);
        }

        let mut history = EvolutionHistory::new();

        for generation in 0..self.config.generations {
            let mut offspring =
                tournament_select(&population, size, self.config.tournament_size, &mut self.rng);

            for pair in offspring.chunks_exact_mut(2) {
                if self.rng.gen::<f64>() < self.config.crossover_rate {
                    let (first, second) = pair.split_at_mut(1);
                    let alpha = self.config.blend_alpha;
                    blend_crossover(&mut first[0], &mut second[0], alpha, &mut self.rng);
                }
            }

            for individual in offspring.iter_mut() {
                if self.rng.gen::<f64>() < self.config.mutation_rate {
                    gaussian_mutate(
                        individual,
                        &self.noise,
                        self.config.gene_mutation_probability,
                        &mut self.rng,
                    );
                }
            }

            let evaluations = self.evaluate_pending(&mut offspring);
            population = offspring;

            let Some(stats) = PopulationStats::of(&population) else {
                continue;
            };
            champion.consider(&population[stats.best_index], Some(generation));

            history.push(GenerationRecord {
                generation,
                best_fitness: stats.best_fitness,
                average_fitness: stats.average_fitness,
                evaluations,
                population_size: population.len(),
            });
            debug!(
                "Generation {}: best {:.6}, average {:.6}, {} evaluations",
                generation, stats.best_fitness, stats.average_fitness, evaluations
            );
        }

        let best_parameters = self.evaluator.space().decode(&champion.genes);
        info!(
            "Optimization {} finished: best fitness {:.6} after {} evaluations ({} failed)",
            run_id,
            champion.fitness,
            self.evaluator.evaluations(),
            self.evaluator.failures()
        );

        OptimizationResult {
            run_id,
            best_parameters,
            best_fitness: champion.fitness,
            best_generation: champion.generation,
            history,
            final_population: population,
            evaluations: self.evaluator.evaluations(),
            failed_evaluations: self.evaluator.failures(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Evaluate every individual without a cached fitness.
    fn evaluate_pending(&mut self, population: &mut [Individual]) -> usize {
        let mut count = 0;
        for individual in population.iter_mut().filter(|i| !i.is_evaluated()) {
            individual.fitness = Some(self.evaluator.evaluate_genes(&individual.genes));
            count += 1;
        }
        count
    }
}
