//! Per-generation statistics.

use serde::{Deserialize, Serialize};

/// Statistics recorded after one completed generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Zero-based generation index
    pub generation: usize,
    /// Highest fitness in the population
    pub best_fitness: f64,
    /// Mean fitness of the population
    pub average_fitness: f64,
    /// Individuals re-evaluated during this generation
    pub evaluations: usize,
    /// Individuals in the population after replacement
    pub population_size: usize,
}

/// Append-only log of generation records.
///
/// Used for reporting only. Serializes as the parallel arrays clients
/// expect: `{generations, best_fitness, avg_fitness}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvolutionHistory {
    records: Vec<GenerationRecord>,
}

impl EvolutionHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn push(&mut self, record: GenerationRecord) {
        self.records.push(record);
    }

    /// Number of recorded generations.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in order.
    pub fn records(&self) -> &[GenerationRecord] {
        &self.records
    }

    /// Most recent record.
    pub fn last(&self) -> Option<&GenerationRecord> {
        self.records.last()
    }
}

#[derive(Serialize, Deserialize)]
struct HistoryColumns {
    generations: Vec<usize>,
    best_fitness: Vec<f64>,
    avg_fitness: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    evaluations: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    population_size: Vec<usize>,
}

impl Serialize for EvolutionHistory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        HistoryColumns {
            generations: self.records.iter().map(|r| r.generation).collect(),
            best_fitness: self.records.iter().map(|r| r.best_fitness).collect(),
            avg_fitness: self.records.iter().map(|r| r.average_fitness).collect(),
            evaluations: self.records.iter().map(|r| r.evaluations).collect(),
            population_size: self.records.iter().map(|r| r.population_size).collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EvolutionHistory {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let cols = HistoryColumns::deserialize(deserializer)?;
        let n = cols.generations.len();
        if cols.best_fitness.len() != n || cols.avg_fitness.len() != n {
            return Err(serde::de::Error::custom("history columns differ in length"));
        }
        let records = (0..n)
            .map(|i| GenerationRecord {
                generation: cols.generations[i],
                best_fitness: cols.best_fitness[i],
                average_fitness: cols.avg_fitness[i],
                evaluations: cols.evaluations.get(i).copied().unwrap_or(0),
                population_size: cols.population_size.get(i).copied().unwrap_or(0),
            })
            .collect();
        Ok(Self { records })
    }
}
