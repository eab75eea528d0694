//! Parameter space - named, bounded search dimensions.

use crate::ConfigError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Decoded parameter values keyed by name.
pub type ParameterSet = BTreeMap<String, f64>;

/// A closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    /// Lower bound (inclusive)
    pub min: f64,
    /// Upper bound (inclusive)
    pub max: f64,
}

impl Bound {
    /// Create a bound. Validation happens when it joins a [`ParameterSpace`].
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether both ends are finite and ordered.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// Clamp a value into the bound.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    /// Whether the value lies within the bound.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Draw a value uniformly from the bound.
    ///
    /// Interpolates between the ends instead of scaling by `max - min`, which
    /// overflows for finite bounds wider than `f64::MAX`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.gen();
        self.clamp(self.min * (1.0 - u) + self.max * u)
    }
}

/// Ordered set of named bounds.
///
/// The declaration order is fixed at construction and defines the gene
/// encoding: gene `i` of every individual belongs to `names()[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Vec<f64>>", into = "BTreeMap<String, [f64; 2]>")]
pub struct ParameterSpace {
    names: Vec<String>,
    bounds: Vec<Bound>,
}

impl ParameterSpace {
    /// Build a space from `(name, bound)` pairs, keeping their order.
    pub fn new<I, S>(params: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, Bound)>,
        S: Into<String>,
    {
        let mut names = Vec::new();
        let mut bounds = Vec::new();
        let mut seen = HashSet::new();

        for (name, bound) in params {
            let name = name.into();
            if !bound.is_valid() {
                return Err(ConfigError::InvalidBound {
                    name,
                    min: bound.min,
                    max: bound.max,
                });
            }
            if !seen.insert(name.clone()) {
                return Err(ConfigError::DuplicateParameter(name));
            }
            names.push(name);
            bounds.push(bound);
        }

        if names.is_empty() {
            return Err(ConfigError::EmptyBounds);
        }

        Ok(Self { names, bounds })
    }

    /// Number of parameters (gene count).
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a constructed space.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Parameter names in gene order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Bounds in gene order.
    pub fn bounds(&self) -> &[Bound] {
        &self.bounds
    }

    /// Bound of a named parameter.
    pub fn bound(&self, name: &str) -> Option<Bound> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.bounds[i])
    }

    /// Iterate over `(name, bound)` in gene order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Bound)> + '_ {
        self.names.iter().map(String::as_str).zip(self.bounds.iter().copied())
    }

    /// Clamp each gene into its bound.
    pub fn clamp_genes(&self, genes: &[f64]) -> Vec<f64> {
        genes
            .iter()
            .zip(&self.bounds)
            .map(|(&g, b)| b.clamp(g))
            .collect()
    }

    /// Decode a gene vector into a clamped, named parameter set.
    pub fn decode(&self, genes: &[f64]) -> ParameterSet {
        debug_assert_eq!(genes.len(), self.len());
        self.names
            .iter()
            .zip(self.clamp_genes(genes))
            .map(|(n, v)| (n.clone(), v))
            .collect()
    }

    /// Draw one gene vector uniformly, independently per gene.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        self.bounds
            .iter()
            .map(|b| b.sample(rng))
            .collect()
    }
}

impl TryFrom<BTreeMap<String, Vec<f64>>> for ParameterSpace {
    type Error = ConfigError;

    fn try_from(raw: BTreeMap<String, Vec<f64>>) -> Result<Self, Self::Error> {
        let mut params = Vec::with_capacity(raw.len());
        for (name, pair) in raw {
            match pair.as_slice() {
                [min, max] => params.push((name, Bound::new(*min, *max))),
                _ => {
                    return Err(ConfigError::MalformedBound {
                        name,
                        len: pair.len(),
                    })
                }
            }
        }
        Self::new(params)
    }
}

impl From<ParameterSpace> for BTreeMap<String, [f64; 2]> {
    fn from(space: ParameterSpace) -> Self {
        space
            .names
            .into_iter()
            .zip(space.bounds)
            .map(|(n, b)| (n, [b.min, b.max]))
            .collect()
    }
}
