//! Tuner core data models.
//!
//! This crate defines the parameter space, the individuals that populate an
//! evolutionary search and the history records produced while it runs.

#![warn(missing_docs)]

// Identities
mod id;

// Search space
mod space;
mod individual;
mod history;

// Errors
mod error;

// Re-exports
pub use id::*;

pub use space::{Bound, ParameterSpace, ParameterSet};
pub use individual::{Individual, Population};
pub use history::{EvolutionHistory, GenerationRecord};
pub use error::ConfigError;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
