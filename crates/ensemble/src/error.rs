//! Ensemble errors.

use tuner_models::{ModelError, RegistryError};

/// Errors raised while building or running an ensemble.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EnsembleError {
    /// No member models
    #[error("No models available for ensemble")]
    Empty,

    /// Weight vector length differs from the member count
    #[error("Number of weights ({weights}) must match number of models ({models})")]
    WeightCountMismatch {
        /// Member count
        models: usize,
        /// Weight count
        weights: usize,
    },

    /// Weights are negative, non-finite or sum to zero
    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    /// Members disagree on output length
    #[error("member outputs differ in length: expected {expected}, got {actual}")]
    OutputMismatch {
        /// Length of the first member's output
        expected: usize,
        /// Offending length
        actual: usize,
    },

    /// Stacking requested before the meta-learner was fitted
    #[error("stacking meta-learner has not been fitted")]
    StackingNotFitted,

    /// A member model failed
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A requested model is not registered
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
