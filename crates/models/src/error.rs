//! Model and registry errors.

/// Errors raised while building, training or running a model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// Input or target dimensions do not match what the model expects
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Input contained no values
    #[error("empty input")]
    EmptyInput,

    /// Hyperparameter outside what the architecture accepts
    #[error("invalid hyperparameter '{name}': {value}")]
    InvalidHyperparameter {
        /// Parameter name
        name: String,
        /// Supplied value
        value: f64,
    },

    /// Training produced a non-finite loss
    #[error("training diverged (loss = {0})")]
    Diverged(f64),

    /// Dataset rows are inconsistent
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
}

/// Errors raised by the model registry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    /// No model with that name
    #[error("Model '{0}' not found")]
    NotFound(String),

    /// A model with that name is already registered
    #[error("Model '{0}' already registered")]
    AlreadyRegistered(String),
}
