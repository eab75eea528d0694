//! Configuration errors raised before a search starts.

/// Errors that make an optimizer configuration unusable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// No parameters were declared
    #[error("parameter bounds must not be empty")]
    EmptyBounds,

    /// A bound is not finite or has min > max
    #[error("invalid bound for '{name}': [{min}, {max}]")]
    InvalidBound {
        /// Parameter name
        name: String,
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },

    /// A bound pair did not have exactly two entries
    #[error("bound for '{name}' must be a [min, max] pair, got {len} values")]
    MalformedBound {
        /// Parameter name
        name: String,
        /// Number of values supplied
        len: usize,
    },

    /// The same parameter name was declared twice
    #[error("duplicate parameter '{0}'")]
    DuplicateParameter(String),

    /// Population size was zero
    #[error("population size must be positive")]
    ZeroPopulation,

    /// Tournament size was zero
    #[error("tournament size must be positive")]
    ZeroTournament,

    /// A probability was outside [0, 1]
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidRate {
        /// Which rate
        name: &'static str,
        /// Supplied value
        value: f64,
    },

    /// A non-negative finite operator constant was violated
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidConstant {
        /// Which constant
        name: &'static str,
        /// Supplied value
        value: f64,
    },
}
