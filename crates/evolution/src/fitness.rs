//! Fitness evaluation with failure isolation.

use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};
use tuner_core::{ParameterSet, ParameterSpace};
use tuner_models::ModelError;

/// Score assigned to a candidate whose evaluation failed.
pub const SENTINEL_FITNESS: f64 = -1e6;

/// Reasons an objective could not score a candidate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    /// A declared parameter was absent from the mapping
    #[error("missing parameter '{0}'")]
    MissingParameter(String),

    /// The objective produced NaN or an infinity
    #[error("non-finite score {0}")]
    NonFinite(f64),

    /// Building or training a model failed
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// The objective panicked
    #[error("objective panicked: {0}")]
    Panicked(String),

    /// Any other objective-specific failure
    #[error("{0}")]
    Failed(String),
}

/// Scores a named parameter set. Higher is better.
pub trait Objective {
    /// Evaluate one candidate.
    fn evaluate(&mut self, params: &ParameterSet) -> Result<f64, EvaluationError>;
}

impl<F> Objective for F
where
    F: FnMut(&ParameterSet) -> Result<f64, EvaluationError>,
{
    fn evaluate(&mut self, params: &ParameterSet) -> Result<f64, EvaluationError> {
        self(params)
    }
}

/// Wraps an [`Objective`] as a total function `parameters -> score`.
///
/// Every declared parameter is clamped into its bound before the objective
/// sees it. Errors, panics and non-finite scores all become
/// [`SENTINEL_FITNESS`].
pub struct FitnessEvaluator<O> {
    space: ParameterSpace,
    objective: O,
    evaluations: usize,
    failures: usize,
}

impl<O: Objective> FitnessEvaluator<O> {
    /// Create an evaluator over a parameter space.
    pub fn new(space: ParameterSpace, objective: O) -> Self {
        Self {
            space,
            objective,
            evaluations: 0,
            failures: 0,
        }
    }

    /// The parameter space used for clamping.
    pub fn space(&self) -> &ParameterSpace {
        &self.space
    }

    /// Number of evaluations performed.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Number of evaluations that ended in the sentinel.
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Score a raw gene vector.
    pub fn evaluate_genes(&mut self, genes: &[f64]) -> f64 {
        let params = self.space.decode(genes);
        self.run(&params)
    }

    /// Score a named parameter mapping, clamping each declared value first.
    pub fn evaluate(&mut self, params: &ParameterSet) -> f64 {
        let missing = self
            .space
            .names()
            .iter()
            .find(|name| !params.contains_key(name.as_str()))
            .cloned();
        if let Some(name) = missing {
            self.evaluations += 1;
            return self.fail(EvaluationError::MissingParameter(name));
        }

        let clamped: ParameterSet = self
            .space
            .iter()
            .filter_map(|(name, bound)| {
                params
                    .get(name)
                    .map(|&v| (name.to_string(), bound.clamp(v)))
            })
            .collect();
        self.run(&clamped)
    }

    fn run(&mut self, params: &ParameterSet) -> f64 {
        self.evaluations += 1;

        let objective = &mut self.objective;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| objective.evaluate(params)));

        match outcome {
            Ok(Ok(score)) if score.is_finite() => score,
            Ok(Ok(score)) => self.fail(EvaluationError::NonFinite(score)),
            Ok(Err(e)) => self.fail(e),
            Err(payload) => {
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                warn!("Objective panicked, assigning sentinel: {}", msg);
                self.fail(EvaluationError::Panicked(msg))
            }
        }
    }

    fn fail(&mut self, error: EvaluationError) -> f64 {
        debug!("Evaluation failed: {}", error);
        self.failures += 1;
        SENTINEL_FITNESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tuner_core::Bound;

    fn space() -> ParameterSpace {
        ParameterSpace::new([("x", Bound::new(0.0, 1.0)), ("y", Bound::new(-1.0, 1.0))]).unwrap()
    }

    fn constant(score: f64) -> impl FnMut(&ParameterSet) -> Result<f64, EvaluationError> {
        move |_: &ParameterSet| -> Result<f64, EvaluationError> { Ok(score) }
    }

    #[test]
    fn test_clamps_before_delegating() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let objective = move |p: &ParameterSet| -> Result<f64, EvaluationError> {
            log.borrow_mut().push(p.clone());
            Ok(p["x"] + p["y"])
        };
        let mut evaluator = FitnessEvaluator::new(space(), objective);

        assert_eq!(evaluator.evaluate_genes(&[5.0, -3.0]), 0.0);

        let mut raw = ParameterSet::new();
        raw.insert("x".into(), -2.0);
        raw.insert("y".into(), 0.5);
        assert_eq!(evaluator.evaluate(&raw), 0.5);

        let seen = seen.borrow();
        assert_eq!(seen[0]["x"], 1.0);
        assert_eq!(seen[0]["y"], -1.0);
        assert_eq!(seen[1]["x"], 0.0);
        assert_eq!(evaluator.evaluations(), 2);
        assert_eq!(evaluator.failures(), 0);
    }

    #[test]
    fn test_errors_become_sentinel() {
        let objective = |_: &ParameterSet| -> Result<f64, EvaluationError> {
            Err(EvaluationError::Failed("shape mismatch".into()))
        };
        let mut evaluator = FitnessEvaluator::new(space(), objective);
        assert_eq!(evaluator.evaluate_genes(&[0.5, 0.5]), SENTINEL_FITNESS);
        assert_eq!(evaluator.failures(), 1);
    }

    #[test]
    fn test_non_finite_becomes_sentinel() {
        let mut evaluator = FitnessEvaluator::new(space(), constant(f64::NAN));
        assert_eq!(evaluator.evaluate_genes(&[0.5, 0.5]), SENTINEL_FITNESS);

        let mut evaluator = FitnessEvaluator::new(space(), constant(f64::INFINITY));
        assert_eq!(evaluator.evaluate_genes(&[0.5, 0.5]), SENTINEL_FITNESS);
    }

    #[test]
    fn test_panic_becomes_sentinel() {
        let objective = |_: &ParameterSet| -> Result<f64, EvaluationError> {
            panic!("numerical divergence")
        };
        let mut evaluator = FitnessEvaluator::new(space(), objective);
        assert_eq!(evaluator.evaluate_genes(&[0.5, 0.5]), SENTINEL_FITNESS);
        assert_eq!(evaluator.failures(), 1);
    }

    #[test]
    fn test_missing_parameter_becomes_sentinel() {
        let mut evaluator = FitnessEvaluator::new(space(), constant(1.0));
        let mut partial = ParameterSet::new();
        partial.insert("x".into(), 0.5);
        assert_eq!(evaluator.evaluate(&partial), SENTINEL_FITNESS);
        assert_eq!(evaluator.evaluations(), 1);
        assert_eq!(evaluator.failures(), 1);

        // the same evaluator keeps working once the mapping is complete
        partial.insert("y".into(), 3.0);
        assert_eq!(evaluator.evaluate(&partial), 1.0);
        assert_eq!(evaluator.evaluations(), 2);
        assert_eq!(evaluator.failures(), 1);
    }

    #[test]
    fn test_extra_parameters_are_dropped() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let objective = move |p: &ParameterSet| -> Result<f64, EvaluationError> {
            log.borrow_mut().push(p.clone());
            Ok(0.0)
        };
        let mut evaluator = FitnessEvaluator::new(space(), objective);

        let mut params = ParameterSet::new();
        params.insert("x".into(), 0.25);
        params.insert("y".into(), 0.5);
        params.insert("unused".into(), 9.0);
        assert_eq!(evaluator.evaluate(&params), 0.0);
        assert_eq!(seen.borrow()[0].keys().collect::<Vec<_>>(), vec!["x", "y"]);
    }
}
