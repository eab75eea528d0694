//! Ready-made objectives and example search spaces.

use crate::{EvaluationError, Objective};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use tuner_core::ParameterSet;
use tuner_models::{Dataset, Trainable};

/// Placeholder scorer rewarding conventional hyperparameter values.
///
/// Learning rates are pulled towards 0.001, hidden/dimension sizes towards
/// 64, and anything else towards zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetObjective;

impl TargetObjective {
    /// Score a parameter set.
    pub fn score(params: &ParameterSet) -> f64 {
        params
            .iter()
            .map(|(name, &value)| {
                let name = name.to_lowercase();
                if name.contains("learning_rate") {
                    -(value - 0.001).abs() * 1000.0
                } else if name.contains("hidden") || name.contains("dim") {
                    -(value - 64.0).abs() * 0.1
                } else {
                    -value.abs() * 0.01
                }
            })
            .sum()
    }
}

impl Objective for TargetObjective {
    fn evaluate(&mut self, params: &ParameterSet) -> Result<f64, EvaluationError> {
        Ok(Self::score(params))
    }
}

/// Scores hyperparameters by briefly training a model and measuring its loss.
///
/// The model is rebuilt from scratch for every candidate, trained for a
/// fixed number of full-batch steps at the candidate's `learning_rate`, and
/// scored as the negative MSE on the validation set (the training set when
/// none is given).
pub struct TrainingObjective<M> {
    train: Dataset,
    validation: Option<Dataset>,
    steps: usize,
    default_learning_rate: f64,
    _model: PhantomData<fn() -> M>,
}

impl<M: Trainable> TrainingObjective<M> {
    /// Train on `train` for five steps per candidate.
    pub fn new(train: Dataset) -> Self {
        Self {
            train,
            validation: None,
            steps: 5,
            default_learning_rate: 0.001,
            _model: PhantomData,
        }
    }

    /// Measure loss on a held-out set.
    pub fn with_validation(mut self, validation: Dataset) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Set the number of training steps per candidate.
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }
}

impl<M: Trainable> Objective for TrainingObjective<M> {
    fn evaluate(&mut self, params: &ParameterSet) -> Result<f64, EvaluationError> {
        let mut model = M::from_hyperparameters(params)?;
        let lr = params
            .get("learning_rate")
            .copied()
            .unwrap_or(self.default_learning_rate);

        for _ in 0..self.steps {
            model.train_step(&self.train, lr)?;
        }

        let loss = self.validation.as_ref().unwrap_or(&self.train).mse(&model)?;
        if !loss.is_finite() {
            return Err(EvaluationError::NonFinite(loss));
        }
        Ok(-loss)
    }
}

/// Example bounds for the hosted model families, as `name -> [min, max]`.
pub fn example_bounds() -> BTreeMap<&'static str, BTreeMap<&'static str, [f64; 2]>> {
    BTreeMap::from([
        (
            "regression_net",
            BTreeMap::from([
                ("learning_rate", [0.0001, 0.01]),
                ("hidden_dim_1", [32.0, 128.0]),
                ("hidden_dim_2", [32.0, 128.0]),
                ("dropout_rate", [0.0, 0.5]),
            ]),
        ),
        (
            "unet",
            BTreeMap::from([
                ("learning_rate", [0.0001, 0.01]),
                ("features_0", [32.0, 128.0]),
                ("features_1", [64.0, 256.0]),
                ("features_2", [128.0, 512.0]),
            ]),
        ),
    ])
}
