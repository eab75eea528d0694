//! Prediction capability and the closed set of model variants.

use crate::{Dataset, ModelError, RegressionModel, SegmentationModel};
use serde::{Deserialize, Serialize};
use tuner_core::ParameterSet;

/// Anything that maps an input vector to an output vector.
pub trait Predictor {
    /// Run inference on a single input.
    fn predict(&self, input: &[f64]) -> Result<Vec<f64>, ModelError>;
}

impl<P: Predictor + ?Sized> Predictor for &P {
    fn predict(&self, input: &[f64]) -> Result<Vec<f64>, ModelError> {
        (**self).predict(input)
    }
}

impl<P: Predictor + ?Sized> Predictor for Box<P> {
    fn predict(&self, input: &[f64]) -> Result<Vec<f64>, ModelError> {
        (**self).predict(input)
    }
}

/// A predictor that can be built from hyperparameters and trained in steps.
pub trait Trainable: Predictor + Sized {
    /// Instantiate an untrained model from hyperparameters.
    fn from_hyperparameters(params: &ParameterSet) -> Result<Self, ModelError>;

    /// Run one full-batch optimisation step and return the loss before it.
    fn train_step(&mut self, data: &Dataset, learning_rate: f64) -> Result<f64, ModelError>;
}

/// Model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Scalar regression
    Regression,
    /// Per-element mask prediction
    Segmentation,
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Regression => write!(f, "regression"),
            Self::Segmentation => write!(f, "segmentation"),
        }
    }
}

/// Every model the service can host.
#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    /// Linear regression model
    Regression(RegressionModel),
    /// Logistic segmentation model
    Segmentation(SegmentationModel),
}

impl Model {
    /// Family of this model.
    pub fn kind(&self) -> ModelKind {
        match self {
            Self::Regression(_) => ModelKind::Regression,
            Self::Segmentation(_) => ModelKind::Segmentation,
        }
    }
}

impl Predictor for Model {
    fn predict(&self, input: &[f64]) -> Result<Vec<f64>, ModelError> {
        match self {
            Self::Regression(m) => m.predict(input),
            Self::Segmentation(m) => m.predict(input),
        }
    }
}

impl From<RegressionModel> for Model {
    fn from(m: RegressionModel) -> Self {
        Self::Regression(m)
    }
}

impl From<SegmentationModel> for Model {
    fn from(m: SegmentationModel) -> Self {
        Self::Segmentation(m)
    }
}
