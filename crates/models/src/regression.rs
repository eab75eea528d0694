//! Linear regression model.

use crate::{Dataset, ModelError, Predictor, Trainable};
use tuner_core::ParameterSet;

const DEFAULT_INPUT_DIM: usize = 4;

/// Single-output linear model `y = w·x + b` with optional L2 decay.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionModel {
    weights: Vec<f64>,
    bias: f64,
    weight_decay: f64,
}

impl RegressionModel {
    /// Zero-initialised model for `input_dim` features.
    pub fn new(input_dim: usize) -> Self {
        Self {
            weights: vec![0.0; input_dim],
            bias: 0.0,
            weight_decay: 0.0,
        }
    }

    /// Model with fixed coefficients.
    pub fn with_parameters(weights: Vec<f64>, bias: f64) -> Self {
        Self {
            weights,
            bias,
            weight_decay: 0.0,
        }
    }

    /// Set the L2 penalty applied during training.
    pub fn with_weight_decay(mut self, weight_decay: f64) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    /// Number of input features.
    pub fn input_dim(&self) -> usize {
        self.weights.len()
    }

    /// Current weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Current bias.
    pub fn bias(&self) -> f64 {
        self.bias
    }

    fn forward(&self, input: &[f64]) -> f64 {
        self.weights.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + self.bias
    }
}

impl Predictor for RegressionModel {
    fn predict(&self, input: &[f64]) -> Result<Vec<f64>, ModelError> {
        if input.len() != self.input_dim() {
            return Err(ModelError::ShapeMismatch {
                expected: self.input_dim(),
                actual: input.len(),
            });
        }
        Ok(vec![self.forward(input)])
    }
}

impl Trainable for RegressionModel {
    fn from_hyperparameters(params: &ParameterSet) -> Result<Self, ModelError> {
        let dim = params
            .get("input_dim")
            .copied()
            .unwrap_or(DEFAULT_INPUT_DIM as f64)
            .round();
        if !dim.is_finite() || dim < 1.0 {
            return Err(ModelError::InvalidHyperparameter {
                name: "input_dim".into(),
                value: dim,
            });
        }

        let decay = params.get("weight_decay").copied().unwrap_or(0.0);
        if !decay.is_finite() || decay < 0.0 {
            return Err(ModelError::InvalidHyperparameter {
                name: "weight_decay".into(),
                value: decay,
            });
        }

        Ok(Self::new(dim as usize).with_weight_decay(decay))
    }

    fn train_step(&mut self, data: &Dataset, learning_rate: f64) -> Result<f64, ModelError> {
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(ModelError::InvalidHyperparameter {
                name: "learning_rate".into(),
                value: learning_rate,
            });
        }
        if data.input_dim() != self.input_dim() {
            return Err(ModelError::ShapeMismatch {
                expected: self.input_dim(),
                actual: data.input_dim(),
            });
        }
        if data.target_dim() != 1 {
            return Err(ModelError::ShapeMismatch {
                expected: 1,
                actual: data.target_dim(),
            });
        }

        let n = data.len() as f64;
        let mut grad_w = vec![0.0; self.input_dim()];
        let mut grad_b = 0.0;
        let mut loss = 0.0;

        for (x, y) in data.iter() {
            let err = self.forward(x) - y[0];
            loss += err * err;
            for (g, xi) in grad_w.iter_mut().zip(x) {
                *g += 2.0 * err * xi / n;
            }
            grad_b += 2.0 * err / n;
        }
        loss /= n;

        if !loss.is_finite() {
            return Err(ModelError::Diverged(loss));
        }

        for (w, g) in self.weights.iter_mut().zip(&grad_w) {
            *w -= learning_rate * (g + 2.0 * self.weight_decay * *w);
        }
        self.bias -= learning_rate * grad_b;

        Ok(loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_data() -> Dataset {
        // y = 2x + 1
        let xs = [0.0, 1.0, 2.0, 3.0];
        Dataset::new(
            xs.iter().map(|&x| vec![x]).collect(),
            xs.iter().map(|&x| vec![2.0 * x + 1.0]).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_predict_checks_shape() {
        let model = RegressionModel::with_parameters(vec![1.0, 2.0], 0.5);
        assert_eq!(model.predict(&[1.0, 1.0]).unwrap(), vec![3.5]);
        assert!(matches!(
            model.predict(&[1.0]),
            Err(ModelError::ShapeMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_training_reduces_loss() {
        let data = line_data();
        let mut model = RegressionModel::new(1);
        let first = model.train_step(&data, 0.05).unwrap();
        let mut last = first;
        for _ in 0..200 {
            last = model.train_step(&data, 0.05).unwrap();
        }
        assert!(last < first);
        assert!((model.weights()[0] - 2.0).abs() < 0.1);
        assert!((model.bias() - 1.0).abs() < 0.2);
    }

    #[test]
    fn test_large_learning_rate_diverges() {
        let data = line_data();
        let mut model = RegressionModel::new(1);
        let mut result = Ok(0.0);
        for _ in 0..2000 {
            result = model.train_step(&data, 10.0);
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(result, Err(ModelError::Diverged(_))));
    }

    #[test]
    fn test_from_hyperparameters() {
        let model = RegressionModel::from_hyperparameters(&ParameterSet::new()).unwrap();
        assert_eq!(model.input_dim(), 4);

        let mut params = ParameterSet::new();
        params.insert("input_dim".into(), 2.6);
        assert_eq!(RegressionModel::from_hyperparameters(&params).unwrap().input_dim(), 3);

        params.insert("input_dim".into(), 0.2);
        assert!(RegressionModel::from_hyperparameters(&params).is_err());
    }
}
