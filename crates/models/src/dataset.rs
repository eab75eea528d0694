//! In-memory supervised datasets and error metrics.

use crate::{ModelError, Predictor};

/// Rectangular input/target rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    inputs: Vec<Vec<f64>>,
    targets: Vec<Vec<f64>>,
}

impl Dataset {
    /// Build a dataset, checking that every row has the same width.
    pub fn new(inputs: Vec<Vec<f64>>, targets: Vec<Vec<f64>>) -> Result<Self, ModelError> {
        if inputs.is_empty() {
            return Err(ModelError::InvalidDataset("no samples".into()));
        }
        if inputs.len() != targets.len() {
            return Err(ModelError::InvalidDataset(format!(
                "{} inputs but {} targets",
                inputs.len(),
                targets.len()
            )));
        }

        let in_dim = inputs[0].len();
        let out_dim = targets[0].len();
        if in_dim == 0 || out_dim == 0 {
            return Err(ModelError::InvalidDataset("zero-width rows".into()));
        }
        if inputs.iter().any(|r| r.len() != in_dim) || targets.iter().any(|r| r.len() != out_dim) {
            return Err(ModelError::InvalidDataset("ragged rows".into()));
        }

        Ok(Self { inputs, targets })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Always false for a constructed dataset.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Width of an input row.
    pub fn input_dim(&self) -> usize {
        self.inputs[0].len()
    }

    /// Width of a target row.
    pub fn target_dim(&self) -> usize {
        self.targets[0].len()
    }

    /// Input rows.
    pub fn inputs(&self) -> &[Vec<f64>] {
        &self.inputs
    }

    /// Target rows.
    pub fn targets(&self) -> &[Vec<f64>] {
        &self.targets
    }

    /// Iterate over `(input, target)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&[f64], &[f64])> + '_ {
        self.inputs
            .iter()
            .zip(&self.targets)
            .map(|(x, y)| (x.as_slice(), y.as_slice()))
    }

    /// Mean squared error of a predictor over every target element.
    pub fn mse<P: Predictor + ?Sized>(&self, model: &P) -> Result<f64, ModelError> {
        let mut total = 0.0;
        let mut count = 0usize;
        for (x, y) in self.iter() {
            let pred = model.predict(x)?;
            if pred.len() != y.len() {
                return Err(ModelError::ShapeMismatch {
                    expected: y.len(),
                    actual: pred.len(),
                });
            }
            total += pred.iter().zip(y).map(|(p, t)| (p - t).powi(2)).sum::<f64>();
            count += y.len();
        }
        Ok(total / count as f64)
    }
}

/// Mean squared error between equally sized slices.
pub fn mean_squared_error(pred: &[f64], truth: &[f64]) -> Result<f64, ModelError> {
    check_pair(pred, truth)?;
    Ok(pred.iter().zip(truth).map(|(p, t)| (p - t).powi(2)).sum::<f64>() / pred.len() as f64)
}

/// Mean absolute error between equally sized slices.
pub fn mean_absolute_error(pred: &[f64], truth: &[f64]) -> Result<f64, ModelError> {
    check_pair(pred, truth)?;
    Ok(pred.iter().zip(truth).map(|(p, t)| (p - t).abs()).sum::<f64>() / pred.len() as f64)
}

fn check_pair(pred: &[f64], truth: &[f64]) -> Result<(), ModelError> {
    if pred.len() != truth.len() {
        return Err(ModelError::ShapeMismatch {
            expected: truth.len(),
            actual: pred.len(),
        });
    }
    if pred.is_empty() {
        return Err(ModelError::EmptyInput);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(Dataset::new(vec![], vec![]).is_err());
        assert!(Dataset::new(vec![vec![1.0]], vec![]).is_err());
        assert!(Dataset::new(vec![vec![1.0], vec![1.0, 2.0]], vec![vec![0.0], vec![0.0]]).is_err());

        let ds = Dataset::new(vec![vec![1.0, 2.0]], vec![vec![3.0]]).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.input_dim(), 2);
        assert_eq!(ds.target_dim(), 1);
    }

    #[test]
    fn test_metrics() {
        assert_eq!(mean_squared_error(&[1.0, 3.0], &[0.0, 1.0]).unwrap(), 2.5);
        assert_eq!(mean_absolute_error(&[1.0, 3.0], &[0.0, 1.0]).unwrap(), 1.5);
        assert!(mean_squared_error(&[1.0], &[1.0, 2.0]).is_err());
        assert_eq!(mean_absolute_error(&[], &[]), Err(ModelError::EmptyInput));
    }
}
