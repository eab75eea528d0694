//! Per-element logistic segmentation model.

use crate::{ModelError, Predictor};

/// Maps every input element to a foreground probability
/// `sigmoid(scale * x + bias)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationModel {
    scale: f64,
    bias: f64,
    threshold: f64,
}

impl SegmentationModel {
    /// Create a model with the given response curve and a 0.5 mask threshold.
    pub fn new(scale: f64, bias: f64) -> Self {
        Self {
            scale,
            bias,
            threshold: 0.5,
        }
    }

    /// Override the mask threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Binary mask: 1.0 where the probability reaches the threshold.
    pub fn predict_mask(&self, input: &[f64]) -> Result<Vec<f64>, ModelError> {
        Ok(self
            .predict(input)?
            .into_iter()
            .map(|p| if p >= self.threshold { 1.0 } else { 0.0 })
            .collect())
    }
}

impl Default for SegmentationModel {
    fn default() -> Self {
        Self::new(1.0, 0.0)
    }
}

impl Predictor for SegmentationModel {
    fn predict(&self, input: &[f64]) -> Result<Vec<f64>, ModelError> {
        if input.is_empty() {
            return Err(ModelError::EmptyInput);
        }
        Ok(input
            .iter()
            .map(|&x| 1.0 / (1.0 + (-(self.scale * x + self.bias)).exp()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probabilities_and_mask() {
        let model = SegmentationModel::new(4.0, -2.0);
        let probs = model.predict(&[0.0, 0.5, 1.0]).unwrap();
        assert!(probs[0] < 0.5);
        assert!((probs[1] - 0.5).abs() < 1e-12);
        assert!(probs[2] > 0.5);

        assert_eq!(model.predict_mask(&[0.0, 0.5, 1.0]).unwrap(), vec![0.0, 1.0, 1.0]);
        assert_eq!(model.predict(&[]), Err(ModelError::EmptyInput));
    }
}
