//! Side-by-side model comparison.

use crate::EnsembleError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tuner_models::{mean_absolute_error, mean_squared_error, Model, ModelRegistry, Predictor};

/// One model's output and, when ground truth was given, its errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Raw prediction
    pub prediction: Vec<f64>,
    /// Mean squared error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mse: Option<f64>,
    /// Mean absolute error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mae: Option<f64>,
    /// Root mean squared error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rmse: Option<f64>,
}

/// Runs the same input through several named models.
pub struct ModelComparator<P> {
    models: BTreeMap<String, P>,
}

impl<P: Predictor> ModelComparator<P> {
    /// Create an empty comparator.
    pub fn new() -> Self {
        Self {
            models: BTreeMap::new(),
        }
    }

    /// Add a named model.
    pub fn add(mut self, name: impl Into<String>, model: P) -> Self {
        self.models.insert(name.into(), model);
        self
    }

    /// Predict with every model.
    ///
    /// Metrics are filled only for models whose output has the same length
    /// as `ground_truth`.
    pub fn compare(
        &self,
        input: &[f64],
        ground_truth: Option<&[f64]>,
    ) -> Result<BTreeMap<String, Comparison>, EnsembleError> {
        let mut results = BTreeMap::new();
        for (name, model) in &self.models {
            let prediction = model.predict(input)?;
            let mut comparison = Comparison {
                prediction,
                mse: None,
                mae: None,
                rmse: None,
            };

            if let Some(truth) = ground_truth {
                if truth.len() == comparison.prediction.len() && !truth.is_empty() {
                    let mse = mean_squared_error(&comparison.prediction, truth)?;
                    comparison.mse = Some(mse);
                    comparison.mae = Some(mean_absolute_error(&comparison.prediction, truth)?);
                    comparison.rmse = Some(mse.sqrt());
                }
            }

            results.insert(name.clone(), comparison);
        }
        Ok(results)
    }
}

impl<P: Predictor> Default for ModelComparator<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> ModelComparator<&'a Model> {
    /// Comparator over every registered model.
    pub fn from_registry(registry: &'a ModelRegistry) -> Result<Self, EnsembleError> {
        let mut comparator = Self::new();
        for name in registry.list() {
            comparator = comparator.add(name, registry.get(name)?);
        }
        Ok(comparator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuner_models::{RegressionModel, SegmentationModel};

    #[test]
    fn test_metrics_when_shapes_match() {
        let comparator = ModelComparator::new()
            .add("low", RegressionModel::with_parameters(vec![1.0], 0.0))
            .add("high", RegressionModel::with_parameters(vec![1.0], 2.0));

        let results = comparator.compare(&[1.0], Some(&[2.0][..])).unwrap();
        assert_eq!(results["low"].prediction, vec![1.0]);
        assert_eq!(results["low"].mse, Some(1.0));
        assert_eq!(results["high"].mae, Some(1.0));
        assert_eq!(results["high"].rmse, Some(1.0));

        let no_truth = comparator.compare(&[1.0], None).unwrap();
        assert_eq!(no_truth["low"].mse, None);
    }

    #[test]
    fn test_registry_comparison_skips_mismatched_metrics() {
        let mut registry = ModelRegistry::with_defaults();
        registry.register("mask", SegmentationModel::default()).unwrap();

        let comparator = ModelComparator::from_registry(&registry).unwrap();
        let results = comparator.compare(&[0.0; 4], Some(&[1.0][..])).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results["base"].mse, Some(1.0));
        assert_eq!(results["mask"].prediction, vec![0.5; 4]);
        assert_eq!(results["mask"].mse, None);

        let json = serde_json::to_value(&results).unwrap();
        assert!(json["mask"].get("mse").is_none());
    }
}
