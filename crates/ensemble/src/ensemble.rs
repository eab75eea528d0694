//! Ensemble predictor.

use crate::EnsembleError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use tuner_models::{Dataset, Model, ModelError, ModelRegistry, Predictor};

/// How member predictions are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnsembleMethod {
    /// Element-wise mean
    Average,
    /// Element-wise mean using the normalised member weights
    #[default]
    WeightedAverage,
    /// Element-wise majority vote over integer-truncated predictions
    Voting,
    /// Learned linear combination (see [`EnsemblePredictor::fit_stacking`])
    Stacking,
}

impl std::fmt::Display for EnsembleMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Average => write!(f, "average"),
            Self::WeightedAverage => write!(f, "weighted_average"),
            Self::Voting => write!(f, "voting"),
            Self::Stacking => write!(f, "stacking"),
        }
    }
}

/// Mean prediction with its spread across members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertainPrediction {
    /// Element-wise mean over members
    pub prediction: Vec<f64>,
    /// Element-wise sample standard deviation over members
    pub uncertainty: Vec<f64>,
}

/// Linear meta-learner over member outputs: one weight per member plus a bias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaLearner {
    /// Weight per member
    pub weights: Vec<f64>,
    /// Additive bias
    pub bias: f64,
}

impl MetaLearner {
    fn combine(&self, predictions: &[Vec<f64>]) -> Vec<f64> {
        let len = predictions[0].len();
        (0..len)
            .map(|j| {
                self.weights
                    .iter()
                    .zip(predictions)
                    .map(|(w, p)| w * p[j])
                    .sum::<f64>()
                    + self.bias
            })
            .collect()
    }
}

/// Combines several predictors into one.
pub struct EnsemblePredictor<P> {
    members: Vec<P>,
    weights: Vec<f64>,
    method: EnsembleMethod,
    meta: Option<MetaLearner>,
}

impl<P: Predictor> EnsemblePredictor<P> {
    /// Equal-weight ensemble using weighted averaging.
    pub fn new(members: Vec<P>) -> Result<Self, EnsembleError> {
        if members.is_empty() {
            return Err(EnsembleError::Empty);
        }
        let n = members.len();
        Ok(Self {
            members,
            weights: vec![1.0 / n as f64; n],
            method: EnsembleMethod::default(),
            meta: None,
        })
    }

    /// Replace the member weights. They are normalised to sum to one.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Result<Self, EnsembleError> {
        if weights.len() != self.members.len() {
            return Err(EnsembleError::WeightCountMismatch {
                models: self.members.len(),
                weights: weights.len(),
            });
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(EnsembleError::InvalidWeights(
                "weights must be finite and non-negative".into(),
            ));
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(EnsembleError::InvalidWeights("weights must not sum to zero".into()));
        }
        self.weights = weights.into_iter().map(|w| w / total).collect();
        Ok(self)
    }

    /// Set the combination method.
    pub fn with_method(mut self, method: EnsembleMethod) -> Self {
        self.method = method;
        self
    }

    /// Combination method in use.
    pub fn method(&self) -> EnsembleMethod {
        self.method
    }

    /// Normalised member weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false for a constructed ensemble.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Fitted stacking meta-learner, if any.
    pub fn meta_learner(&self) -> Option<&MetaLearner> {
        self.meta.as_ref()
    }

    /// Combined prediction for one input.
    pub fn predict(&self, input: &[f64]) -> Result<Vec<f64>, EnsembleError> {
        let predictions = self.member_predictions(input)?;
        match self.method {
            EnsembleMethod::Average => Ok(mean(&predictions)),
            EnsembleMethod::WeightedAverage => Ok(weighted_mean(&predictions, &self.weights)),
            EnsembleMethod::Voting => Ok(vote(&predictions)),
            EnsembleMethod::Stacking => {
                let meta = self.meta.as_ref().ok_or(EnsembleError::StackingNotFitted)?;
                Ok(meta.combine(&predictions))
            }
        }
    }

    /// Unweighted mean and sample standard deviation across members.
    ///
    /// A single-member ensemble reports zero uncertainty.
    pub fn predict_with_uncertainty(
        &self,
        input: &[f64],
    ) -> Result<UncertainPrediction, EnsembleError> {
        let predictions = self.member_predictions(input)?;
        let prediction = mean(&predictions);
        let n = predictions.len();

        let uncertainty = if n < 2 {
            vec![0.0; prediction.len()]
        } else {
            prediction
                .iter()
                .enumerate()
                .map(|(j, m)| {
                    let sum_sq: f64 = predictions.iter().map(|p| (p[j] - m).powi(2)).sum();
                    (sum_sq / (n - 1) as f64).sqrt()
                })
                .collect()
        };

        Ok(UncertainPrediction { prediction, uncertainty })
    }

    /// Fit the stacking meta-learner by full-batch gradient descent on MSE
    /// and switch the ensemble to [`EnsembleMethod::Stacking`].
    ///
    /// Starts from the current member weights and zero bias. Returns the
    /// final training loss.
    pub fn fit_stacking(
        &mut self,
        data: &Dataset,
        epochs: usize,
        learning_rate: f64,
    ) -> Result<f64, EnsembleError> {
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(ModelError::InvalidHyperparameter {
                name: "learning_rate".into(),
                value: learning_rate,
            }
            .into());
        }

        let mut samples = Vec::with_capacity(data.len());
        for (x, y) in data.iter() {
            let predictions = self.member_predictions(x)?;
            if predictions[0].len() != y.len() {
                return Err(EnsembleError::OutputMismatch {
                    expected: y.len(),
                    actual: predictions[0].len(),
                });
            }
            samples.push((predictions, y));
        }

        let mut meta = MetaLearner {
            weights: self.weights.clone(),
            bias: 0.0,
        };
        let count = (data.len() * data.target_dim()) as f64;
        let mut loss = stacking_loss(&meta, &samples, count);

        for _ in 0..epochs {
            let mut grad_w = vec![0.0; meta.weights.len()];
            let mut grad_b = 0.0;
            for (predictions, targets) in &samples {
                let out = meta.combine(predictions);
                for (j, (o, t)) in out.iter().zip(targets.iter()).enumerate() {
                    let err = 2.0 * (o - t) / count;
                    for (g, p) in grad_w.iter_mut().zip(predictions) {
                        *g += err * p[j];
                    }
                    grad_b += err;
                }
            }
            for (w, g) in meta.weights.iter_mut().zip(&grad_w) {
                *w -= learning_rate * g;
            }
            meta.bias -= learning_rate * grad_b;

            loss = stacking_loss(&meta, &samples, count);
            if !loss.is_finite() {
                return Err(ModelError::Diverged(loss).into());
            }
        }

        debug!(
            "Fitted stacking meta-learner over {} members, loss {:.6}",
            self.members.len(),
            loss
        );
        self.meta = Some(meta);
        self.method = EnsembleMethod::Stacking;
        Ok(loss)
    }

    fn member_predictions(&self, input: &[f64]) -> Result<Vec<Vec<f64>>, EnsembleError> {
        let mut predictions: Vec<Vec<f64>> = Vec::with_capacity(self.members.len());
        for member in &self.members {
            let pred = member.predict(input)?;
            if let Some(first) = predictions.first() {
                if first.len() != pred.len() {
                    return Err(EnsembleError::OutputMismatch {
                        expected: first.len(),
                        actual: pred.len(),
                    });
                }
            }
            predictions.push(pred);
        }
        Ok(predictions)
    }
}

impl<'a> EnsemblePredictor<&'a Model> {
    /// Ensemble over registered models. An empty `names` uses every model.
    pub fn from_registry(
        registry: &'a ModelRegistry,
        names: &[String],
    ) -> Result<Self, EnsembleError> {
        let members = if names.is_empty() {
            registry
                .list()
                .into_iter()
                .map(|name| registry.get(name))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            names
                .iter()
                .map(|name| registry.get(name))
                .collect::<Result<Vec<_>, _>>()?
        };
        Self::new(members)
    }
}

fn stacking_loss(meta: &MetaLearner, samples: &[(Vec<Vec<f64>>, &[f64])], count: f64) -> f64 {
    samples
        .iter()
        .map(|(predictions, targets)| {
            meta.combine(predictions)
                .iter()
                .zip(targets.iter())
                .map(|(o, t)| (o - t).powi(2))
                .sum::<f64>()
        })
        .sum::<f64>()
        / count
}

fn mean(predictions: &[Vec<f64>]) -> Vec<f64> {
    let n = predictions.len() as f64;
    (0..predictions[0].len())
        .map(|j| predictions.iter().map(|p| p[j]).sum::<f64>() / n)
        .collect()
}

fn weighted_mean(predictions: &[Vec<f64>], weights: &[f64]) -> Vec<f64> {
    (0..predictions[0].len())
        .map(|j| predictions.iter().zip(weights).map(|(p, w)| p[j] * w).sum())
        .collect()
}

fn vote(predictions: &[Vec<f64>]) -> Vec<f64> {
    (0..predictions[0].len())
        .map(|j| {
            let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
            for p in predictions {
                *counts.entry(p[j].trunc() as i64).or_default() += 1;
            }
            // ascending keys: the smallest value wins ties
            let mut winner = (0i64, 0usize);
            for (value, count) in counts {
                if count > winner.1 {
                    winner = (value, count);
                }
            }
            winner.0 as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuner_models::{RegressionModel, SegmentationModel};

    /// Predictor returning a fixed vector.
    struct Constant(Vec<f64>);

    impl Predictor for Constant {
        fn predict(&self, _input: &[f64]) -> Result<Vec<f64>, ModelError> {
            Ok(self.0.clone())
        }
    }

    fn constants(values: &[&[f64]]) -> Vec<Constant> {
        values.iter().map(|v| Constant(v.to_vec())).collect()
    }

    #[test]
    fn test_construction_errors() {
        let empty: Vec<Constant> = vec![];
        assert!(matches!(EnsemblePredictor::new(empty), Err(EnsembleError::Empty)));

        let two = EnsemblePredictor::new(constants(&[&[1.0], &[2.0]])).unwrap();
        assert!(matches!(
            two.with_weights(vec![1.0]),
            Err(EnsembleError::WeightCountMismatch { models: 2, weights: 1 })
        ));

        let two = EnsemblePredictor::new(constants(&[&[1.0], &[2.0]])).unwrap();
        assert!(matches!(two.with_weights(vec![0.0, 0.0]), Err(EnsembleError::InvalidWeights(_))));

        let two = EnsemblePredictor::new(constants(&[&[1.0], &[2.0]])).unwrap();
        assert!(matches!(two.with_weights(vec![-1.0, 2.0]), Err(EnsembleError::InvalidWeights(_))));
    }

    #[test]
    fn test_average_and_weighted_average() {
        let ensemble = EnsemblePredictor::new(constants(&[&[1.0, 10.0], &[3.0, 20.0]]))
            .unwrap()
            .with_method(EnsembleMethod::Average);
        assert_eq!(ensemble.predict(&[]).unwrap(), vec![2.0, 15.0]);

        let weighted = EnsemblePredictor::new(constants(&[&[1.0, 10.0], &[3.0, 20.0]]))
            .unwrap()
            .with_weights(vec![3.0, 1.0])
            .unwrap();
        assert_eq!(weighted.method(), EnsembleMethod::WeightedAverage);
        assert_eq!(weighted.weights(), &[0.75, 0.25]);
        assert_eq!(weighted.predict(&[]).unwrap(), vec![1.5, 12.5]);
    }

    #[test]
    fn test_voting_majority_and_ties() {
        let members = constants(&[&[1.9, 0.0], &[1.2, 5.0], &[3.0, 2.0], &[3.7, 7.0]]);
        let ensemble = EnsemblePredictor::new(members)
            .unwrap()
            .with_method(EnsembleMethod::Voting);
        // column 0 truncates to [1, 1, 3, 3]: tie, smallest wins
        // column 1 has no repeats: smallest wins
        assert_eq!(ensemble.predict(&[]).unwrap(), vec![1.0, 0.0]);

        let ensemble = EnsemblePredictor::new(constants(&[&[2.0], &[5.0], &[5.5]]))
            .unwrap()
            .with_method(EnsembleMethod::Voting);
        assert_eq!(ensemble.predict(&[]).unwrap(), vec![5.0]);
    }

    #[test]
    fn test_uncertainty() {
        let ensemble = EnsemblePredictor::new(constants(&[&[1.0], &[2.0], &[3.0]])).unwrap();
        let result = ensemble.predict_with_uncertainty(&[]).unwrap();
        assert_eq!(result.prediction, vec![2.0]);
        assert!((result.uncertainty[0] - 1.0).abs() < 1e-12);

        let single = EnsemblePredictor::new(constants(&[&[4.0]])).unwrap();
        assert_eq!(single.predict_with_uncertainty(&[]).unwrap().uncertainty, vec![0.0]);
    }

    #[test]
    fn test_mismatched_member_outputs() {
        let ensemble = EnsemblePredictor::new(constants(&[&[1.0], &[1.0, 2.0]])).unwrap();
        assert!(matches!(
            ensemble.predict(&[]),
            Err(EnsembleError::OutputMismatch { expected: 1, actual: 2 })
        ));
    }

    #[test]
    fn test_stacking_requires_fit() {
        let members = vec![
            RegressionModel::with_parameters(vec![1.0], 0.0),
            RegressionModel::with_parameters(vec![0.0], 1.0),
        ];
        let mut ensemble = EnsemblePredictor::new(members)
            .unwrap()
            .with_method(EnsembleMethod::Stacking);
        assert_eq!(ensemble.predict(&[2.0]), Err(EnsembleError::StackingNotFitted));

        // target = 2 * (member 0) + 3 * (member 1) = 2x + 3
        let xs: Vec<f64> = (0..6).map(|i| i as f64 * 0.5).collect();
        let data = Dataset::new(
            xs.iter().map(|&x| vec![x]).collect(),
            xs.iter().map(|&x| vec![2.0 * x + 3.0]).collect(),
        )
        .unwrap();

        let loss = ensemble.fit_stacking(&data, 2000, 0.05).unwrap();
        assert!(loss < 1e-3);
        assert_eq!(ensemble.method(), EnsembleMethod::Stacking);

        let pred = ensemble.predict(&[4.0]).unwrap();
        assert!((pred[0] - 11.0).abs() < 0.1);
    }

    #[test]
    fn test_from_registry() {
        let mut registry = ModelRegistry::with_defaults();
        registry
            .register("alt", RegressionModel::with_parameters(vec![1.0, 1.0, 1.0, 1.0], 0.0))
            .unwrap();
        registry.register("mask", SegmentationModel::default()).unwrap();

        let names = ["base".to_string(), "alt".to_string()];
        let ensemble = EnsemblePredictor::from_registry(&registry, &names).unwrap();
        assert_eq!(ensemble.len(), 2);
        assert_eq!(ensemble.predict(&[1.0, 1.0, 1.0, 1.0]).unwrap(), vec![2.0]);

        let missing = EnsemblePredictor::from_registry(&registry, &["nope".into()]);
        assert!(matches!(missing, Err(EnsembleError::Registry(_))));

        // every registered model; segmentation yields four outputs, regression one
        let all = EnsemblePredictor::from_registry(&registry, &[]).unwrap();
        assert_eq!(all.len(), 3);
        assert!(matches!(all.predict(&[0.0; 4]), Err(EnsembleError::OutputMismatch { .. })));
    }
}
