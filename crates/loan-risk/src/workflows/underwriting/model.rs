use serde::{Deserialize, Serialize};

use super::domain::Prediction;
use super::encoding::FeatureVector;

/// Binary classifier consumed as a black box.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<ModelLabel, ModelError>;
}

/// Errors raised by a classifier when it cannot score a vector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("model expects {expected} features, received {found}")]
    FeatureCount { expected: usize, found: usize },
}

/// Raw class emitted by the model, before any business meaning is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ModelLabel {
    Zero,
    One,
}

impl From<ModelLabel> for u8 {
    fn from(label: ModelLabel) -> Self {
        match label {
            ModelLabel::Zero => 0,
            ModelLabel::One => 1,
        }
    }
}

impl TryFrom<u8> for ModelLabel {
    type Error = InvalidLabel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ModelLabel::Zero),
            1 => Ok(ModelLabel::One),
            other => Err(InvalidLabel(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("model labels are 0 or 1, found {0}")]
pub struct InvalidLabel(pub u8);

/// Which raw label a given model artifact uses for "will default".
///
/// Revisions disagree on this, so it is stored next to every artifact and never guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelPolarity {
    pub default_label: ModelLabel,
}

impl LabelPolarity {
    pub const ONE_MEANS_DEFAULT: LabelPolarity = LabelPolarity {
        default_label: ModelLabel::One,
    };
    pub const ZERO_MEANS_DEFAULT: LabelPolarity = LabelPolarity {
        default_label: ModelLabel::Zero,
    };

    pub fn interpret(&self, label: ModelLabel) -> Prediction {
        if label == self.default_label {
            Prediction::WillDefault
        } else {
            Prediction::WillNotDefault
        }
    }
}

pub const DEFAULT_THRESHOLD: f64 = 0.5;

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// Linear model with a logistic link, as exported from the training notebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LogisticModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn width(&self) -> usize {
        self.coefficients.len()
    }

    pub fn decision_score(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        if features.len() != self.coefficients.len() {
            return Err(ModelError::FeatureCount {
                expected: self.coefficients.len(),
                found: features.len(),
            });
        }

        Ok(self
            .coefficients
            .iter()
            .zip(features.values())
            .map(|(weight, value)| weight * value)
            .sum::<f64>()
            + self.intercept)
    }

    /// Probability of label one.
    pub fn probability(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let score = self.decision_score(features)?;
        Ok(1.0 / (1.0 + (-score).exp()))
    }
}

impl Classifier for LogisticModel {
    fn predict(&self, features: &FeatureVector) -> Result<ModelLabel, ModelError> {
        let probability = self.probability(features)?;
        Ok(if probability >= self.threshold {
            ModelLabel::One
        } else {
            ModelLabel::Zero
        })
    }
}
