use serde::{Deserialize, Serialize};

/// Fitted transform over the numeric subset of a feature vector.
pub trait Scaler: Send + Sync {
    fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ScalingError>;
}

/// Raised when a scaler cannot accept the subset it was handed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScalingError {
    #[error("scaler was fitted on {expected} features, received {found}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("scaler returned {found} values for {expected} inputs")]
    OutputLength { expected: usize, found: usize },
}

/// Standardization with per-feature mean and scale: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ScalingError> {
        if mean.len() != scale.len() {
            return Err(ScalingError::ShapeMismatch {
                expected: mean.len(),
                found: scale.len(),
            });
        }
        Ok(Self { mean, scale })
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ScalingError> {
        if values.len() != self.mean.len() || values.len() != self.scale.len() {
            return Err(ScalingError::ShapeMismatch {
                expected: self.mean.len(),
                found: values.len(),
            });
        }

        Ok(values
            .iter()
            .zip(&self.mean)
            .zip(&self.scale)
            .map(|((value, mean), scale)| {
                // constant columns are fitted with a zero scale; leave them centred only
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (value - mean) / scale
            })
            .collect())
    }
}
