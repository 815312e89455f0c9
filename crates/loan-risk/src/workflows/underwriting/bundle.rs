use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::access::AccessGate;
use super::encoding::{
    FeatureEncoder, FeatureSchema, SchemaError, SchemaVariant, StandardScaler,
};
use super::model::{LabelPolarity, LogisticModel};
use super::service::LoanDefaultService;

/// Model artifact bundle: the schema, scaler, model and polarity that were trained together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub schema: FeatureSchema,
    pub polarity: LabelPolarity,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    pub model: LogisticModel,
}

/// Artifact loading failures. Without a usable bundle no prediction is meaningful.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("unable to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("model artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model artifact schema is invalid: {0}")]
    Schema(#[from] SchemaError),
    #[error("model has {found} coefficients but schema `{version}` encodes {expected} features")]
    CoefficientCount {
        version: String,
        expected: usize,
        found: usize,
    },
    #[error("schema scales {expected} coordinates but the scaler was fitted on {found}")]
    ScalerWidth { expected: usize, found: usize },
    #[error("scaler mean has {mean} entries but scale has {scale}")]
    ScalerParameters { mean: usize, scale: usize },
    #[error("schema lists scaled coordinates but the artifact has no scaler")]
    MissingScaler,
    #[error("artifact `{version}` reads label {found} as default; that revision uses {expected}")]
    PolarityMismatch {
        version: String,
        expected: u8,
        found: u8,
    },
}

impl ModelBundle {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bundle = Self::from_json(&raw)?;
        debug!(path = %path.display(), version = %bundle.version(), "model artifact loaded");
        Ok(bundle)
    }

    pub fn from_json(raw: &str) -> Result<Self, ArtifactError> {
        let bundle: ModelBundle = serde_json::from_str(raw)?;
        bundle.validate()?;
        Ok(bundle)
    }

    pub fn version(&self) -> &str {
        &self.schema.version
    }

    /// Structural checks. Artifacts labelled with a built-in revision must also carry that
    /// revision's polarity; beyond that, whether the coordinates mean what the model learned is
    /// not knowable from the artifact.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        self.schema.validate()?;

        if let Some(variant) = SchemaVariant::from_label(&self.schema.version) {
            let expected = variant.polarity();
            if self.polarity != expected {
                return Err(ArtifactError::PolarityMismatch {
                    version: self.schema.version.clone(),
                    expected: expected.default_label.into(),
                    found: self.polarity.default_label.into(),
                });
            }
        }

        let width = self.schema.width()?;
        if self.model.width() != width {
            return Err(ArtifactError::CoefficientCount {
                version: self.schema.version.clone(),
                expected: width,
                found: self.model.width(),
            });
        }

        match &self.scaler {
            Some(scaler) => {
                if scaler.mean.len() != scaler.scale.len() {
                    return Err(ArtifactError::ScalerParameters {
                        mean: scaler.mean.len(),
                        scale: scaler.scale.len(),
                    });
                }
                if scaler.width() != self.schema.scaled_indices.len() {
                    return Err(ArtifactError::ScalerWidth {
                        expected: self.schema.scaled_indices.len(),
                        found: scaler.width(),
                    });
                }
            }
            None if !self.schema.scaled_indices.is_empty() => {
                return Err(ArtifactError::MissingScaler)
            }
            None => {}
        }

        Ok(())
    }

    pub fn into_service(
        self,
        gate: AccessGate,
    ) -> Result<LoanDefaultService<LogisticModel, StandardScaler>, ArtifactError> {
        self.validate()?;
        let encoder = FeatureEncoder::new(self.schema)?;
        Ok(LoanDefaultService::new(
            encoder,
            Arc::new(self.model),
            self.scaler.map(Arc::new),
            self.polarity,
            gate,
        ))
    }
}
