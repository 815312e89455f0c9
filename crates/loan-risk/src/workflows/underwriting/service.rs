use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use super::access::{AccessGate, SessionContext};
use super::domain::{
    ApplicantRecord, ApplicantSubmission, Prediction, PredictionOutcome, RequestId,
};
use super::encoding::{
    CoordinateView, EncodingError, FeatureEncoder, FeatureSchema, FeatureVector, Scaler,
    SchemaError,
};
use super::intake::{IntakeGuard, IntakeViolation};
use super::model::{Classifier, LabelPolarity, ModelError};

/// Service composing intake, the feature encoder, the scaler and the classifier.
///
/// Every collaborator is injected; the only mutable state is the request sequence used for
/// identifiers, which starts at 1 for each service instance.
pub struct LoanDefaultService<M, S> {
    gate: Arc<AccessGate>,
    intake: IntakeGuard,
    encoder: Arc<FeatureEncoder>,
    scaler: Option<Arc<S>>,
    model: Arc<M>,
    polarity: LabelPolarity,
    requests: AtomicU64,
}

impl<M, S> LoanDefaultService<M, S>
where
    M: Classifier + 'static,
    S: Scaler + 'static,
{
    pub fn new(
        encoder: FeatureEncoder,
        model: Arc<M>,
        scaler: Option<Arc<S>>,
        polarity: LabelPolarity,
        gate: AccessGate,
    ) -> Self {
        Self::with_intake(IntakeGuard::default(), encoder, model, scaler, polarity, gate)
    }

    pub(crate) fn with_intake(
        intake: IntakeGuard,
        encoder: FeatureEncoder,
        model: Arc<M>,
        scaler: Option<Arc<S>>,
        polarity: LabelPolarity,
        gate: AccessGate,
    ) -> Self {
        Self {
            gate: Arc::new(gate),
            intake,
            encoder: Arc::new(encoder),
            scaler,
            model,
            polarity,
            requests: AtomicU64::new(1),
        }
    }

    fn next_request_id(&self) -> RequestId {
        let id = self.requests.fetch_add(1, Ordering::Relaxed);
        RequestId(format!("req-{id:06}"))
    }

    /// Check a presented access code and produce the request's session context.
    pub fn authorize(&self, access_code: Option<&str>) -> SessionContext {
        self.gate.check(access_code)
    }

    pub fn model_version(&self) -> &str {
        &self.encoder.schema().version
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.encoder.schema()
    }

    pub fn polarity(&self) -> LabelPolarity {
        self.polarity
    }

    /// Encoded (and scaled, when the artifact carries a scaler) model input for `record`.
    pub fn encode(
        &self,
        record: &ApplicantRecord,
    ) -> Result<FeatureVector, PredictionServiceError> {
        let vector = self.encoder.encode_scaled(record, self.scaler.as_deref())?;
        debug!(
            model_version = %self.model_version(),
            width = vector.len(),
            "applicant encoded"
        );
        Ok(vector)
    }

    /// Run the model on an already validated record.
    pub fn classify(
        &self,
        record: &ApplicantRecord,
    ) -> Result<Prediction, PredictionServiceError> {
        let vector = self.encode(record)?;
        let label = self.model.predict(&vector)?;
        Ok(self.polarity.interpret(label))
    }

    /// Full prediction cycle for one form submission.
    pub fn predict(
        &self,
        session: &SessionContext,
        submission: ApplicantSubmission,
    ) -> Result<PredictionOutcome, PredictionServiceError> {
        if !session.is_authenticated() {
            return Err(PredictionServiceError::Unauthorized);
        }

        let record = self.intake.record_from_submission(submission)?;
        let prediction = self.classify(&record)?;
        let outcome = PredictionOutcome {
            request_id: self.next_request_id(),
            client_name: record.client_name,
            prediction,
            model_version: self.model_version().to_string(),
            predicted_at: Utc::now(),
        };

        info!(
            request_id = %outcome.request_id.0,
            model_version = %outcome.model_version,
            prediction = outcome.prediction.label(),
            "prediction served"
        );

        Ok(outcome)
    }

    /// Coordinate table for the active schema, for the schema endpoint and the CLI.
    pub fn layout(&self) -> Result<SchemaLayout, SchemaError> {
        Ok(SchemaLayout {
            version: self.model_version().to_string(),
            width: self.encoder.width(),
            polarity: self.polarity,
            coordinates: self.schema().coordinates()?,
        })
    }
}

/// Flattened view of the schema a service is running with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaLayout {
    pub version: String,
    pub width: usize,
    pub polarity: LabelPolarity,
    pub coordinates: Vec<CoordinateView>,
}

/// Error raised by the prediction service.
#[derive(Debug, thiserror::Error)]
pub enum PredictionServiceError {
    #[error("access code missing or incorrect")]
    Unauthorized,
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Model(#[from] ModelError),
}
