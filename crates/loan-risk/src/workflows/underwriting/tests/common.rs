use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::underwriting::access::AccessGate;
use crate::workflows::underwriting::bundle::ModelBundle;
use crate::workflows::underwriting::domain::{
    ApplicantRecord, ApplicantSubmission, HomeOwnership, LoanPurpose, YesNo,
};
use crate::workflows::underwriting::encoding::{
    FeatureEncoder, FeatureVector, Scaler, ScalingError, SchemaVariant, StandardScaler,
};
use crate::workflows::underwriting::model::{Classifier, LogisticModel, ModelError, ModelLabel};
use crate::workflows::underwriting::service::LoanDefaultService;

pub(super) const ACCESS_CODE: &str = "branch-7";

/// Applicant used throughout the encoding scenarios.
pub(super) fn record() -> ApplicantRecord {
    ApplicantRecord {
        client_name: "Ama Mensah".to_string(),
        age: Some(30),
        annual_income: Some(50_000.0),
        employment_duration_years: Some(5),
        loan_amount: Some(10_000.0),
        interest_rate: Some(7.5),
        credit_history_length: Some(3.0),
        prior_default: Some(false),
        home_ownership: Some(HomeOwnership::Rent),
        loan_purpose: Some(LoanPurpose::Education),
    }
}

/// The same applicant as the form would post it.
pub(super) fn submission() -> ApplicantSubmission {
    ApplicantSubmission {
        client_name: Some("  Ama Mensah ".to_string()),
        age: Some(30),
        annual_income: Some(50_000.0),
        employment_duration_years: Some(5),
        loan_amount: Some(10_000.0),
        interest_rate: Some(7.5),
        credit_history_length: Some(3.0),
        prior_default: Some(YesNo::Text("No".to_string())),
        home_ownership: Some("Rent".to_string()),
        loan_purpose: Some("Education".to_string()),
    }
}

/// Scaler centred on [`record`], so its numeric coordinates scale to zero.
pub(super) fn one_hot_scaler() -> StandardScaler {
    StandardScaler::new(
        vec![30.0, 50_000.0, 5.0, 10_000.0, 7.5, 3.0],
        vec![10.0, 25_000.0, 5.0, 5_000.0, 2.5, 3.0],
    )
    .expect("scaler parameters align")
}

/// One-hot bundle whose only signal is the RENT indicator (coordinate 8).
pub(super) fn one_hot_bundle() -> ModelBundle {
    let mut coefficients = vec![0.0; 14];
    coefficients[8] = 5.0;
    ModelBundle {
        schema: SchemaVariant::OneHotV2.schema(),
        polarity: SchemaVariant::OneHotV2.polarity(),
        scaler: Some(one_hot_scaler()),
        model: LogisticModel::new(coefficients, -2.5),
    }
}

/// Ordinal bundle whose only signal is the prior default flag (coordinate 8).
pub(super) fn ordinal_bundle() -> ModelBundle {
    let mut coefficients = vec![0.0; 9];
    coefficients[8] = 4.0;
    ModelBundle {
        schema: SchemaVariant::OrdinalV1.schema(),
        polarity: SchemaVariant::OrdinalV1.polarity(),
        scaler: Some(
            StandardScaler::new(
                vec![50_000.0, 10_000.0, 7.5, 3.0],
                vec![25_000.0, 5_000.0, 2.5, 1.5],
            )
            .expect("scaler parameters align"),
        ),
        model: LogisticModel::new(coefficients, -2.0),
    }
}

pub(super) fn gate() -> AccessGate {
    AccessGate::new(ACCESS_CODE)
}

pub(super) fn build_service(
    bundle: ModelBundle,
) -> LoanDefaultService<LogisticModel, StandardScaler> {
    bundle.into_service(gate()).expect("bundle is consistent")
}

/// Classifier that records every vector it sees and answers with a fixed label.
#[derive(Default)]
pub(super) struct RecordingClassifier {
    pub(super) seen: Mutex<Vec<Vec<f64>>>,
    pub(super) answer: Option<ModelLabel>,
}

impl RecordingClassifier {
    pub(super) fn answering(label: ModelLabel) -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            answer: Some(label),
        }
    }

    pub(super) fn vectors(&self) -> Vec<Vec<f64>> {
        self.seen.lock().expect("classifier mutex poisoned").clone()
    }
}

impl Classifier for RecordingClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<ModelLabel, ModelError> {
        self.seen
            .lock()
            .expect("classifier mutex poisoned")
            .push(features.values().to_vec());
        Ok(self.answer.unwrap_or(ModelLabel::Zero))
    }
}

/// Scaler that drops its last output value.
pub(super) struct TruncatingScaler;

impl Scaler for TruncatingScaler {
    fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ScalingError> {
        let mut output = values.to_vec();
        output.pop();
        Ok(output)
    }
}

pub(super) fn recording_service<S: Scaler + 'static>(
    variant: SchemaVariant,
    scaler: Option<S>,
    classifier: Arc<RecordingClassifier>,
) -> LoanDefaultService<RecordingClassifier, S> {
    LoanDefaultService::new(
        FeatureEncoder::new(variant.schema()).expect("built-in schema is valid"),
        classifier,
        scaler.map(Arc::new),
        variant.polarity(),
        gate(),
    )
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
