//! Loan applicant intake, feature encoding and default prediction.
//!
//! A submission flows through [`IntakeGuard`] into an [`ApplicantRecord`], the
//! [`FeatureEncoder`] lays it out in the order the paired model was trained on, an optional
//! scaler standardizes the numeric coordinates, and the classifier's raw label is read through
//! the artifact's [`LabelPolarity`].

pub mod access;
pub mod batch;
pub mod bundle;
pub mod domain;
pub mod encoding;
pub(crate) mod intake;
pub mod model;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use access::{AccessGate, SessionContext, DEFAULT_ACCESS_CODE};
pub use batch::{score_csv, BatchError, BatchSummary};
pub use bundle::{ArtifactError, ModelBundle};
pub use domain::{
    ApplicantRecord, ApplicantSubmission, FieldName, FieldValue, HomeOwnership, LoanPurpose,
    Prediction, PredictionOutcome, PredictionView, RequestId, ValueKind, YesNo,
};
pub use encoding::{
    apply_scaling, build_vector, derive_ratio, encode_categorical, BaselinePolicy,
    CoordinateKind, EncodingError, FeatureEncoder, FeatureEntry, FeatureRule, FeatureSchema,
    FeatureVector, OrdinalLevel, Scaler, ScalingError, SchemaError, SchemaVariant,
    StandardScaler,
};
pub use intake::{IntakeGuard, IntakeViolation};
pub use model::{Classifier, LabelPolarity, LogisticModel, ModelError, ModelLabel};
pub use router::{prediction_router, ACCESS_CODE_HEADER};
pub use service::{LoanDefaultService, PredictionServiceError, SchemaLayout};
