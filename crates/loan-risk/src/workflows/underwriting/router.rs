use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::domain::ApplicantSubmission;
use super::encoding::{EncodingError, Scaler};
use super::model::Classifier;
use super::service::{LoanDefaultService, PredictionServiceError};

/// Header carrying the shared access code on prediction requests.
pub const ACCESS_CODE_HEADER: &str = "x-access-code";

/// Router builder exposing the login check, prediction and schema endpoints.
pub fn prediction_router<M, S>(service: Arc<LoanDefaultService<M, S>>) -> Router
where
    M: Classifier + 'static,
    S: Scaler + 'static,
{
    Router::new()
        .route("/api/v1/session", post(session_handler::<M, S>))
        .route("/api/v1/predictions", post(predict_handler::<M, S>))
        .route("/api/v1/schema", get(schema_handler::<M, S>))
        .with_state(service)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    pub access_code: String,
}

pub(crate) async fn session_handler<M, S>(
    State(service): State<Arc<LoanDefaultService<M, S>>>,
    axum::Json(request): axum::Json<SessionRequest>,
) -> Response
where
    M: Classifier + 'static,
    S: Scaler + 'static,
{
    if service
        .authorize(Some(&request.access_code))
        .is_authenticated()
    {
        (StatusCode::OK, axum::Json(json!({ "authenticated": true }))).into_response()
    } else {
        let payload = json!({
            "authenticated": false,
            "error": "incorrect access code",
        });
        (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
    }
}

pub(crate) async fn predict_handler<M, S>(
    State(service): State<Arc<LoanDefaultService<M, S>>>,
    headers: HeaderMap,
    axum::Json(submission): axum::Json<ApplicantSubmission>,
) -> Response
where
    M: Classifier + 'static,
    S: Scaler + 'static,
{
    let access_code = headers
        .get(ACCESS_CODE_HEADER)
        .and_then(|value| value.to_str().ok());
    let session = service.authorize(access_code);

    match service.predict(&session, submission) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome.view())).into_response(),
        Err(error) => {
            let status = status_for(&error);
            if status.is_server_error() {
                warn!(%error, "prediction failed");
            }
            let payload = json!({
                "error": error.to_string(),
            });
            (status, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn schema_handler<M, S>(
    State(service): State<Arc<LoanDefaultService<M, S>>>,
) -> Response
where
    M: Classifier + 'static,
    S: Scaler + 'static,
{
    match service.layout() {
        Ok(layout) => (StatusCode::OK, axum::Json(layout)).into_response(),
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

/// HTTP status for a failed prediction request.
pub fn status_for(error: &PredictionServiceError) -> StatusCode {
    match error {
        PredictionServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
        PredictionServiceError::Intake(_)
        | PredictionServiceError::Encoding(EncodingError::Schema(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PredictionServiceError::Encoding(EncodingError::Scaling(_))
        | PredictionServiceError::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
