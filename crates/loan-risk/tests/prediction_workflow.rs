//! Integration specifications for the applicant prediction workflow.
//!
//! Scenarios load the demo artifacts shipped with the repository and drive them through the
//! public service facade, batch scorer and HTTP router.

mod common {
    use loan_risk::workflows::underwriting::{
        AccessGate, ApplicantSubmission, LoanDefaultService, LogisticModel, ModelBundle,
        StandardScaler, YesNo,
    };

    pub(super) const ACCESS_CODE: &str = "front-desk";

    pub(super) const ONE_HOT_ARTIFACT: &str =
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../artifacts/one_hot_v2.json");
    pub(super) const ORDINAL_ARTIFACT: &str =
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../artifacts/ordinal_v1.json");

    pub(super) fn load(path: &str) -> ModelBundle {
        ModelBundle::load(path).expect("demo artifact loads")
    }

    pub(super) fn build_service(path: &str) -> LoanDefaultService<LogisticModel, StandardScaler> {
        load(path)
            .into_service(AccessGate::new(ACCESS_CODE))
            .expect("demo artifact is consistent")
    }

    /// Salaried renter with a modest loan at a low rate.
    pub(super) fn steady_applicant() -> ApplicantSubmission {
        ApplicantSubmission {
            client_name: Some("Ama Mensah".to_string()),
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

    /// Thin file, large loan, high rate and a prior default.
    pub(super) fn stretched_applicant() -> ApplicantSubmission {
        ApplicantSubmission {
            client_name: Some("Yaw Owusu".to_string()),
            age: Some(22),
            annual_income: Some(12_000.0),
            employment_duration_years: Some(0),
            loan_amount: Some(25_000.0),
            interest_rate: Some(22.0),
            credit_history_length: Some(1.0),
            prior_default: Some(YesNo::Flag(true)),
            home_ownership: Some("Rent".to_string()),
            loan_purpose: Some("Education".to_string()),
        }
    }
}

mod artifacts {
    use super::common::*;
    use loan_risk::workflows::underwriting::SchemaVariant;

    #[test]
    fn shipped_artifacts_match_built_in_layouts() {
        for (path, variant) in [
            (ONE_HOT_ARTIFACT, SchemaVariant::OneHotV2),
            (ORDINAL_ARTIFACT, SchemaVariant::OrdinalV1),
        ] {
            let bundle = load(path);
            assert_eq!(bundle.schema, variant.schema());
            assert_eq!(bundle.polarity, variant.polarity());
            assert!(bundle.validate().is_ok());
        }
    }
}

mod predictions {
    use super::common::*;
    use loan_risk::workflows::underwriting::{Prediction, PredictionServiceError, SessionContext};

    #[test]
    fn both_revisions_agree_on_clear_cases() {
        for path in [ONE_HOT_ARTIFACT, ORDINAL_ARTIFACT] {
            let service = build_service(path);
            let session = service.authorize(Some(ACCESS_CODE));

            let steady = service
                .predict(&session, steady_applicant())
                .expect("prediction succeeds");
            assert_eq!(steady.prediction, Prediction::WillNotDefault, "{path}");

            let stretched = service
                .predict(&session, stretched_applicant())
                .expect("prediction succeeds");
            assert_eq!(stretched.prediction, Prediction::WillDefault, "{path}");
            assert_eq!(
                stretched.summary(),
                "The model predicts that Yaw Owusu will default."
            );
        }
    }

    #[test]
    fn ordinal_revision_cannot_score_unlisted_purposes() {
        let service = build_service(ORDINAL_ARTIFACT);
        let session = service.authorize(Some(ACCESS_CODE));
        let mut applicant = steady_applicant();
        applicant.loan_purpose = Some("Medical".to_string());

        let error = service
            .predict(&session, applicant.clone())
            .expect_err("no ordinal level for MEDICAL");
        assert!(matches!(error, PredictionServiceError::Encoding(_)));

        let service = build_service(ONE_HOT_ARTIFACT);
        let session = service.authorize(Some(ACCESS_CODE));
        assert!(service.predict(&session, applicant).is_ok());
    }

    #[test]
    fn anonymous_session_is_refused() {
        let service = build_service(ONE_HOT_ARTIFACT);

        let error = service
            .predict(&SessionContext::anonymous(), steady_applicant())
            .expect_err("locked out");

        assert!(matches!(error, PredictionServiceError::Unauthorized));
    }
}

mod batch {
    use super::common::*;
    use loan_risk::workflows::underwriting::{score_csv, BatchSummary};

    #[test]
    fn csv_export_is_scored_row_by_row() {
        let service = build_service(ONE_HOT_ARTIFACT);
        let session = service.authorize(Some(ACCESS_CODE));
        let export = "\
client_name,age,annual_income,employment_duration_years,loan_amount,interest_rate,credit_history_length,prior_default,home_ownership,loan_purpose
Ama Mensah,30,50000,5,10000,7.5,3,No,Rent,Education
Yaw Owusu,22,12000,0,25000,22,1,Yes,Rent,Medical
Abena Ofori,29,41000,3,6000,9.5,4,No,Castle,Personal
";
        let mut output = Vec::new();

        let summary =
            score_csv(&service, &session, export.as_bytes(), &mut output).expect("batch runs");

        assert_eq!(
            summary,
            BatchSummary {
                scored: 2,
                failed: 1
            }
        );
        let written = String::from_utf8(output).expect("utf8 output");
        assert!(written.contains("Ama Mensah,will_not_default"));
        assert!(written.contains("Yaw Owusu,will_default"));
        assert!(written.contains("Castle"));
    }
}

mod routing {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use loan_risk::workflows::underwriting::{prediction_router, ACCESS_CODE_HEADER};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn build_router() -> axum::Router {
        prediction_router(Arc::new(build_service(ONE_HOT_ARTIFACT)))
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), 16 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    #[tokio::test]
    async fn post_predictions_returns_outcome() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/predictions")
            .header("content-type", "application/json")
            .header(ACCESS_CODE_HEADER, ACCESS_CODE)
            .body(Body::from(
                json!({
                    "client_name": "Yaw Owusu",
                    "age": 22,
                    "annual_income": 12000,
                    "employment_duration": 0,
                    "loan_applied": 25000,
                    "rate": 22,
                    "credit_history": 1,
                    "default": true,
                    "home_ownership": "Rent",
                    "loan_purpose": "Education"
                })
                .to_string(),
            ))
            .expect("request");

        let response = build_router()
            .oneshot(request)
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["prediction"], "WILL_DEFAULT");
        assert_eq!(body["model_version"], "one-hot-v2");
    }

    #[tokio::test]
    async fn get_schema_reports_active_layout() {
        let response = build_router()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/schema")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["width"], 14);
        assert_eq!(body["polarity"]["default_label"], 0);
        assert_eq!(body["coordinates"][13]["name"], "loan_purpose=VENTURE");
    }
}
