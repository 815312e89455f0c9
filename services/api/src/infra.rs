use loan_risk::config::AppConfig;
use loan_risk::error::AppError;
use loan_risk::workflows::underwriting::{
    AccessGate, LoanDefaultService, LogisticModel, ModelBundle, SchemaVariant, StandardScaler,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

/// Service shape hydrated from a JSON model artifact.
pub(crate) type ArtifactService = LoanDefaultService<LogisticModel, StandardScaler>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load the model artifact (flag override first, then configuration) and build the service
/// behind the configured access code.
pub(crate) fn load_service(
    config: &AppConfig,
    artifact: Option<PathBuf>,
) -> Result<ArtifactService, AppError> {
    let path = artifact.unwrap_or_else(|| config.model.artifact_path.clone());
    let bundle = ModelBundle::load(&path)?;
    info!(
        path = %path.display(),
        model_version = %bundle.version(),
        polarity = ?bundle.polarity.default_label,
        "model artifact ready"
    );

    if config.access.is_default {
        warn!("APP_ACCESS_CODE is not set; the default access code is in use");
    }

    let service = bundle.into_service(AccessGate::new(config.access.code.clone()))?;
    Ok(service)
}

pub(crate) fn parse_variant(raw: &str) -> Result<SchemaVariant, String> {
    SchemaVariant::from_label(raw).ok_or_else(|| {
        let known: Vec<&str> = SchemaVariant::ALL
            .iter()
            .map(|variant| variant.label())
            .collect();
        format!("unknown schema variant '{raw}' (expected one of {})", known.join(", "))
    })
}
