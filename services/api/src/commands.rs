use crate::infra::{load_service, parse_variant};
use clap::Args;
use loan_risk::config::AppConfig;
use loan_risk::error::AppError;
use loan_risk::telemetry::{self, LogTarget};
use loan_risk::workflows::underwriting::{
    score_csv, ApplicantSubmission, ArtifactError, SchemaLayout, SchemaVariant, YesNo,
};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct PredictArgs {
    /// Client name shown in the prediction sentence
    #[arg(long)]
    pub(crate) client_name: Option<String>,
    #[arg(long)]
    pub(crate) age: Option<i64>,
    #[arg(long)]
    pub(crate) annual_income: Option<f64>,
    /// Employment duration in whole years
    #[arg(long)]
    pub(crate) employment_duration: Option<i64>,
    #[arg(long)]
    pub(crate) loan_amount: Option<f64>,
    /// Interest rate in percent
    #[arg(long)]
    pub(crate) interest_rate: Option<f64>,
    /// Credit history length in years
    #[arg(long)]
    pub(crate) credit_history: Option<f64>,
    /// Whether the applicant defaulted before (yes/no)
    #[arg(long)]
    pub(crate) prior_default: Option<String>,
    /// RENT, OWN, MORTGAGE or OTHER
    #[arg(long)]
    pub(crate) home_ownership: Option<String>,
    /// PERSONAL, EDUCATION, VENTURE, HOMEIMPROVEMENT, MEDICAL or DEBTCONSOLIDATION
    #[arg(long)]
    pub(crate) loan_purpose: Option<String>,
    /// Shared access code for the prediction form
    #[arg(long)]
    pub(crate) access_code: Option<String>,
    /// Model artifact to load (defaults to APP_MODEL_ARTIFACT)
    #[arg(long)]
    pub(crate) artifact: Option<PathBuf>,
    /// Print the full outcome as JSON instead of the summary sentence
    #[arg(long)]
    pub(crate) json: bool,
}

impl PredictArgs {
    pub(crate) fn submission(&self) -> ApplicantSubmission {
        ApplicantSubmission {
            client_name: self.client_name.clone(),
            age: self.age,
            annual_income: self.annual_income,
            employment_duration_years: self.employment_duration,
            loan_amount: self.loan_amount,
            interest_rate: self.interest_rate,
            credit_history_length: self.credit_history,
            prior_default: self.prior_default.clone().map(YesNo::Text),
            home_ownership: self.home_ownership.clone(),
            loan_purpose: self.loan_purpose.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export with one applicant per row
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Where to write the predictions (defaults to stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Shared access code for the prediction form
    #[arg(long)]
    pub(crate) access_code: Option<String>,
    /// Model artifact to load (defaults to APP_MODEL_ARTIFACT)
    #[arg(long)]
    pub(crate) artifact: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SchemaArgs {
    /// Model artifact whose layout to print (defaults to APP_MODEL_ARTIFACT)
    #[arg(long, conflicts_with = "variant")]
    pub(crate) artifact: Option<PathBuf>,
    /// Print a built-in layout (ordinal-v1 or one-hot-v2) without loading an artifact
    #[arg(long, value_parser = parse_variant)]
    pub(crate) variant: Option<SchemaVariant>,
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init_with_target(&config.telemetry, LogTarget::Stderr)?;

    let submission = args.submission();
    let service = load_service(&config, args.artifact)?;
    let session = service.authorize(args.access_code.as_deref());
    let outcome = service.predict(&session, submission)?;

    if args.json {
        match serde_json::to_string_pretty(&outcome.view()) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Prediction payload unavailable: {err}"),
        }
    } else {
        println!("{}", outcome.summary());
        println!(
            "  prediction={} model={} request={}",
            outcome.prediction.label(),
            outcome.model_version,
            outcome.request_id.0
        );
    }

    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs {
        input,
        output,
        access_code,
        artifact,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init_with_target(&config.telemetry, LogTarget::Stderr)?;

    let service = load_service(&config, artifact)?;
    let session = service.authorize(access_code.as_deref());
    let reader = BufReader::new(File::open(&input)?);

    let summary = match output {
        Some(path) => {
            let writer = BufWriter::new(File::create(&path)?);
            score_csv(&service, &session, reader, writer)?
        }
        None => score_csv(&service, &session, reader, std::io::stdout().lock())?,
    };

    eprintln!(
        "Scored {} applicant(s); {} row(s) rejected",
        summary.scored, summary.failed
    );
    Ok(())
}

pub(crate) fn run_schema(args: SchemaArgs) -> Result<(), AppError> {
    let layout = match args.variant {
        Some(variant) => variant_layout(variant)?,
        None => {
            let config = AppConfig::load()?;
            telemetry::init_with_target(&config.telemetry, LogTarget::Stderr)?;
            let service = load_service(&config, args.artifact)?;
            service.layout().map_err(ArtifactError::from)?
        }
    };

    render_layout(&layout);
    Ok(())
}

fn variant_layout(variant: SchemaVariant) -> Result<SchemaLayout, AppError> {
    let schema = variant.schema();
    let width = schema.width().map_err(ArtifactError::from)?;
    let coordinates = schema.coordinates().map_err(ArtifactError::from)?;

    Ok(SchemaLayout {
        version: schema.version,
        width,
        polarity: variant.polarity(),
        coordinates,
    })
}

fn render_layout(layout: &SchemaLayout) {
    println!("Feature layout {} ({} coordinates)", layout.version, layout.width);
    println!(
        "Label {} means the applicant will default",
        u8::from(layout.polarity.default_label)
    );
    for coordinate in &layout.coordinates {
        let scaled = if coordinate.scaled { " [scaled]" } else { "" };
        println!(
            "  {:>2}  {:<32} {:?}{}",
            coordinate.index, coordinate.name, coordinate.kind, scaled
        );
    }
}
