use crate::commands::{run_batch, run_predict, run_schema, BatchArgs, PredictArgs, SchemaArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_risk::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "loan-risk-api",
    about = "Serve and run loan default predictions from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Predict a single applicant from command line flags
    Predict(PredictArgs),
    /// Score a CSV export of applicants and write a CSV of predictions
    Batch(BatchArgs),
    /// Print the feature layout of a model artifact or built-in schema
    Schema(SchemaArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Model artifact to serve (defaults to APP_MODEL_ARTIFACT)
    #[arg(long)]
    pub(crate) artifact: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Predict(args) => run_predict(args),
        Command::Batch(args) => run_batch(args),
        Command::Schema(args) => run_schema(args),
    }
}
