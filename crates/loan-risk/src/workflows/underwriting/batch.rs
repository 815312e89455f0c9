use std::io::{Read, Write};

use serde::Serialize;
use tracing::{info, warn};

use super::access::SessionContext;
use super::domain::ApplicantSubmission;
use super::encoding::Scaler;
use super::model::Classifier;
use super::service::{LoanDefaultService, PredictionServiceError};

/// Failures that stop a batch run. Rows that cannot be read or scored are written to the output
/// with their error instead.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("access code missing or incorrect")]
    Unauthorized,
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// One output line per input row.
#[derive(Debug, Clone, Serialize)]
struct BatchRow {
    row: usize,
    client_name: String,
    prediction: String,
    summary: String,
    error: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub scored: usize,
    pub failed: usize,
}

/// Score every applicant in a CSV export (one submission per row, header names matching the
/// form fields) and write a CSV of predictions.
pub fn score_csv<M, S, R, W>(
    service: &LoanDefaultService<M, S>,
    session: &SessionContext,
    reader: R,
    writer: W,
) -> Result<BatchSummary, BatchError>
where
    M: Classifier + 'static,
    S: Scaler + 'static,
    R: Read,
    W: Write,
{
    if !session.is_authenticated() {
        return Err(BatchError::Unauthorized);
    }

    let mut input = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut output = csv::Writer::from_writer(writer);
    let mut summary = BatchSummary::default();

    for (index, row) in input.deserialize::<ApplicantSubmission>().enumerate() {
        let row_number = index + 1;
        let submission = match row {
            Ok(submission) => submission,
            Err(error) if matches!(error.kind(), csv::ErrorKind::Deserialize { .. }) => {
                summary.failed += 1;
                warn!(row = row_number, %error, "applicant row unreadable");
                output.serialize(BatchRow {
                    row: row_number,
                    client_name: String::new(),
                    prediction: String::new(),
                    summary: String::new(),
                    error: error.to_string(),
                })?;
                continue;
            }
            Err(error) => return Err(error.into()),
        };
        let client_name = submission.client_name.clone().unwrap_or_default();

        let line = match service.predict(session, submission) {
            Ok(outcome) => {
                summary.scored += 1;
                BatchRow {
                    row: row_number,
                    client_name: outcome.client_name.clone(),
                    prediction: outcome.prediction.label().to_string(),
                    summary: outcome.summary(),
                    error: String::new(),
                }
            }
            Err(PredictionServiceError::Unauthorized) => return Err(BatchError::Unauthorized),
            Err(error) => {
                summary.failed += 1;
                warn!(row = row_number, %error, "applicant row rejected");
                BatchRow {
                    row: row_number,
                    client_name,
                    prediction: String::new(),
                    summary: String::new(),
                    error: error.to_string(),
                }
            }
        };
        output.serialize(line)?;
    }

    output.flush()?;
    info!(
        scored = summary.scored,
        failed = summary.failed,
        "batch scoring finished"
    );
    Ok(summary)
}
