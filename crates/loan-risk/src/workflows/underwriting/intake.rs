use super::domain::{
    ApplicantRecord, ApplicantSubmission, FieldName, HomeOwnership, LoanPurpose, YesNo,
};

/// Validation errors raised while turning form fields into an applicant record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("applicant must be at least {minimum} years old (found {found})")]
    Underage { minimum: u32, found: i64 },
    #[error("`{field}` must be a finite, non-negative number (found {found})")]
    InvalidNumber { field: FieldName, found: String },
    #[error("`{field}` does not recognise {value:?}")]
    UnknownCategory { field: FieldName, value: String },
    #[error("`{field}` expects yes or no (found {value:?})")]
    InvalidAnswer { field: FieldName, value: String },
}

pub const DEFAULT_MINIMUM_AGE: u32 = 18;

/// Guard responsible for producing `ApplicantRecord` instances.
#[derive(Debug, Clone)]
pub struct IntakeGuard {
    minimum_age: u32,
}

impl Default for IntakeGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MINIMUM_AGE)
    }
}

impl IntakeGuard {
    pub fn new(minimum_age: u32) -> Self {
        Self { minimum_age }
    }

    pub fn minimum_age(&self) -> u32 {
        self.minimum_age
    }

    /// Convert an inbound submission into a validated applicant record.
    pub fn record_from_submission(
        &self,
        submission: ApplicantSubmission,
    ) -> Result<ApplicantRecord, IntakeViolation> {
        let age = match submission.age {
            Some(age) if age < i64::from(self.minimum_age) => {
                return Err(IntakeViolation::Underage {
                    minimum: self.minimum_age,
                    found: age,
                })
            }
            Some(age) => Some(whole_number(FieldName::Age, age)?),
            None => None,
        };

        let employment_duration_years = submission
            .employment_duration_years
            .map(|years| whole_number(FieldName::EmploymentDurationYears, years))
            .transpose()?;

        let prior_default = submission
            .prior_default
            .map(|answer| yes_no(FieldName::PriorDefault, answer))
            .transpose()?;

        let home_ownership = non_blank(submission.home_ownership)
            .map(|raw| {
                HomeOwnership::parse(&raw).ok_or(IntakeViolation::UnknownCategory {
                    field: FieldName::HomeOwnership,
                    value: raw,
                })
            })
            .transpose()?;

        let loan_purpose = non_blank(submission.loan_purpose)
            .map(|raw| {
                LoanPurpose::parse(&raw).ok_or(IntakeViolation::UnknownCategory {
                    field: FieldName::LoanPurpose,
                    value: raw,
                })
            })
            .transpose()?;

        Ok(ApplicantRecord {
            client_name: submission
                .client_name
                .map(|name| name.trim().to_string())
                .unwrap_or_default(),
            age,
            annual_income: amount(FieldName::AnnualIncome, submission.annual_income)?,
            employment_duration_years,
            loan_amount: amount(FieldName::LoanAmount, submission.loan_amount)?,
            interest_rate: amount(FieldName::InterestRate, submission.interest_rate)?,
            credit_history_length: amount(
                FieldName::CreditHistoryLength,
                submission.credit_history_length,
            )?,
            prior_default,
            home_ownership,
            loan_purpose,
        })
    }
}

fn whole_number(field: FieldName, value: i64) -> Result<u32, IntakeViolation> {
    u32::try_from(value).map_err(|_| IntakeViolation::InvalidNumber {
        field,
        found: value.to_string(),
    })
}

fn amount(field: FieldName, value: Option<f64>) -> Result<Option<f64>, IntakeViolation> {
    match value {
        Some(value) if !value.is_finite() || value < 0.0 => Err(IntakeViolation::InvalidNumber {
            field,
            found: value.to_string(),
        }),
        other => Ok(other),
    }
}

fn yes_no(field: FieldName, answer: YesNo) -> Result<bool, IntakeViolation> {
    match answer {
        YesNo::Flag(flag) => Ok(flag),
        YesNo::Number(1) => Ok(true),
        YesNo::Number(0) => Ok(false),
        YesNo::Number(other) => Err(IntakeViolation::InvalidAnswer {
            field,
            value: other.to_string(),
        }),
        YesNo::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" | "1" => Ok(true),
            "no" | "n" | "false" | "0" => Ok(false),
            _ => Err(IntakeViolation::InvalidAnswer { field, value: text }),
        },
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}
