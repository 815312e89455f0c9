use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for a single prediction request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

/// Raw form fields exactly as the applicant form posts them.
///
/// Every field is optional here; [`IntakeGuard`](super::IntakeGuard) enforces the numeric
/// contract and the feature schema decides which fields a model actually needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicantSubmission {
    pub client_name: Option<String>,
    pub age: Option<i64>,
    pub annual_income: Option<f64>,
    #[serde(alias = "employment_duration")]
    pub employment_duration_years: Option<i64>,
    #[serde(alias = "loan_applied")]
    pub loan_amount: Option<f64>,
    #[serde(alias = "rate")]
    pub interest_rate: Option<f64>,
    #[serde(alias = "credit_history")]
    pub credit_history_length: Option<f64>,
    #[serde(alias = "default")]
    pub prior_default: Option<YesNo>,
    pub home_ownership: Option<String>,
    pub loan_purpose: Option<String>,
}

/// The form offers a "Yes"/"No" select while API clients usually send booleans, and CSV
/// exports carry the 0/1 coding the model was trained on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YesNo {
    Flag(bool),
    Number(i64),
    Text(String),
}

/// Validated applicant attributes for one prediction cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub client_name: String,
    pub age: Option<u32>,
    pub annual_income: Option<f64>,
    pub employment_duration_years: Option<u32>,
    pub loan_amount: Option<f64>,
    pub interest_rate: Option<f64>,
    pub credit_history_length: Option<f64>,
    pub prior_default: Option<bool>,
    pub home_ownership: Option<HomeOwnership>,
    pub loan_purpose: Option<LoanPurpose>,
}

impl ApplicantRecord {
    /// Look up a field by name; `None` means the applicant left it unset.
    pub fn value(&self, field: FieldName) -> Option<FieldValue> {
        match field {
            FieldName::Age => self.age.map(|age| FieldValue::Number(f64::from(age))),
            FieldName::AnnualIncome => self.annual_income.map(FieldValue::Number),
            FieldName::EmploymentDurationYears => self
                .employment_duration_years
                .map(|years| FieldValue::Number(f64::from(years))),
            FieldName::LoanAmount => self.loan_amount.map(FieldValue::Number),
            FieldName::InterestRate => self.interest_rate.map(FieldValue::Number),
            FieldName::CreditHistoryLength => self.credit_history_length.map(FieldValue::Number),
            FieldName::PriorDefault => self.prior_default.map(FieldValue::Flag),
            FieldName::HomeOwnership => self
                .home_ownership
                .map(|home| FieldValue::Category(home.label())),
            FieldName::LoanPurpose => self
                .loan_purpose
                .map(|purpose| FieldValue::Category(purpose.label())),
        }
    }
}

/// Record fields a feature rule may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Age,
    AnnualIncome,
    EmploymentDurationYears,
    LoanAmount,
    InterestRate,
    CreditHistoryLength,
    PriorDefault,
    HomeOwnership,
    LoanPurpose,
}

impl FieldName {
    pub const fn label(self) -> &'static str {
        match self {
            FieldName::Age => "age",
            FieldName::AnnualIncome => "annual_income",
            FieldName::EmploymentDurationYears => "employment_duration_years",
            FieldName::LoanAmount => "loan_amount",
            FieldName::InterestRate => "interest_rate",
            FieldName::CreditHistoryLength => "credit_history_length",
            FieldName::PriorDefault => "prior_default",
            FieldName::HomeOwnership => "home_ownership",
            FieldName::LoanPurpose => "loan_purpose",
        }
    }

    pub const fn kind(self) -> ValueKind {
        match self {
            FieldName::Age
            | FieldName::AnnualIncome
            | FieldName::EmploymentDurationYears
            | FieldName::LoanAmount
            | FieldName::InterestRate
            | FieldName::CreditHistoryLength => ValueKind::Number,
            FieldName::PriorDefault => ValueKind::Flag,
            FieldName::HomeOwnership | FieldName::LoanPurpose => ValueKind::Category,
        }
    }
}

/// Shape of the values a record field carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Flag,
    Category,
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Typed view of a single record field handed to the encoding rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Flag(bool),
    Category(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HomeOwnership {
    Rent,
    Own,
    Mortgage,
    Other,
}

impl HomeOwnership {
    pub const ALL: [HomeOwnership; 4] = [
        HomeOwnership::Rent,
        HomeOwnership::Own,
        HomeOwnership::Mortgage,
        HomeOwnership::Other,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            HomeOwnership::Rent => "RENT",
            HomeOwnership::Own => "OWN",
            HomeOwnership::Mortgage => "MORTGAGE",
            HomeOwnership::Other => "OTHER",
        }
    }

    /// Accepts the form labels ("Own", "Mortgage", ...) as well as the canonical ones.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = category_key(raw);
        Self::ALL.into_iter().find(|home| home.label() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanPurpose {
    Personal,
    Education,
    Venture,
    HomeImprovement,
    Medical,
    DebtConsolidation,
}

impl LoanPurpose {
    pub const ALL: [LoanPurpose; 6] = [
        LoanPurpose::Personal,
        LoanPurpose::Education,
        LoanPurpose::Venture,
        LoanPurpose::HomeImprovement,
        LoanPurpose::Medical,
        LoanPurpose::DebtConsolidation,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            LoanPurpose::Personal => "PERSONAL",
            LoanPurpose::Education => "EDUCATION",
            LoanPurpose::Venture => "VENTURE",
            LoanPurpose::HomeImprovement => "HOMEIMPROVEMENT",
            LoanPurpose::Medical => "MEDICAL",
            LoanPurpose::DebtConsolidation => "DEBTCONSOLIDATION",
        }
    }

    /// "Home Improvement", "home_improvement" and "HOMEIMPROVEMENT" all resolve the same way.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = category_key(raw);
        Self::ALL.into_iter().find(|purpose| purpose.label() == key)
    }
}

fn category_key(raw: &str) -> String {
    raw.chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .map(|ch| ch.to_ascii_uppercase())
        .collect()
}

/// Business-facing reading of the model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Prediction {
    WillDefault,
    WillNotDefault,
}

impl Prediction {
    pub const fn label(self) -> &'static str {
        match self {
            Prediction::WillDefault => "will_default",
            Prediction::WillNotDefault => "will_not_default",
        }
    }

    pub fn sentence(self, client_name: &str) -> String {
        let client = if client_name.is_empty() {
            "the applicant"
        } else {
            client_name
        };
        match self {
            Prediction::WillDefault => format!("The model predicts that {client} will default."),
            Prediction::WillNotDefault => {
                format!("The model predicts that {client} will not default.")
            }
        }
    }
}

/// Result handed to the presentation layer. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub request_id: RequestId,
    pub client_name: String,
    pub prediction: Prediction,
    pub model_version: String,
    pub predicted_at: DateTime<Utc>,
}

impl PredictionOutcome {
    pub fn summary(&self) -> String {
        self.prediction.sentence(&self.client_name)
    }

    pub fn view(&self) -> PredictionView {
        PredictionView {
            request_id: self.request_id.clone(),
            client_name: self.client_name.clone(),
            prediction: self.prediction,
            model_version: self.model_version.clone(),
            predicted_at: self.predicted_at,
            summary: self.summary(),
        }
    }
}

/// Serialized shape of an outcome for API and CLI output.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionView {
    pub request_id: RequestId,
    pub client_name: String,
    pub prediction: Prediction,
    pub model_version: String,
    pub predicted_at: DateTime<Utc>,
    pub summary: String,
}
