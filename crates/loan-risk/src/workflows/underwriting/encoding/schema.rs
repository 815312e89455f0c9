use serde::{Deserialize, Serialize};

use super::super::domain::{FieldName, ValueKind};
use super::super::model::LabelPolarity;
use super::{validate_scaled_indices, CoordinateKind, SchemaError};

/// Ordered feature layout a model was trained against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: String,
    pub entries: Vec<FeatureEntry>,
    /// Coordinates handed to the scaler, in the order the scaler was fitted on.
    #[serde(default)]
    pub scaled_indices: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEntry {
    pub name: String,
    pub rule: FeatureRule,
}

/// How a schema entry turns record fields into one or more coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureRule {
    Numeric {
        field: FieldName,
    },
    Ratio {
        numerator: FieldName,
        denominator: FieldName,
    },
    Ordinal {
        field: FieldName,
        levels: Vec<OrdinalLevel>,
    },
    OneHot {
        field: FieldName,
        categories: Vec<String>,
        #[serde(default)]
        baseline: BaselinePolicy,
    },
}

impl FeatureRule {
    pub fn width(&self) -> Result<usize, SchemaError> {
        match self {
            FeatureRule::Numeric { .. }
            | FeatureRule::Ratio { .. }
            | FeatureRule::Ordinal { .. } => Ok(1),
            FeatureRule::OneHot {
                categories,
                baseline,
                ..
            } => Ok(indicator_columns(categories, baseline)?.len()),
        }
    }

    pub fn kind(&self) -> CoordinateKind {
        match self {
            FeatureRule::OneHot { .. } => CoordinateKind::Indicator,
            _ => CoordinateKind::Numeric,
        }
    }

    /// Numeric and ratio rules read numbers or flags; ordinal and one-hot rules read categories.
    pub fn check_fields(&self) -> Result<(), SchemaError> {
        match self {
            FeatureRule::Numeric { field } => expect_quantity(*field),
            FeatureRule::Ratio {
                numerator,
                denominator,
            } => {
                expect_quantity(*numerator)?;
                expect_quantity(*denominator)
            }
            FeatureRule::Ordinal { field, .. } | FeatureRule::OneHot { field, .. } => {
                match field.kind() {
                    ValueKind::Category => Ok(()),
                    ValueKind::Number | ValueKind::Flag => Err(SchemaError::FieldKind {
                        field: *field,
                        expected: "a category",
                    }),
                }
            }
        }
    }
}

fn expect_quantity(field: FieldName) -> Result<(), SchemaError> {
    match field.kind() {
        ValueKind::Number | ValueKind::Flag => Ok(()),
        ValueKind::Category => Err(SchemaError::FieldKind {
            field,
            expected: "a number",
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdinalLevel {
    pub category: String,
    pub value: f64,
}

/// Which input collapses to the all-zero indicator block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselinePolicy {
    /// Only unset or unrecognized values encode to zeros; every listed category keeps a column.
    #[default]
    UnsetOnly,
    /// The named category is the dropped reference level. If it appears in the category list
    /// its column is removed from the block.
    Category(String),
}

impl BaselinePolicy {
    pub fn is_baseline(&self, category: &str) -> bool {
        match self {
            BaselinePolicy::UnsetOnly => false,
            BaselinePolicy::Category(baseline) => baseline.eq_ignore_ascii_case(category),
        }
    }
}

/// Columns emitted for a one-hot rule, baseline removed.
pub(crate) fn indicator_columns<'a>(
    categories: &'a [String],
    baseline: &BaselinePolicy,
) -> Result<Vec<&'a str>, SchemaError> {
    if categories.is_empty() {
        return Err(SchemaError::EmptyCategoryList);
    }

    Ok(categories
        .iter()
        .map(String::as_str)
        .filter(|category| !baseline.is_baseline(category))
        .collect())
}

/// One row of the flattened layout, used for introspection and diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinateView {
    pub index: usize,
    pub name: String,
    pub kind: CoordinateKind,
    pub scaled: bool,
}

impl FeatureSchema {
    pub fn width(&self) -> Result<usize, SchemaError> {
        self.entries
            .iter()
            .try_fold(0, |width, entry| Ok(width + entry.rule.width()?))
    }

    pub fn coordinate_kinds(&self) -> Result<Vec<CoordinateKind>, SchemaError> {
        let mut kinds = Vec::new();
        for entry in &self.entries {
            let width = entry.rule.width()?;
            kinds.extend(std::iter::repeat(entry.rule.kind()).take(width));
        }
        Ok(kinds)
    }

    /// Flatten the schema into named coordinates (`home_ownership=RENT` for indicator columns).
    pub fn coordinates(&self) -> Result<Vec<CoordinateView>, SchemaError> {
        let mut names = Vec::new();
        for entry in &self.entries {
            match &entry.rule {
                FeatureRule::OneHot {
                    categories,
                    baseline,
                    ..
                } => {
                    for column in indicator_columns(categories, baseline)? {
                        names.push((format!("{}={}", entry.name, column), CoordinateKind::Indicator));
                    }
                }
                rule => names.push((entry.name.clone(), rule.kind())),
            }
        }

        Ok(names
            .into_iter()
            .enumerate()
            .map(|(index, (name, kind))| CoordinateView {
                index,
                name,
                kind,
                scaled: self.scaled_indices.contains(&index),
            })
            .collect())
    }

    /// Check the layout is well formed: rules read fields of the right kind, category lists are
    /// non-empty and scaled indices stay on numeric coordinates.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for entry in &self.entries {
            entry.rule.check_fields()?;
        }
        let kinds = self.coordinate_kinds()?;
        validate_scaled_indices(&kinds, &self.scaled_indices)
    }
}

/// Layouts shipped by past model revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaVariant {
    /// Label-encoded home ownership and purpose, prior default flag last.
    #[serde(rename = "ordinal-v1")]
    OrdinalV1,
    /// Drop-baseline indicator blocks for home ownership and purpose.
    #[serde(rename = "one-hot-v2")]
    OneHotV2,
}

impl SchemaVariant {
    pub const ALL: [SchemaVariant; 2] = [SchemaVariant::OrdinalV1, SchemaVariant::OneHotV2];

    pub const fn label(self) -> &'static str {
        match self {
            SchemaVariant::OrdinalV1 => "ordinal-v1",
            SchemaVariant::OneHotV2 => "one-hot-v2",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|variant| variant.label().eq_ignore_ascii_case(raw))
    }

    /// Label polarity the variant's model artifacts were trained with.
    pub const fn polarity(self) -> LabelPolarity {
        match self {
            SchemaVariant::OrdinalV1 => LabelPolarity::ONE_MEANS_DEFAULT,
            SchemaVariant::OneHotV2 => LabelPolarity::ZERO_MEANS_DEFAULT,
        }
    }

    pub fn schema(self) -> FeatureSchema {
        match self {
            SchemaVariant::OrdinalV1 => {
                let mut entries = applicant_numerics();
                entries.push(ordinal(
                    FieldName::HomeOwnership,
                    &[("OWN", 1.0), ("MORTGAGE", 2.0), ("RENT", 3.0)],
                ));
                entries.push(ordinal(
                    FieldName::LoanPurpose,
                    &[("EDUCATION", 1.0), ("HOMEIMPROVEMENT", 2.0)],
                ));
                entries.push(numeric(FieldName::PriorDefault));

                FeatureSchema {
                    version: self.label().to_string(),
                    entries,
                    scaled_indices: vec![1, 3, 4, 5],
                }
            }
            SchemaVariant::OneHotV2 => {
                let mut entries = applicant_numerics();
                entries.push(one_hot(
                    FieldName::HomeOwnership,
                    &["MORTGAGE", "OWN", "RENT"],
                    "OTHER",
                ));
                entries.push(one_hot(
                    FieldName::LoanPurpose,
                    &["EDUCATION", "HOMEIMPROVEMENT", "MEDICAL", "PERSONAL", "VENTURE"],
                    "DEBTCONSOLIDATION",
                ));

                FeatureSchema {
                    version: self.label().to_string(),
                    entries,
                    scaled_indices: (0..6).collect(),
                }
            }
        }
    }
}

fn applicant_numerics() -> Vec<FeatureEntry> {
    [
        FieldName::Age,
        FieldName::AnnualIncome,
        FieldName::EmploymentDurationYears,
        FieldName::LoanAmount,
        FieldName::InterestRate,
        FieldName::CreditHistoryLength,
    ]
    .into_iter()
    .map(numeric)
    .collect()
}

fn numeric(field: FieldName) -> FeatureEntry {
    FeatureEntry {
        name: field.label().to_string(),
        rule: FeatureRule::Numeric { field },
    }
}

fn ordinal(field: FieldName, levels: &[(&str, f64)]) -> FeatureEntry {
    FeatureEntry {
        name: field.label().to_string(),
        rule: FeatureRule::Ordinal {
            field,
            levels: levels
                .iter()
                .map(|(category, value)| OrdinalLevel {
                    category: category.to_string(),
                    value: *value,
                })
                .collect(),
        },
    }
}

fn one_hot(field: FieldName, categories: &[&str], baseline: &str) -> FeatureEntry {
    FeatureEntry {
        name: field.label().to_string(),
        rule: FeatureRule::OneHot {
            field,
            categories: categories.iter().map(|category| category.to_string()).collect(),
            baseline: BaselinePolicy::Category(baseline.to_string()),
        },
    }
}
