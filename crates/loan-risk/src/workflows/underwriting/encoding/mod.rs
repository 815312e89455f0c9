//! Applicant record to model input transform.
//!
//! The encoder never checks that a schema matches the model it is paired with; a reordered
//! coordinate or a different baseline category still yields a vector of the right width and
//! a silently wrong prediction. Schemas therefore travel with their model artifact.

mod rules;
mod scaling;
mod schema;

pub use rules::{derive_ratio, encode_categorical, encode_ordinal};
pub use scaling::{Scaler, ScalingError, StandardScaler};
pub use schema::{
    BaselinePolicy, CoordinateView, FeatureEntry, FeatureRule, FeatureSchema, OrdinalLevel,
    SchemaVariant,
};

use serde::Serialize;

use super::domain::{ApplicantRecord, FieldName, FieldValue};

/// Whether a coordinate carries a raw quantity or an indicator bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateKind {
    Numeric,
    Indicator,
}

/// Model input in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
    kinds: Vec<CoordinateKind>,
}

impl FeatureVector {
    /// Vector whose coordinates are all numeric; handy for feeding a classifier directly.
    pub fn numeric(values: Vec<f64>) -> Self {
        let kinds = vec![CoordinateKind::Numeric; values.len()];
        Self { values, kinds }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn kinds(&self) -> &[CoordinateKind] {
        &self.kinds
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Schema or record mismatch. Fatal to the request that hit it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("record is missing `{0}`, which the feature schema requires")]
    MissingField(FieldName),
    #[error("`{field}` cannot be encoded as {expected}")]
    FieldKind {
        field: FieldName,
        expected: &'static str,
    },
    #[error("category list must not be empty")]
    EmptyCategoryList,
    #[error("`{field}` value {category:?} has no ordinal level")]
    UnmappedCategory { field: FieldName, category: String },
    #[error("scaled index {index} is outside a vector of width {width}")]
    ScaledIndexOutOfRange { index: usize, width: usize },
    #[error("scaled index {index} points at an indicator coordinate")]
    ScaledIndicator { index: usize },
    #[error("scaled index {index} is listed more than once")]
    DuplicateScaledIndex { index: usize },
}

/// Failure of the full encode step (vector construction followed by scaling).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodingError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Scaling(#[from] ScalingError),
}

/// Build the feature vector for `record`, entry by entry in schema order.
pub fn build_vector(
    record: &ApplicantRecord,
    schema: &FeatureSchema,
) -> Result<FeatureVector, SchemaError> {
    let mut values = Vec::with_capacity(schema.entries.len());
    let mut kinds = Vec::with_capacity(schema.entries.len());

    for entry in &schema.entries {
        match &entry.rule {
            FeatureRule::Numeric { field } => {
                values.push(numeric_value(record, *field)?);
                kinds.push(CoordinateKind::Numeric);
            }
            FeatureRule::Ratio {
                numerator,
                denominator,
            } => {
                let numerator = numeric_value(record, *numerator)?;
                let denominator = numeric_value(record, *denominator)?;
                values.push(derive_ratio(numerator, denominator));
                kinds.push(CoordinateKind::Numeric);
            }
            FeatureRule::Ordinal { field, levels } => {
                let category = category_value(record, *field)?;
                values.push(encode_ordinal(*field, category, levels)?);
                kinds.push(CoordinateKind::Numeric);
            }
            FeatureRule::OneHot {
                field,
                categories,
                baseline,
            } => {
                let category = category_value(record, *field)?;
                let block = encode_categorical(category, categories, baseline)?;
                kinds.extend(std::iter::repeat(CoordinateKind::Indicator).take(block.len()));
                values.extend(block);
            }
        }
    }

    Ok(FeatureVector { values, kinds })
}

/// Rescale the coordinates at `indices` in place, leaving every other coordinate untouched.
pub fn apply_scaling<S>(
    vector: FeatureVector,
    scaler: &S,
    indices: &[usize],
) -> Result<FeatureVector, EncodingError>
where
    S: Scaler + ?Sized,
{
    if indices.is_empty() {
        return Ok(vector);
    }

    validate_scaled_indices(&vector.kinds, indices)?;

    let subset: Vec<f64> = indices.iter().map(|&index| vector.values[index]).collect();
    let scaled = scaler.transform(&subset)?;
    if scaled.len() != subset.len() {
        return Err(ScalingError::OutputLength {
            expected: subset.len(),
            found: scaled.len(),
        }
        .into());
    }

    let FeatureVector { mut values, kinds } = vector;
    for (&index, value) in indices.iter().zip(scaled) {
        values[index] = value;
    }

    Ok(FeatureVector { values, kinds })
}

pub(crate) fn validate_scaled_indices(
    kinds: &[CoordinateKind],
    indices: &[usize],
) -> Result<(), SchemaError> {
    for (position, &index) in indices.iter().enumerate() {
        match kinds.get(index) {
            None => {
                return Err(SchemaError::ScaledIndexOutOfRange {
                    index,
                    width: kinds.len(),
                })
            }
            Some(CoordinateKind::Indicator) => {
                return Err(SchemaError::ScaledIndicator { index })
            }
            Some(CoordinateKind::Numeric) => {}
        }
        if indices[..position].contains(&index) {
            return Err(SchemaError::DuplicateScaledIndex { index });
        }
    }
    Ok(())
}

fn numeric_value(record: &ApplicantRecord, field: FieldName) -> Result<f64, SchemaError> {
    match record.value(field) {
        Some(FieldValue::Number(value)) => Ok(value),
        Some(FieldValue::Flag(flag)) => Ok(if flag { 1.0 } else { 0.0 }),
        Some(FieldValue::Category(_)) => Err(SchemaError::FieldKind {
            field,
            expected: "a number",
        }),
        None => Err(SchemaError::MissingField(field)),
    }
}

fn category_value(
    record: &ApplicantRecord,
    field: FieldName,
) -> Result<Option<&'static str>, SchemaError> {
    match record.value(field) {
        Some(FieldValue::Category(label)) => Ok(Some(label)),
        None => Ok(None),
        Some(_) => Err(SchemaError::FieldKind {
            field,
            expected: "a category",
        }),
    }
}

/// Stateless encoder bound to one validated schema.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    schema: FeatureSchema,
    width: usize,
}

impl FeatureEncoder {
    pub fn new(schema: FeatureSchema) -> Result<Self, SchemaError> {
        schema.validate()?;
        let width = schema.width()?;
        Ok(Self { schema, width })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn encode(&self, record: &ApplicantRecord) -> Result<FeatureVector, SchemaError> {
        build_vector(record, &self.schema)
    }

    /// Encode and, when a scaler is supplied, rescale the schema's scaled coordinates.
    pub fn encode_scaled<S>(
        &self,
        record: &ApplicantRecord,
        scaler: Option<&S>,
    ) -> Result<FeatureVector, EncodingError>
    where
        S: Scaler + ?Sized,
    {
        let vector = self.encode(record)?;
        match scaler {
            Some(scaler) => apply_scaling(vector, scaler, &self.schema.scaled_indices),
            None => Ok(vector),
        }
    }
}
