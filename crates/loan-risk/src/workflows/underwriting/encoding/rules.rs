use super::super::domain::FieldName;
use super::schema::{indicator_columns, BaselinePolicy, OrdinalLevel};
use super::SchemaError;

/// Baseline indicator encoding.
///
/// Unset values, unrecognized values and the baseline category all produce the zero block.
/// The fallback is silent so the output matches what the training pipeline produced.
pub fn encode_categorical(
    value: Option<&str>,
    categories: &[String],
    baseline: &BaselinePolicy,
) -> Result<Vec<f64>, SchemaError> {
    let columns = indicator_columns(categories, baseline)?;
    let mut block = vec![0.0; columns.len()];

    if let Some(value) = value.filter(|value| !baseline.is_baseline(value)) {
        if let Some(position) = columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(value))
        {
            block[position] = 1.0;
        }
    }

    Ok(block)
}

/// Zero-guarded ratio: a non-positive denominator yields 0.
pub fn derive_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Label encoding through an explicit level table. Unlike indicator blocks there is no
/// neutral value, so unset and unmapped inputs are errors.
pub fn encode_ordinal(
    field: FieldName,
    value: Option<&str>,
    levels: &[OrdinalLevel],
) -> Result<f64, SchemaError> {
    let value = value.ok_or(SchemaError::MissingField(field))?;
    levels
        .iter()
        .find(|level| level.category.eq_ignore_ascii_case(value))
        .map(|level| level.value)
        .ok_or_else(|| SchemaError::UnmappedCategory {
            field,
            category: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn baseline_inside_list_drops_its_column() {
        let list = categories(&["RENT", "OWN", "MORTGAGE", "OTHER"]);
        let baseline = BaselinePolicy::Category("OTHER".to_string());

        assert_eq!(
            encode_categorical(Some("OWN"), &list, &baseline).expect("encodes"),
            vec![0.0, 1.0, 0.0]
        );
        assert_eq!(
            encode_categorical(Some("OTHER"), &list, &baseline).expect("encodes"),
            vec![0.0, 0.0, 0.0]
        );
        assert_eq!(
            encode_categorical(None, &list, &baseline).expect("encodes"),
            vec![0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn baseline_outside_list_keeps_full_width() {
        let list = categories(&["MORTGAGE", "OWN", "RENT"]);
        let baseline = BaselinePolicy::Category("OTHER".to_string());

        assert_eq!(
            encode_categorical(Some("RENT"), &list, &baseline).expect("encodes"),
            vec![0.0, 0.0, 1.0]
        );
        assert_eq!(
            encode_categorical(Some("OTHER"), &list, &baseline).expect("encodes"),
            vec![0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn unrecognized_value_falls_back_to_zero_block() {
        let list = categories(&["EDUCATION", "MEDICAL"]);

        let block = encode_categorical(Some("VENTURE"), &list, &BaselinePolicy::UnsetOnly)
            .expect("encodes");

        assert_eq!(block, vec![0.0, 0.0]);
    }

    #[test]
    fn matching_ignores_ascii_case() {
        let list = categories(&["Rent", "Own"]);

        let block =
            encode_categorical(Some("OWN"), &list, &BaselinePolicy::UnsetOnly).expect("encodes");

        assert_eq!(block, vec![0.0, 1.0]);
    }

    #[test]
    fn at_most_one_bit_is_set() {
        let list = categories(&["RENT", "OWN", "MORTGAGE", "OTHER"]);
        let baseline = BaselinePolicy::Category("OTHER".to_string());

        for value in ["RENT", "OWN", "MORTGAGE"] {
            let block = encode_categorical(Some(value), &list, &baseline).expect("encodes");
            assert_eq!(block.len(), 3);
            assert_eq!(block.iter().filter(|bit| **bit == 1.0).count(), 1);
            assert!(block.iter().all(|bit| *bit == 0.0 || *bit == 1.0));
        }
    }

    #[test]
    fn empty_category_list_is_rejected() {
        let error = encode_categorical(Some("RENT"), &[], &BaselinePolicy::UnsetOnly)
            .expect_err("empty list");
        assert_eq!(error, SchemaError::EmptyCategoryList);
    }

    #[test]
    fn ratio_guards_non_positive_denominators() {
        assert_eq!(derive_ratio(500.0, 0.0), 0.0);
        assert_eq!(derive_ratio(500.0, -20.0), 0.0);
        assert_eq!(derive_ratio(500.0, 1000.0), 0.5);
    }

    #[test]
    fn ordinal_requires_a_mapped_value() {
        let levels = vec![
            OrdinalLevel {
                category: "OWN".to_string(),
                value: 1.0,
            },
            OrdinalLevel {
                category: "RENT".to_string(),
                value: 3.0,
            },
        ];

        assert_eq!(
            encode_ordinal(FieldName::HomeOwnership, Some("rent"), &levels).expect("mapped"),
            3.0
        );
        assert_eq!(
            encode_ordinal(FieldName::HomeOwnership, None, &levels),
            Err(SchemaError::MissingField(FieldName::HomeOwnership))
        );
        match encode_ordinal(FieldName::HomeOwnership, Some("OTHER"), &levels) {
            Err(SchemaError::UnmappedCategory { field, category }) => {
                assert_eq!(field, FieldName::HomeOwnership);
                assert_eq!(category, "OTHER");
            }
            other => panic!("expected unmapped category, got {other:?}"),
        }
    }
}
