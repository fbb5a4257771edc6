//! Record → feature vector transformation.
//!
//! The encoder applies the stored transform verbatim. It never re-derives a
//! category mapping and never substitutes a default for an unseen value.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::{CategoricalField, FEATURE_COLUMNS, FeatureVector, Field, NumericField, RawRecord};
use crate::encode::artifact::{ColumnTransform, EncoderArtifact};
use crate::error::PredictError;

#[derive(Debug, Clone, PartialEq)]
enum ColumnEncoding {
    Numeric(NumericField),
    Ordinal {
        field: CategoricalField,
        categories: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct EncodedColumn {
    encoding: ColumnEncoding,
    mean: f64,
    scale: f64,
}

impl EncodedColumn {
    fn field(&self) -> Field {
        match &self.encoding {
            ColumnEncoding::Numeric(f) => Field::Numeric(*f),
            ColumnEncoding::Ordinal { field, .. } => Field::Categorical(*field),
        }
    }
}

/// Validated, ready-to-apply preprocessing transform.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEncoder {
    columns: Vec<EncodedColumn>,
}

impl FeatureEncoder {
    /// Validate an artifact and build the encoder.
    ///
    /// Rejects artifacts that miss or repeat a field, carry unusable scaling
    /// parameters, or whose ordinal categories differ from the grade
    /// enumerations in `domain`.
    pub fn from_artifact(artifact: &EncoderArtifact) -> Result<Self, String> {
        if artifact.format_version != EncoderArtifact::FORMAT_VERSION {
            return Err(format!(
                "unsupported format_version {} (expected {})",
                artifact.format_version,
                EncoderArtifact::FORMAT_VERSION
            ));
        }
        if artifact.columns.len() != FEATURE_COLUMNS.len() {
            return Err(format!(
                "expected {} columns, found {}",
                FEATURE_COLUMNS.len(),
                artifact.columns.len()
            ));
        }

        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(artifact.columns.len());

        for col in &artifact.columns {
            let field = Field::from_name(&col.name)
                .ok_or_else(|| format!("column `{}` is not a record field", col.name))?;
            if !seen.insert(field) {
                return Err(format!("column `{}` appears more than once", col.name));
            }
            if !col.mean.is_finite() {
                return Err(format!("column `{}` has non-finite mean", col.name));
            }
            if !col.scale.is_finite() || col.scale == 0.0 {
                return Err(format!("column `{}` has unusable scale {}", col.name, col.scale));
            }

            let encoding = match (field, &col.transform) {
                (Field::Numeric(f), ColumnTransform::Numeric) => ColumnEncoding::Numeric(f),
                (Field::Categorical(f), ColumnTransform::Ordinal { categories }) => {
                    let expected = f.categories();
                    if categories.iter().map(String::as_str).ne(expected.iter().copied()) {
                        return Err(format!(
                            "column `{}` categories [{}] do not match the known grades [{}]",
                            col.name,
                            categories.join(", "),
                            expected.join(", ")
                        ));
                    }
                    ColumnEncoding::Ordinal {
                        field: f,
                        categories: categories.clone(),
                    }
                }
                (Field::Numeric(_), ColumnTransform::Ordinal { .. }) => {
                    return Err(format!("numeric column `{}` cannot be ordinal-encoded", col.name));
                }
                (Field::Categorical(_), ColumnTransform::Numeric) => {
                    return Err(format!("categorical column `{}` needs an ordinal mapping", col.name));
                }
            };

            columns.push(EncodedColumn {
                encoding,
                mean: col.mean,
                scale: col.scale,
            });
        }

        Ok(Self { columns })
    }

    /// Number of output columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Output column names, in output order.
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.field().name()).collect()
    }

    /// Stored categories for a categorical field, in ordinal order.
    pub fn categories(&self, field: CategoricalField) -> Option<&[String]> {
        self.columns.iter().find_map(|c| match &c.encoding {
            ColumnEncoding::Ordinal { field: f, categories } if *f == field => Some(categories.as_slice()),
            _ => None,
        })
    }

    /// Encode one record.
    ///
    /// Pure: the same record always yields the same vector.
    pub fn encode(&self, record: &RawRecord) -> Result<FeatureVector, PredictError> {
        validate_numeric_fields(record)?;

        let mut values = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let raw = match &column.encoding {
                ColumnEncoding::Numeric(f) => record.numeric(*f),
                ColumnEncoding::Ordinal { field, categories } => {
                    let value = record.categorical(*field);
                    let index = categories.iter().position(|c| c == value).ok_or_else(|| {
                        PredictError::UnknownCategory {
                            field: field.name().to_string(),
                            value: value.to_string(),
                            allowed: categories.clone(),
                        }
                    })?;
                    index as f64
                }
            };
            values.push((raw - column.mean) / column.scale);
        }

        debug!(columns = values.len(), "encoded record");
        Ok(FeatureVector::new(values))
    }
}

/// Numeric fields must be finite and non-negative.
fn validate_numeric_fields(record: &RawRecord) -> Result<(), PredictError> {
    for field in NumericField::ALL {
        let value = record.numeric(field);
        if !value.is_finite() {
            return Err(PredictError::invalid_input(
                field.name(),
                format!("must be a finite number, got {value}"),
            ));
        }
        if value < 0.0 {
            return Err(PredictError::invalid_input(
                field.name(),
                format!("must be non-negative, got {value}"),
            ));
        }
    }
    Ok(())
}
