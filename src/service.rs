//! Transport-independent request/response boundary.
//!
//! The HTTP server, the CLI and the TUI all speak these types. This is also
//! where presentation rounding happens: the pipeline returns the raw model
//! output and `respond` rounds it to cents for display.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::app::pipeline::PredictPipeline;
use crate::domain::{CategoricalField, NumericField, NumericRange, RawRecord};
use crate::error::{ErrorKind, PredictError};

/// Outcome of one prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PredictResponse {
    Success {
        predicted_price: f64,
        input_data: RawRecord,
    },
    Error {
        error_kind: ErrorKind,
        message: String,
    },
}

impl PredictResponse {
    pub fn from_error(err: &PredictError) -> Self {
        PredictResponse::Error {
            error_kind: err.kind(),
            message: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PredictResponse::Success { .. })
    }
}

/// Discoverable metadata for client-side validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryOptions {
    pub cut: Vec<String>,
    pub color: Vec<String>,
    pub clarity: Vec<String>,
    /// Advisory bounds keyed by numeric field name.
    pub ranges: BTreeMap<String, NumericRange>,
}

impl CategoryOptions {
    /// Options derived from the grade enumerations.
    pub fn current() -> Self {
        let owned = |f: CategoricalField| -> Vec<String> { f.categories().into_iter().map(str::to_string).collect() };
        Self {
            cut: owned(CategoricalField::Cut),
            color: owned(CategoricalField::Color),
            clarity: owned(CategoricalField::Clarity),
            ranges: NumericField::ALL
                .iter()
                .map(|f| (f.name().to_string(), f.conventional_range()))
                .collect(),
        }
    }

    pub fn for_field(&self, field: CategoricalField) -> &[String] {
        match field {
            CategoricalField::Cut => &self.cut,
            CategoricalField::Color => &self.color,
            CategoricalField::Clarity => &self.clarity,
        }
    }

    pub fn range(&self, field: NumericField) -> NumericRange {
        self.ranges
            .get(field.name())
            .copied()
            .unwrap_or_else(|| field.conventional_range())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
    pub artifacts: String,
}

pub fn health(pipeline: &PredictPipeline) -> HealthStatus {
    HealthStatus {
        status: "healthy".to_string(),
        message: "API is operational".to_string(),
        artifacts: pipeline.state().as_str().to_string(),
    }
}

/// Run one prediction and wrap the outcome.
pub fn respond(pipeline: &PredictPipeline, record: RawRecord) -> PredictResponse {
    match pipeline.predict(&record) {
        Ok(price) => PredictResponse::Success {
            predicted_price: round_cents(price),
            input_data: record,
        },
        Err(err) => PredictResponse::from_error(&err),
    }
}

/// Round half away from zero to two decimal places.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round_cents(11037.31877158333), 11037.32);
        assert_eq!(round_cents(-7037.898), -7037.9);
        assert_eq!(round_cents(1.005_000_1), 1.01);
    }

    #[test]
    fn options_come_from_grade_enums() {
        let options = CategoryOptions::current();
        assert_eq!(options.cut, ["Fair", "Good", "Very Good", "Premium", "Ideal"]);
        assert_eq!(options.color, ["D", "E", "F", "G", "H", "I", "J"]);
        assert_eq!(options.clarity, ["I1", "SI2", "SI1", "VS2", "VS1", "VVS2", "VVS1", "IF"]);
        assert_eq!(options.range(NumericField::Carat).min, 0.2);
        assert_eq!(options.ranges.len(), 6);
    }

    #[test]
    fn error_response_shape() {
        let err = PredictError::invalid_input("x", "must be non-negative, got -1");
        let json = serde_json::to_value(PredictResponse::from_error(&err)).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error_kind"], "invalid_input");
        assert_eq!(json["message"], "invalid input for `x`: must be non-negative, got -1");
    }

    #[test]
    fn success_response_round_trips() {
        let response = PredictResponse::Success {
            predicted_price: 11037.32,
            input_data: RawRecord::example(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.starts_with(r#"{"status":"success","predicted_price":11037.32"#), "{json}");
        let back: PredictResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, response);
    }
}
