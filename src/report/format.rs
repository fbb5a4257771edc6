//! Terminal formatting for prediction results and metadata.
//!
//! Kept in one place so output changes stay localized and the CLI/TUI share
//! the same rendering of prices.

use crate::domain::{CategoricalField, NumericField, RawRecord};
use crate::io::Artifacts;
use crate::service::{CategoryOptions, PredictResponse};

/// `$12,345.67`; negative values render as `-$1,234.50`.
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return format!("${value}");
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = group_thousands(cents / 100);
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${whole}.{:02}", cents % 100)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// One line per record field, e.g. `carat    1.50 ct`.
pub fn format_record(record: &RawRecord) -> String {
    let mut out = String::new();
    for field in NumericField::ALL {
        out.push_str(&format!(
            "{:<8} {:>7.2} {}\n",
            field.name(),
            record.numeric(field),
            field.unit()
        ));
    }
    for field in CategoricalField::ALL {
        out.push_str(&format!("{:<8} {:>7}\n", field.name(), record.categorical(field)));
    }
    out
}

pub fn format_response(response: &PredictResponse) -> String {
    match response {
        PredictResponse::Success {
            predicted_price,
            input_data,
        } => format!(
            "{}\nPredicted price: {}",
            format_record(input_data).trim_end(),
            format_price(*predicted_price)
        ),
        PredictResponse::Error { error_kind, message } => {
            format!("Prediction failed [{}]: {message}", error_kind.as_str())
        }
    }
}

pub fn format_options(options: &CategoryOptions) -> String {
    let mut out = String::new();
    for field in CategoricalField::ALL {
        out.push_str(&format!(
            "{:<8} {}\n",
            field.name(),
            options.for_field(field).join(", ")
        ));
    }
    for field in NumericField::ALL {
        let r = options.range(field);
        out.push_str(&format!(
            "{:<8} {} – {} {} (step {}, default {})\n",
            field.name(),
            r.min,
            r.max,
            field.unit(),
            r.step,
            r.default
        ));
    }
    out
}

/// Summary printed by `gem check`.
pub fn format_artifact_summary(artifacts: &Artifacts, model_location: &str, preprocessor_location: &str) -> String {
    let mut out = String::new();
    out.push_str("=== gem - artifact check ===\n");
    out.push_str(&format!("Model:        {model_location}\n"));
    out.push_str(&format!("Preprocessor: {preprocessor_location}\n"));
    out.push_str(&format!("Estimator:    {}\n", artifacts.model.estimator()));
    out.push_str(&format!("Intercept:    {:.4}\n", artifacts.model.intercept()));
    out.push_str(&format!(
        "Columns ({}): {}\n",
        artifacts.encoder.width(),
        artifacts.encoder.column_names().join(", ")
    ));
    out.push_str("Pairing:      OK\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn price_formatting() {
        assert_eq!(format_price(11037.31877), "$11,037.32");
        assert_eq!(format_price(999.999), "$1,000.00");
        assert_eq!(format_price(0.0), "$0.00");
        assert_eq!(format_price(-7037.9), "-$7,037.90");
        assert_eq!(format_price(1234567.0), "$1,234,567.00");
    }

    #[test]
    fn response_formatting() {
        let ok = PredictResponse::Success {
            predicted_price: 11037.32,
            input_data: RawRecord::example(),
        };
        let text = format_response(&ok);
        assert!(text.contains("clarity      VS1"), "{text}");
        assert!(text.ends_with("Predicted price: $11,037.32"), "{text}");

        let err = PredictResponse::Error {
            error_kind: ErrorKind::ArtifactLoad,
            message: "missing".to_string(),
        };
        assert_eq!(format_response(&err), "Prediction failed [artifact_load]: missing");
    }

    #[test]
    fn options_list_every_field() {
        let text = format_options(&CategoryOptions::current());
        assert_eq!(text.lines().count(), 9);
        assert!(text.starts_with("cut      Fair, Good, Very Good, Premium, Ideal"), "{text}");
    }
}
