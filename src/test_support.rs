//! Fixture artifact pair shared by unit tests.

use crate::encode::EncoderArtifact;
use crate::models::ModelArtifact;

pub const PREPROCESSOR_JSON: &str = include_str!("../tests/fixtures/preprocessor.json");
pub const MODEL_JSON: &str = include_str!("../tests/fixtures/model.json");

/// Encoded `RawRecord::example()` under the fixture preprocessor.
pub const EXAMPLE_FEATURES: [f64; 9] = [
    1.5330244138598799,
    0.6281071346690031,
    0.40249493966158906,
    1.3382536131426999,
    1.251805035320543,
    1.4018335892887728,
    0.903128044485079,
    0.11623001829505464,
    0.42902531775408614,
];

/// Regression baseline for `RawRecord::example()` under the fixture pair.
pub const EXAMPLE_PRICE: f64 = 11037.31877158333;

pub fn encoder_artifact() -> EncoderArtifact {
    serde_json::from_str(PREPROCESSOR_JSON).expect("fixture preprocessor parses")
}

pub fn model_artifact() -> ModelArtifact {
    serde_json::from_str(MODEL_JSON).expect("fixture model parses")
}
