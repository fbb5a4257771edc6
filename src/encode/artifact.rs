//! Serialized form of the fitted preprocessing transform.
//!
//! The training side writes one entry per output column, in output order. Each
//! entry is standard-scaled after an optional ordinal encoding:
//!
//! ```text
//! numeric:  (value - mean) / scale
//! ordinal:  (index_of(value, categories) - mean) / scale
//! ```
//!
//! Documents carry a `format_version` and unknown keys are refused, so an
//! artifact written by a newer training pipeline fails to load instead of
//! having its extra settings ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncoderArtifact {
    pub format_version: u32,
    pub columns: Vec<ColumnSpec>,
}

impl EncoderArtifact {
    /// The only `format_version` this build understands.
    pub const FORMAT_VERSION: u32 = 1;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnSpec {
    /// Raw record field this column is computed from.
    pub name: String,
    pub transform: ColumnTransform,
    pub mean: f64,
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnTransform {
    Numeric,
    Ordinal { categories: Vec<String> },
}
