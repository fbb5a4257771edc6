//! Linear regression model evaluation.
//!
//! The training side compared several linear estimators (ordinary least
//! squares and its L1/L2/elastic-net regularized variants). Once fit, all of
//! them evaluate the same way:
//!
//! ```text
//! price = intercept + Σ coefficient_i * feature_i
//! ```

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::domain::FeatureVector;
use crate::error::PredictError;

/// Serialized form of a fitted linear estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelArtifact {
    pub format_version: u32,
    /// Which estimator produced the coefficients (informational).
    pub estimator: String,
    /// Input column names, in the order the coefficients expect them.
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl ModelArtifact {
    /// The only `format_version` this build understands.
    pub const FORMAT_VERSION: u32 = 1;
}

/// A validated, immutable linear regressor.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    estimator: String,
    feature_names: Vec<String>,
    coefficients: DVector<f64>,
    intercept: f64,
}

impl LinearModel {
    pub fn from_artifact(artifact: &ModelArtifact) -> Result<Self, String> {
        if artifact.format_version != ModelArtifact::FORMAT_VERSION {
            return Err(format!(
                "unsupported format_version {} (expected {})",
                artifact.format_version,
                ModelArtifact::FORMAT_VERSION
            ));
        }
        if artifact.coefficients.is_empty() {
            return Err("model has no coefficients".to_string());
        }
        if artifact.feature_names.len() != artifact.coefficients.len() {
            return Err(format!(
                "{} feature names but {} coefficients",
                artifact.feature_names.len(),
                artifact.coefficients.len()
            ));
        }
        if let Some(i) = artifact.coefficients.iter().position(|c| !c.is_finite()) {
            return Err(format!("coefficient for `{}` is not finite", artifact.feature_names[i]));
        }
        if !artifact.intercept.is_finite() {
            return Err("intercept is not finite".to_string());
        }

        Ok(Self {
            estimator: artifact.estimator.clone(),
            feature_names: artifact.feature_names.clone(),
            coefficients: DVector::from_column_slice(&artifact.coefficients),
            intercept: artifact.intercept,
        })
    }

    pub fn estimator(&self) -> &str {
        &self.estimator
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Evaluate the model on one encoded record.
    ///
    /// The raw output is returned as-is: no clamping or rounding.
    pub fn predict(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        if features.len() != self.n_features() {
            return Err(PredictError::inference(format!(
                "feature vector has {} columns, model expects {}",
                features.len(),
                self.n_features()
            )));
        }

        let y = self.coefficients.dot(features.as_vector()) + self.intercept;
        if !y.is_finite() {
            return Err(PredictError::inference(format!("model produced a non-finite output ({y})")));
        }
        Ok(y)
    }
}
