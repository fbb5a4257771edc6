//! Decode and pair the model/preprocessor artifacts.
//!
//! Every failure here (missing file, unreadable bytes, bad JSON, failed
//! validation, mismatched pair) becomes `PredictError::ArtifactLoad`. There is
//! no fallback model.

use std::time::Instant;

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::encode::{EncoderArtifact, FeatureEncoder};
use crate::error::PredictError;
use crate::io::store::{ArtifactKind, ArtifactStore};
use crate::models::{LinearModel, ModelArtifact};

/// A validated encoder/model pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifacts {
    pub encoder: FeatureEncoder,
    pub model: LinearModel,
}

/// Read both artifacts from `store`, validate them, and check they line up.
pub fn load_artifacts(store: &dyn ArtifactStore) -> Result<Artifacts, PredictError> {
    let started = Instant::now();

    let encoder_artifact: EncoderArtifact = read_json(store, ArtifactKind::Preprocessor)?;
    let encoder = FeatureEncoder::from_artifact(&encoder_artifact)
        .map_err(|msg| load_error(store, ArtifactKind::Preprocessor, msg))?;

    let model_artifact: ModelArtifact = read_json(store, ArtifactKind::Model)?;
    let model =
        LinearModel::from_artifact(&model_artifact).map_err(|msg| load_error(store, ArtifactKind::Model, msg))?;

    check_pairing(&encoder, &model).map_err(|msg| load_error(store, ArtifactKind::Model, msg))?;

    info!(
        model = %store.location(ArtifactKind::Model),
        preprocessor = %store.location(ArtifactKind::Preprocessor),
        estimator = model.estimator(),
        features = model.n_features(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "loaded artifact pair"
    );

    Ok(Artifacts { encoder, model })
}

/// The model's input columns must be exactly the encoder's output columns, in
/// the same order. A reordering here would silently produce wrong prices.
pub fn check_pairing(encoder: &FeatureEncoder, model: &LinearModel) -> Result<(), String> {
    let encoded = encoder.column_names();
    let expected: Vec<&str> = model.feature_names().iter().map(String::as_str).collect();
    if encoded != expected {
        return Err(format!(
            "model expects columns [{}] but preprocessor produces [{}]",
            expected.join(", "),
            encoded.join(", ")
        ));
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(store: &dyn ArtifactStore, kind: ArtifactKind) -> Result<T, PredictError> {
    let bytes = store
        .read(kind)
        .map_err(|e| load_error(store, kind, format!("read failed: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| load_error(store, kind, format!("invalid JSON: {e}")))
}

fn load_error(store: &dyn ArtifactStore, kind: ArtifactKind, message: impl Into<String>) -> PredictError {
    let err = PredictError::artifact_load(kind.label(), store.location(kind), message);
    warn!(error = %err, "artifact load failed");
    err
}
