//! Inference pipeline shared by the CLI, the HTTP server and the TUI.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! artifact acquisition -> encode -> model invocation -> raw scalar
//!
//! The front-ends focus on presentation (rounding, JSON envelopes, widgets).
//!
//! Lifecycle: `Unloaded -> Loaded`, never back. Acquisition happens at most
//! once successfully per pipeline; concurrent first callers block on the
//! in-flight load. A failed acquisition leaves the pipeline `Unloaded`, so the
//! next call reads storage again and reports the current error.

use std::path::PathBuf;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::domain::{FeatureVector, RawRecord};
use crate::error::PredictError;
use crate::io::{ArtifactStore, Artifacts, FsArtifactStore, load_artifacts};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Unloaded,
    Loaded,
}

impl PipelineState {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineState::Unloaded => "unloaded",
            PipelineState::Loaded => "loaded",
        }
    }
}

/// Owns the artifact handle and runs single-record inference.
pub struct PredictPipeline {
    store: Box<dyn ArtifactStore>,
    artifacts: OnceCell<Artifacts>,
}

impl PredictPipeline {
    pub fn new(store: impl ArtifactStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            artifacts: OnceCell::new(),
        }
    }

    pub fn from_paths(model: impl Into<PathBuf>, preprocessor: impl Into<PathBuf>) -> Self {
        Self::new(FsArtifactStore::new(model, preprocessor))
    }

    pub fn state(&self) -> PipelineState {
        if self.artifacts.get().is_some() {
            PipelineState::Loaded
        } else {
            PipelineState::Unloaded
        }
    }

    /// Acquire the artifact pair if not already held.
    ///
    /// Called implicitly by `predict`; call it at startup for eager loading.
    pub fn load(&self) -> Result<&Artifacts, PredictError> {
        self.artifacts.get_or_try_init(|| load_artifacts(self.store.as_ref()))
    }

    /// Encode a record without running the model.
    pub fn encode(&self, record: &RawRecord) -> Result<FeatureVector, PredictError> {
        self.load()?.encoder.encode(record)
    }

    /// Run the model directly on an already-encoded vector.
    pub fn predict_features(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        self.load()?.model.predict(features)
    }

    /// Predict the price of one record.
    ///
    /// Returns the model's raw output. Presentation rounding belongs to the caller.
    pub fn predict(&self, record: &RawRecord) -> Result<f64, PredictError> {
        let artifacts = self.load()?;
        let features = artifacts.encoder.encode(record)?;
        let price = artifacts.model.predict(&features)?;
        debug!(
            carat = record.carat,
            cut = %record.cut,
            color = %record.color,
            clarity = %record.clarity,
            price,
            "prediction"
        );
        Ok(price)
    }
}

impl Default for PredictPipeline {
    fn default() -> Self {
        Self::new(FsArtifactStore::default())
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::io::ArtifactKind;
    use crate::test_support::{EXAMPLE_PRICE, MODEL_JSON, PREPROCESSOR_JSON};

    #[derive(Clone, Default)]
    struct FlakyStore {
        reads: Arc<AtomicUsize>,
        available: Arc<std::sync::atomic::AtomicBool>,
    }

    impl ArtifactStore for FlakyStore {
        fn read(&self, kind: ArtifactKind) -> io::Result<Vec<u8>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if !self.available.load(Ordering::SeqCst) {
                return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "storage offline"));
            }
            Ok(match kind {
                ArtifactKind::Model => MODEL_JSON.as_bytes().to_vec(),
                ArtifactKind::Preprocessor => PREPROCESSOR_JSON.as_bytes().to_vec(),
            })
        }

        fn location(&self, kind: ArtifactKind) -> String {
            format!("flaky:{}", kind.label())
        }
    }

    #[test]
    fn predicts_baseline_and_transitions_to_loaded() {
        let store = FlakyStore::default();
        store.available.store(true, Ordering::SeqCst);
        let pipeline = PredictPipeline::new(store.clone());
        assert_eq!(pipeline.state(), PipelineState::Unloaded);

        let price = pipeline.predict(&RawRecord::example()).unwrap();
        assert!((price - EXAMPLE_PRICE).abs() < 1e-6, "got {price}");
        assert_eq!(pipeline.state(), PipelineState::Loaded);

        pipeline.predict(&RawRecord::example()).unwrap();
        assert_eq!(store.reads.load(Ordering::SeqCst), 2, "one read per artifact");
    }

    #[test]
    fn failed_load_stays_unloaded_and_retries() {
        let store = FlakyStore::default();
        let pipeline = PredictPipeline::new(store.clone());

        for _ in 0..3 {
            let err = pipeline.predict(&RawRecord::example()).unwrap_err();
            assert!(matches!(err, PredictError::ArtifactLoad { .. }), "{err:?}");
            assert_eq!(pipeline.state(), PipelineState::Unloaded);
        }
        assert_eq!(store.reads.load(Ordering::SeqCst), 3);

        store.available.store(true, Ordering::SeqCst);
        assert!(pipeline.predict(&RawRecord::example()).is_ok());
        assert_eq!(pipeline.state(), PipelineState::Loaded);
    }

    #[test]
    fn input_errors_do_not_disturb_loaded_state() {
        let store = FlakyStore::default();
        store.available.store(true, Ordering::SeqCst);
        let pipeline = PredictPipeline::new(store);

        let mut bad = RawRecord::example();
        bad.clarity = "FL".to_string();
        assert!(pipeline.predict(&bad).unwrap_err().is_invalid_input());
        assert_eq!(pipeline.state(), PipelineState::Loaded);
    }
}
