//! Error types.
//!
//! - `PredictError` is the typed failure of the inference core. Callers branch
//!   on `kind()` instead of matching message strings.
//! - `AppError` is the process-level error carried up to `main`, with the exit
//!   code to report.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single prediction (or of artifact acquisition behind it).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    /// The record violates the data-model invariants (non-finite or negative
    /// numeric field, malformed payload).
    #[error("invalid input for `{field}`: {message}")]
    InvalidInput { field: String, message: String },

    /// A categorical value outside the encoder's stored mapping.
    ///
    /// A specialization of invalid input: it points at drift between what a
    /// client offers and what the encoder was fit on.
    #[error("unknown category {value:?} for `{field}` (expected one of: {})", allowed.join(", "))]
    UnknownCategory {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    /// The model or encoder artifact could not be read, decoded, or paired.
    #[error("failed to load {artifact} artifact from {location}: {message}")]
    ArtifactLoad {
        artifact: String,
        location: String,
        message: String,
    },

    /// The loaded model failed while evaluating an encoded record.
    #[error("inference failed: {message}")]
    Inference { message: String },
}

/// Failure class, as exposed to boundary callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    UnknownCategory,
    ArtifactLoad,
    Inference,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::UnknownCategory => "unknown_category",
            ErrorKind::ArtifactLoad => "artifact_load",
            ErrorKind::Inference => "inference",
        }
    }

    /// Process exit code when this failure ends a CLI command.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::InvalidInput | ErrorKind::UnknownCategory => 2,
            ErrorKind::ArtifactLoad => 3,
            ErrorKind::Inference => 4,
        }
    }
}

impl PredictError {
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn artifact_load(
        artifact: impl Into<String>,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ArtifactLoad {
            artifact: artifact.into(),
            location: location.into(),
            message: message.into(),
        }
    }

    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictError::InvalidInput { .. } => ErrorKind::InvalidInput,
            PredictError::UnknownCategory { .. } => ErrorKind::UnknownCategory,
            PredictError::ArtifactLoad { .. } => ErrorKind::ArtifactLoad,
            PredictError::Inference { .. } => ErrorKind::Inference,
        }
    }

    /// True for every input defect, including unknown categories.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            PredictError::InvalidInput { .. } | PredictError::UnknownCategory { .. }
        )
    }

    /// Input defects are fixable by the caller; system defects are not.
    pub fn is_caller_correctable(&self) -> bool {
        self.is_invalid_input()
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        AppError::new(err.kind().exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
