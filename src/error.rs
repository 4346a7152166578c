use thiserror::Error;

/// Convenient result alias for recognition operations.
pub type Result<T> = std::result::Result<T, RecognizeError>;

/// Every way a prediction request can fail.
///
/// Each variant maps to a stable machine-readable kind (see [`RecognizeError::kind`])
/// so that transport layers can tell caller mistakes apart from model failures
/// without matching on message text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecognizeError {
    /// A feature or intensity vector had the wrong number of elements.
    #[error("expected {expected} values (28x28), got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },

    /// The raster could not be built or decoded.
    #[error("invalid raster: {0}")]
    InvalidRaster(String),

    /// The model artifact was missing or corrupt when the session was created.
    /// Sticky for the lifetime of the process.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// The backend errored, returned a malformed result, or produced
    /// non-finite scores.
    #[error("inference failed: {0}")]
    InferenceFailure(String),

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl RecognizeError {
    pub fn kind(&self) -> &'static str {
        match self {
            RecognizeError::InvalidInputShape { .. } => "invalid_input_shape",
            RecognizeError::InvalidRaster(_)         => "invalid_raster",
            RecognizeError::ModelUnavailable(_)      => "model_unavailable",
            RecognizeError::InferenceFailure(_)      => "inference_failure",
            RecognizeError::Config(_)                => "config",
        }
    }

    /// True for errors the caller can fix by resubmitting different input.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            RecognizeError::InvalidInputShape { .. } | RecognizeError::InvalidRaster(_)
        )
    }

    #[cfg(feature = "onnx")]
    pub(crate) fn inference(context: &str, err: impl std::fmt::Display) -> Self {
        RecognizeError::InferenceFailure(format!("{}: {}", context, err))
    }

    pub(crate) fn model_unavailable(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        RecognizeError::ModelUnavailable(format!("{}: {}", path.display(), err))
    }
}
