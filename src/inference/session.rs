use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::{error, info};

use crate::error::{RecognizeError, Result};
use crate::inference::classifier::{DigitClassifier, LogitVector};
use crate::inference::dense::DenseClassifier;
use crate::preprocess::FeatureVector;

/// A loaded model plus where it came from. Read-only once created.
pub struct InferenceSession {
    classifier: Box<dyn DigitClassifier>,
    model_path: PathBuf,
}

impl std::fmt::Debug for InferenceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceSession")
            .field("backend", &self.classifier.backend())
            .field("model_path", &self.model_path)
            .finish()
    }
}

impl InferenceSession {
    /// Loads a model artifact, picking the backend from the file extension:
    /// `.onnx` runs through tract (feature `onnx`), anything else is read as
    /// a dense JSON network.
    pub fn load(path: &Path) -> Result<InferenceSession> {
        let is_onnx = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case("onnx"));

        let classifier: Box<dyn DigitClassifier> = if is_onnx {
            load_onnx(path)?
        } else {
            Box::new(DenseClassifier::load(path)?)
        };

        Ok(InferenceSession::from_classifier(classifier, path))
    }

    /// Wraps an already-built classifier, e.g. a test stub.
    pub fn from_classifier(classifier: Box<dyn DigitClassifier>, model_path: &Path) -> InferenceSession {
        InferenceSession { classifier, model_path: model_path.to_path_buf() }
    }

    /// The process-wide session. The first call loads `model_path`; every
    /// later call returns the same session (or the same load error) no
    /// matter which path it passes.
    pub fn global(model_path: &Path) -> Result<&'static InferenceSession> {
        static GLOBAL: SessionCell = SessionCell::new();
        GLOBAL.get_or_load(model_path)
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl DigitClassifier for InferenceSession {
    fn infer(&self, features: &FeatureVector) -> Result<LogitVector> {
        self.classifier.infer(features)
    }

    fn backend(&self) -> &'static str {
        self.classifier.backend()
    }
}

#[cfg(feature = "onnx")]
fn load_onnx(path: &Path) -> Result<Box<dyn DigitClassifier>> {
    Ok(Box::new(crate::inference::onnx::OnnxClassifier::load(path)?))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(path: &Path) -> Result<Box<dyn DigitClassifier>> {
    Err(RecognizeError::model_unavailable(
        path,
        "ONNX support is not compiled in; rebuild with `--features onnx`",
    ))
}

/// Exactly-once holder for a session.
///
/// Concurrent first callers block on the same initialization; only one of
/// them runs the loader. A failed load is cached too, so a missing or
/// corrupt artifact stays fatal until the process restarts.
pub struct SessionCell {
    cell: OnceLock<Result<InferenceSession>>,
}

impl SessionCell {
    pub const fn new() -> SessionCell {
        SessionCell { cell: OnceLock::new() }
    }

    pub fn get_or_load(&self, model_path: &Path) -> Result<&InferenceSession> {
        self.get_or_init_with(|| InferenceSession::load(model_path))
    }

    pub fn get_or_init_with<F>(&self, init: F) -> Result<&InferenceSession>
    where
        F: FnOnce() -> Result<InferenceSession>,
    {
        let outcome = self.cell.get_or_init(|| {
            let loaded = init();
            match &loaded {
                Ok(session) => info!(
                    path = %session.model_path.display(),
                    backend = session.backend(),
                    "inference session ready"
                ),
                Err(e) => error!(error = %e, "inference session failed to initialize"),
            }
            loaded
        });

        match outcome {
            Ok(session) => Ok(session),
            Err(RecognizeError::ModelUnavailable(msg)) => Err(RecognizeError::ModelUnavailable(msg.clone())),
            Err(other) => Err(RecognizeError::ModelUnavailable(other.to_string())),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl Default for SessionCell {
    fn default() -> Self {
        SessionCell::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::NUM_CLASSES;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fixed([f32; NUM_CLASSES]);

    impl DigitClassifier for Fixed {
        fn infer(&self, _features: &FeatureVector) -> Result<LogitVector> {
            Ok(LogitVector::new(self.0))
        }

        fn backend(&self) -> &'static str {
            "fixed"
        }
    }

    #[test]
    fn concurrent_first_callers_initialize_once() {
        let cell = Arc::new(SessionCell::new());
        let loads = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cell = Arc::clone(&cell);
                let loads = Arc::clone(&loads);
                std::thread::spawn(move || {
                    let session = cell
                        .get_or_init_with(|| {
                            loads.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(20));
                            Ok(InferenceSession::from_classifier(
                                Box::new(Fixed([0.0; NUM_CLASSES])),
                                Path::new("stub"),
                            ))
                        })
                        .unwrap();
                    session as *const InferenceSession as usize
                })
            })
            .collect();

        let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn load_failure_is_sticky() {
        let cell = SessionCell::new();
        let first = cell.get_or_load(Path::new("/no/such/model.json")).unwrap_err();
        assert_eq!(first.kind(), "model_unavailable");
        assert!(cell.is_initialized());

        // A later caller with a valid loader still sees the first failure.
        let second = cell
            .get_or_init_with(|| Ok(InferenceSession::from_classifier(
                Box::new(Fixed([0.0; NUM_CLASSES])),
                Path::new("stub"),
            )))
            .unwrap_err();
        assert_eq!(first, second);
    }

    #[test]
    fn onnx_extension_selects_onnx_backend() {
        let err = InferenceSession::load(Path::new("/no/such/model.ONNX")).unwrap_err();
        assert_eq!(err.kind(), "model_unavailable");
        assert!(err.to_string().contains("model.ONNX"));
    }

    #[test]
    fn session_delegates_to_its_classifier() {
        let mut scores = [0.0; NUM_CLASSES];
        scores[6] = 3.0;
        let session = InferenceSession::from_classifier(Box::new(Fixed(scores)), Path::new("stub"));
        let features = FeatureVector::from_normalized(vec![0.0; crate::preprocess::GRID_LEN]).unwrap();
        assert_eq!(session.infer(&features).unwrap().as_array()[6], 3.0);
        assert_eq!(session.backend(), "fixed");
    }
}
