use crate::error::{RecognizeError, Result};
use crate::preprocess::FeatureVector;

/// Number of digit classes emitted by every classifier.
pub const NUM_CLASSES: usize = 10;

/// Input tensor layout: batch, channels, height, width.
pub const INPUT_SHAPE: [usize; 4] = [1, 1, 28, 28];

/// Raw, unnormalized per-class scores in class order 0..9.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogitVector {
    scores: [f32; NUM_CLASSES],
}

impl LogitVector {
    pub fn new(scores: [f32; NUM_CLASSES]) -> LogitVector {
        LogitVector { scores }
    }

    /// Validates a backend's flattened output. A wrong length means the model
    /// returned something malformed, which is an inference failure rather
    /// than a caller mistake.
    pub fn from_slice(values: &[f32]) -> Result<LogitVector> {
        let scores: [f32; NUM_CLASSES] = values.try_into().map_err(|_| {
            RecognizeError::InferenceFailure(format!(
                "model returned {} scores, expected {}", values.len(), NUM_CLASSES
            ))
        })?;
        Ok(LogitVector { scores })
    }

    pub fn as_array(&self) -> &[f32; NUM_CLASSES] {
        &self.scores
    }
}

/// Anything that can map a normalized 28×28 image to ten class logits.
///
/// Implementations must be safe to call concurrently from many request
/// threads through a shared reference.
pub trait DigitClassifier: Send + Sync {
    /// Runs the model on one image. `features` has already been length
    /// checked; implementations reshape it to [`INPUT_SHAPE`].
    fn infer(&self, features: &FeatureVector) -> Result<LogitVector>;

    /// Short backend label used in logs.
    fn backend(&self) -> &'static str;
}

impl<T: DigitClassifier + ?Sized> DigitClassifier for &T {
    fn infer(&self, features: &FeatureVector) -> Result<LogitVector> {
        (**self).infer(features)
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}

impl<T: DigitClassifier + ?Sized> DigitClassifier for Box<T> {
    fn infer(&self, features: &FeatureVector) -> Result<LogitVector> {
        (**self).infer(features)
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_model_output_is_rejected() {
        let err = LogitVector::from_slice(&[0.0; 9]).unwrap_err();
        assert_eq!(err.kind(), "inference_failure");
        assert!(LogitVector::from_slice(&[0.0; 11]).is_err());
        let ok = LogitVector::from_slice(&[1.0; 10]).unwrap();
        assert_eq!(ok.as_array()[9], 1.0);
    }

    #[test]
    fn input_shape_holds_one_grid() {
        assert_eq!(INPUT_SHAPE.iter().product::<usize>(), crate::preprocess::GRID_LEN);
    }
}
