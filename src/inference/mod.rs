pub mod classifier;
pub mod dense;
pub mod mock;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod session;

pub use classifier::{DigitClassifier, LogitVector, INPUT_SHAPE, NUM_CLASSES};
pub use dense::DenseClassifier;
pub use mock::{mock_predict, mock_predict_with};
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
pub use session::{InferenceSession, SessionCell};
