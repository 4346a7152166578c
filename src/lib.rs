pub mod error;
pub mod config;
pub mod raster;
pub mod preprocess;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod inference;
pub mod score;
pub mod pipeline;

// Convenience re-exports
pub use error::{RecognizeError, Result};
pub use config::{RecognizerConfig, ServerConfig};
pub use raster::{RasterFrame, Rgba};
pub use preprocess::{downsample, normalize, normalize_with, FeatureVector, IntensityGrid, Normalization};
pub use network::{InputType, ModelMetadata, Network};
pub use inference::{DenseClassifier, DigitClassifier, InferenceSession, LogitVector, mock_predict};
pub use score::{interpret, softmax, Classification, Prediction};
pub use pipeline::Recognizer;
