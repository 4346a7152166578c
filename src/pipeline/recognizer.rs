use tracing::debug;

use crate::error::Result;
use crate::inference::DigitClassifier;
use crate::preprocess::{downsample, normalize_with, FeatureVector, Normalization};
use crate::raster::RasterFrame;
use crate::score::{self, Classification, Prediction};

/// Runs the full pipeline against one classifier:
/// raster → 28×28 grid → features → logits → prediction.
///
/// Holds no per-request state; share one `Recognizer` across threads.
pub struct Recognizer<'a> {
    classifier: &'a dyn DigitClassifier,
    normalization: Normalization,
}

impl<'a> Recognizer<'a> {
    pub fn new(classifier: &'a dyn DigitClassifier) -> Recognizer<'a> {
        Recognizer { classifier, normalization: Normalization::default() }
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Recognizer<'a> {
        self.normalization = normalization;
        self
    }

    /// Downsamples and normalizes a drawing, then classifies it.
    pub fn predict_raster(&self, frame: &RasterFrame) -> Result<Prediction> {
        self.classify_raster(frame).map(|c| c.prediction)
    }

    /// Classifies 784 raw `[0, 1]` intensities that were downsampled elsewhere.
    /// The length is checked before the model is touched.
    pub fn predict_intensities(&self, intensities: &[f32]) -> Result<Prediction> {
        self.classify_intensities(intensities).map(|c| c.prediction)
    }

    pub fn predict_features(&self, features: &FeatureVector) -> Result<Prediction> {
        self.classify_features(features).map(|c| c.prediction)
    }

    pub fn classify_raster(&self, frame: &RasterFrame) -> Result<Classification> {
        let grid = downsample(frame);
        debug!(
            width = frame.width(),
            height = frame.height(),
            mean_ink = grid.mean(),
            "raster downsampled"
        );
        self.classify_features(&normalize_with(&grid, &self.normalization))
    }

    pub fn classify_intensities(&self, intensities: &[f32]) -> Result<Classification> {
        let features = FeatureVector::from_intensities(intensities, &self.normalization)?;
        self.classify_features(&features)
    }

    pub fn classify_features(&self, features: &FeatureVector) -> Result<Classification> {
        let logits = self.classifier.infer(features)?;
        let classification = score::classify(&logits)?;
        debug!(
            backend = self.classifier.backend(),
            digit = classification.prediction.digit,
            confidence = classification.prediction.confidence,
            "prediction"
        );
        Ok(classification)
    }
}
