use serde::{Deserialize, Serialize};

use crate::error::{RecognizeError, Result};
use crate::preprocess::downsample::{IntensityGrid, GRID_LEN};

/// Dataset mean of MNIST pixel intensities.
pub const MNIST_MEAN: f32 = 0.1307;
/// Dataset standard deviation of MNIST pixel intensities.
pub const MNIST_STD: f32 = 0.3081;

/// z-score constants applied before inference.
///
/// They must match whatever the loaded model was trained with; the defaults
/// are the MNIST statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Normalization {
    pub mean: f32,
    pub std: f32,
}

impl Default for Normalization {
    fn default() -> Self {
        Normalization { mean: MNIST_MEAN, std: MNIST_STD }
    }
}

impl Normalization {
    #[inline]
    pub fn apply(&self, x: f32) -> f32 {
        (x - self.mean) / self.std
    }
}

/// Exactly 784 normalized features in grid order, ready for the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f32>,
}

impl FeatureVector {
    /// Wraps values that are already normalized.
    ///
    /// Any length other than 784 is rejected; nothing is padded or truncated.
    pub fn from_normalized(values: Vec<f32>) -> Result<FeatureVector> {
        if values.len() != GRID_LEN {
            return Err(RecognizeError::InvalidInputShape {
                expected: GRID_LEN,
                actual: values.len(),
            });
        }
        Ok(FeatureVector { values })
    }

    /// Normalizes raw `[0, 1]` intensities, such as a client-side downsampled
    /// canvas. The length is checked before any arithmetic.
    pub fn from_intensities(values: &[f32], norm: &Normalization) -> Result<FeatureVector> {
        if values.len() != GRID_LEN {
            return Err(RecognizeError::InvalidInputShape {
                expected: GRID_LEN,
                actual: values.len(),
            });
        }
        Ok(FeatureVector { values: values.iter().map(|&v| norm.apply(v)).collect() })
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Normalizes a grid with the MNIST constants.
pub fn normalize(grid: &IntensityGrid) -> FeatureVector {
    normalize_with(grid, &Normalization::default())
}

/// Elementwise `(x - mean) / std`. Negative outputs are expected and kept.
pub fn normalize_with(grid: &IntensityGrid, norm: &Normalization) -> FeatureVector {
    FeatureVector {
        values: grid.as_slice().iter().map(|&v| norm.apply(v)).collect(),
    }
}
