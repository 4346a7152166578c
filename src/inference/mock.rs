use rand::Rng;

use crate::error::{RecognizeError, Result};
use crate::preprocess::GRID_LEN;
use crate::score::Prediction;

/// Lower bound of the fabricated confidence band.
pub const MOCK_CONFIDENCE_MIN: f32 = 0.85;
/// Width of the fabricated confidence band.
pub const MOCK_CONFIDENCE_SPAN: f32 = 0.14;

/// Stand-in for environments without a model.
///
/// Takes the same 784 raw intensities as the real route and returns the same
/// shape, but the digit comes from the mean intensity and the confidence is
/// random in `[0.85, 0.99)`. It is not meant to agree with a real model.
pub fn mock_predict(intensities: &[f32]) -> Result<Prediction> {
    mock_predict_with(&mut rand::thread_rng(), intensities)
}

pub fn mock_predict_with<R: Rng + ?Sized>(rng: &mut R, intensities: &[f32]) -> Result<Prediction> {
    if intensities.len() != GRID_LEN {
        return Err(RecognizeError::InvalidInputShape {
            expected: GRID_LEN,
            actual: intensities.len(),
        });
    }
    let avg = intensities.iter().sum::<f32>() / GRID_LEN as f32;
    let digit = ((avg * 10.0).floor().clamp(0.0, 9.0) as u8) % 10;
    let confidence = MOCK_CONFIDENCE_MIN + rng.gen::<f32>() * MOCK_CONFIDENCE_SPAN;
    Ok(Prediction { digit, confidence })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn digit_tracks_mean_intensity() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(mock_predict_with(&mut rng, &[0.0; GRID_LEN]).unwrap().digit, 0);
        assert_eq!(mock_predict_with(&mut rng, &[0.35; GRID_LEN]).unwrap().digit, 3);
        assert_eq!(mock_predict_with(&mut rng, &[1.0; GRID_LEN]).unwrap().digit, 9);
    }

    #[test]
    fn confidence_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let p = mock_predict_with(&mut rng, &[0.2; GRID_LEN]).unwrap();
            assert!(p.confidence >= 0.85 && p.confidence < 0.99 + 1e-6);
        }
    }

    #[test]
    fn shares_the_shape_contract() {
        let err = mock_predict(&[0.0; 783]).unwrap_err();
        assert_eq!(err, RecognizeError::InvalidInputShape { expected: 784, actual: 783 });
    }
}
