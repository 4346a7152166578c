use serde::{Deserialize, Serialize};

use crate::error::{RecognizeError, Result};
use crate::inference::{LogitVector, NUM_CLASSES};

/// The predicted digit and the softmax probability assigned to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub digit: u8,
    pub confidence: f32,
}

/// A prediction together with the full class distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub prediction: Prediction,
    pub probabilities: [f32; NUM_CLASSES],
}

/// Index of the largest logit; the first index wins ties.
pub fn argmax(logits: &LogitVector) -> usize {
    let scores = logits.as_array();
    let mut best = 0;
    for i in 1..NUM_CLASSES {
        if scores[i] > scores[best] {
            best = i;
        }
    }
    best
}

fn check_finite(logits: &LogitVector) -> Result<()> {
    match logits.as_array().iter().position(|v| !v.is_finite()) {
        Some(i) => Err(RecognizeError::InferenceFailure(format!(
            "non-finite logit {} for class {}", logits.as_array()[i], i
        ))),
        None => Ok(()),
    }
}

/// Softmax over the ten logits.
///
/// Every exponent is taken of `l_i - max`, so no term exceeds `exp(0) = 1`
/// and large logits cannot overflow.
pub fn softmax(logits: &LogitVector) -> Result<[f32; NUM_CLASSES]> {
    check_finite(logits)?;
    let scores = logits.as_array();
    let max = scores[argmax(logits)];

    let mut probs = [0.0f32; NUM_CLASSES];
    let mut sum = 0.0f32;
    for (p, &l) in probs.iter_mut().zip(scores.iter()) {
        *p = (l - max).exp();
        sum += *p;
    }
    for p in probs.iter_mut() {
        *p /= sum;
    }
    Ok(probs)
}

/// Turns raw logits into the winning digit and its probability.
///
/// `confidence = 1 / Σ exp(l_i - l_max)`, which lies in `(0, 1]` and equals 1
/// only when every other class underflows to zero.
pub fn interpret(logits: &LogitVector) -> Result<Prediction> {
    check_finite(logits)?;
    let digit = argmax(logits);
    let scores = logits.as_array();
    let max = scores[digit];
    let exp_sum: f32 = scores.iter().map(|&l| (l - max).exp()).sum();

    Ok(Prediction { digit: digit as u8, confidence: 1.0 / exp_sum })
}

/// [`interpret`] plus the full distribution.
pub fn classify(logits: &LogitVector) -> Result<Classification> {
    Ok(Classification {
        prediction: interpret(logits)?,
        probabilities: softmax(logits)?,
    })
}
