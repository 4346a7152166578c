use std::path::Path;

use tract_onnx::prelude::*;
use tracing::debug;

use crate::error::{RecognizeError, Result};
use crate::inference::classifier::{DigitClassifier, LogitVector, INPUT_SHAPE};
use crate::preprocess::FeatureVector;

type OnnxPlan = RunnableModel<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// An ONNX digit model (e.g. the model zoo's `mnist-8.onnx`) executed with tract.
pub struct OnnxClassifier {
    plan: OnnxPlan,
}

impl OnnxClassifier {
    /// Loads, pins the input to `f32 [1, 1, 28, 28]`, optimizes and plans the graph.
    pub fn load(path: &Path) -> Result<OnnxClassifier> {
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact(INPUT_SHAPE).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| RecognizeError::model_unavailable(path, e))?;
        debug!(path = %path.display(), "onnx model planned");
        Ok(OnnxClassifier { plan })
    }
}

impl DigitClassifier for OnnxClassifier {
    fn infer(&self, features: &FeatureVector) -> Result<LogitVector> {
        let [n, c, h, w] = INPUT_SHAPE;
        let input: Tensor = tract_ndarray::Array4::from_shape_vec((n, c, h, w), features.as_slice().to_vec())
            .map_err(|e| RecognizeError::inference("reshaping features", e))?
            .into();

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| RecognizeError::inference("onnx forward pass", e))?;
        let first = outputs
            .first()
            .ok_or_else(|| RecognizeError::InferenceFailure("model produced no outputs".into()))?;
        let view = first
            .to_array_view::<f32>()
            .map_err(|e| RecognizeError::inference("reading output tensor", e))?;

        let flat: Vec<f32> = view.iter().copied().collect();
        LogitVector::from_slice(&flat)
    }

    fn backend(&self) -> &'static str {
        "onnx"
    }
}
