use std::path::Path;

use tracing::debug;

use crate::error::{RecognizeError, Result};
use crate::inference::classifier::{DigitClassifier, LogitVector, NUM_CLASSES};
use crate::network::Network;
use crate::preprocess::{FeatureVector, GRID_LEN};

/// A JSON-serialized fully connected network used as the digit model.
///
/// The network sees the 1×1×28×28 input flattened row-major, which is the
/// order `FeatureVector` already stores.
#[derive(Debug)]
pub struct DenseClassifier {
    network: Network,
}

impl DenseClassifier {
    /// Wraps a network after checking it maps 784 inputs to 10 outputs.
    pub fn new(network: Network) -> std::result::Result<DenseClassifier, String> {
        network.check_topology()?;
        if network.input_size() != GRID_LEN {
            return Err(format!(
                "model expects {} inputs, the digit pipeline produces {}",
                network.input_size(), GRID_LEN
            ));
        }
        if network.output_size() != NUM_CLASSES {
            return Err(format!(
                "model emits {} outputs, expected {}",
                network.output_size(), NUM_CLASSES
            ));
        }
        if let Some(meta) = &network.metadata {
            meta.check_digit_input()?;
        }
        Ok(DenseClassifier { network })
    }

    pub fn load(path: &Path) -> Result<DenseClassifier> {
        let network = Network::load_json(path)
            .map_err(|e| RecognizeError::model_unavailable(path, e))?;
        let layers = network.layers.len();
        let classifier = DenseClassifier::new(network)
            .map_err(|e| RecognizeError::model_unavailable(path, e))?;
        debug!(path = %path.display(), layers, "dense model loaded");
        Ok(classifier)
    }

    pub fn network(&self) -> &Network {
        &self.network
    }
}

impl DigitClassifier for DenseClassifier {
    fn infer(&self, features: &FeatureVector) -> Result<LogitVector> {
        let input = features.as_slice().iter().map(|&v| v as f64).collect();
        let output: Vec<f32> = self.network.logits(input).into_iter().map(|v| v as f32).collect();
        LogitVector::from_slice(&output)
    }

    fn backend(&self) -> &'static str {
        "dense"
    }
}
