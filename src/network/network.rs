use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::layers::dense::Layer;
use crate::network::metadata::ModelMetadata;

/// A pre-trained, fixed-topology fully connected network.
///
/// Read-only after loading: every method takes `&self`, so one instance can
/// serve concurrent requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub metadata: Option<ModelMetadata>,
}

impl Network {
    pub fn new(layers: Vec<Layer>) -> Network {
        Network { layers, metadata: None }
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, Layer::input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |l| l.size)
    }

    /// Full forward pass including the output activation.
    pub fn forward(&self, input: Vec<f64>) -> Vec<f64> {
        self.layers.iter().fold(input, |current, layer| layer.forward(current))
    }

    /// Forward pass that stops before a trailing `Softmax`, returning raw
    /// class scores. Any other output activation is applied as usual.
    pub fn logits(&self, input: Vec<f64>) -> Vec<f64> {
        let Some((last, hidden)) = self.layers.split_last() else {
            return input;
        };
        let current = hidden.iter().fold(input, |current, layer| layer.forward(current));
        match last.activator {
            ActivationFunction::Softmax => last.pre_activation(current),
            _ => last.forward(current),
        }
    }

    /// Verifies every layer's shape and that consecutive layers chain.
    pub fn check_topology(&self) -> Result<(), String> {
        if self.layers.is_empty() {
            return Err("model has no layers".into());
        }
        for (i, layer) in self.layers.iter().enumerate() {
            layer.check_shape().map_err(|e| format!("layer {}: {}", i, e))?;
            if i > 0 && layer.input_size() != self.layers[i - 1].size {
                return Err(format!(
                    "layer {} expects {} inputs but layer {} emits {}",
                    i, layer.input_size(), i - 1, self.layers[i - 1].size
                ));
            }
        }
        Ok(())
    }

    /// Serializes the network weights to a pretty-printed JSON file.
    pub fn save_json(&self, path: &std::path::Path) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json(path: &std::path::Path) -> std::io::Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::matrix::Matrix;

    fn two_layer(output: ActivationFunction) -> Network {
        Network::new(vec![
            Layer::new(
                Matrix::from_data(vec![vec![1.0, 0.0], vec![0.0, 1.0]]),
                Matrix::row_vector(vec![0.0, 0.0]),
                ActivationFunction::ReLU,
            ),
            Layer::new(
                Matrix::from_data(vec![vec![2.0, 0.0], vec![0.0, 1.0]]),
                Matrix::row_vector(vec![0.0, 1.0]),
                output,
            ),
        ])
    }

    #[test]
    fn logits_skip_trailing_softmax() {
        let net = two_layer(ActivationFunction::Softmax);
        assert_eq!(net.logits(vec![1.0, -3.0]), vec![2.0, 1.0]);
        let probs = net.forward(vec![1.0, -3.0]);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn logits_keep_other_output_activations() {
        let net = two_layer(ActivationFunction::Identity);
        assert_eq!(net.logits(vec![1.0, -3.0]), net.forward(vec![1.0, -3.0]));
    }

    #[test]
    fn broken_chain_is_reported() {
        let mut net = two_layer(ActivationFunction::Identity);
        assert!(net.check_topology().is_ok());
        net.layers[1].weights = Matrix::zeros(3, 2);
        let err = net.check_topology().unwrap_err();
        assert!(err.contains("layer 1 expects 3 inputs"), "{}", err);
        assert!(Network::new(vec![]).check_topology().is_err());
    }

    #[test]
    fn json_round_trip_keeps_weights_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.json");
        let mut net = two_layer(ActivationFunction::Softmax);
        net.metadata = Some(ModelMetadata {
            description: Some("toy".into()),
            ..Default::default()
        });
        net.save_json(&path).unwrap();

        let loaded = Network::load_json(&path).unwrap();
        assert_eq!(loaded.layers[1].weights, net.layers[1].weights);
        assert_eq!(loaded.metadata.unwrap().description.as_deref(), Some("toy"));
    }

    #[test]
    fn metadata_is_optional_on_disk() {
        let json = r#"{"layers":[{"size":1,"weights":{"rows":1,"cols":1,"data":[[2.0]]},
            "biases":{"rows":1,"cols":1,"data":[[0.0]]},"activator":"Identity"}]}"#;
        let net: Network = serde_json::from_str(json).unwrap();
        assert!(net.metadata.is_none());
        assert_eq!(net.logits(vec![1.5]), vec![3.0]);
    }
}
