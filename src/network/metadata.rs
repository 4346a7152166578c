use serde::{Deserialize, Serialize};

/// Describes how the input fed to a Network was prepared during training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputType {
    /// A flat vector of f64 features with no image layout.
    Numeric,
    /// Grayscale image resized to width×height.
    ImageGrayscale { width: u32, height: u32 },
    /// RGB image resized to width×height, flattened as R,G,B,...
    ImageRgb { width: u32, height: u32 },
}

/// Optional annotations attached to a saved Network.
/// All fields are Option<> so models without metadata deserialize cleanly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub description: Option<String>,
    pub input_type: Option<InputType>,
    /// Human-readable class labels for the output layer (e.g. ["0","1",...,"9"]).
    pub output_labels: Option<Vec<String>>,
}

impl ModelMetadata {
    /// Fails when the metadata declares an input the 28×28 grayscale
    /// pipeline cannot produce.
    pub fn check_digit_input(&self) -> Result<(), String> {
        match &self.input_type {
            None | Some(InputType::Numeric) => Ok(()),
            Some(InputType::ImageGrayscale { width: 28, height: 28 }) => Ok(()),
            Some(other) => Err(format!("model declares unsupported input {:?}", other)),
        }
    }
}
