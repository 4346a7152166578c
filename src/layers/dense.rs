use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};

/// One fully connected layer of a pre-trained network.
///
/// `weights` is `input_size × size`, `biases` is `1 × size`, so a forward
/// pass is `a = f(x · W + b)` with `x` a row vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub size: usize,
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction,
}

impl Layer {
    pub fn new(weights: Matrix, biases: Matrix, activation: ActivationFunction) -> Layer {
        Layer {
            size: biases.cols,
            weights,
            biases,
            activator: activation,
        }
    }

    pub fn input_size(&self) -> usize {
        self.weights.rows
    }

    /// `z = x · W + b`, before the activation.
    pub fn pre_activation(&self, input: Vec<f64>) -> Vec<f64> {
        (&Matrix::row_vector(input) * &self.weights + &self.biases).into_row()
    }

    pub fn forward(&self, input: Vec<f64>) -> Vec<f64> {
        self.activator.apply(self.pre_activation(input))
    }

    /// Checks that the stored shapes are internally consistent.
    pub fn check_shape(&self) -> Result<(), String> {
        if !self.weights.is_well_formed() || !self.biases.is_well_formed() {
            return Err("ragged weight or bias matrix".into());
        }
        if self.biases.rows != 1 || self.biases.cols != self.size {
            return Err(format!(
                "bias shape {}x{} does not match layer size {}",
                self.biases.rows, self.biases.cols, self.size
            ));
        }
        if self.weights.cols != self.size {
            return Err(format!(
                "weight shape {}x{} does not match layer size {}",
                self.weights.rows, self.weights.cols, self.size
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_applies_weights_bias_and_activation() {
        let layer = Layer::new(
            Matrix::from_data(vec![vec![1.0, -1.0], vec![2.0, 0.0]]),
            Matrix::row_vector(vec![0.5, 0.0]),
            ActivationFunction::ReLU,
        );
        assert_eq!(layer.pre_activation(vec![1.0, 1.0]), vec![3.5, -1.0]);
        assert_eq!(layer.forward(vec![1.0, 1.0]), vec![3.5, 0.0]);
    }

    #[test]
    fn inconsistent_shapes_are_reported() {
        let mut layer = Layer::new(Matrix::zeros(3, 2), Matrix::zeros(1, 2), ActivationFunction::Identity);
        assert!(layer.check_shape().is_ok());
        layer.size = 4;
        assert!(layer.check_shape().is_err());
    }
}
