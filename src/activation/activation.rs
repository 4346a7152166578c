use serde::{Serialize, Deserialize};
use std::f64::consts::{E, PI};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
    Identity,
    /// Vector-valued; only meaningful through `apply()`.
    Softmax,
    Tanh,
    LeakyReLU { alpha: f64 },
    Elu { alpha: f64 },
    Gelu,
    Swish,
}

impl ActivationFunction {
    /// Applies the activation to a whole layer's pre-activation vector.
    pub fn apply(&self, z: Vec<f64>) -> Vec<f64> {
        match self {
            ActivationFunction::Softmax => softmax(z),
            _ => z.into_iter().map(|x| self.function(x)).collect(),
        }
    }

    /// Element-wise activation. `Softmax` passes values through unchanged
    /// here; use `apply()` for the vector form.
    fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Identity | ActivationFunction::Softmax => x,
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
            ActivationFunction::Elu { alpha } => {
                if x > 0.0 { x } else { alpha * (E.powf(x) - 1.0) }
            }
            ActivationFunction::Gelu => {
                let c = (2.0_f64 / PI).sqrt();
                0.5 * x * (1.0 + (c * (x + 0.044715 * x.powi(3))).tanh())
            }
            ActivationFunction::Swish => x / (1.0 + E.powf(-x)),
        }
    }
}

/// Max-shifted softmax for hidden layers that use it.
fn softmax(z: Vec<f64>) -> Vec<f64> {
    let max = z.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = z.iter().map(|&x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elementwise_variants() {
        let z = vec![-2.0, 0.0, 3.0];
        assert_eq!(ActivationFunction::ReLU.apply(z.clone()), vec![0.0, 0.0, 3.0]);
        assert_eq!(ActivationFunction::Identity.apply(z.clone()), z);
        let leaky = ActivationFunction::LeakyReLU { alpha: 0.1 }.apply(z.clone());
        assert!((leaky[0] + 0.2).abs() < 1e-12);
        let sig = ActivationFunction::Sigmoid.apply(vec![0.0]);
        assert!((sig[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn softmax_is_vector_wise() {
        let p = ActivationFunction::Softmax.apply(vec![1000.0, 1000.0]);
        assert!((p[0] - 0.5).abs() < 1e-12 && (p[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn deserializes_plain_variant_tags() {
        let a: ActivationFunction = serde_json::from_str(r#"{"LeakyReLU":{"alpha":0.01}}"#).unwrap();
        assert_eq!(a, ActivationFunction::LeakyReLU { alpha: 0.01 });
        let s: ActivationFunction = serde_json::from_str(r#""Softmax""#).unwrap();
        assert_eq!(s, ActivationFunction::Softmax);
    }
}
