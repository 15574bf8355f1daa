use super::{Activation, Controller};
use crate::serialize::{deserialize_layers, serialize_layers};
use rulinalg::matrix::{BaseMatrix, BaseMatrixMut, Matrix};
use serde::{Deserialize, Serialize};

/// A fixed-topology feed-forward network. Each layer is an `(inputs + 1) x outputs` matrix, the
/// extra row weighting a constant bias input of 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dense {
    #[serde(
        serialize_with = "serialize_layers",
        deserialize_with = "deserialize_layers"
    )]
    layers: Vec<Matrix<f64>>,
    activation: Activation,
}

impl Dense {
    /// Layers must chain, each one taking the previous one's outputs plus a bias
    pub fn new(layers: Vec<Matrix<f64>>, activation: Activation) -> Self {
        debug_assert!(layers.windows(2).all(|w| w[0].cols() + 1 == w[1].rows()));
        Self { layers, activation }
    }

    pub fn sensory(&self) -> usize {
        self.layers.first().map_or(0, |m| m.rows() - 1)
    }

    pub fn action(&self) -> usize {
        self.layers.last().map_or(0, |m| m.cols())
    }

    pub fn layers(&self) -> &[Matrix<f64>] {
        &self.layers
    }

    /// Feed `input` through every layer. Input must be sized to [Dense::sensory]
    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        debug_assert_eq!(input.len(), self.sensory());
        let σ = |x: f64| self.activation.apply(x);

        self.layers.iter().fold(input.to_vec(), |mut x, layer| {
            x.push(1.);
            let n = x.len();
            (Matrix::new(1, n, x) * layer).apply(&σ).into_vec()
        })
    }
}

impl Controller for Dense {
    fn activate(&mut self, distances: &[f64]) -> [f64; 3] {
        let out = self.forward(distances);
        let mut actions = [0.; 3];
        for (slot, v) in actions.iter_mut().zip(out) {
            *slot = v;
        }
        actions
    }
}
