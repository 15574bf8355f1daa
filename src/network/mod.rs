//! Controllers turn a car's radar reading into its three control outputs. The generation loop
//! only sees [Controller]; [Dense] is the network the built-in evolver breeds.

pub mod dense;

pub use dense::Dense;

use serde::{Deserialize, Serialize};

pub mod activate {
    use core::f64::consts::E;

    pub fn steep_sigmoid(x: f64) -> f64 {
        1. / (1. + E.powf(-4.9 * x))
    }

    pub fn sigmoid(x: f64) -> f64 {
        1. / (1. + E.powf(-x))
    }

    pub fn relu(x: f64) -> f64 {
        if x < 0. {
            0.
        } else {
            x
        }
    }

    pub fn tanh(x: f64) -> f64 {
        x.tanh()
    }
}

/// Named activation functions, so they can be picked from config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    SteepSigmoid,
    Sigmoid,
    Relu,
    Tanh,
}

impl Activation {
    #[inline]
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Activation::SteepSigmoid => activate::steep_sigmoid(x),
            Activation::Sigmoid => activate::sigmoid(x),
            Activation::Relu => activate::relu(x),
            Activation::Tanh => activate::tanh(x),
        }
    }
}

/// Anything that can drive: given one distance per probe, produce accelerate, turn left and turn
/// right outputs, in that order.
pub trait Controller {
    fn activate(&mut self, distances: &[f64]) -> [f64; 3];
}

impl<F: FnMut(&[f64]) -> [f64; 3]> Controller for F {
    fn activate(&mut self, distances: &[f64]) -> [f64; 3] {
        self(distances)
    }
}
