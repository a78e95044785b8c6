use crate::error::MlError;
use crate::recorder::Recorder;
use crate::tensor::Tensor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A fully connected neural network layer.
#[derive(Clone, Debug)]
pub struct Dense {
    /// The weight matrix for the layer, laid out `[out_dim, in_dim]`.
    pub w: Tensor,
    /// The bias vector for the layer.
    pub b: Tensor,
    /// The number of input dimensions.
    pub in_dim: usize,
    /// The number of output dimensions.
    pub out_dim: usize,
}

impl Dense {
    /// Creates a new `Dense` layer with the given weights and biases.
    ///
    /// `weights` holds `out_d * in_d` values row by row, `bias` holds `out_d`.
    pub fn new(weights: Vec<f32>, bias: Vec<f32>, in_d: usize, out_d: usize) -> Result<Self, MlError> {
        Ok(Self {
            w: Tensor::from_vec(vec![out_d, in_d], weights)?.with_grad(),
            b: Tensor::from_vec(vec![out_d], bias)?.with_grad(),
            in_dim: in_d,
            out_dim: out_d,
        })
    }

    /// Draws weights and biases uniformly from `[low, high)`.
    pub fn uniform(in_d: usize, out_d: usize, low: f32, high: f32, rng: &mut fastrand::Rng) -> Self {
        let mut draw = || low + (high - low) * rng.f32();
        let weights = (0..in_d * out_d).map(|_| draw()).collect();
        let bias = (0..out_d).map(|_| draw()).collect();
        Self {
            w: Tensor::raw(vec![out_d, in_d], weights).with_grad(),
            b: Tensor::raw(vec![out_d], bias).with_grad(),
            in_dim: in_d,
            out_dim: out_d,
        }
    }

    /// Performs the forward pass on a `[batch, in_dim]` input.
    pub fn forward(&self, x: &Tensor, recorder: &mut impl Recorder) -> Result<Tensor, MlError> {
        let wx = self.w.matmul(x, recorder)?;
        wx.add_broadcast(&self.b, recorder)
    }

    pub fn params(&self) -> [&Tensor; 2] {
        [&self.w, &self.b]
    }

    pub fn params_mut(&mut self) -> [&mut Tensor; 2] {
        [&mut self.w, &mut self.b]
    }
}

/// Nonlinearity applied between stacked layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    #[serde(alias = "none")]
    Identity,
    Relu,
    Tanh,
}

impl Activation {
    pub fn apply(self, x: Tensor, recorder: &mut impl Recorder) -> Tensor {
        match self {
            Activation::Identity => x,
            Activation::Relu => x.relu(recorder),
            Activation::Tanh => x.tanh(recorder),
        }
    }
}

impl FromStr for Activation {
    type Err = MlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "identity" | "none" => Ok(Activation::Identity),
            "relu" => Ok(Activation::Relu),
            "tanh" => Ok(Activation::Tanh),
            other => Err(MlError::UnknownActivation(other.to_string())),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Activation::Identity => "identity",
            Activation::Relu => "relu",
            Activation::Tanh => "tanh",
        };
        f.write_str(name)
    }
}
