use crate::error::MlError;
use crate::tape::Gradients;
use crate::Tensor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// First-order update rule applied to a set of parameters.
pub trait Optimizer {
    /// Moves every parameter against its gradient. Fails without touching
    /// anything if a parameter has no gradient in `grads`.
    fn step(&mut self, params: &mut [&mut Tensor], grads: &Gradients) -> Result<(), MlError>;
}

fn check_grads(params: &[&mut Tensor], grads: &Gradients) -> Result<(), MlError> {
    match params.iter().find(|p| grads.get(p).is_none()) {
        Some(p) => Err(MlError::MissingGradient(p.id)),
        None => Ok(()),
    }
}

/// Plain gradient descent with a fixed step size.
#[derive(Clone, Debug)]
pub struct Sgd {
    pub lr: f32,
}

impl Sgd {
    #[must_use]
    pub fn new(lr: f32) -> Self {
        Self { lr }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, params: &mut [&mut Tensor], grads: &Gradients) -> Result<(), MlError> {
        check_grads(params, grads)?;
        for p in params.iter_mut() {
            let Some(grad) = grads.get(p) else { continue };
            for (pv, gv) in p.data.iter_mut().zip(grad) {
                *pv -= self.lr * gv;
            }
        }
        Ok(())
    }
}

pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    eps: f32,
    t: i32,
    moments: HashMap<usize, (Vec<f32>, Vec<f32>)>,
}

impl Adam {
    #[must_use]
    pub fn new(lr: f32) -> Self {
        Self { lr, beta1: 0.9, beta2: 0.999, eps: 1e-8, t: 0, moments: HashMap::new() }
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [&mut Tensor], grads: &Gradients) -> Result<(), MlError> {
        check_grads(params, grads)?;
        self.t += 1;
        let bias1 = 1.0 - self.beta1.powi(self.t);
        let bias2 = 1.0 - self.beta2.powi(self.t);
        for p in params.iter_mut() {
            let Some(grad) = grads.get(p) else { continue };
            let (m, v) = self
                .moments
                .entry(p.id)
                .or_insert_with(|| (vec![0.0; grad.len()], vec![0.0; grad.len()]));
            for (i, &g) in grad.iter().enumerate() {
                m[i] = self.beta1 * m[i] + (1.0 - self.beta1) * g;
                v[i] = self.beta2 * v[i] + (1.0 - self.beta2) * g * g;
                let m_hat = m[i] / bias1;
                let v_hat = v[i] / bias2;
                p.data[i] -= self.lr * m_hat / (v_hat.sqrt() + self.eps);
            }
        }
        Ok(())
    }
}

/// Selects an [`Optimizer`] from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    #[default]
    Sgd,
    Adam,
}

impl OptimizerKind {
    pub fn build(self, lr: f32) -> Box<dyn Optimizer> {
        match self {
            OptimizerKind::Sgd => Box::new(Sgd::new(lr)),
            OptimizerKind::Adam => Box::new(Adam::new(lr)),
        }
    }
}

impl FromStr for OptimizerKind {
    type Err = MlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sgd" => Ok(OptimizerKind::Sgd),
            "adam" => Ok(OptimizerKind::Adam),
            other => Err(MlError::UnknownOptimizer(other.to_string())),
        }
    }
}
