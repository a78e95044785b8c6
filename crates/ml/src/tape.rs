use crate::error::MlError;
use crate::graph::{EOp, Node};
use crate::recorder::Recorder;
use crate::Tensor;
use std::collections::HashMap;

/// A tape that records operations for automatic differentiation.
///
/// Unlike [`Graph`](crate::graph::Graph) the tape keeps a snapshot of every
/// operand, so parameters may be mutated after the forward pass without
/// invalidating the backward pass.
#[derive(Default)]
pub struct Tape {
    nodes: Vec<Node>,
    values: HashMap<usize, Tensor>,
}

impl Recorder for Tape {
    fn record(&mut self, node: Node, operands: &[&Tensor], out: &Tensor) {
        for t in operands.iter().copied().chain(std::iter::once(out)) {
            self.values.entry(t.id).or_insert_with(|| t.clone());
        }
        self.nodes.push(node);
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

/// Gradients produced by [`Tape::backward`], keyed by tensor id.
#[derive(Debug, Default)]
pub struct Gradients {
    grads: HashMap<usize, Vec<f32>>,
}

impl Gradients {
    pub fn get(&self, tensor: &Tensor) -> Option<&[f32]> {
        self.grads.get(&tensor.id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.grads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grads.is_empty()
    }
}

impl Tape {
    /// Creates a new, empty tape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the gradients of `loss` with respect to every recorded
    /// tensor flagged `requires_grad`.
    ///
    /// The gradients are computed by traversing the recorded operations in reverse order.
    pub fn backward(&self, loss: &Tensor) -> Result<Gradients, MlError> {
        if loss.len() != 1 {
            return Err(MlError::NonScalarLoss(loss.shape.clone()));
        }
        let mut grads: HashMap<usize, Vec<f32>> = HashMap::new();
        grads.insert(loss.id, vec![1.0]);

        for node in self.nodes.iter().rev() {
            // Ops that do not feed the loss contribute nothing.
            let Some(out_grad) = grads.get(&node.out).cloned() else {
                continue;
            };
            let a = &self.values[&node.a];
            let b = node.b.map(|id| &self.values[&id]);

            match (node.op, b) {
                (EOp::MatMul, Some(x)) => {
                    let out_dim = a.shape[0];
                    let in_dim = a.shape[1];
                    let batch_size = x.shape[0];
                    {
                        let w_grad = slot(&mut grads, a);
                        for i in 0..out_dim {
                            for j in 0..in_dim {
                                for k in 0..batch_size {
                                    w_grad[i * in_dim + j] +=
                                        out_grad[k * out_dim + i] * x.data[k * in_dim + j];
                                }
                            }
                        }
                    }
                    {
                        let x_grad = slot(&mut grads, x);
                        for k in 0..batch_size {
                            for j in 0..in_dim {
                                for i in 0..out_dim {
                                    x_grad[k * in_dim + j] +=
                                        out_grad[k * out_dim + i] * a.data[i * in_dim + j];
                                }
                            }
                        }
                    }
                }
                (EOp::AddBroadcast, Some(bias)) => {
                    let dim = a.shape[1];
                    {
                        let a_grad = slot(&mut grads, a);
                        for (g, og) in a_grad.iter_mut().zip(&out_grad) {
                            *g += og;
                        }
                    }
                    let b_grad = slot(&mut grads, bias);
                    for (i, og) in out_grad.iter().enumerate() {
                        b_grad[i % dim] += og;
                    }
                }
                (EOp::Sub, Some(rhs)) => {
                    {
                        let a_grad = slot(&mut grads, a);
                        for (g, og) in a_grad.iter_mut().zip(&out_grad) {
                            *g += og;
                        }
                    }
                    let b_grad = slot(&mut grads, rhs);
                    for (g, og) in b_grad.iter_mut().zip(&out_grad) {
                        *g -= og;
                    }
                }
                (EOp::MulScalar(scalar), None) => {
                    let a_grad = slot(&mut grads, a);
                    for (g, og) in a_grad.iter_mut().zip(&out_grad) {
                        *g += scalar * og;
                    }
                }
                (EOp::Pow(exp), None) => {
                    let a_grad = slot(&mut grads, a);
                    for (g, (d, og)) in a_grad.iter_mut().zip(a.data.iter().zip(&out_grad)) {
                        *g += exp * d.powf(exp - 1.0) * og;
                    }
                }
                (EOp::Relu, None) => {
                    let a_grad = slot(&mut grads, a);
                    for (g, (d, og)) in a_grad.iter_mut().zip(a.data.iter().zip(&out_grad)) {
                        if *d > 0.0 {
                            *g += og;
                        }
                    }
                }
                (EOp::Tanh, None) => {
                    let out = &self.values[&node.out];
                    let a_grad = slot(&mut grads, a);
                    for (g, (d, og)) in a_grad.iter_mut().zip(out.data.iter().zip(&out_grad)) {
                        *g += (1.0 - d.powi(2)) * og;
                    }
                }
                (EOp::ReduceSum, None) => {
                    let a_grad = slot(&mut grads, a);
                    for g in a_grad.iter_mut() {
                        *g += out_grad[0];
                    }
                }
                (op, _) => unreachable!("{op:?} recorded with the wrong operand count"),
            }
        }

        grads.retain(|id, _| self.values.get(id).is_some_and(|t| t.requires_grad));
        tracing::trace!(nodes = self.nodes.len(), params = grads.len(), "backward pass");
        Ok(Gradients { grads })
    }
}

fn slot<'g>(grads: &'g mut HashMap<usize, Vec<f32>>, t: &Tensor) -> &'g mut Vec<f32> {
    grads.entry(t.id).or_insert_with(|| vec![0.0; t.data.len()])
}
