//! Tensor and reverse-mode differentiation toolkit.
//!
//! This crate is the numeric engine the agent in `rl` builds on. It offers
//! just enough to build stacked affine layers, evaluate them on a batch and
//! apply one gradient step toward a scalar loss:
//!
//! - [`Tensor`]: row-major `f32` storage with a process-unique id.
//! - [`Recorder`]: sink for forward-pass operations. [`Graph`] is the
//!   inference recorder, [`Tape`] keeps operand snapshots for
//!   [`Tape::backward`].
//! - [`Dense`] and [`Activation`]: the layer building blocks.
//! - [`Optimizer`] with [`Sgd`] and [`Adam`].

pub mod error;
pub mod graph;
pub mod nn;
pub mod optim;
pub mod recorder;
pub mod tape;
pub mod tensor;

pub use error::MlError;
pub use graph::Graph;
pub use nn::{Activation, Dense};
pub use optim::{Adam, Optimizer, OptimizerKind, Sgd};
pub use recorder::Recorder;
pub use tape::{Gradients, Tape};
pub use tensor::Tensor;
