use crate::error::MlError;
use crate::graph::{EOp, Node};
use crate::recorder::Recorder;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

fn next_id() -> usize {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Dense row-major `f32` tensor.
///
/// Every tensor carries a process-unique `id`; recorders key operands and
/// gradients by it. Clones share the id, so a clone taken before a forward
/// pass still identifies the same parameter afterwards.
#[derive(Clone, Debug)]
pub struct Tensor {
    pub id: usize,
    pub data: Vec<f32>,
    pub shape: Vec<usize>,
    pub requires_grad: bool,
}

impl Tensor {
    /// Builds a tensor from raw row-major data.
    ///
    /// Fails with [`MlError::ShapeMismatch`] when `data.len()` is not the
    /// product of `shape`.
    pub fn from_vec(shape: Vec<usize>, data: Vec<f32>) -> Result<Self, MlError> {
        let expected = shape.iter().product::<usize>();
        if expected != data.len() {
            return Err(MlError::ShapeMismatch {
                op: "from_vec",
                lhs: shape,
                rhs: vec![data.len()],
            });
        }
        Ok(Self::raw(shape, data))
    }

    /// Callers guarantee `product(shape) == data.len()`.
    pub(crate) fn raw(shape: Vec<usize>, data: Vec<f32>) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), data.len());
        Self { id: next_id(), data, shape, requires_grad: false }
    }

    /// Stacks equally sized rows into an `[rows, cols]` matrix.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R], cols: usize) -> Result<Self, MlError> {
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(MlError::ShapeMismatch {
                    op: "from_rows",
                    lhs: vec![cols],
                    rhs: vec![row.len()],
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self::raw(vec![rows.len(), cols], data))
    }

    pub fn zeros(shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self::raw(shape, vec![0.0; len])
    }

    pub fn scalar(value: f32) -> Self {
        Self::raw(vec![1], vec![value])
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Leading dimension of a matrix; `1` for vectors.
    pub fn rows(&self) -> usize {
        if self.shape.len() >= 2 { self.shape[0] } else { 1 }
    }

    /// Trailing dimension.
    pub fn cols(&self) -> usize {
        self.shape.last().copied().unwrap_or(1)
    }

    pub fn row(&self, i: usize) -> &[f32] {
        let cols = self.cols();
        &self.data[i * cols..(i + 1) * cols]
    }

    pub fn set_requires_grad(&mut self) {
        self.requires_grad = true;
    }

    #[must_use]
    pub fn with_grad(mut self) -> Self {
        self.requires_grad = true;
        self
    }

    /// `self` holds weights laid out `[out, in]`; `x` is a batch `[n, in]`.
    /// Produces `[n, out]`, i.e. `x · selfᵀ`.
    pub fn matmul(&self, x: &Tensor, recorder: &mut impl Recorder) -> Result<Tensor, MlError> {
        if self.shape.len() != 2 || x.shape.len() != 2 || self.shape[1] != x.shape[1] {
            return Err(MlError::ShapeMismatch {
                op: "matmul",
                lhs: self.shape.clone(),
                rhs: x.shape.clone(),
            });
        }
        let out_dim = self.shape[0];
        let in_dim = self.shape[1];
        let batch = x.shape[0];
        let mut data = vec![0.0; batch * out_dim];
        for k in 0..batch {
            let xs = &x.data[k * in_dim..(k + 1) * in_dim];
            for o in 0..out_dim {
                let ws = &self.data[o * in_dim..(o + 1) * in_dim];
                data[k * out_dim + o] = ws.iter().zip(xs).map(|(w, v)| w * v).sum();
            }
        }
        let out = Tensor::raw(vec![batch, out_dim], data);
        recorder.record(
            Node { op: EOp::MatMul, a: self.id, b: Some(x.id), out: out.id },
            &[self, x],
            &out,
        );
        Ok(out)
    }

    /// Adds a `[d]` vector to every row of an `[n, d]` matrix.
    pub fn add_broadcast(&self, b: &Tensor, recorder: &mut impl Recorder) -> Result<Tensor, MlError> {
        if self.shape.len() != 2 || b.shape.len() != 1 || b.shape[0] != self.shape[1] {
            return Err(MlError::ShapeMismatch {
                op: "add_broadcast",
                lhs: self.shape.clone(),
                rhs: b.shape.clone(),
            });
        }
        let dim = self.shape[1];
        let data = self
            .data
            .iter()
            .enumerate()
            .map(|(i, v)| v + b.data[i % dim])
            .collect();
        let out = Tensor::raw(self.shape.clone(), data);
        recorder.record(
            Node { op: EOp::AddBroadcast, a: self.id, b: Some(b.id), out: out.id },
            &[self, b],
            &out,
        );
        Ok(out)
    }

    pub fn sub(&self, other: &Tensor, recorder: &mut impl Recorder) -> Result<Tensor, MlError> {
        if self.shape != other.shape {
            return Err(MlError::ShapeMismatch {
                op: "sub",
                lhs: self.shape.clone(),
                rhs: other.shape.clone(),
            });
        }
        let data = self.data.iter().zip(&other.data).map(|(a, b)| a - b).collect();
        let out = Tensor::raw(self.shape.clone(), data);
        recorder.record(
            Node { op: EOp::Sub, a: self.id, b: Some(other.id), out: out.id },
            &[self, other],
            &out,
        );
        Ok(out)
    }

    pub fn mul_scalar(&self, scalar: f32, recorder: &mut impl Recorder) -> Tensor {
        let data = self.data.iter().map(|v| v * scalar).collect();
        self.unary(EOp::MulScalar(scalar), data, recorder)
    }

    pub fn pow(&self, exp: f32, recorder: &mut impl Recorder) -> Tensor {
        let data = self.data.iter().map(|v| v.powf(exp)).collect();
        self.unary(EOp::Pow(exp), data, recorder)
    }

    pub fn relu(&self, recorder: &mut impl Recorder) -> Tensor {
        let data = self.data.iter().map(|v| v.max(0.0)).collect();
        self.unary(EOp::Relu, data, recorder)
    }

    pub fn tanh(&self, recorder: &mut impl Recorder) -> Tensor {
        let data = self.data.iter().map(|v| v.tanh()).collect();
        self.unary(EOp::Tanh, data, recorder)
    }

    pub fn reduce_sum(&self, recorder: &mut impl Recorder) -> Tensor {
        let out = Tensor::scalar(self.data.iter().sum());
        recorder.record(
            Node { op: EOp::ReduceSum, a: self.id, b: None, out: out.id },
            &[self],
            &out,
        );
        out
    }

    fn unary(&self, op: EOp, data: Vec<f32>, recorder: &mut impl Recorder) -> Tensor {
        let out = Tensor::raw(self.shape.clone(), data);
        recorder.record(Node { op, a: self.id, b: None, out: out.id }, &[self], &out);
        out
    }
}
