use crate::recorder::Recorder;
use crate::Tensor;

/// Differentiable operations understood by the [`Tape`](crate::tape::Tape).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EOp {
    MatMul,
    AddBroadcast,
    Sub,
    MulScalar(f32),
    Pow(f32),
    Relu,
    Tanh,
    ReduceSum,
}

/// One recorded operation. `b` is `None` for unary ops.
#[derive(Clone, Debug)]
pub struct Node {
    pub op: EOp,
    pub a: usize,
    pub b: Option<usize>,
    pub out: usize,
}

/// Inference-only recorder: keeps the op sequence but no operand values,
/// so nothing recorded here can be differentiated.
#[derive(Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Recorder for Graph {
    fn record(&mut self, node: Node, _operands: &[&Tensor], _out: &Tensor) {
        self.nodes.push(node);
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
