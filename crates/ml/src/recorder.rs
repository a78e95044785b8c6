use crate::graph::Node;
use crate::Tensor;

/// Sink for the operations a forward pass performs.
pub trait Recorder {
    /// Called once per op with its operands and freshly created output.
    fn record(&mut self, node: Node, operands: &[&Tensor], out: &Tensor);
    fn nodes(&self) -> &[Node];
}
