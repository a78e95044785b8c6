use crate::approximator::FunctionApproximator;
use crate::error::{check_len, Result};
use ml::Tensor;

/// Deterministic actor mapping a state to an action.
///
/// No exploration noise is added and nothing in this crate updates the
/// actor's parameters: it keeps the weights it was initialized with.
#[derive(Clone, Debug)]
pub struct Policy {
    net: FunctionApproximator,
}

impl Policy {
    /// The approximator's input width is the state dimension and its output
    /// width the action dimension.
    pub fn new(net: FunctionApproximator) -> Self {
        Self { net }
    }

    pub fn state_dim(&self) -> usize {
        self.net.input_dim()
    }

    pub fn action_dim(&self) -> usize {
        self.net.output_dim()
    }

    pub fn approximator(&self) -> &FunctionApproximator {
        &self.net
    }

    pub fn act(&self, state: &[f32]) -> Result<Vec<f32>> {
        check_len("policy state", self.state_dim(), state.len())?;
        let batch = Tensor::from_vec(vec![1, state.len()], state.to_vec())?;
        Ok(self.net.evaluate(&batch)?.row(0).to_vec())
    }

    /// Evaluates `[n, state_dim]` states into `[n, action_dim]` actions.
    pub fn act_batch(&self, states: &Tensor) -> Result<Tensor> {
        self.net.evaluate(states)
    }
}
