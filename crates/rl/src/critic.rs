use crate::approximator::FunctionApproximator;
use crate::error::{check_len, Result, RlError};
use crate::policy::Policy;
use crate::transition::{Columns, Transition};
use ml::{Optimizer, Tensor};
use std::fmt;

/// Critic estimating the value of a `(state, action)` pair.
///
/// The approximator sees state and action concatenated along the feature
/// axis and produces a single value. Training regresses toward the one-step
/// target `reward + Q(next_state, policy(next_state))`. There is no discount
/// factor (it is implicitly 1) and no separate target network: the bootstrap
/// uses whatever estimator and policy are passed in, typically the live ones.
/// With an undiscounted target the estimates can grow without bound over
/// long horizons.
pub struct ValueEstimator {
    net: FunctionApproximator,
    state_dim: usize,
    action_dim: usize,
    optimizer: Box<dyn Optimizer>,
    updates: u64,
}

impl ValueEstimator {
    /// `net` must take `state_dim + action_dim` inputs and produce one output.
    pub fn new(net: FunctionApproximator, action_dim: usize, optimizer: Box<dyn Optimizer>) -> Result<Self> {
        check_len("critic output width", 1, net.output_dim())?;
        if action_dim == 0 || net.input_dim() <= action_dim {
            return Err(RlError::InvalidConfig(format!(
                "critic input width {} cannot hold a state plus {action_dim} action values",
                net.input_dim()
            )));
        }
        Ok(Self {
            state_dim: net.input_dim() - action_dim,
            action_dim,
            net,
            optimizer,
            updates: 0,
        })
    }

    pub fn state_dim(&self) -> usize {
        self.state_dim
    }

    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    pub fn approximator(&self) -> &FunctionApproximator {
        &self.net
    }

    /// Number of completed training steps.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// One value per row of `states` / `actions`.
    pub fn estimate(&self, states: &Tensor, actions: &Tensor) -> Result<Vec<f32>> {
        let inputs = self.concat(states, actions)?;
        Ok(self.net.evaluate(&inputs)?.data)
    }

    /// Bootstrap targets for `batch`, with this estimator as the value source.
    pub fn td_targets(&self, batch: &[Transition], policy: &Policy) -> Result<Vec<f32>> {
        let cols = Columns::unzip(batch, self.state_dim, self.action_dim)?;
        self.bootstrap(&cols, policy)
    }

    /// `0.5 * sum((Q(s, a) - target)^2)` over `batch`, targets bootstrapped
    /// from `value_source`.
    pub fn td_loss(&self, batch: &[Transition], policy: &Policy, value_source: &ValueEstimator) -> Result<f32> {
        self.check_source(value_source)?;
        let cols = Columns::unzip(batch, self.state_dim, self.action_dim)?;
        let targets = value_source.bootstrap(&cols, policy)?;
        let q = self.estimate(&cols.states, &cols.actions)?;
        Ok(q.iter().zip(&targets).map(|(q, t)| 0.5 * (q - t).powi(2)).sum())
    }

    /// One gradient step toward targets bootstrapped from this estimator
    /// itself. Returns the loss measured before the step.
    pub fn train_step(&mut self, batch: &[Transition], policy: &Policy) -> Result<f32> {
        let cols = Columns::unzip(batch, self.state_dim, self.action_dim)?;
        let targets = self.bootstrap(&cols, policy)?;
        self.fit(&cols, targets)
    }

    /// Like [`train_step`](Self::train_step) but bootstraps from
    /// `value_source`. Only this estimator's parameters change.
    pub fn train_step_from(
        &mut self,
        batch: &[Transition],
        policy: &Policy,
        value_source: &ValueEstimator,
    ) -> Result<f32> {
        self.check_source(value_source)?;
        let cols = Columns::unzip(batch, self.state_dim, self.action_dim)?;
        let targets = value_source.bootstrap(&cols, policy)?;
        self.fit(&cols, targets)
    }

    fn bootstrap(&self, cols: &Columns, policy: &Policy) -> Result<Vec<f32>> {
        check_len("policy state width", self.state_dim, policy.state_dim())?;
        check_len("policy action width", self.action_dim, policy.action_dim())?;
        let u = policy.act_batch(&cols.next_states)?;
        let q_next = self.estimate(&cols.next_states, &u)?;
        Ok(cols.rewards.iter().zip(q_next).map(|(r, q)| r + q).collect())
    }

    fn fit(&mut self, cols: &Columns, targets: Vec<f32>) -> Result<f32> {
        let inputs = self.concat(&cols.states, &cols.actions)?;
        let targets = Tensor::from_vec(vec![cols.len(), 1], targets)?;
        let loss = self.net.fit(&inputs, &targets, self.optimizer.as_mut())?;
        self.updates += 1;
        if loss.is_finite() {
            tracing::debug!(loss, batch = cols.len(), updates = self.updates, "critic update");
        } else {
            tracing::warn!(loss, updates = self.updates, "critic TD loss is not finite");
        }
        Ok(loss)
    }

    fn check_source(&self, other: &ValueEstimator) -> Result<()> {
        check_len("value source state width", self.state_dim, other.state_dim)?;
        check_len("value source action width", self.action_dim, other.action_dim)
    }

    fn concat(&self, states: &Tensor, actions: &Tensor) -> Result<Tensor> {
        check_len("critic state rank", 2, states.shape.len())?;
        check_len("critic action rank", 2, actions.shape.len())?;
        check_len("critic state width", self.state_dim, states.cols())?;
        check_len("critic action width", self.action_dim, actions.cols())?;
        check_len("critic action rows", states.rows(), actions.rows())?;
        let rows = states.rows();
        let mut data = Vec::with_capacity(rows * (self.state_dim + self.action_dim));
        for i in 0..rows {
            data.extend_from_slice(states.row(i));
            data.extend_from_slice(actions.row(i));
        }
        Ok(Tensor::from_vec(vec![rows, self.state_dim + self.action_dim], data)?)
    }
}

impl fmt::Debug for ValueEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueEstimator")
            .field("state_dim", &self.state_dim)
            .field("action_dim", &self.action_dim)
            .field("net", &self.net)
            .field("updates", &self.updates)
            .finish_non_exhaustive()
    }
}
