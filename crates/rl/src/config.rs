use crate::approximator::ApproximatorBuilder;
use crate::critic::ValueEstimator;
use crate::error::{Result, RlError};
use crate::policy::Policy;
use crate::replay::ReplayBuffer;
use crate::reward::RewardSignal;
use crate::runner::RunnerConfig;
use ml::{Activation, OptimizerKind};
use serde::{Deserialize, Serialize};

/// Everything needed to assemble an agent. Missing fields take the defaults
/// below when deserialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub state_dim: usize,
    pub action_dim: usize,
    /// Widths of the hidden layers shared by actor and critic; each network
    /// appends its own output layer.
    pub hidden_layers: Vec<usize>,
    pub activation: Activation,
    pub capacity: usize,
    pub batch_size: usize,
    pub max_steps: usize,
    pub episodes: usize,
    pub learning_rate: f32,
    pub optimizer: OptimizerKind,
    pub init_range: f32,
    pub seed: u64,
    pub render: bool,
    pub reward: RewardSignal,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            state_dim: 3,
            action_dim: 1,
            hidden_layers: vec![100, 50],
            activation: Activation::Identity,
            capacity: 100,
            batch_size: 5,
            max_steps: 500,
            episodes: 1,
            learning_rate: 0.05,
            optimizer: OptimizerKind::Sgd,
            init_range: 0.001,
            seed: 0,
            render: false,
            reward: RewardSignal::Survival,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        let problem = if self.state_dim == 0 || self.action_dim == 0 {
            "state_dim and action_dim must be positive"
        } else if self.hidden_layers.is_empty() || self.hidden_layers.contains(&0) {
            "hidden_layers must be a non-empty list of positive widths"
        } else if self.capacity == 0 {
            "capacity must be positive"
        } else if self.batch_size == 0 {
            "batch_size must be positive"
        } else if self.max_steps == 0 {
            "max_steps must be positive"
        } else if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            "learning_rate must be a positive number"
        } else {
            return Ok(());
        };
        Err(RlError::InvalidConfig(problem.into()))
    }

    fn network(&self, input_dim: usize, output_dim: usize) -> ApproximatorBuilder {
        ApproximatorBuilder::new(input_dim)
            .layers(&self.hidden_layers)
            .layer(output_dim)
            .activation(self.activation)
            .init_range(self.init_range)
    }

    pub fn build_policy(&self, rng: &mut fastrand::Rng) -> Result<Policy> {
        let net = self.network(self.state_dim, self.action_dim).build(rng)?;
        Ok(Policy::new(net))
    }

    pub fn build_critic(&self, rng: &mut fastrand::Rng) -> Result<ValueEstimator> {
        let net = self.network(self.state_dim + self.action_dim, 1).build(rng)?;
        ValueEstimator::new(net, self.action_dim, self.optimizer.build(self.learning_rate))
    }

    pub fn build_buffer(&self, rng: fastrand::Rng) -> Result<ReplayBuffer> {
        ReplayBuffer::new(self.state_dim, self.action_dim, self.capacity, rng)
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            max_steps: self.max_steps,
            batch_size: self.batch_size,
            render: self.render,
            reward: self.reward,
        }
    }
}
