use crate::critic::ValueEstimator;
use crate::env::Env;
use crate::error::{check_len, RlError};
use crate::policy::Policy;
use crate::replay::ReplayBuffer;
use crate::reward::RewardSignal;
use crate::transition::Transition;
use anyhow::{Context, Result};
use ml::Tensor;

#[derive(Clone, Debug)]
pub struct RunnerConfig {
    /// Step budget per episode.
    pub max_steps: usize,
    /// Transitions sampled for each critic update.
    pub batch_size: usize,
    pub render: bool,
    pub reward: RewardSignal,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { max_steps: 500, batch_size: 5, render: false, reward: RewardSignal::Survival }
    }
}

/// Drives episodes: act, step, store, sample, train the critic.
///
/// Only the critic learns. The actor is queried every step but never
/// receives a policy-improvement update.
pub struct EpisodeRunner<E: Env> {
    env: E,
    policy: Policy,
    critic: ValueEstimator,
    buffer: ReplayBuffer,
    config: RunnerConfig,
}

impl<E: Env> EpisodeRunner<E> {
    /// Wires the components together after checking that every dimension
    /// agrees with the environment's.
    pub fn new(
        env: E,
        policy: Policy,
        critic: ValueEstimator,
        buffer: ReplayBuffer,
        config: RunnerConfig,
    ) -> Result<Self, RlError> {
        let (s, a) = (env.obs_size(), env.action_size());
        check_len("policy state width", s, policy.state_dim())?;
        check_len("policy action width", a, policy.action_dim())?;
        check_len("critic state width", s, critic.state_dim())?;
        check_len("critic action width", a, critic.action_dim())?;
        check_len("replay state width", s, buffer.state_dim())?;
        check_len("replay action width", a, buffer.action_dim())?;
        if config.max_steps == 0 || config.batch_size == 0 {
            return Err(RlError::InvalidConfig(
                "max_steps and batch_size must be positive".into(),
            ));
        }
        Ok(Self { env, policy, critic, buffer, config })
    }

    /// Runs one episode and returns the zero-based index of its last step,
    /// so a full episode of `max_steps` returns `max_steps - 1`.
    ///
    /// The episode ends early when the environment reports termination.
    /// Environment failures are returned with the step they happened on.
    pub fn run_episode(&mut self) -> Result<usize> {
        let mut obs = self.env.reset().context("environment reset failed")?;
        check_len("observation", self.policy.state_dim(), obs.len())?;

        let mut last = 0;
        for i in 0..self.config.max_steps {
            last = i;
            if self.config.render {
                self.env.render().context("environment render failed")?;
            }

            let action = self.policy.act(&obs)?;
            let step = self
                .env
                .step(&action)
                .with_context(|| format!("environment step {i} failed"))?;
            check_len("observation", self.policy.state_dim(), step.observation.len())?;

            // The learner never sees the environment's reward directly.
            let reward = self.config.reward.derive(&step);

            if tracing::enabled!(tracing::Level::DEBUG) {
                let q = self.critic.estimate(
                    &Tensor::from_vec(vec![1, step.observation.len()], step.observation.clone())?,
                    &Tensor::from_vec(vec![1, action.len()], action.clone())?,
                )?;
                tracing::debug!(
                    step = i,
                    ?obs,
                    next = ?step.observation,
                    ?action,
                    reward,
                    expected_q = q[0],
                    "transition"
                );
            }

            self.buffer.store(Transition::new(obs, step.observation.clone(), action, reward))?;
            let batch = self.buffer.sample(self.config.batch_size);
            self.critic.train_step(&batch, &self.policy)?;

            obs = step.observation;
            if step.terminated {
                tracing::debug!(step = i, "environment terminated the episode");
                break;
            }
        }

        tracing::info!(
            steps = last + 1,
            buffered = self.buffer.len(),
            critic_updates = self.critic.updates(),
            "episode finished"
        );
        Ok(last)
    }

    /// Runs `episodes` episodes back to back.
    pub fn run(&mut self, episodes: usize) -> Result<Vec<usize>> {
        (0..episodes)
            .map(|episode| {
                tracing::info!(episode, "starting episode");
                self.run_episode().with_context(|| format!("episode {episode} failed"))
            })
            .collect()
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn critic(&self) -> &ValueEstimator {
        &self.critic
    }

    pub fn buffer(&self) -> &ReplayBuffer {
        &self.buffer
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }
}
