use std::collections::HashMap;

/// Outcome of one [`Env::step`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Step {
    pub observation: Vec<f32>,
    /// The environment's own reward signal.
    pub reward: f32,
    pub terminated: bool,
    /// Free-form diagnostics; never read by the learner.
    pub info: HashMap<String, f32>,
}

/// Reinforcement learning environment trait.
///
/// Inspired by classic frameworks like OpenAI Gym, this trait defines the core
/// interface an environment must provide. Errors from [`reset`] or [`step`]
/// propagate unchanged to whoever drives the episode; there is no recovery
/// from a failed step.
///
/// [`reset`]: Env::reset
/// [`step`]: Env::step
pub trait Env {
    /// Reset the environment to its starting state and return the initial
    /// observation vector.
    fn reset(&mut self) -> anyhow::Result<Vec<f32>>;

    /// Advance the environment by one action.
    fn step(&mut self, action: &[f32]) -> anyhow::Result<Step>;

    /// Draw the current state. Most environments have nothing to show.
    fn render(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Size of the observation vector.
    fn obs_size(&self) -> usize;

    /// Size of the action vector.
    fn action_size(&self) -> usize;
}
