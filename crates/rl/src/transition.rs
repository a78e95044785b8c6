use crate::error::{check_len, Result, RlError};
use ml::Tensor;

/// One observed `(state, next_state, action, reward)` tuple.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: Vec<f32>,
    pub next_state: Vec<f32>,
    pub action: Vec<f32>,
    pub reward: f32,
}

impl Transition {
    pub fn new(state: Vec<f32>, next_state: Vec<f32>, action: Vec<f32>, reward: f32) -> Self {
        Self { state, next_state, action, reward }
    }

    pub(crate) fn check_dims(&self, state_dim: usize, action_dim: usize) -> Result<()> {
        check_len("transition state", state_dim, self.state.len())?;
        check_len("transition next_state", state_dim, self.next_state.len())?;
        check_len("transition action", action_dim, self.action.len())
    }
}

/// A mini-batch unzipped into parallel columns.
pub(crate) struct Columns {
    pub states: Tensor,
    pub next_states: Tensor,
    pub actions: Tensor,
    pub rewards: Vec<f32>,
}

impl Columns {
    pub fn unzip(batch: &[Transition], state_dim: usize, action_dim: usize) -> Result<Self> {
        if batch.is_empty() {
            return Err(RlError::EmptyBatch);
        }
        for t in batch {
            t.check_dims(state_dim, action_dim)?;
        }
        let states: Vec<&[f32]> = batch.iter().map(|t| t.state.as_slice()).collect();
        let next_states: Vec<&[f32]> = batch.iter().map(|t| t.next_state.as_slice()).collect();
        let actions: Vec<&[f32]> = batch.iter().map(|t| t.action.as_slice()).collect();
        Ok(Self {
            states: Tensor::from_rows(&states, state_dim)?,
            next_states: Tensor::from_rows(&next_states, state_dim)?,
            actions: Tensor::from_rows(&actions, action_dim)?,
            rewards: batch.iter().map(|t| t.reward).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }
}
