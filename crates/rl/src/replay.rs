use crate::error::{Result, RlError};
use crate::transition::Transition;

/// Fixed-capacity store of past transitions.
///
/// The buffer fills slot by slot until `capacity` is reached. From then on
/// every [`store`](ReplayBuffer::store) overwrites a uniformly random slot, so
/// the buffer never grows and no transition is protected from eviction.
/// Sampling draws uniformly with replacement. Both draws come from the
/// buffer's own `fastrand::Rng`, which makes a seeded buffer reproducible.
pub struct ReplayBuffer {
    state_dim: usize,
    action_dim: usize,
    capacity: usize,
    slots: Vec<Transition>,
    rng: fastrand::Rng,
}

impl ReplayBuffer {
    pub fn new(state_dim: usize, action_dim: usize, capacity: usize, rng: fastrand::Rng) -> Result<Self> {
        if capacity == 0 {
            return Err(RlError::InvalidConfig("replay capacity must be positive".into()));
        }
        Ok(Self {
            state_dim,
            action_dim,
            capacity,
            slots: Vec::with_capacity(capacity),
            rng,
        })
    }

    pub fn with_seed(state_dim: usize, action_dim: usize, capacity: usize, seed: u64) -> Result<Self> {
        Self::new(state_dim, action_dim, capacity, fastrand::Rng::with_seed(seed))
    }

    /// Appends `transition`, or overwrites a random slot once full.
    pub fn store(&mut self, transition: Transition) -> Result<()> {
        transition.check_dims(self.state_dim, self.action_dim)?;
        if self.slots.len() < self.capacity {
            self.slots.push(transition);
        } else {
            let idx = self.rng.usize(0..self.slots.len());
            tracing::trace!(slot = idx, "replay buffer full, overwriting");
            self.slots[idx] = transition;
        }
        Ok(())
    }

    /// Returns every stored transition when `k >= len()`, otherwise `k`
    /// transitions drawn uniformly with replacement (duplicates possible).
    ///
    /// The whole-buffer batch comes back in slot order, not shuffled.
    pub fn sample(&mut self, k: usize) -> Vec<Transition> {
        let count = self.slots.len();
        if k >= count {
            return self.slots.clone();
        }
        (0..k)
            .map(|_| self.slots[self.rng.usize(0..count)].clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn state_dim(&self) -> usize {
        self.state_dim
    }

    pub fn action_dim(&self) -> usize {
        self.action_dim
    }

    /// Stored transitions in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.slots.iter()
    }
}
