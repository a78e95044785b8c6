use crate::env::Step;
use serde::{Deserialize, Serialize};

/// Which reward the learner sees for a step.
///
/// `Survival` replaces the environment's reward with 1 for every step that
/// did not terminate and 0 for the terminating one, whatever the environment
/// reported. `Environment` passes the native reward through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardSignal {
    #[default]
    Survival,
    Environment,
}

impl RewardSignal {
    pub fn derive(self, step: &Step) -> f32 {
        match self {
            RewardSignal::Survival => {
                if step.terminated {
                    0.0
                } else {
                    1.0
                }
            }
            RewardSignal::Environment => step.reward,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survival_ignores_native_reward() {
        let alive = Step { reward: -7.5, ..Step::default() };
        let dead = Step { reward: 100.0, terminated: true, ..Step::default() };
        assert_eq!(RewardSignal::Survival.derive(&alive), 1.0);
        assert_eq!(RewardSignal::Survival.derive(&dead), 0.0);
        assert_eq!(RewardSignal::Environment.derive(&alive), -7.5);
    }
}
