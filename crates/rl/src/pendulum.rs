use crate::env::{Env, Step};
use std::collections::HashMap;
use std::f32::consts::PI;

const MAX_SPEED: f32 = 8.0;
const MAX_TORQUE: f32 = 2.0;
const DT: f32 = 0.05;
const G: f32 = 10.0;
const M: f32 = 1.0;
const L: f32 = 1.0;

/// Pendulum swing-up task with a continuous torque action.
///
/// Observation is `[cos θ, sin θ, θ̇]` with θ = 0 upright. The reward
/// `-(θ² + 0.1 θ̇² + 0.001 u²)` is computed from the state before the step.
/// The task never terminates on its own; episode length is the caller's
/// step budget.
pub struct Pendulum {
    theta: f32,
    theta_dot: f32,
    rng: fastrand::Rng,
}

impl Pendulum {
    pub fn new(rng: fastrand::Rng) -> Self {
        Self { theta: PI, theta_dot: 0.0, rng }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(fastrand::Rng::with_seed(seed))
    }

    pub fn angle(&self) -> f32 {
        self.theta
    }

    fn observation(&self) -> Vec<f32> {
        vec![self.theta.cos(), self.theta.sin(), self.theta_dot]
    }
}

/// Wraps an angle into `[-π, π)`.
fn angle_normalize(x: f32) -> f32 {
    (x + PI).rem_euclid(2.0 * PI) - PI
}

impl Env for Pendulum {
    fn reset(&mut self) -> anyhow::Result<Vec<f32>> {
        self.theta = (self.rng.f32() * 2.0 - 1.0) * PI;
        self.theta_dot = self.rng.f32() * 2.0 - 1.0;
        Ok(self.observation())
    }

    fn step(&mut self, action: &[f32]) -> anyhow::Result<Step> {
        anyhow::ensure!(action.len() == 1, "pendulum expects 1 torque value, got {}", action.len());
        anyhow::ensure!(action[0].is_finite(), "pendulum torque is not finite: {}", action[0]);
        let u = action[0].clamp(-MAX_TORQUE, MAX_TORQUE);

        let th = angle_normalize(self.theta);
        let cost = th.powi(2) + 0.1 * self.theta_dot.powi(2) + 0.001 * u.powi(2);

        let acc = 3.0 * G / (2.0 * L) * self.theta.sin() + 3.0 / (M * L * L) * u;
        let new_theta_dot = self.theta_dot + acc * DT;
        self.theta += new_theta_dot * DT;
        self.theta_dot = new_theta_dot.clamp(-MAX_SPEED, MAX_SPEED);

        let mut info = HashMap::new();
        info.insert("theta".to_string(), angle_normalize(self.theta));
        info.insert("torque".to_string(), u);
        Ok(Step { observation: self.observation(), reward: -cost, terminated: false, info })
    }

    fn render(&mut self) -> anyhow::Result<()> {
        tracing::info!(
            theta = angle_normalize(self.theta),
            theta_dot = self.theta_dot,
            "pendulum"
        );
        Ok(())
    }

    fn obs_size(&self) -> usize {
        3
    }

    fn action_size(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_produces_valid_observation() {
        let mut env = Pendulum::with_seed(3);
        let obs = env.reset().unwrap();
        assert_eq!(obs.len(), 3);
        assert!((obs[0].powi(2) + obs[1].powi(2) - 1.0).abs() < 1e-5);
        assert!(obs[2].abs() <= 1.0);
    }

    #[test]
    fn upright_and_still_costs_nothing() {
        let mut env = Pendulum::with_seed(0);
        env.theta = 0.0;
        env.theta_dot = 0.0;
        let step = env.step(&[0.0]).unwrap();
        assert!(step.reward.abs() < 1e-6);
        assert!(!step.terminated);

        env.theta = PI;
        env.theta_dot = 0.0;
        let down = env.step(&[0.0]).unwrap();
        assert!(down.reward < -9.0);
    }

    #[test]
    fn torque_and_speed_are_clamped() {
        let mut env = Pendulum::with_seed(0);
        env.theta = 0.0;
        env.theta_dot = 0.0;
        let step = env.step(&[100.0]).unwrap();
        assert_eq!(step.info["torque"], MAX_TORQUE);
        for _ in 0..200 {
            let s = env.step(&[MAX_TORQUE]).unwrap();
            assert!(s.observation[2].abs() <= MAX_SPEED);
        }
    }

    #[test]
    fn rejects_malformed_actions() {
        let mut env = Pendulum::with_seed(0);
        assert!(env.step(&[0.0, 1.0]).is_err());
        assert!(env.step(&[f32::NAN]).is_err());
    }

    #[test]
    fn normalize_wraps_both_directions() {
        assert!((angle_normalize(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-5);
        assert!((angle_normalize(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-5);
    }
}
