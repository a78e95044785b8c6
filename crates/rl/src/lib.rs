//! Online actor-critic learner for continuous control.
//!
//! The pieces, leaf first:
//!
//! - [`FunctionApproximator`]: stacked affine layers built by
//!   [`ApproximatorBuilder`] on top of the `ml` tensor engine.
//! - [`ReplayBuffer`]: bounded store of [`Transition`]s with random
//!   overwrite once full and uniform sampling with replacement.
//! - [`Policy`]: the actor, state to action. It is never trained.
//! - [`ValueEstimator`]: the critic, `(state, action)` to value. Owns the
//!   temporal-difference update.
//! - [`EpisodeRunner`]: steps an [`Env`], feeds the buffer and trains the
//!   critic after every step.
//!
//! [`AgentConfig`] assembles all of them from one serde-friendly struct and
//! [`Pendulum`] is a ready-made swing-up environment.

pub mod approximator;
pub mod config;
pub mod critic;
pub mod env;
pub mod error;
pub mod pendulum;
pub mod policy;
pub mod replay;
pub mod reward;
pub mod runner;
pub mod transition;

pub use approximator::{ApproximatorBuilder, FunctionApproximator};
pub use config::AgentConfig;
pub use critic::ValueEstimator;
pub use env::{Env, Step};
pub use error::{Result, RlError};
pub use pendulum::Pendulum;
pub use policy::Policy;
pub use replay::ReplayBuffer;
pub use reward::RewardSignal;
pub use runner::{EpisodeRunner, RunnerConfig};
pub use transition::Transition;
