//! # swingup
//!
//! Runs the actor-critic learner from the `rl` crate on the pendulum
//! swing-up task. Settings come from an optional JSON file plus command-line
//! overrides; log verbosity follows `RUST_LOG` (default `info`, use `debug`
//! to see every transition and critic update).
//!
//! Prints the zero-based index of the last step of each episode on stdout.
//! Logs go to stderr.

mod settings;

use anyhow::Result;
use clap::Parser;
use rl::{EpisodeRunner, Pendulum};
use settings::{Cli, Settings, API_KEY_VAR};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(&cli)?;
    if settings.api_key.is_some() {
        tracing::info!("{API_KEY_VAR} is set");
    } else {
        tracing::debug!("{API_KEY_VAR} is not set");
    }

    let cfg = &settings.agent;
    let mut rng = fastrand::Rng::with_seed(cfg.seed);
    let policy = cfg.build_policy(&mut rng)?;
    let critic = cfg.build_critic(&mut rng)?;
    let buffer = cfg.build_buffer(fastrand::Rng::with_seed(cfg.seed.wrapping_add(1)))?;
    let env = Pendulum::with_seed(cfg.seed.wrapping_add(2));

    tracing::info!(
        hidden = ?cfg.hidden_layers,
        activation = %cfg.activation,
        capacity = cfg.capacity,
        batch_size = cfg.batch_size,
        learning_rate = cfg.learning_rate,
        critic_params = critic.approximator().parameter_count(),
        "agent assembled"
    );

    let mut runner = EpisodeRunner::new(env, policy, critic, buffer, cfg.runner_config())?;
    let results = runner.run(cfg.episodes)?;
    for last in results {
        println!("{last}");
    }
    Ok(())
}
