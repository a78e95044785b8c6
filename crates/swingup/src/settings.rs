use anyhow::{Context, Result};
use clap::Parser;
use ml::OptimizerKind;
use rl::AgentConfig;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Credential for the external service integration. Read once, never used by
/// the learner.
pub const API_KEY_VAR: &str = "OPEN_AI_KEY";

/// Train an actor-critic agent on the pendulum swing-up task.
#[derive(Parser, Debug)]
#[command(name = "swingup", version)]
pub struct Cli {
    /// JSON file with agent settings; missing fields use defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub episodes: Option<usize>,
    /// Step budget per episode.
    #[arg(long)]
    pub max_steps: Option<usize>,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long)]
    pub learning_rate: Option<f32>,
    /// `sgd` or `adam`.
    #[arg(long)]
    pub optimizer: Option<OptimizerKind>,
    /// Log the pendulum state every step.
    #[arg(long)]
    pub render: bool,
}

impl Cli {
    fn apply(&self, cfg: &mut AgentConfig) {
        if let Some(episodes) = self.episodes {
            cfg.episodes = episodes;
        }
        if let Some(max_steps) = self.max_steps {
            cfg.max_steps = max_steps;
        }
        if let Some(seed) = self.seed {
            cfg.seed = seed;
        }
        if let Some(lr) = self.learning_rate {
            cfg.learning_rate = lr;
        }
        if let Some(optimizer) = self.optimizer {
            cfg.optimizer = optimizer;
        }
        cfg.render |= self.render;
    }
}

pub struct Settings {
    pub agent: AgentConfig,
    pub api_key: Option<String>,
}

impl Settings {
    /// Config file first, then command-line overrides, then validation.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut agent = match &cli.config {
            Some(path) => read_config(path)?,
            None => AgentConfig::default(),
        };
        cli.apply(&mut agent);
        agent.validate()?;
        let api_key = std::env::var(API_KEY_VAR).ok().filter(|k| !k.is_empty());
        Ok(Self { agent, api_key })
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("agent", &self.agent)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn read_config(path: &Path) -> Result<AgentConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_defaults() {
        let cli = Cli::parse_from([
            "swingup",
            "--episodes",
            "3",
            "--max-steps",
            "50",
            "--optimizer",
            "adam",
            "--render",
        ]);
        let settings = Settings::load(&cli).unwrap();
        assert_eq!(settings.agent.episodes, 3);
        assert_eq!(settings.agent.max_steps, 50);
        assert_eq!(settings.agent.optimizer, OptimizerKind::Adam);
        assert!(settings.agent.render);
        assert_eq!(settings.agent.capacity, 100);
    }

    #[test]
    fn config_file_then_overrides() {
        let path = std::env::temp_dir().join(format!("swingup-cfg-{}.json", std::process::id()));
        fs::write(&path, r#"{ "capacity": 42, "max_steps": 10 }"#).unwrap();
        let cli = Cli::parse_from(["swingup", "--config", path.to_str().unwrap(), "--max-steps", "7"]);
        let settings = Settings::load(&cli).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(settings.agent.capacity, 42);
        assert_eq!(settings.agent.max_steps, 7);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let cli = Cli::parse_from(["swingup", "--max-steps", "0"]);
        assert!(Settings::load(&cli).is_err());
    }

    #[test]
    fn missing_config_file_names_the_path() {
        let cli = Cli::parse_from(["swingup", "--config", "/nonexistent/swingup.json"]);
        let err = Settings::load(&cli).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/swingup.json"));
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let settings = Settings { agent: AgentConfig::default(), api_key: Some("sk-secret".into()) };
        let shown = format!("{settings:?}");
        assert!(!shown.contains("sk-secret"));
        assert!(shown.contains("<redacted>"));
    }
}
