// Error types shared by the engine, the spatial index and the config loader

use thiserror::Error;

use crate::agent::AgentId;

/// Failures surfaced by the engine. All of them are contract violations:
/// an agent the population knows about is missing from the spatial index,
/// an identity refers to the wrong species, or a human is spawned without
/// energy.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("agent {0} is not present in the spatial index")]
    UnknownAgent(AgentId),

    #[error("agent {0} is not a live human")]
    NotHuman(AgentId),

    #[error("agent {0} is not a live zombie")]
    NotZombie(AgentId),

    #[error("humans must start with at least one unit of energy")]
    ZeroStartingEnergy,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors from loading or validating a [`crate::config::SimulationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported config format '{0}' (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

pub type SimResult<T> = Result<T, SimError>;
