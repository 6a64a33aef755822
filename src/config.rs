// Global configuration for a zombie outbreak run

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Paths searched (in order) when no config file is given on the command line.
pub const DEFAULT_CONFIG_PATHS: [&str; 3] = ["config.yaml", "config.yml", "config.json"];

/// How the grid treats coordinates that leave its bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderPolicy {
    /// Torus: leaving one edge re-enters from the opposite one.
    Wrapped,
    /// Hard walls: positions are clamped inside the grid and
    /// neighborhoods are cut at the edges.
    Clipped,
}

// Configuration struct for simulation parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // Grid
    pub grid_width: usize,
    pub grid_height: usize,
    pub border: BorderPolicy,

    // Initial population
    pub human_count: usize,
    pub zombie_count: usize,
    pub human_energy_min: u32,
    pub human_energy_max: u32,

    // Movement
    pub human_step_length: f64,
    pub zombie_step_length: f64,
    pub sense_radius: u32, // Moore radius scanned before moving
    pub watch_radius: u32, // Humans react to zombie moves within this radius

    // Scheduling
    pub shuffle_activation_order: bool,
    pub seed: Option<u64>,
    pub max_ticks: u64,
    pub stop_when_extinct: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_width: 50,
            grid_height: 50,
            border: BorderPolicy::Wrapped,
            human_count: 100,
            zombie_count: 5,
            human_energy_min: 4,
            human_energy_max: 10,
            human_step_length: 2.0,
            zombie_step_length: 1.0,
            sense_radius: 1,
            watch_radius: 1,
            shuffle_activation_order: false,
            seed: None,
            max_ticks: 200,
            stop_when_extinct: true,
        }
    }
}

impl SimulationConfig {
    /// Load a config from a YAML or JSON file, picked by extension.
    /// Missing fields take their default values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let config: Self = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&contents)?,
            "json" => serde_json::from_str(&contents)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        config.validate()?;
        Ok(config)
    }

    /// Search the working directory for a config file, falling back to defaults.
    /// A file that exists but fails to load is reported and skipped.
    pub fn from_default_paths() -> Self {
        for candidate in DEFAULT_CONFIG_PATHS {
            if !Path::new(candidate).exists() {
                continue;
            }
            match Self::from_file(candidate) {
                Ok(config) => {
                    tracing::info!(path = candidate, "loaded config");
                    return config;
                }
                Err(e) => {
                    tracing::warn!(path = candidate, error = %e, "ignoring unreadable config");
                }
            }
        }
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::Invalid("grid dimensions must be positive"));
        }
        if self.human_energy_min == 0 {
            return Err(ConfigError::Invalid("human_energy_min must be at least 1"));
        }
        if self.human_energy_min > self.human_energy_max {
            return Err(ConfigError::Invalid(
                "human_energy_min must not exceed human_energy_max",
            ));
        }
        for step in [self.human_step_length, self.zombie_step_length] {
            if !step.is_finite() || step <= 0.0 {
                return Err(ConfigError::Invalid("step lengths must be positive and finite"));
            }
        }
        // Any radius past the longer side already covers the whole grid
        let widest = self.grid_width.max(self.grid_height) as u64;
        if u64::from(self.sense_radius) > widest || u64::from(self.watch_radius) > widest {
            return Err(ConfigError::Invalid(
                "sense_radius and watch_radius must not exceed the longer grid side",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.border, BorderPolicy::Wrapped);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "grid_width: 20\nborder: clipped\nseed: 7\n";
        let config: SimulationConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.grid_width, 20);
        assert_eq!(config.grid_height, 50);
        assert_eq!(config.border, BorderPolicy::Clipped);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.human_count, 100);
    }

    #[test]
    fn json_file_round_trips_through_from_file() {
        let dir = std::env::temp_dir().join(format!("zombies-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("run.json");
        std::fs::write(&path, r#"{ "human_count": 12, "zombie_count": 3 }"#).unwrap();

        let config = SimulationConfig::from_file(&path).unwrap();
        assert_eq!(config.human_count, 12);
        assert_eq!(config.zombie_count, 3);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = std::env::temp_dir().join(format!("zombies-ext-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("run.toml");
        std::fs::write(&path, "human_count = 1").unwrap();

        let err = SimulationConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "toml"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn validation_rejects_bad_values() {
        let zero_grid = SimulationConfig {
            grid_width: 0,
            ..SimulationConfig::default()
        };
        assert!(zero_grid.validate().is_err());

        let inverted_energy = SimulationConfig {
            human_energy_min: 8,
            human_energy_max: 3,
            ..SimulationConfig::default()
        };
        assert!(inverted_energy.validate().is_err());

        let zero_energy = SimulationConfig {
            human_energy_min: 0,
            ..SimulationConfig::default()
        };
        assert!(zero_energy.validate().is_err());

        let bad_step = SimulationConfig {
            zombie_step_length: f64::NAN,
            ..SimulationConfig::default()
        };
        assert!(bad_step.validate().is_err());
    }

    #[test]
    fn radii_are_capped_by_the_longer_side() {
        let at_cap = SimulationConfig {
            grid_width: 10,
            grid_height: 30,
            sense_radius: 30,
            watch_radius: 30,
            ..SimulationConfig::default()
        };
        assert!(at_cap.validate().is_ok());

        let huge_sense = SimulationConfig {
            sense_radius: u32::MAX,
            ..SimulationConfig::default()
        };
        assert!(matches!(huge_sense.validate(), Err(ConfigError::Invalid(_))));

        let wide_watch = SimulationConfig {
            watch_radius: 51,
            ..SimulationConfig::default()
        };
        assert!(wide_watch.validate().is_err());
    }
}
