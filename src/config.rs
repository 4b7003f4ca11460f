// Configuration module for reading Snake.toml
// Every tunable of the decision engine and the server lives here; the engine
// itself never reads files or the environment.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::behavior::{behavior_with_seed, DEFAULT_WANDERER_SEED};

/// Name of the strategy that runs rollouts instead of a single heuristic
pub const LOOKAHEAD_ALGORITHM: &str = "lookahead";

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub timing: TimingConfig,
    pub simulation: SimulationConfig,
    pub scores: ScoresConfig,
    pub strategy: StrategyConfig,
    pub appearance: AppearanceConfig,
    pub debug: DebugConfig,
}

/// Response deadline as seen by the game server
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TimingConfig {
    pub response_time_budget_ms: u64,
    pub network_overhead_ms: u64,
}

impl TimingConfig {
    /// Computes the effective computation budget
    pub fn effective_budget_ms(&self) -> u64 {
        self.response_time_budget_ms.saturating_sub(self.network_overhead_ms)
    }
}

/// Rollout limits and the hypotheses played out for each side
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SimulationConfig {
    pub max_millis: u64,
    pub max_turns: u32,
    pub my_behaviors: Vec<String>,
    pub enemy_behaviors: Vec<String>,
    #[serde(default = "default_wanderer_seed")]
    pub wanderer_seed: u64,
}

fn default_wanderer_seed() -> u64 {
    DEFAULT_WANDERER_SEED
}

/// Outcome scoring weights
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScoresConfig {
    pub survival_turn_weight: u64,
    pub food_eaten_weight: u64,
}

/// Which behaviour answers /move
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StrategyConfig {
    pub algorithm: String,
}

/// Metadata returned from GET /
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppearanceConfig {
    pub apiversion: String,
    pub author: String,
    pub color: String,
    pub head: String,
    pub tail: String,
    pub version: String,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Snake.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed and validated configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        let config: Config =
            toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Snake.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                response_time_budget_ms: 400,
                network_overhead_ms: 50,
            },
            simulation: SimulationConfig {
                max_millis: 120,
                max_turns: 10000,
                my_behaviors: vec![
                    "cautious".to_string(),
                    "hungry".to_string(),
                    "tail_chaser".to_string(),
                ],
                enemy_behaviors: vec![
                    "cautious".to_string(),
                    "hungry".to_string(),
                    "stalker".to_string(),
                ],
                wanderer_seed: DEFAULT_WANDERER_SEED,
            },
            scores: ScoresConfig {
                survival_turn_weight: 100,
                food_eaten_weight: 200,
            },
            strategy: StrategyConfig {
                algorithm: LOOKAHEAD_ALGORITHM.to_string(),
            },
            appearance: AppearanceConfig {
                apiversion: "1".to_string(),
                author: "ksiopiolosz-aterlo".to_string(),
                color: "#00DEAD".to_string(),
                head: "default".to_string(),
                tail: "default".to_string(),
                version: "1.0.0".to_string(),
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "battlesnake_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            eprintln!("Warning: Could not load Snake.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }

    /// Milliseconds one decision may spend simulating
    pub fn decision_budget_ms(&self) -> u64 {
        self.simulation
            .max_millis
            .min(self.timing.effective_budget_ms())
    }

    /// Rejects names no behaviour answers to and empty hypothesis lists
    pub fn validate(&self) -> Result<(), String> {
        if self.simulation.my_behaviors.is_empty() {
            return Err("simulation.my_behaviors must not be empty".to_string());
        }
        if self.simulation.enemy_behaviors.is_empty() {
            return Err("simulation.enemy_behaviors must not be empty".to_string());
        }

        let seed = self.simulation.wanderer_seed;
        for name in self
            .simulation
            .my_behaviors
            .iter()
            .chain(self.simulation.enemy_behaviors.iter())
        {
            if behavior_with_seed(name, seed).is_none() {
                return Err(format!("Unknown behaviour '{}' in [simulation]", name));
            }
        }

        let algorithm = self.strategy.algorithm.as_str();
        if algorithm != LOOKAHEAD_ALGORITHM && behavior_with_seed(algorithm, seed).is_none() {
            return Err(format!("Unknown strategy.algorithm '{}'", algorithm));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_budget_calculation() {
        let config = Config::default_hardcoded();
        assert_eq!(config.timing.effective_budget_ms(), 350);
    }

    #[test]
    fn test_decision_budget_is_the_smaller_limit() {
        let mut config = Config::default_hardcoded();
        assert_eq!(config.decision_budget_ms(), 120);

        config.simulation.max_millis = 1000;
        assert_eq!(config.decision_budget_ms(), 350);
    }

    #[test]
    fn test_hardcoded_defaults_are_valid() {
        assert!(Config::default_hardcoded().validate().is_ok());
    }

    #[test]
    fn test_snake_toml_can_be_parsed() {
        // This test ensures Snake.toml is valid and can be parsed
        let result = Config::from_file("Snake.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Snake.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config = Config::from_file("Snake.toml")
            .expect("Snake.toml should be parseable");
        assert_eq!(file_config, Config::default_hardcoded());
    }

    #[test]
    fn test_unknown_behaviour_is_rejected() {
        let mut config = Config::default_hardcoded();
        config.simulation.enemy_behaviors.push("berserk".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.contains("berserk"));

        let mut config = Config::default_hardcoded();
        config.strategy.algorithm = "teleport".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default_hardcoded();
        config.strategy.algorithm = "headstrong_up".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_hypotheses_are_rejected() {
        let mut config = Config::default_hardcoded();
        config.simulation.my_behaviors.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wanderer_seed_is_optional() {
        let toml = r##"
            [timing]
            response_time_budget_ms = 500
            network_overhead_ms = 100

            [simulation]
            max_millis = 50
            max_turns = 20
            my_behaviors = ["wanderer"]
            enemy_behaviors = ["tail_chaser"]

            [scores]
            survival_turn_weight = 1
            food_eaten_weight = 2

            [strategy]
            algorithm = "cautious"

            [appearance]
            apiversion = "1"
            author = "someone"
            color = "#123456"
            head = "default"
            tail = "default"
            version = "0.1.0"

            [debug]
            enabled = true
            log_file_path = "decisions.jsonl"
        "##;
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.simulation.wanderer_seed, DEFAULT_WANDERER_SEED);
        assert_eq!(config.decision_budget_ms(), 50);
        assert!(config.debug.enabled);
    }

    #[test]
    fn test_missing_file_returns_error() {
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
    }
}
