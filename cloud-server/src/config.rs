//! Configuration module

use std::env;
use std::time::Duration;

use sentinel_core::constants;
use sentinel_core::EngineConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Remote scorer base URL
    pub scorer_url: String,

    /// Node ids served by the history views
    pub node_ids: Vec<String>,

    /// Scoring engine tuning
    pub engine: EngineConfig,

    /// Period of the expired-record sweep
    pub sweep_interval: Duration,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),

            scorer_url: constants::get_scorer_url(),

            node_ids: parse_node_ids(
                &env::var("NODE_IDS").unwrap_or_else(|_| "BANK_A,BANK_B".to_string()),
            ),

            engine: EngineConfig::from_env(),

            sweep_interval: Duration::from_secs(constants::get_sweep_interval_secs()),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_known_node(&self, node_id: &str) -> bool {
        self.node_ids.iter().any(|n| n == node_id)
    }
}

fn parse_node_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_node_ids() {
        assert_eq!(parse_node_ids("BANK_A, BANK_B,,"), vec!["BANK_A", "BANK_B"]);
        assert!(parse_node_ids("").is_empty());
    }
}
