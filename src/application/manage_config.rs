//! Config management use case

use crate::domain::DayBoundary;
use crate::error::{Result, SolaceError};
use crate::infrastructure::{Config, Workspace};
use std::path::PathBuf;
use std::str::FromStr;

/// Keys accepted by `get` and `set`, in listing order
pub const CONFIG_KEYS: [&str; 12] = [
    "server.host",
    "server.port",
    "database.path",
    "llm.base_url",
    "llm.model",
    "llm.api_key_env",
    "llm.timeout_secs",
    "llm.max_retries",
    "llm.retry_backoff_ms",
    "journal.day_boundary",
    "journal.persist_summary",
    "log.level",
];

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn unknown_key(key: &str) -> SolaceError {
    SolaceError::Config(format!(
        "Unknown config key: '{}'. Valid keys are: {}",
        key,
        CONFIG_KEYS.join(", ")
    ))
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| SolaceError::Config(format!("Invalid value for {}: '{}'", key, value)))
}

/// Service for reading and changing workspace configuration
pub struct ConfigService {
    workspace: Workspace,
}

impl ConfigService {
    pub fn new(workspace: Workspace) -> Self {
        ConfigService { workspace }
    }

    /// Get a single config value
    pub fn get(&self, key: &str) -> Result<String> {
        let config = self.workspace.load_config()?;
        read_key(&config, key)
    }

    /// Set a config value
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut config = self.workspace.load_config()?;

        match key {
            "server.host" => config.server.host = value.to_string(),
            "server.port" => config.server.port = parse_value(key, value)?,
            "database.path" => config.database.path = PathBuf::from(value),
            "llm.base_url" => config.llm.base_url = value.to_string(),
            "llm.model" => config.llm.model = value.to_string(),
            "llm.api_key_env" => config.llm.api_key_env = value.to_string(),
            "llm.timeout_secs" => {
                let secs: u64 = parse_value(key, value)?;
                if secs == 0 {
                    return Err(SolaceError::Config(
                        "llm.timeout_secs must be at least 1".to_string(),
                    ));
                }
                config.llm.timeout_secs = secs;
            }
            "llm.max_retries" => config.llm.max_retries = parse_value(key, value)?,
            "llm.retry_backoff_ms" => config.llm.retry_backoff_ms = parse_value(key, value)?,
            "journal.day_boundary" => {
                config.journal.day_boundary =
                    DayBoundary::from_str(value).map_err(SolaceError::Config)?;
            }
            "journal.persist_summary" => {
                config.journal.persist_summary = parse_value(key, value)?
            }
            "log.level" => {
                let level = value.to_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(SolaceError::Config(format!(
                        "Invalid log level: '{}'. Valid levels are: {}",
                        value,
                        LOG_LEVELS.join(", ")
                    )));
                }
                config.log.level = level;
            }
            _ => return Err(unknown_key(key)),
        }

        self.workspace.save_config(&config)
    }

    /// All config values as key/value pairs
    pub fn list(&self) -> Result<Vec<(&'static str, String)>> {
        let config = self.workspace.load_config()?;
        CONFIG_KEYS
            .iter()
            .map(|key| Ok((*key, read_key(&config, key)?)))
            .collect()
    }
}

fn read_key(config: &Config, key: &str) -> Result<String> {
    let value = match key {
        "server.host" => config.server.host.clone(),
        "server.port" => config.server.port.to_string(),
        "database.path" => config.database.path.display().to_string(),
        "llm.base_url" => config.llm.base_url.clone(),
        "llm.model" => config.llm.model.clone(),
        "llm.api_key_env" => config.llm.api_key_env.clone(),
        "llm.timeout_secs" => config.llm.timeout_secs.to_string(),
        "llm.max_retries" => config.llm.max_retries.to_string(),
        "llm.retry_backoff_ms" => config.llm.retry_backoff_ms.to_string(),
        "journal.day_boundary" => config.journal.day_boundary.to_string(),
        "journal.persist_summary" => config.journal.persist_summary.to_string(),
        "log.level" => config.log.level.clone(),
        _ => return Err(unknown_key(key)),
    };
    Ok(value)
}
