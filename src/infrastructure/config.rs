//! Configuration management

use crate::domain::DayBoundary;
use crate::error::{Result, SolaceError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Workspace directory holding config, database and prompt overrides
pub const SOLACE_DIR: &str = ".solace";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub journal: JournalConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file, relative paths resolve against the `.solace` directory
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: PathBuf::from("solace.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Per-call timeout
    pub timeout_secs: u64,
    /// Retries for transient failures, on top of the first attempt
    pub max_retries: u32,
    /// Backoff before the first retry, doubled on each following one
    pub retry_backoff_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            timeout_secs: 30,
            max_retries: 2,
            retry_backoff_ms: 500,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable.
    /// Called once at process start.
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(SolaceError::Config(format!(
                "API key not set: environment variable {} is empty or missing",
                self.api_key_env
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Boundary deciding which calendar day an entry belongs to
    pub day_boundary: DayBoundary,
    /// Store the analysis summary in the entry's `reflection` field
    pub persist_summary: bool,
}

impl Default for JournalConfig {
    fn default() -> Self {
        JournalConfig {
            day_boundary: DayBoundary::Utc,
            persist_summary: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load config from .solace/config.toml in the given directory
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = path.join(SOLACE_DIR).join(CONFIG_FILE);

        let contents = fs::read_to_string(&config_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SolaceError::NotSolaceDirectory(path.to_path_buf())
            } else {
                SolaceError::Io(e)
            }
        })?;

        toml::from_str(&contents)
            .map_err(|e| SolaceError::Config(format!("Failed to parse config.toml: {}", e)))
    }

    /// Save config to .solace/config.toml in the given directory
    pub fn save_to_dir(&self, path: &Path) -> Result<()> {
        let solace_dir = path.join(SOLACE_DIR);

        if !solace_dir.exists() {
            fs::create_dir(&solace_dir)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| SolaceError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(solace_dir.join(CONFIG_FILE), contents)?;

        Ok(())
    }
}
