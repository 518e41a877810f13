//! Workspace discovery and layout

use crate::error::{Result, SolaceError};
use crate::infrastructure::config::{Config, SOLACE_DIR};
use std::fs;
use std::path::{Path, PathBuf};

/// A directory containing a `.solace` workspace
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
}

impl Workspace {
    pub fn new(root: PathBuf) -> Self {
        Workspace { root }
    }

    /// Find the workspace: SOLACE_ROOT first, then walk up from the current directory
    pub fn discover() -> Result<Self> {
        if let Ok(root_path) = std::env::var("SOLACE_ROOT") {
            let path = PathBuf::from(root_path);
            if Self::has_solace_dir(&path) {
                return Ok(Workspace::new(path));
            }
            return Err(SolaceError::Config(format!(
                "SOLACE_ROOT is set to '{}' but no .solace directory found. \
                Run 'solace init' in that directory or unset SOLACE_ROOT.",
                path.display()
            )));
        }

        let current_dir = std::env::current_dir()?;
        Self::discover_from(&current_dir)
    }

    /// Walk up from `start` until a directory with `.solace` is found
    pub fn discover_from(start: &Path) -> Result<Self> {
        start
            .ancestors()
            .find(|dir| Self::has_solace_dir(dir))
            .map(|dir| Workspace::new(dir.to_path_buf()))
            .ok_or_else(|| SolaceError::NotSolaceDirectory(start.to_path_buf()))
    }

    fn has_solace_dir(path: &Path) -> bool {
        path.join(SOLACE_DIR).is_dir()
    }

    pub fn is_initialized(&self) -> bool {
        Self::has_solace_dir(&self.root)
    }

    /// Create the `.solace` directory; fails if it already exists
    pub fn initialize(&self) -> Result<()> {
        let solace_dir = self.solace_dir();

        if solace_dir.exists() {
            return Err(SolaceError::Config(format!(
                "Directory already initialized: {}",
                self.root.display()
            )));
        }

        fs::create_dir_all(&solace_dir)?;
        Ok(())
    }

    pub fn solace_dir(&self) -> PathBuf {
        self.root.join(SOLACE_DIR)
    }

    /// Directory searched for prompt template overrides
    pub fn prompts_dir(&self) -> PathBuf {
        self.solace_dir().join("prompts")
    }

    /// Absolute path of the configured database file
    pub fn database_path(&self, config: &Config) -> PathBuf {
        if config.database.path.is_absolute() {
            config.database.path.clone()
        } else {
            self.solace_dir().join(&config.database.path)
        }
    }

    pub fn load_config(&self) -> Result<Config> {
        Config::load_from_dir(&self.root)
    }

    pub fn save_config(&self, config: &Config) -> Result<()> {
        config.save_to_dir(&self.root)
    }
}
