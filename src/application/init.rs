//! Initialize workspace use case

use crate::error::Result;
use crate::infrastructure::{Config, SqliteEntryStore, Workspace};
use std::fs;
use std::path::{Path, PathBuf};

/// Initialize a new workspace at `path`: config file plus an empty database.
pub async fn init(path: &Path, database: Option<PathBuf>) -> Result<Workspace> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }

    let workspace = Workspace::new(path.to_path_buf());
    workspace.initialize()?;

    let mut config = Config::default();
    if let Some(database) = database {
        config.database.path = database;
    }
    workspace.save_config(&config)?;

    SqliteEntryStore::connect(&workspace.database_path(&config)).await?;

    Ok(workspace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_config_and_database() {
        let temp = TempDir::new().unwrap();
        let ws = init(temp.path(), None).await.unwrap();

        assert!(temp.path().join(".solace/config.toml").exists());
        assert!(temp.path().join(".solace/solace.db").exists());
        assert_eq!(ws.load_config().unwrap(), Config::default());
    }

    #[tokio::test]
    async fn test_init_custom_database() {
        let temp = TempDir::new().unwrap();
        init(temp.path(), Some(PathBuf::from("diary.sqlite")))
            .await
            .unwrap();

        assert!(temp.path().join(".solace/diary.sqlite").exists());
    }

    #[tokio::test]
    async fn test_init_twice_fails() {
        let temp = TempDir::new().unwrap();
        init(temp.path(), None).await.unwrap();
        assert!(init(temp.path(), None).await.is_err());
    }

    #[tokio::test]
    async fn test_init_creates_missing_directory() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        init(&nested, None).await.unwrap();
        assert!(nested.join(".solace").is_dir());
    }
}
