//! Error types for solace

use crate::infrastructure::CompletionError;
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the solace backend
#[derive(Debug, Error)]
pub enum SolaceError {
    #[error("Not a solace directory: {0}")]
    NotSolaceDirectory(PathBuf),

    #[error("Invalid time reference: {0}")]
    InvalidTimeReference(String),

    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("Entry not found: {0}")]
    EntryNotFound(i64),

    #[error("No entry for user {user_id} on {date}")]
    NoEntryForDate { user_id: i64, date: NaiveDate },

    #[error("User {user_id} already has an entry for {date}")]
    DuplicateEntry { user_id: i64, date: NaiveDate },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Analysis failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Failure of a dispatch. Any failed call fails the whole dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A call failed with a non-transient error and was not retried
    #[error("{aspect} call failed: {cause}")]
    AspectCallFailed {
        aspect: &'static str,
        #[source]
        cause: CompletionError,
    },

    /// A call kept failing transiently until the retry budget ran out
    #[error("{failed_aspect} call failed after {attempts} attempts: {cause}")]
    DispatchFailed {
        failed_aspect: &'static str,
        attempts: u32,
        #[source]
        cause: CompletionError,
    },
}

impl DispatchError {
    /// Name of the aspect (or `summary`) whose call failed
    pub fn aspect(&self) -> &'static str {
        match self {
            DispatchError::AspectCallFailed { aspect, .. } => aspect,
            DispatchError::DispatchFailed { failed_aspect, .. } => failed_aspect,
        }
    }
}

impl SolaceError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SolaceError::NotSolaceDirectory(_) => 2,
            SolaceError::InvalidTimeReference(_) => 3,
            SolaceError::UserNotFound(_)
            | SolaceError::EntryNotFound(_)
            | SolaceError::NoEntryForDate { .. } => 4,
            SolaceError::DuplicateEntry { .. } => 5,
            SolaceError::Dispatch(_) => 6,
            _ => 1,
        }
    }

    /// Whether the error means the addressed record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SolaceError::UserNotFound(_)
                | SolaceError::EntryNotFound(_)
                | SolaceError::NoEntryForDate { .. }
        )
    }

    /// Get a user-friendly error message with suggestions
    pub fn display_with_suggestions(&self) -> String {
        match self {
            SolaceError::NotSolaceDirectory(path) => {
                format!(
                    "Not a solace directory: {}\n\n\
                    Suggestions:\n\
                    • Run 'solace init' in this directory to create a new workspace\n\
                    • Navigate to an existing solace directory\n\
                    • Set SOLACE_ROOT environment variable to your workspace path",
                    path.display()
                )
            }
            SolaceError::InvalidTimeReference(ref_str) => {
                format!(
                    "Invalid time reference: '{}'\n\n\
                    Valid time references:\n\
                    • today, yesterday, tomorrow\n\
                    • monday, tuesday, ..., sunday (most recent)\n\
                    • last monday, next friday, etc.\n\
                    • Specific dates: DD-MM-YYYY or YYYY-MM-DD (e.g., 17-01-2025)",
                    ref_str
                )
            }
            SolaceError::DuplicateEntry { user_id, date } => {
                format!(
                    "User {} already has an entry for {}\n\n\
                    Suggestions:\n\
                    • Update the existing entry instead of creating a new one\n\
                    • Entries are limited to one per user per calendar day\n\
                    • The day boundary is set by 'journal.day_boundary'",
                    user_id, date
                )
            }
            SolaceError::Dispatch(err) => {
                format!(
                    "Analysis failed during the {} call: {}\n\n\
                    Suggestions:\n\
                    • Check network access to the language model endpoint\n\
                    • Raise the call timeout: solace config llm.timeout_secs 60\n\
                    • Allow more retries: solace config llm.max_retries 3",
                    err.aspect(),
                    err
                )
            }
            SolaceError::Config(msg) => {
                if msg.contains("API key") {
                    format!(
                        "{}\n\n\
                        Suggestions:\n\
                        • export GOOGLE_API_KEY=<your key>\n\
                        • Point to another variable: solace config llm.api_key_env MY_KEY_VAR",
                        msg
                    )
                } else if msg.contains("day boundary") {
                    format!(
                        "{}\n\n\
                        Valid day boundaries: utc, local, or a fixed offset like +02:00\n\
                        Example: solace config journal.day_boundary local",
                        msg
                    )
                } else {
                    msg.clone()
                }
            }
            _ => self.to_string(),
        }
    }
}

/// Result type using SolaceError
pub type Result<T> = std::result::Result<T, SolaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_solace_directory_suggestion() {
        let err = SolaceError::NotSolaceDirectory(PathBuf::from("/tmp/test"));
        let msg = err.display_with_suggestions();
        assert!(msg.contains("solace init"));
        assert!(msg.contains("SOLACE_ROOT"));
        assert!(msg.contains("Suggestions"));
    }

    #[test]
    fn test_invalid_time_reference_examples() {
        let err = SolaceError::InvalidTimeReference("baddate".to_string());
        let msg = err.display_with_suggestions();
        assert!(msg.contains("today"));
        assert!(msg.contains("DD-MM-YYYY"));
        assert!(msg.contains("'baddate'"));
    }

    #[test]
    fn test_duplicate_entry_suggestions() {
        let err = SolaceError::DuplicateEntry {
            user_id: 7,
            date: NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(),
        };
        let msg = err.display_with_suggestions();
        assert!(msg.contains("User 7"));
        assert!(msg.contains("2025-01-17"));
        assert!(msg.contains("journal.day_boundary"));
    }

    #[test]
    fn test_dispatch_failure_names_aspect() {
        let err = SolaceError::from(DispatchError::DispatchFailed {
            failed_aspect: "plan",
            attempts: 3,
            cause: CompletionError::Timeout,
        });
        let msg = err.display_with_suggestions();
        assert!(msg.contains("plan call"));
        assert!(msg.contains("after 3 attempts"));
        assert!(msg.contains("llm.timeout_secs"));
    }

    #[test]
    fn test_config_api_key_suggestions() {
        let err = SolaceError::Config("API key not set: GOOGLE_API_KEY".to_string());
        let msg = err.display_with_suggestions();
        assert!(msg.contains("export GOOGLE_API_KEY"));
        assert!(msg.contains("llm.api_key_env"));
    }

    #[test]
    fn test_config_day_boundary_suggestions() {
        let err = SolaceError::Config("Invalid day boundary: 'mars'".to_string());
        let msg = err.display_with_suggestions();
        assert!(msg.contains("utc, local"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            SolaceError::NotSolaceDirectory(PathBuf::from(".")).exit_code(),
            2
        );
        assert_eq!(SolaceError::InvalidTimeReference("x".into()).exit_code(), 3);
        assert_eq!(SolaceError::EntryNotFound(1).exit_code(), 4);
        assert_eq!(SolaceError::UserNotFound(1).exit_code(), 4);
        assert_eq!(SolaceError::InvalidInput("x".into()).exit_code(), 1);
    }

    #[test]
    fn test_other_errors_fallback() {
        let err = SolaceError::Template("Template error".to_string());
        let msg = err.display_with_suggestions();
        assert_eq!(msg, "Template error: Template error");
    }
}
