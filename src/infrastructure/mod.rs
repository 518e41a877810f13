//! Infrastructure layer - Configuration, persistence and the language model

pub mod completion;
pub mod config;
pub mod store;
pub mod workspace;

pub use completion::{CompletionError, CompletionService, GeminiClient};
pub use config::Config;
pub use store::{EntryFilter, EntryStore, SqliteEntryStore};
pub use workspace::Workspace;
