//! Application layer - Use cases and orchestration

pub mod dispatch;
pub mod init;
pub mod journal;
pub mod manage_config;

pub use dispatch::{CallPolicy, DispatchResult, Dispatcher};
pub use journal::JournalService;
pub use manage_config::ConfigService;
