//! solace - Diary journaling backend
//!
//! Stores one diary entry per user per day and runs each entry through a set
//! of LLM reflection calls (gratitude, listening, planning, safety) whose
//! outputs are merged into a single summary.

pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod server;

pub use error::SolaceError;
