//! Domain layer - Journal records, dispatch inputs and prompt rules

pub mod aspect;
pub mod content;
pub mod day_boundary;
pub mod journal;
pub mod safety;
pub mod template;
pub mod time_ref;

pub use aspect::Aspect;
pub use content::{is_present, DiaryEntryContent};
pub use day_boundary::DayBoundary;
pub use journal::{Entry, EntryUpdate, NewEntry, NewUser, User, UserUpdate};
pub use safety::SafetyAssessment;
pub use template::{load_template, PromptSet, Template};
pub use time_ref::TimeReference;
