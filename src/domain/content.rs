//! Diary entry content handed to the dispatcher

use serde::{Deserialize, Serialize};

/// Free-text fields of one diary entry. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryEntryContent {
    #[serde(default)]
    pub gratitude: Option<String>,
    #[serde(default)]
    pub raw_thoughts: Option<String>,
    #[serde(default)]
    pub tasks: Option<String>,
    #[serde(default)]
    pub pain_points: Option<String>,
}

/// A field counts as present only if it holds something other than whitespace.
pub fn is_present(field: Option<&str>) -> bool {
    field.is_some_and(|value| !value.trim().is_empty())
}

impl DiaryEntryContent {
    /// True when no field is present
    pub fn is_blank(&self) -> bool {
        [
            self.gratitude.as_deref(),
            self.raw_thoughts.as_deref(),
            self.tasks.as_deref(),
            self.pain_points.as_deref(),
        ]
        .into_iter()
        .all(|field| !is_present(field))
    }
}
