//! Safety classification of the safety-check call's reply

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn verdict_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?is)^(unsafe|safe)\b\s*[:\-]?\s*(.*)$").unwrap())
}

/// Classification derived from a raw safety-check reply.
///
/// Surfaced to callers only; dispatch never changes course because of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyAssessment {
    /// True when the reply leads with the word `UNSAFE`
    pub flagged: bool,
    /// Explanation following the verdict token
    pub notes: String,
}

impl SafetyAssessment {
    /// Classify a raw reply. Case-insensitive on the leading token and
    /// insensitive to surrounding whitespace.
    pub fn classify(raw: &str) -> Self {
        let trimmed = raw.trim();

        match verdict_regex().captures(trimmed) {
            Some(caps) => SafetyAssessment {
                flagged: caps[1].eq_ignore_ascii_case("unsafe"),
                notes: caps[2].trim().to_string(),
            },
            // No leading verdict token: keep the whole reply as notes
            None => SafetyAssessment {
                flagged: false,
                notes: trimmed.to_string(),
            },
        }
    }
}
