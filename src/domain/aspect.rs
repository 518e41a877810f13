//! Aspects of an entry that the language model reflects on

use crate::domain::content::{is_present, DiaryEntryContent};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One named category of reflection.
///
/// Variants are declared in evaluation order, so the derived `Ord` keeps an
/// ordered map keyed by `Aspect` in the order aspects are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aspect {
    /// Positive highlights drawn from `gratitude`
    Gratitude,
    /// Empathetic listening over `raw_thoughts`
    Reflection,
    /// A gentle day plan built from `tasks`
    Plan,
    /// Safety check of `pain_points`
    Safety,
}

impl Aspect {
    /// All aspects in evaluation order
    pub const ALL: [Aspect; 4] = [
        Aspect::Gratitude,
        Aspect::Reflection,
        Aspect::Plan,
        Aspect::Safety,
    ];

    /// Key the aspect's output is recorded under
    pub fn key(&self) -> &'static str {
        match self {
            Aspect::Gratitude => "gratitude",
            Aspect::Reflection => "reflection",
            Aspect::Plan => "plan",
            Aspect::Safety => "safety",
        }
    }

    /// Name of the remote call that produces this aspect
    pub fn call_name(&self) -> &'static str {
        match self {
            Aspect::Gratitude => "positive-extraction",
            Aspect::Reflection => "empathetic-listening",
            Aspect::Plan => "gentle-planning",
            Aspect::Safety => "safety-check",
        }
    }

    /// Prompt template file for this aspect
    pub fn template_name(&self) -> &'static str {
        match self {
            Aspect::Gratitude => "gratitude.txt",
            Aspect::Reflection => "listener.txt",
            Aspect::Plan => "planner.txt",
            Aspect::Safety => "safety.txt",
        }
    }

    /// The entry field feeding this aspect, if it is present
    pub fn input<'a>(&self, content: &'a DiaryEntryContent) -> Option<&'a str> {
        let field = match self {
            Aspect::Gratitude => content.gratitude.as_deref(),
            Aspect::Reflection => content.raw_thoughts.as_deref(),
            Aspect::Plan => content.tasks.as_deref(),
            Aspect::Safety => content.pain_points.as_deref(),
        };
        field.filter(|value| is_present(Some(value)))
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_keys() {
        let keys: Vec<&str> = Aspect::ALL.iter().map(Aspect::key).collect();
        assert_eq!(keys, ["gratitude", "reflection", "plan", "safety"]);
    }

    #[test]
    fn test_call_names() {
        let names: Vec<&str> = Aspect::ALL.iter().map(Aspect::call_name).collect();
        assert_eq!(
            names,
            [
                "positive-extraction",
                "empathetic-listening",
                "gentle-planning",
                "safety-check"
            ]
        );
    }

    #[test]
    fn test_input_mapping() {
        let content = DiaryEntryContent {
            gratitude: Some("sunshine".to_string()),
            raw_thoughts: Some("busy head".to_string()),
            tasks: Some("Finish report".to_string()),
            pain_points: Some("tired".to_string()),
        };
        assert_eq!(Aspect::Gratitude.input(&content), Some("sunshine"));
        assert_eq!(Aspect::Reflection.input(&content), Some("busy head"));
        assert_eq!(Aspect::Plan.input(&content), Some("Finish report"));
        assert_eq!(Aspect::Safety.input(&content), Some("tired"));
    }

    #[test]
    fn test_input_skips_whitespace_fields() {
        let content = DiaryEntryContent {
            gratitude: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(Aspect::Gratitude.input(&content), None);
        assert_eq!(Aspect::Plan.input(&content), None);
    }

    #[test]
    fn test_map_order_follows_evaluation_order() {
        let mut map = BTreeMap::new();
        map.insert(Aspect::Safety, "s");
        map.insert(Aspect::Gratitude, "g");
        map.insert(Aspect::Plan, "p");

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"gratitude":"g","plan":"p","safety":"s"}"#);
    }
}
