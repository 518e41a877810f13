//! Users and their diary entries

use crate::domain::content::DiaryEntryContent;
use crate::error::{Result, SolaceError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

/// A journal owner. The password digest never leaves the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// SHA-256 hex digest of a password
pub fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SolaceError::InvalidInput(
            "User name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(SolaceError::InvalidInput(
            "Password must not be empty".to_string(),
        ));
    }
    Ok(())
}

impl NewUser {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_password(&self.password)
    }
}

impl UserUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        Ok(())
    }
}

/// One user's diary submission for a calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub gratitude: Option<String>,
    pub tasks: Option<String>,
    pub pain_points: Option<String>,
    pub raw_thoughts: Option<String>,
    pub reflection: Option<String>,
}

impl Entry {
    /// The free-text fields the dispatcher works on
    pub fn content(&self) -> DiaryEntryContent {
        DiaryEntryContent {
            gratitude: self.gratitude.clone(),
            raw_thoughts: self.raw_thoughts.clone(),
            tasks: self.tasks.clone(),
            pain_points: self.pain_points.clone(),
        }
    }
}

/// A new entry. `date` defaults to today under the configured day boundary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEntry {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub gratitude: Option<String>,
    #[serde(default)]
    pub tasks: Option<String>,
    #[serde(default)]
    pub pain_points: Option<String>,
    #[serde(default)]
    pub raw_thoughts: Option<String>,
}

/// Distinguish a missing field (`None`) from an explicit `null` (`Some(None)`)
fn double_option<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Changes to an entry. An absent field is left unchanged, `null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryUpdate {
    #[serde(default, deserialize_with = "double_option")]
    pub gratitude: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub tasks: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub pain_points: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub raw_thoughts: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub reflection: Option<Option<String>>,
}

impl EntryUpdate {
    /// Apply onto an existing entry
    pub fn apply_to(self, entry: &mut Entry) {
        let fields = [
            (self.gratitude, &mut entry.gratitude),
            (self.tasks, &mut entry.tasks),
            (self.pain_points, &mut entry.pain_points),
            (self.raw_thoughts, &mut entry.raw_thoughts),
            (self.reflection, &mut entry.reflection),
        ];
        for (change, field) in fields {
            if let Some(value) = change {
                *field = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> Entry {
        Entry {
            id: 1,
            user_id: 1,
            date: NaiveDate::from_ymd_opt(2025, 1, 17).unwrap(),
            created_at: Utc::now(),
            gratitude: Some("sunshine".to_string()),
            tasks: None,
            pain_points: Some("tired".to_string()),
            raw_thoughts: None,
            reflection: None,
        }
    }

    #[test]
    fn test_password_digest() {
        let digest = password_digest("hunter2");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, password_digest("hunter2"));
        assert_ne!(digest, password_digest("hunter3"));
    }

    #[test]
    fn test_new_user_validation() {
        let ok = NewUser {
            name: "ada".to_string(),
            password: "pw".to_string(),
        };
        assert!(ok.validate().is_ok());

        let blank = NewUser {
            name: "  ".to_string(),
            password: "pw".to_string(),
        };
        assert!(matches!(blank.validate(), Err(SolaceError::InvalidInput(_))));

        let no_password = NewUser {
            name: "ada".to_string(),
            password: String::new(),
        };
        assert!(no_password.validate().is_err());
    }

    #[test]
    fn test_user_serialization_has_no_password() {
        let user = User {
            id: 3,
            name: "ada".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
    }

    #[test]
    fn test_entry_content_projection() {
        let content = sample_entry().content();
        assert_eq!(content.gratitude.as_deref(), Some("sunshine"));
        assert_eq!(content.pain_points.as_deref(), Some("tired"));
        assert!(content.tasks.is_none());
    }

    #[test]
    fn test_update_applies_only_given_fields() {
        let mut entry = sample_entry();
        EntryUpdate {
            tasks: Some(Some("Finish report".to_string())),
            reflection: Some(Some("A calm day".to_string())),
            ..Default::default()
        }
        .apply_to(&mut entry);

        assert_eq!(entry.tasks.as_deref(), Some("Finish report"));
        assert_eq!(entry.reflection.as_deref(), Some("A calm day"));
        assert_eq!(entry.gratitude.as_deref(), Some("sunshine"));
    }

    #[test]
    fn test_update_null_clears_missing_keeps() {
        let mut entry = sample_entry();
        entry.pain_points = Some("sore back".to_string());

        let update: EntryUpdate =
            serde_json::from_str(r#"{"pain_points": null, "tasks": "rest"}"#).unwrap();
        assert_eq!(update.pain_points, Some(None));
        assert_eq!(update.gratitude, None);

        update.apply_to(&mut entry);
        assert!(entry.pain_points.is_none());
        assert_eq!(entry.tasks.as_deref(), Some("rest"));
        assert_eq!(entry.gratitude.as_deref(), Some("sunshine"));
    }

    #[test]
    fn test_new_entry_date_optional() {
        let entry: NewEntry = serde_json::from_str(r#"{"gratitude":"tea"}"#).unwrap();
        assert!(entry.date.is_none());

        let entry: NewEntry =
            serde_json::from_str(r#"{"date":"2025-01-17","tasks":"walk"}"#).unwrap();
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2025, 1, 17));
    }
}
