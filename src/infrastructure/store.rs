//! SQLite entry store

use crate::domain::journal::password_digest;
use crate::domain::{Entry, NewEntry, NewUser, User, UserUpdate};
use crate::error::{Result, SolaceError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

const DATE_FORMAT: &str = "%Y-%m-%d";

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS users (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        name          TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at    TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS entries (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id      INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        entry_date   TEXT NOT NULL,
        created_at   TEXT NOT NULL,
        gratitude    TEXT,
        tasks        TEXT,
        pain_points  TEXT,
        raw_thoughts TEXT,
        reflection   TEXT
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_entries_user_date ON entries (user_id, entry_date)",
];

const ENTRY_COLUMNS: &str = "id, user_id, entry_date, created_at, gratitude, tasks, pain_points, raw_thoughts, reflection";

/// Date window and size limit for listing entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// Inclusive lower bound
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound
    pub to: Option<NaiveDate>,
    pub limit: Option<usize>,
}

/// Durable record of users and diary entries
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn create_user(&self, user: &NewUser) -> Result<User>;

    async fn get_user(&self, id: i64) -> Result<Option<User>>;

    /// Returns `None` when the user does not exist
    async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<Option<User>>;

    /// Deletes the user and all their entries
    async fn delete_user(&self, id: i64) -> Result<bool>;

    /// Insert an entry on `date`. A second entry for the same user and date
    /// fails with `DuplicateEntry`.
    async fn create_entry(&self, user_id: i64, date: NaiveDate, entry: &NewEntry) -> Result<Entry>;

    async fn get_entry(&self, id: i64) -> Result<Option<Entry>>;

    async fn entry_on(&self, user_id: i64, date: NaiveDate) -> Result<Option<Entry>>;

    async fn entry_exists_on(&self, user_id: i64, date: NaiveDate) -> Result<bool>;

    /// Newest first
    async fn list_entries(&self, user_id: i64, filter: &EntryFilter) -> Result<Vec<Entry>>;

    /// Persist the text fields of an existing entry
    async fn save_entry(&self, entry: &Entry) -> Result<bool>;

    async fn delete_entry(&self, id: i64) -> Result<bool>;
}

/// SQLite-backed entry store using a sqlx pool
#[derive(Debug, Clone)]
pub struct SqliteEntryStore {
    pool: SqlitePool,
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_err<E>(err: E) -> SolaceError
where
    E: std::error::Error + Send + Sync + 'static,
{
    SolaceError::Database(sqlx::Error::Decode(Box::new(err)))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(decode_err)
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(decode_err)
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    let created_at: String = row.try_get("created_at")?;
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn entry_from_row(row: &SqliteRow) -> Result<Entry> {
    let date: String = row.try_get("entry_date")?;
    let created_at: String = row.try_get("created_at")?;
    Ok(Entry {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        date: parse_date(&date)?,
        created_at: parse_timestamp(&created_at)?,
        gratitude: row.try_get("gratitude")?,
        tasks: row.try_get("tasks")?,
        pain_points: row.try_get("pain_points")?,
        raw_thoughts: row.try_get("raw_thoughts")?,
        reflection: row.try_get("reflection")?,
    })
}

impl SqliteEntryStore {
    /// Wrap an existing pool and make sure the schema exists
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        Ok(SqliteEntryStore { pool })
    }

    /// Open (and create if missing) a database file
    pub async fn connect(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        info!(path = %path.display(), "opened entry store");
        Self::new(pool).await
    }

    /// A private in-memory database, mostly for tests
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // One connection that never recycles, or the database disappears
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::new(pool).await
    }
}

#[async_trait]
impl EntryStore for SqliteEntryStore {
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (name, password_hash, created_at) VALUES (?1, ?2, ?3)",
        )
        .bind(user.name.trim())
        .bind(password_digest(&user.password))
        .bind(timestamp(now))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(user_id = id, "created user");

        self.get_user(id)
            .await?
            .ok_or(SolaceError::UserNotFound(id))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, created_at FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<Option<User>> {
        let result = sqlx::query(
            "UPDATE users
             SET name = COALESCE(?1, name),
                 password_hash = COALESCE(?2, password_hash)
             WHERE id = ?3",
        )
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.password.as_deref().map(password_digest))
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_user(id).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_entry(&self, user_id: i64, date: NaiveDate, entry: &NewEntry) -> Result<Entry> {
        let result = sqlx::query(
            "INSERT INTO entries (user_id, entry_date, created_at, gratitude, tasks, pain_points, raw_thoughts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(user_id)
        .bind(date.format(DATE_FORMAT).to_string())
        .bind(timestamp(Utc::now()))
        .bind(entry.gratitude.as_deref())
        .bind(entry.tasks.as_deref())
        .bind(entry.pain_points.as_deref())
        .bind(entry.raw_thoughts.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                SolaceError::DuplicateEntry { user_id, date }
            }
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                SolaceError::UserNotFound(user_id)
            }
            other => SolaceError::Database(other),
        })?;

        let id = result.last_insert_rowid();
        debug!(entry_id = id, user_id, %date, "created entry");

        self.get_entry(id)
            .await?
            .ok_or(SolaceError::EntryNotFound(id))
    }

    async fn get_entry(&self, id: i64) -> Result<Option<Entry>> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(entry_from_row).transpose()
    }

    async fn entry_on(&self, user_id: i64, date: NaiveDate) -> Result<Option<Entry>> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE user_id = ?1 AND entry_date = ?2");
        let row = sqlx::query(&sql)
            .bind(user_id)
            .bind(date.format(DATE_FORMAT).to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(entry_from_row).transpose()
    }

    async fn entry_exists_on(&self, user_id: i64, date: NaiveDate) -> Result<bool> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM entries WHERE user_id = ?1 AND entry_date = ?2")
                .bind(user_id)
                .bind(date.format(DATE_FORMAT).to_string())
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    async fn list_entries(&self, user_id: i64, filter: &EntryFilter) -> Result<Vec<Entry>> {
        // SQLite treats a negative LIMIT as "no limit"
        let limit = filter
            .limit
            .map(|n| i64::try_from(n).unwrap_or(i64::MAX))
            .unwrap_or(-1);

        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entries
             WHERE user_id = ?1
               AND (?2 IS NULL OR entry_date >= ?2)
               AND (?3 IS NULL OR entry_date <= ?3)
             ORDER BY entry_date DESC
             LIMIT ?4"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(filter.from.map(|d| d.format(DATE_FORMAT).to_string()))
            .bind(filter.to.map(|d| d.format(DATE_FORMAT).to_string()))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(entry_from_row).collect()
    }

    async fn save_entry(&self, entry: &Entry) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE entries
             SET gratitude = ?1, tasks = ?2, pain_points = ?3, raw_thoughts = ?4, reflection = ?5
             WHERE id = ?6",
        )
        .bind(entry.gratitude.as_deref())
        .bind(entry.tasks.as_deref())
        .bind(entry.pain_points.as_deref())
        .bind(entry.raw_thoughts.as_deref())
        .bind(entry.reflection.as_deref())
        .bind(entry.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_entry(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM entries WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
