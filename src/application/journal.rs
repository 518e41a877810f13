//! Journal use cases shared by the HTTP and CLI surfaces

use crate::application::dispatch::{CallPolicy, DispatchResult, Dispatcher};
use crate::domain::{
    DayBoundary, DiaryEntryContent, Entry, EntryUpdate, NewEntry, NewUser, PromptSet,
    TimeReference, User, UserUpdate,
};
use crate::error::{Result, SolaceError};
use crate::infrastructure::config::JournalConfig;
use crate::infrastructure::{
    Config, EntryFilter, EntryStore, GeminiClient, SqliteEntryStore, Workspace,
};
use std::sync::Arc;
use tracing::info;

/// List a user's entries, newest first.
///
/// Needs only the store, so the CLI can list without a completion service.
pub async fn list_user_entries(
    store: &dyn EntryStore,
    user_id: i64,
    filter: &EntryFilter,
) -> Result<Vec<Entry>> {
    store
        .get_user(user_id)
        .await?
        .ok_or(SolaceError::UserNotFound(user_id))?;

    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if from > to {
            return Err(SolaceError::InvalidInput(format!(
                "Start date {} is after end date {}",
                from, to
            )));
        }
    }

    store.list_entries(user_id, filter).await
}

/// Service over the entry store and the dispatcher
pub struct JournalService {
    store: Arc<dyn EntryStore>,
    dispatcher: Arc<Dispatcher>,
    boundary: DayBoundary,
    persist_summary: bool,
}

impl JournalService {
    pub fn new(
        store: Arc<dyn EntryStore>,
        dispatcher: Arc<Dispatcher>,
        settings: &JournalConfig,
    ) -> Self {
        JournalService {
            store,
            dispatcher,
            boundary: settings.day_boundary,
            persist_summary: settings.persist_summary,
        }
    }

    /// Wire the production collaborators for a workspace.
    ///
    /// Reads the API key from the environment once, here.
    pub async fn from_workspace(workspace: &Workspace, config: &Config) -> Result<Self> {
        let api_key = config.llm.api_key()?;
        let completion = Arc::new(GeminiClient::new(&config.llm, api_key));
        let prompts = PromptSet::load(&workspace.prompts_dir())?;
        let dispatcher = Dispatcher::new(completion, prompts, CallPolicy::from(&config.llm));

        let store = SqliteEntryStore::connect(&workspace.database_path(config)).await?;

        Ok(JournalService::new(
            Arc::new(store),
            Arc::new(dispatcher),
            &config.journal,
        ))
    }

    pub fn day_boundary(&self) -> DayBoundary {
        self.boundary
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User> {
        user.validate()?;
        let created = self.store.create_user(user).await?;
        info!(user_id = created.id, "user created");
        Ok(created)
    }

    pub async fn get_user(&self, id: i64) -> Result<User> {
        self.store
            .get_user(id)
            .await?
            .ok_or(SolaceError::UserNotFound(id))
    }

    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<User> {
        update.validate()?;
        self.store
            .update_user(id, update)
            .await?
            .ok_or(SolaceError::UserNotFound(id))
    }

    pub async fn delete_user(&self, id: i64) -> Result<()> {
        if !self.store.delete_user(id).await? {
            return Err(SolaceError::UserNotFound(id));
        }
        info!(user_id = id, "user deleted");
        Ok(())
    }

    /// Create an entry; at most one per user per calendar day
    pub async fn create_entry(&self, user_id: i64, entry: &NewEntry) -> Result<Entry> {
        self.get_user(user_id).await?;

        let date = entry.date.unwrap_or_else(|| self.boundary.today());
        if self.store.entry_exists_on(user_id, date).await? {
            return Err(SolaceError::DuplicateEntry { user_id, date });
        }

        let created = self.store.create_entry(user_id, date, entry).await?;
        info!(entry_id = created.id, user_id, %date, "entry created");
        Ok(created)
    }

    pub async fn get_entry(&self, id: i64) -> Result<Entry> {
        self.store
            .get_entry(id)
            .await?
            .ok_or(SolaceError::EntryNotFound(id))
    }

    pub async fn list_entries(&self, user_id: i64, filter: &EntryFilter) -> Result<Vec<Entry>> {
        list_user_entries(self.store.as_ref(), user_id, filter).await
    }

    /// The user's entry on the day a time reference resolves to
    pub async fn entry_for(&self, user_id: i64, time_ref: &TimeReference) -> Result<Entry> {
        self.get_user(user_id).await?;

        let date = time_ref.resolve_in(&self.boundary);
        self.store
            .entry_on(user_id, date)
            .await?
            .ok_or(SolaceError::NoEntryForDate { user_id, date })
    }

    pub async fn today_entry(&self, user_id: i64) -> Result<Entry> {
        self.entry_for(user_id, &TimeReference::Today).await
    }

    pub async fn update_entry(&self, id: i64, update: EntryUpdate) -> Result<Entry> {
        let mut entry = self.get_entry(id).await?;
        update.apply_to(&mut entry);

        if !self.store.save_entry(&entry).await? {
            return Err(SolaceError::EntryNotFound(id));
        }
        Ok(entry)
    }

    pub async fn delete_entry(&self, id: i64) -> Result<()> {
        if !self.store.delete_entry(id).await? {
            return Err(SolaceError::EntryNotFound(id));
        }
        info!(entry_id = id, "entry deleted");
        Ok(())
    }

    /// Dispatch a stored entry. The summary is written to `reflection`
    /// when `journal.persist_summary` is on.
    pub async fn analyze_entry(&self, id: i64) -> Result<DispatchResult> {
        let mut entry = self.get_entry(id).await?;
        let result = self.dispatcher.dispatch(&entry.content()).await?;

        if self.persist_summary {
            entry.reflection = Some(result.summary.clone());
            self.store.save_entry(&entry).await?;
        }

        info!(entry_id = id, aspects = result.aspect_responses.len(), "entry analyzed");
        Ok(result)
    }

    /// Dispatch content that is not stored
    pub async fn analyze_content(&self, content: &DiaryEntryContent) -> Result<DispatchResult> {
        Ok(self.dispatcher.dispatch(content).await?)
    }
}
