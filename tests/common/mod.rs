#![allow(dead_code)]

use assert_cmd::Command;
use async_trait::async_trait;
use solace::application::{CallPolicy, Dispatcher, JournalService};
use solace::domain::PromptSet;
use solace::infrastructure::config::JournalConfig;
use solace::infrastructure::{CompletionError, CompletionService, SqliteEntryStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn solace_cmd() -> Command {
    let mut cmd = Command::cargo_bin("solace").unwrap();
    cmd.env_remove("SOLACE_ROOT");
    cmd.env_remove("GOOGLE_API_KEY");
    cmd
}

/// Replies according to which built-in template a prompt was rendered from
#[derive(Default)]
pub struct ScriptedCompletion {
    pub prompts: Mutex<Vec<String>>,
    pub unsafe_reply: bool,
    /// Fail every call whose prompt contains this text
    pub fail_on: Option<&'static str>,
    pub calls: AtomicUsize,
}

impl ScriptedCompletion {
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(marker) = self.fail_on {
            if prompt.contains(marker) {
                return Err(CompletionError::Status {
                    status: 400,
                    body: "bad request".to_string(),
                });
            }
        }

        let reply = if prompt.contains("POSITIVE aspects") {
            "You found joy in small things."
        } else if prompt.contains("empathetic listener") {
            "That sounds like a lot to carry."
        } else if prompt.contains("gentle planner") {
            "Start with one task."
        } else if prompt.contains("safety checker") {
            if self.unsafe_reply {
                "UNSAFE: mentions hopelessness"
            } else {
                "SAFE"
            }
        } else {
            "Overall a steady day."
        };
        Ok(reply.to_string())
    }
}

pub fn quick_policy() -> CallPolicy {
    CallPolicy {
        timeout: Duration::from_secs(5),
        max_retries: 0,
        backoff: Duration::from_millis(1),
    }
}

/// Journal service over an in-memory store and the given completion fake
pub async fn journal_service(completion: Arc<ScriptedCompletion>) -> JournalService {
    let store = SqliteEntryStore::in_memory().await.unwrap();
    let dispatcher = Dispatcher::new(completion, PromptSet::builtin().unwrap(), quick_policy());
    JournalService::new(
        Arc::new(store),
        Arc::new(dispatcher),
        &JournalConfig::default(),
    )
}
