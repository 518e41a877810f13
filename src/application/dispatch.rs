//! Dispatcher: routes entry content through the aspect calls and merges them

use crate::domain::{Aspect, DiaryEntryContent, PromptSet, SafetyAssessment};
use crate::error::DispatchError;
use crate::infrastructure::config::LlmConfig;
use crate::infrastructure::{CompletionError, CompletionService};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Name reported for the merge call in errors and logs
pub const SUMMARY_CALL: &str = "summary";

/// Timeout and retry rules applied to every remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        CallPolicy::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for CallPolicy {
    fn from(config: &LlmConfig) -> Self {
        CallPolicy {
            timeout: Duration::from_secs(config.timeout_secs),
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

impl CallPolicy {
    /// Delay before retry number `retry` (1-based)
    fn backoff_for(&self, retry: u32) -> Duration {
        self.backoff
            .saturating_mul(1u32 << retry.saturating_sub(1).min(16))
    }
}

/// Output of one dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    /// Per-aspect outputs, in evaluation order
    pub aspect_responses: BTreeMap<Aspect, String>,
    pub summary: String,
    /// Present when the safety check ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety: Option<SafetyAssessment>,
}

/// Decides which aspect calls an entry needs, issues them and merges the results
pub struct Dispatcher {
    completion: Arc<dyn CompletionService>,
    prompts: PromptSet,
    policy: CallPolicy,
}

impl Dispatcher {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        prompts: PromptSet,
        policy: CallPolicy,
    ) -> Self {
        Dispatcher {
            completion,
            prompts,
            policy,
        }
    }

    /// Run every applicable aspect call, then the summary call over their outputs.
    ///
    /// Aspect calls are independent and run concurrently; the summary call
    /// starts only after all of them finished. Any failed call fails the
    /// whole dispatch.
    pub async fn dispatch(
        &self,
        content: &DiaryEntryContent,
    ) -> Result<DispatchResult, DispatchError> {
        let planned: Vec<(Aspect, &str)> = Aspect::ALL
            .iter()
            .filter_map(|aspect| aspect.input(content).map(|input| (*aspect, input)))
            .collect();

        debug!(
            service = self.completion.name(),
            aspects = ?planned.iter().map(|(a, _)| a.key()).collect::<Vec<_>>(),
            "dispatching entry"
        );

        if content.is_blank() {
            debug!("entry has no content, only the summary call runs");
        }

        let calls = planned.iter().map(|&(aspect, input)| async move {
            debug!(aspect = aspect.key(), call = aspect.call_name(), "issuing aspect call");
            let prompt = self.prompts.aspect(aspect).render(input);
            let text = self.call(aspect.key(), &prompt).await?;
            Ok::<_, DispatchError>((aspect, text))
        });
        let aspect_responses: BTreeMap<Aspect, String> =
            try_join_all(calls).await?.into_iter().collect();

        let safety = aspect_responses
            .get(&Aspect::Safety)
            .map(|raw| SafetyAssessment::classify(raw));
        if safety.as_ref().is_some_and(|s| s.flagged) {
            warn!("safety check flagged entry");
        }

        let summary_prompt = self
            .prompts
            .summary()
            .render(&render_responses(&aspect_responses));
        let summary = self.call(SUMMARY_CALL, &summary_prompt).await?;

        info!(aspects = aspect_responses.len(), "dispatch complete");

        Ok(DispatchResult {
            aspect_responses,
            summary,
            safety,
        })
    }

    /// One remote call under the timeout and retry policy
    async fn call(&self, name: &'static str, prompt: &str) -> Result<String, DispatchError> {
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            debug!(call = name, attempt = attempts, "calling completion service");

            let outcome =
                match tokio::time::timeout(self.policy.timeout, self.completion.complete(prompt))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(CompletionError::Timeout),
                };

            let cause = match outcome {
                Ok(text) => return Ok(text),
                Err(cause) => cause,
            };

            if !cause.is_transient() || (attempts == 1 && self.policy.max_retries == 0) {
                return Err(DispatchError::AspectCallFailed {
                    aspect: name,
                    cause,
                });
            }
            if attempts > self.policy.max_retries {
                return Err(DispatchError::DispatchFailed {
                    failed_aspect: name,
                    attempts,
                    cause,
                });
            }

            let delay = self.policy.backoff_for(attempts);
            warn!(call = name, attempt = attempts, error = %cause, ?delay, "retrying completion call");
            tokio::time::sleep(delay).await;
        }
    }
}

/// Text form of the collected responses handed to the summary prompt
fn render_responses(responses: &BTreeMap<Aspect, String>) -> String {
    serde_json::to_string_pretty(responses).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Answers by recognising which template a prompt came from
    #[derive(Default)]
    struct EchoCompletion {
        prompts: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl CompletionService for EchoCompletion {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let reply = if prompt.contains("POSITIVE aspects") {
                "You found joy in small things.".to_string()
            } else if prompt.contains("empathetic listener") {
                "That sounds like a lot to carry.".to_string()
            } else if prompt.contains("gentle planner") {
                "Start with the report, then take a walk.".to_string()
            } else if prompt.contains("safety checker") {
                "UNSAFE: mentions self-harm".to_string()
            } else {
                format!("SUMMARY OF {}", prompt)
            };
            Ok(reply)
        }
    }

    /// Fails the first `failures` calls with a fixed error
    struct FlakyCompletion {
        failures: u32,
        calls: AtomicU32,
        error: fn() -> CompletionError,
    }

    #[async_trait]
    impl CompletionService for FlakyCompletion {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err((self.error)())
            } else {
                Ok("ok".to_string())
            }
        }
    }

    fn quick_policy(max_retries: u32) -> CallPolicy {
        CallPolicy {
            timeout: Duration::from_secs(5),
            max_retries,
            backoff: Duration::from_millis(1),
        }
    }

    fn dispatcher(service: Arc<dyn CompletionService>, policy: CallPolicy) -> Dispatcher {
        Dispatcher::new(service, PromptSet::builtin().unwrap(), policy)
    }

    fn full_content() -> DiaryEntryContent {
        DiaryEntryContent {
            gratitude: Some("Had coffee with a friend".to_string()),
            raw_thoughts: Some("My head is busy".to_string()),
            tasks: Some("Finish report".to_string()),
            pain_points: Some("I feel hopeless".to_string()),
        }
    }

    #[tokio::test]
    async fn test_empty_content_still_summarizes() {
        let service = Arc::new(EchoCompletion::default());
        let result = dispatcher(service.clone(), quick_policy(0))
            .dispatch(&DiaryEntryContent::default())
            .await
            .unwrap();

        assert!(result.aspect_responses.is_empty());
        assert!(result.safety.is_none());
        assert!(!result.summary.is_empty());

        let prompts = service.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("{}"));
    }

    #[tokio::test]
    async fn test_single_field_single_aspect() {
        let service = Arc::new(EchoCompletion::default());
        let content = DiaryEntryContent {
            gratitude: Some("Had coffee with a friend".to_string()),
            ..Default::default()
        };
        let result = dispatcher(service.clone(), quick_policy(0))
            .dispatch(&content)
            .await
            .unwrap();

        let keys: Vec<Aspect> = result.aspect_responses.keys().copied().collect();
        assert_eq!(keys, vec![Aspect::Gratitude]);
        assert!(result.summary.contains("You found joy in small things."));
        assert!(!result.summary.contains("\"plan\""));
    }

    #[tokio::test]
    async fn test_only_tasks_yields_plan() {
        let service = Arc::new(EchoCompletion::default());
        let content = DiaryEntryContent {
            gratitude: Some(String::new()),
            raw_thoughts: Some(String::new()),
            tasks: Some("Finish report".to_string()),
            pain_points: Some(String::new()),
        };
        let result = dispatcher(service, quick_policy(0))
            .dispatch(&content)
            .await
            .unwrap();

        let keys: Vec<Aspect> = result.aspect_responses.keys().copied().collect();
        assert_eq!(keys, vec![Aspect::Plan]);
        assert!(result.summary.contains("\"plan\""));
        assert!(!result.summary.contains("\"gratitude\""));
        assert!(!result.summary.contains("\"safety\""));
    }

    #[tokio::test]
    async fn test_all_fields_all_aspects() {
        let service = Arc::new(EchoCompletion::default());
        let result = dispatcher(service.clone(), quick_policy(0))
            .dispatch(&full_content())
            .await
            .unwrap();

        let keys: Vec<&str> = result.aspect_responses.keys().map(Aspect::key).collect();
        assert_eq!(keys, ["gratitude", "reflection", "plan", "safety"]);
        assert!(result.aspect_responses.values().all(|v| !v.is_empty()));

        // The summary call sees every aspect output
        for value in result.aspect_responses.values() {
            assert!(result.summary.contains(value.as_str()));
        }
        assert_eq!(service.prompts.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_safety_classification_is_surfaced() {
        let service = Arc::new(EchoCompletion::default());
        let result = dispatcher(service, quick_policy(0))
            .dispatch(&full_content())
            .await
            .unwrap();

        let safety = result.safety.unwrap();
        assert!(safety.flagged);
        assert_eq!(safety.notes, "mentions self-harm");
        // Flagging does not drop any aspect
        assert_eq!(result.aspect_responses.len(), 4);
    }

    #[tokio::test]
    async fn test_aspect_calls_run_concurrently() {
        let service = Arc::new(EchoCompletion {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        dispatcher(service.clone(), quick_policy(0))
            .dispatch(&full_content())
            .await
            .unwrap();

        assert_eq!(service.max_in_flight.load(Ordering::SeqCst), 4);
        // Summary is last
        let prompts = service.prompts.lock().unwrap();
        assert!(prompts[4].contains("agents provided responses"));
    }

    #[tokio::test]
    async fn test_non_transient_failure_is_not_retried() {
        let service = Arc::new(FlakyCompletion {
            failures: 1,
            calls: AtomicU32::new(0),
            error: || CompletionError::Status {
                status: 400,
                body: "bad request".to_string(),
            },
        });
        let content = DiaryEntryContent {
            tasks: Some("Finish report".to_string()),
            ..Default::default()
        };
        let err = dispatcher(service.clone(), quick_policy(3))
            .dispatch(&content)
            .await
            .unwrap_err();

        match err {
            DispatchError::AspectCallFailed { aspect, .. } => assert_eq!(aspect, "plan"),
            other => panic!("Expected AspectCallFailed, got {:?}", other),
        }
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_recovers_within_budget() {
        let service = Arc::new(FlakyCompletion {
            failures: 2,
            calls: AtomicU32::new(0),
            error: || CompletionError::Transport("connection reset".to_string()),
        });
        let content = DiaryEntryContent {
            gratitude: Some("sunshine".to_string()),
            ..Default::default()
        };
        let result = dispatcher(service.clone(), quick_policy(2))
            .dispatch(&content)
            .await
            .unwrap();

        assert_eq!(result.aspect_responses[&Aspect::Gratitude], "ok");
        // Two failures, one success, then the summary
        assert_eq!(service.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let service = Arc::new(FlakyCompletion {
            failures: u32::MAX,
            calls: AtomicU32::new(0),
            error: || CompletionError::Status {
                status: 503,
                body: String::new(),
            },
        });
        let err = dispatcher(service.clone(), quick_policy(2))
            .dispatch(&DiaryEntryContent::default())
            .await
            .unwrap_err();

        match err {
            DispatchError::DispatchFailed {
                failed_aspect,
                attempts,
                ..
            } => {
                assert_eq!(failed_aspect, SUMMARY_CALL);
                assert_eq!(attempts, 3);
            }
            other => panic!("Expected DispatchFailed, got {:?}", other),
        }
        assert_eq!(service.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        let service = Arc::new(EchoCompletion {
            delay: Some(Duration::from_millis(500)),
            ..Default::default()
        });
        let policy = CallPolicy {
            timeout: Duration::from_millis(20),
            max_retries: 0,
            backoff: Duration::from_millis(1),
        };
        let err = dispatcher(service, policy)
            .dispatch(&DiaryEntryContent::default())
            .await
            .unwrap_err();

        match err {
            DispatchError::AspectCallFailed { aspect, cause } => {
                assert_eq!(aspect, SUMMARY_CALL);
                assert!(matches!(cause, CompletionError::Timeout));
            }
            other => panic!("Expected AspectCallFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = CallPolicy {
            timeout: Duration::from_secs(1),
            max_retries: 3,
            backoff: Duration::from_millis(100),
        };
        assert_eq!(policy.backoff_for(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(400));
    }

    #[test]
    fn test_result_serialization() {
        let mut aspect_responses = BTreeMap::new();
        aspect_responses.insert(Aspect::Plan, "walk".to_string());
        let result = DispatchResult {
            aspect_responses,
            summary: "calm".to_string(),
            safety: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["aspect_responses"]["plan"], "walk");
        assert_eq!(json["summary"], "calm");
        assert!(json.get("safety").is_none());
    }
}
