//! Ordered call recording
//!
//! [`CallRecorder`] hands out hook closures that append to one shared log, so a
//! test can assert the interleaving of hooks, reactions and key handlers.
//! [`ValueLog`] does the same for container reactions, keeping the values.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tether_core::{Result, TetherError};

/// One recorded invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    /// Label the hook was created with
    pub label: String,
    /// Payload for submit hooks
    pub payload: Option<Value>,
}

/// Shared, ordered log of hook invocations.
#[derive(Clone, Default)]
pub struct CallRecorder {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `label` directly
    pub fn record(&self, label: impl Into<String>) {
        self.calls.lock().push(Call {
            label: label.into(),
            payload: None,
        });
    }

    /// Record `label` with a payload
    pub fn record_with(&self, label: impl Into<String>, payload: Value) {
        self.calls.lock().push(Call {
            label: label.into(),
            payload: Some(payload),
        });
    }

    /// A cancel-style hook (or key handler) that records `label`
    pub fn hook(&self, label: &str) -> impl Fn() -> Result<()> + Send + Sync + 'static {
        let recorder = self.clone();
        let label = label.to_string();
        move || {
            recorder.record(label.clone());
            Ok(())
        }
    }

    /// A cancel-style hook that records `label`, then fails
    pub fn failing_hook(
        &self,
        label: &str,
        message: &str,
    ) -> impl Fn() -> Result<()> + Send + Sync + 'static {
        let recorder = self.clone();
        let label = label.to_string();
        let message = message.to_string();
        move || {
            recorder.record(label.clone());
            Err(TetherError::hook(message.clone()))
        }
    }

    /// A submit-style hook that records `label` and the payload
    pub fn submit_hook(&self, label: &str) -> impl Fn(&Value) -> Result<()> + Send + Sync + 'static {
        let recorder = self.clone();
        let label = label.to_string();
        move |payload| {
            recorder.record_with(label.clone(), payload.clone());
            Ok(())
        }
    }

    /// Everything recorded, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Recorded labels, in order
    pub fn labels(&self) -> Vec<String> {
        self.calls.lock().iter().map(|call| call.label.clone()).collect()
    }

    /// How often `label` was recorded
    pub fn count(&self, label: &str) -> usize {
        self.calls.lock().iter().filter(|call| call.label == label).count()
    }

    /// Payloads recorded under `label`, in order
    pub fn payloads(&self, label: &str) -> Vec<Value> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.label == label)
            .filter_map(|call| call.payload.clone())
            .collect()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

/// Values seen by a container reaction.
pub struct ValueLog<T> {
    values: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for ValueLog<T> {
    fn clone(&self) -> Self {
        Self {
            values: Arc::clone(&self.values),
        }
    }
}

impl<T> Default for ValueLog<T> {
    fn default() -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Clone + Send + 'static> ValueLog<T> {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// A reaction appending every value it sees
    pub fn reaction(&self) -> impl Fn(&T) -> Result<()> + Send + Sync + 'static {
        let values = Arc::clone(&self.values);
        move |value| {
            values.lock().push(value.clone());
            Ok(())
        }
    }

    /// Values seen so far, in order
    pub fn values(&self) -> Vec<T> {
        self.values.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hooks_share_one_log() {
        let calls = CallRecorder::new();
        let first = calls.hook("first");
        let submit = calls.submit_hook("submit");

        first().unwrap();
        submit(&json!({ "ok": true })).unwrap();
        first().unwrap();

        assert_eq!(calls.labels(), vec!["first", "submit", "first"]);
        assert_eq!(calls.count("first"), 2);
        assert_eq!(calls.payloads("submit"), vec![json!({ "ok": true })]);
    }

    #[test]
    fn test_calls_keep_payloads_until_cleared() {
        let calls = CallRecorder::new();
        calls.record("cancel");
        calls.record_with("submit", json!(7));

        assert_eq!(
            calls.calls(),
            vec![
                Call {
                    label: "cancel".to_string(),
                    payload: None,
                },
                Call {
                    label: "submit".to_string(),
                    payload: Some(json!(7)),
                },
            ]
        );
        calls.clear();
        assert!(calls.is_empty());
    }

    #[test]
    fn test_failing_hook_records_then_fails() {
        let calls = CallRecorder::new();
        let hook = calls.failing_hook("guard", "nope");
        assert!(hook().unwrap_err().is_hook_failure());
        assert_eq!(calls.count("guard"), 1);
    }

    #[test]
    fn test_value_log_reaction() {
        let log = ValueLog::new();
        let reaction = log.reaction();
        reaction(&1).unwrap();
        reaction(&2).unwrap();
        assert_eq!(log.values(), vec![1, 2]);
    }
}
