//! Session state
//!
//! The session record lives in a [`StateContainer`] whose single bound
//! reaction serializes the whole record to JSON and writes it to the
//! [`KeyValueStore`] under one fixed key. Every `set` issues exactly one
//! write, synchronously; a failed write is returned from `set`.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tether_core::{Binding, KeyValueStore, Result, StateContainer};

/// Default storage key for the session record.
pub const DEFAULT_SESSION_KEY: &str = "session";

/// Serialize a session record for storage.
pub fn serialize_session<S: Serialize>(session: &S) -> Result<String> {
    Ok(serde_json::to_string(session)?)
}

/// Parse a stored session record.
pub fn deserialize_session<S: DeserializeOwned>(raw: &str) -> Result<S> {
    Ok(serde_json::from_str(raw)?)
}

/// A general-purpose session record.
///
/// Hosts with their own session shape can use any serializable type with
/// [`Session`] instead.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Signed-in user, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Name shown for the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Free-form application data
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl SessionRecord {
    /// The empty session
    pub fn empty() -> Self {
        Self::default()
    }

    /// Session for a signed-in user
    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            ..Self::default()
        }
    }

    /// Copy with a display name
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Copy with an attribute set
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Session container bound to persistent storage.
#[derive(Debug)]
pub struct Session<S> {
    container: StateContainer<S>,
    persistence: Option<Binding<S>>,
    key: String,
}

impl<S> Session<S>
where
    S: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Create a session holding `initial`, persisting every later change
    /// to `store` under `key`.
    pub fn new(initial: S, store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let container = StateContainer::new(initial);
        let persist_key = key.clone();
        let persistence = container.bind(move |session: &S| {
            let raw = serialize_session(session)?;
            store.set_item(&persist_key, &raw)?;
            tracing::debug!(key = %persist_key, bytes = raw.len(), "session persisted");
            Ok(())
        })?;
        Ok(Self {
            container,
            persistence: Some(persistence),
            key,
        })
    }

    /// Create a session from the record stored under `key`, or `fallback`
    /// when nothing is stored. A stored record that fails to parse is an
    /// error.
    pub fn restore(store: Arc<dyn KeyValueStore>, key: impl Into<String>, fallback: S) -> Result<Self> {
        let key = key.into();
        let initial = match store.get_item(&key)? {
            Some(raw) => {
                tracing::debug!(key = %key, "restoring persisted session");
                deserialize_session(&raw)?
            }
            None => fallback,
        };
        Self::new(initial, store, key)
    }

    /// Current session record
    pub fn get(&self) -> Result<S> {
        self.container.get()
    }

    /// Replace the session record and persist it
    pub fn set(&self, next: S) -> Result<()> {
        self.container.set(next)
    }

    /// Replace the session record with `f(current)` and persist it
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(S) -> S,
    {
        self.container.update(f)
    }

    /// The underlying container, for binding further reactions
    pub fn container(&self) -> &StateContainer<S> {
        &self.container
    }

    /// Storage key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Detach persistence and dispose the container
    pub fn dispose(&mut self) {
        if let Some(binding) = self.persistence.take() {
            binding.unbind();
        }
        self.container.dispose();
    }
}
