//! Application configuration
//!
//! TOML file, all keys optional:
//!
//! ```toml
//! session_key = "session"
//! cancel_key = "Escape"
//!
//! [shell]
//! show_header = true
//! footer_align = "end"
//! ```
//!
//! Environment overrides use the `TETHER_` prefix (`TETHER_SESSION_KEY`,
//! `TETHER_CANCEL_KEY`) and win over the file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tether_core::{KeyCode, Result, TetherError};

use crate::session::DEFAULT_SESSION_KEY;
use crate::shell::ShellDefaults;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "TETHER_";

/// Settings for an [`AppCore`](crate::AppCore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Storage key for the persisted session
    pub session_key: String,
    /// Key that cancels the active modal
    pub cancel_key: KeyCode,
    /// Defaults for dialog shells
    pub shell: ShellDefaults,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session_key: DEFAULT_SESSION_KEY.to_string(),
            cancel_key: KeyCode::Escape,
            shell: ShellDefaults::default(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TetherError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| TetherError::serialization(e.to_string()))
    }

    /// Apply `TETHER_*` overrides from the process environment
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply `TETHER_*` overrides from `vars`; other names are ignored.
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in vars {
            let Some(key) = name.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value: String = value.into();
            match key {
                "SESSION_KEY" => self.session_key = value,
                "CANCEL_KEY" => {
                    self.cancel_key = value
                        .parse::<KeyCode>()
                        .map_err(|e| TetherError::config(format!("{ENV_PREFIX}{key}: {e}")))?;
                }
                _ => continue,
            }
            tracing::debug!(variable = %name.as_ref(), "configuration override applied");
        }
        self.validate()
    }

    /// Check invariants
    pub fn validate(&self) -> Result<()> {
        if self.session_key.trim().is_empty() {
            return Err(TetherError::config("session_key must not be empty"));
        }
        Ok(())
    }
}
