//! Unified error system for Tether
//!
//! A single error type shared by the reactive container, the modal controller,
//! the dialog shell and the persistence seam. Lifecycle hooks return this type
//! too, so a hook failure reaches the caller of `request_cancel` or
//! `request_submit` unchanged.

use serde::{Deserialize, Serialize};

/// Unified error type for all Tether operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum TetherError {
    /// Operation on a container that has been disposed
    #[error("Container disposed")]
    ContainerDisposed,

    /// A reaction tried to `set` the container that is currently notifying it
    #[error("Reentrant mutation: container is already dispatching a change")]
    ReentrantMutation,

    /// A lifecycle hook or close/submit handler failed
    #[error("Hook failed: {message}")]
    Hook {
        /// Message reported by the hook
        message: String,
    },

    /// Cancel or submit requested while no modal is active
    #[error("No active modal")]
    NoActiveModal,

    /// No handler is registered for a modal kind
    #[error("Unknown modal kind: {kind}")]
    UnknownModalKind {
        /// The unresolved kind tag
        kind: String,
    },

    /// Dialog shell input that cannot be laid out
    #[error("Invalid shell: {message}")]
    InvalidShell {
        /// Error message describing the invalid input
        message: String,
    },

    /// Invalid input or argument
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// Key-value store operation failed
    #[error("Storage error: {message}")]
    Storage {
        /// Error message describing the storage failure
        message: String,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Config error: {message}")]
    Config {
        /// Error message describing the configuration problem
        message: String,
    },
}

impl TetherError {
    /// Create a hook failure
    pub fn hook(message: impl Into<String>) -> Self {
        Self::Hook {
            message: message.into(),
        }
    }

    /// Create an unknown modal kind error
    pub fn unknown_modal_kind(kind: impl Into<String>) -> Self {
        Self::UnknownModalKind { kind: kind.into() }
    }

    /// Create an invalid shell error
    pub fn invalid_shell(message: impl Into<String>) -> Self {
        Self::InvalidShell {
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error was raised by a lifecycle hook or handler
    pub fn is_hook_failure(&self) -> bool {
        matches!(self, Self::Hook { .. })
    }
}

/// Standard Result type for Tether operations
pub type Result<T> = std::result::Result<T, TetherError>;

impl From<serde_json::Error> for TetherError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<toml::de::Error> for TetherError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err.to_string())
    }
}

impl From<std::io::Error> for TetherError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(err.to_string())
    }
}
