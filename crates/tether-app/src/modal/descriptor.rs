//! Modal descriptors
//!
//! A descriptor names which registered handler renders the dialog (its
//! [`ModalKind`]), carries the handler's arguments, and holds the optional
//! cancel/submit lifecycle hooks. Descriptors are immutable once built.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tether_core::Result;

/// Hook run around a cancel transition.
pub type CancelHook = Arc<dyn Fn() -> Result<()> + Send + Sync>;

/// Hook run around a submit transition; receives the submitted payload.
pub type SubmitHook = Arc<dyn Fn(&Value) -> Result<()> + Send + Sync>;

/// Tag naming the registered handler that renders a modal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModalKind(String);

impl ModalKind {
    /// Create a kind tag
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    /// The tag as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModalKind {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

impl From<String> for ModalKind {
    fn from(kind: String) -> Self {
        Self(kind)
    }
}

/// Everything needed to show one modal.
///
/// ```rust,ignore
/// let descriptor = ModalDescriptor::new("confirm-delete")
///     .with_arguments(json!({ "item": "draft-7" }))
///     .before_cancel(|| Ok(()))
///     .after_submit(|payload| {
///         tracing::info!(%payload, "deleted");
///         Ok(())
///     });
/// controller.open_modal(descriptor);
/// ```
#[derive(Clone)]
pub struct ModalDescriptor {
    kind: ModalKind,
    arguments: Value,
    before_cancel: Option<CancelHook>,
    after_cancel: Option<CancelHook>,
    before_submit: Option<SubmitHook>,
    after_submit: Option<SubmitHook>,
}

impl ModalDescriptor {
    /// Create a descriptor for `kind` with null arguments and no hooks
    pub fn new(kind: impl Into<ModalKind>) -> Self {
        Self {
            kind: kind.into(),
            arguments: Value::Null,
            before_cancel: None,
            after_cancel: None,
            before_submit: None,
            after_submit: None,
        }
    }

    /// Set the arguments handed to the modal's handler
    pub fn with_arguments(mut self, arguments: Value) -> Self {
        self.arguments = arguments;
        self
    }

    /// Hook run before a cancel closes the modal; an error aborts the cancel
    pub fn before_cancel<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.before_cancel = Some(Arc::new(hook));
        self
    }

    /// Hook run after a cancel, once the controller is already idle
    pub fn after_cancel<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.after_cancel = Some(Arc::new(hook));
        self
    }

    /// Hook run before a submit closes the modal; an error aborts the submit
    pub fn before_submit<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value) -> Result<()> + Send + Sync + 'static,
    {
        self.before_submit = Some(Arc::new(hook));
        self
    }

    /// Hook run after a submit, once the controller is already idle
    pub fn after_submit<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value) -> Result<()> + Send + Sync + 'static,
    {
        self.after_submit = Some(Arc::new(hook));
        self
    }

    /// The handler tag
    pub fn kind(&self) -> &ModalKind {
        &self.kind
    }

    /// Arguments for the handler
    pub fn arguments(&self) -> &Value {
        &self.arguments
    }

    pub(crate) fn before_cancel_hook(&self) -> Option<&CancelHook> {
        self.before_cancel.as_ref()
    }

    pub(crate) fn after_cancel_hook(&self) -> Option<&CancelHook> {
        self.after_cancel.as_ref()
    }

    pub(crate) fn before_submit_hook(&self) -> Option<&SubmitHook> {
        self.before_submit.as_ref()
    }

    pub(crate) fn after_submit_hook(&self) -> Option<&SubmitHook> {
        self.after_submit.as_ref()
    }
}

impl fmt::Debug for ModalDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalDescriptor")
            .field("kind", &self.kind)
            .field("arguments", &self.arguments)
            .field("before_cancel", &self.before_cancel.is_some())
            .field("after_cancel", &self.after_cancel.is_some())
            .field("before_submit", &self.before_submit.is_some())
            .field("after_submit", &self.after_submit.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_defaults() {
        let d = ModalDescriptor::new("about");
        assert_eq!(d.kind().as_str(), "about");
        assert_eq!(d.arguments(), &Value::Null);
        assert!(d.before_cancel_hook().is_none());
        assert!(d.after_submit_hook().is_none());
    }

    #[test]
    fn test_descriptor_builder_sets_hooks() {
        let d = ModalDescriptor::new("rename")
            .with_arguments(json!({ "name": "draft" }))
            .before_cancel(|| Ok(()))
            .after_submit(|_| Ok(()));

        assert_eq!(d.arguments()["name"], "draft");
        assert!(d.before_cancel_hook().is_some());
        assert!(d.after_cancel_hook().is_none());
        assert!(d.before_submit_hook().is_none());
        assert!(d.after_submit_hook().is_some());
    }

    #[test]
    fn test_debug_hides_hook_bodies() {
        let d = ModalDescriptor::new("rename").after_cancel(|| Ok(()));
        let debug_str = format!("{d:?}");
        assert!(debug_str.contains("rename"));
        assert!(debug_str.contains("after_cancel: true"));
    }

    #[test]
    fn test_modal_kind_serializes_as_string() {
        let kind = ModalKind::from("confirm");
        assert_eq!(serde_json::to_string(&kind).unwrap_or_default(), "\"confirm\"");
        assert_eq!(kind.to_string(), "confirm");
    }
}
