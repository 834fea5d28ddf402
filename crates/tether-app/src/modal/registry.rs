//! Modal handler registry
//!
//! Descriptors name a [`ModalKind`]; the registry resolves that tag to the
//! [`ModalHandler`] that turns the modal's props into dialog shell input.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tether_core::{Result, TetherError};

use super::controller::{ActiveModal, ModalController, ModalId};
use super::descriptor::{ModalDescriptor, ModalKind};
use crate::shell::{CloseHandler, ShellDefaults, ShellProps, SubmitHandler};

/// Values the controller hands to a modal's handler.
///
/// `cancel` and `submit` are bound to the controller's `request_cancel` and
/// `request_submit`.
#[derive(Clone)]
pub struct ModalProps {
    id: ModalId,
    descriptor: Arc<ModalDescriptor>,
    controller: ModalController,
    shell_defaults: ShellDefaults,
}

impl ModalProps {
    pub(crate) fn new(active: &ActiveModal, controller: ModalController) -> Self {
        Self {
            id: active.id(),
            descriptor: Arc::clone(active.descriptor()),
            controller,
            shell_defaults: ShellDefaults::default(),
        }
    }

    pub(crate) fn with_shell_defaults(mut self, defaults: ShellDefaults) -> Self {
        self.shell_defaults = defaults;
        self
    }

    /// Id of the modal being rendered
    pub fn id(&self) -> ModalId {
        self.id
    }

    /// The descriptor's original arguments
    pub fn arguments(&self) -> &Value {
        self.descriptor.arguments()
    }

    /// Request cancellation of the modal; a no-op once another modal (or
    /// none) is active
    pub fn cancel(&self) -> Result<()> {
        cancel_if_active(&self.controller, self.id)
    }

    /// Request submission of the modal with `payload`; a no-op once another
    /// modal (or none) is active
    pub fn submit(&self, payload: Value) -> Result<()> {
        submit_if_active(&self.controller, self.id, payload)
    }

    /// `cancel` as a shell close handler
    pub fn close_handler(&self) -> CloseHandler {
        let controller = self.controller.clone();
        let id = self.id;
        Arc::new(move || cancel_if_active(&controller, id))
    }

    /// `submit` as a shell submit handler; `payload` builds the submitted value
    pub fn submit_handler<F>(&self, payload: F) -> SubmitHandler
    where
        F: Fn() -> Result<Value> + Send + Sync + 'static,
    {
        let controller = self.controller.clone();
        let id = self.id;
        Arc::new(move || {
            if controller.active_id() != Some(id) {
                tracing::debug!(%id, "submit from a stale modal ignored");
                return Ok(());
            }
            controller.request_submit(payload()?)
        })
    }

    /// Shell props seeded from the configured defaults, with `cancel` wired
    /// as the close handler
    pub fn shell<C>(&self) -> ShellProps<C> {
        ShellProps::with_defaults(&self.shell_defaults).on_close_handler(self.close_handler())
    }
}

fn cancel_if_active(controller: &ModalController, id: ModalId) -> Result<()> {
    if controller.active_id() != Some(id) {
        tracing::debug!(%id, "cancel from a stale modal ignored");
        return Ok(());
    }
    controller.request_cancel()
}

fn submit_if_active(controller: &ModalController, id: ModalId, payload: Value) -> Result<()> {
    if controller.active_id() != Some(id) {
        tracing::debug!(%id, "submit from a stale modal ignored");
        return Ok(());
    }
    controller.request_submit(payload)
}

impl fmt::Debug for ModalProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalProps")
            .field("id", &self.id)
            .field("kind", self.descriptor.kind())
            .field("arguments", self.descriptor.arguments())
            .finish()
    }
}

/// Renders one kind of modal into dialog shell input.
pub trait ModalHandler<C>: Send + Sync {
    /// Build the shell for the modal described by `props`
    fn render(&self, props: ModalProps) -> Result<ShellProps<C>>;
}

impl<C, F> ModalHandler<C> for F
where
    F: Fn(ModalProps) -> Result<ShellProps<C>> + Send + Sync,
{
    fn render(&self, props: ModalProps) -> Result<ShellProps<C>> {
        self(props)
    }
}

impl<C> fmt::Debug for dyn ModalHandler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalHandler").finish_non_exhaustive()
    }
}

/// Map from modal kind to handler.
pub struct ModalRegistry<C> {
    handlers: BTreeMap<ModalKind, Arc<dyn ModalHandler<C>>>,
}

impl<C> Default for ModalRegistry<C> {
    fn default() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }
}

impl<C> ModalRegistry<C> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`; each kind may be registered once
    pub fn register<H>(&mut self, kind: impl Into<ModalKind>, handler: H) -> Result<()>
    where
        H: ModalHandler<C> + 'static,
    {
        let kind = kind.into();
        if self.handlers.contains_key(&kind) {
            return Err(TetherError::invalid(format!(
                "modal kind `{kind}` is already registered"
            )));
        }
        tracing::debug!(%kind, "modal handler registered");
        self.handlers.insert(kind, Arc::new(handler));
        Ok(())
    }

    /// Builder form of [`register`](Self::register)
    pub fn with<H>(mut self, kind: impl Into<ModalKind>, handler: H) -> Result<Self>
    where
        H: ModalHandler<C> + 'static,
    {
        self.register(kind, handler)?;
        Ok(self)
    }

    /// Handler for `kind`
    pub fn resolve(&self, kind: &ModalKind) -> Result<Arc<dyn ModalHandler<C>>> {
        self.handlers
            .get(kind)
            .cloned()
            .ok_or_else(|| TetherError::unknown_modal_kind(kind.as_str()))
    }

    /// Whether `kind` has a handler
    pub fn contains(&self, kind: &ModalKind) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Registered kinds in sorted order
    pub fn kinds(&self) -> impl Iterator<Item = &ModalKind> {
        self.handlers.keys()
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<C> fmt::Debug for ModalRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalRegistry")
            .field("kinds", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
