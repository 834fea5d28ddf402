//! Modal controller
//!
//! Two-state machine (`Idle` / `Active`) that owns the one live modal and runs
//! its lifecycle hooks around cancel and submit.
//!
//! Transition order for cancel (submit is symmetric, passing the payload to
//! both hooks):
//!
//! 1. `before_cancel`, if present. An error aborts the transition; the modal
//!    stays active and the error goes to the caller.
//! 2. `close_modal()`; the controller is now `Idle`.
//! 3. `after_cancel`, if present. Because the state is already `Idle`, this
//!    hook may open the next modal.
//!
//! The state lock is never held while a hook runs.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tether_core::{Result, TetherError};

use super::descriptor::{ModalDescriptor, ModalKind};

/// Instance number assigned to each opened modal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalId(u64);

impl ModalId {
    /// Raw instance number
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "modal#{}", self.0)
    }
}

/// The modal currently shown.
#[derive(Clone, Debug)]
pub struct ActiveModal {
    id: ModalId,
    descriptor: Arc<ModalDescriptor>,
}

impl ActiveModal {
    /// Instance id assigned by `open_modal`
    pub fn id(&self) -> ModalId {
        self.id
    }

    /// Handler tag
    pub fn kind(&self) -> &ModalKind {
        self.descriptor.kind()
    }

    /// The descriptor passed to `open_modal`
    pub fn descriptor(&self) -> &Arc<ModalDescriptor> {
        &self.descriptor
    }
}

/// Controller state.
#[derive(Clone, Debug, Default)]
pub enum ModalState {
    /// Nothing is shown
    #[default]
    Idle,
    /// A modal is shown
    Active(ActiveModal),
}

impl ModalState {
    /// Whether a modal is shown
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// The shown modal, if any
    pub fn active(&self) -> Option<&ActiveModal> {
        match self {
            Self::Active(active) => Some(active),
            Self::Idle => None,
        }
    }
}

struct ControllerInner {
    state: Mutex<ModalState>,
    next_id: AtomicU64,
}

/// Owner of the single live modal.
///
/// Clones are handles to the same controller, which is how the `cancel` and
/// `submit` callbacks handed to a modal's handler reach it.
#[derive(Clone)]
pub struct ModalController {
    inner: Arc<ControllerInner>,
}

impl Default for ModalController {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalController {
    /// Create an idle controller
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                state: Mutex::new(ModalState::Idle),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> ModalState {
        self.inner.state.lock().clone()
    }

    /// Whether a modal is shown
    pub fn is_active(&self) -> bool {
        self.inner.state.lock().is_active()
    }

    /// Id of the shown modal
    pub fn active_id(&self) -> Option<ModalId> {
        self.inner.state.lock().active().map(ActiveModal::id)
    }

    /// Kind of the shown modal
    pub fn active_kind(&self) -> Option<ModalKind> {
        self.inner
            .state
            .lock()
            .active()
            .map(|active| active.kind().clone())
    }

    /// Show `descriptor`, from any state.
    ///
    /// A modal that is already shown is discarded without running any of its
    /// hooks.
    pub fn open_modal(&self, descriptor: ModalDescriptor) -> ModalId {
        let id = ModalId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let kind = descriptor.kind().clone();
        let active = ActiveModal {
            id,
            descriptor: Arc::new(descriptor),
        };

        let previous = std::mem::replace(&mut *self.inner.state.lock(), ModalState::Active(active));
        if let ModalState::Active(replaced) = previous {
            tracing::warn!(
                replaced = %replaced.id,
                replaced_kind = %replaced.kind(),
                %id,
                %kind,
                "open_modal replaced an active modal without running its hooks"
            );
        }
        tracing::debug!(%id, %kind, "modal opened");
        id
    }

    /// Return to `Idle` without running any hooks.
    ///
    /// Returns the id of the modal that was closed.
    pub fn close_modal(&self) -> Option<ModalId> {
        let previous = std::mem::take(&mut *self.inner.state.lock());
        let closed = previous.active().map(ActiveModal::id);
        if let Some(id) = closed {
            tracing::debug!(%id, "modal closed");
        }
        closed
    }

    /// Cancel the shown modal, running `before_cancel` and `after_cancel`.
    pub fn request_cancel(&self) -> Result<()> {
        let active = self.require_active()?;
        let descriptor = active.descriptor();

        if let Some(hook) = descriptor.before_cancel_hook() {
            if let Err(err) = hook() {
                tracing::debug!(id = %active.id, error = %err, "cancel aborted by before_cancel");
                return Err(err);
            }
        }

        self.close_modal();
        tracing::debug!(id = %active.id, "modal cancelled");

        if let Some(hook) = descriptor.after_cancel_hook() {
            hook()?;
        }
        Ok(())
    }

    /// Submit the shown modal with `payload`, running `before_submit` and
    /// `after_submit`. Both hooks receive the same payload.
    pub fn request_submit(&self, payload: Value) -> Result<()> {
        let active = self.require_active()?;
        let descriptor = active.descriptor();

        if let Some(hook) = descriptor.before_submit_hook() {
            if let Err(err) = hook(&payload) {
                tracing::debug!(id = %active.id, error = %err, "submit aborted by before_submit");
                return Err(err);
            }
        }

        self.close_modal();
        tracing::debug!(id = %active.id, "modal submitted");

        if let Some(hook) = descriptor.after_submit_hook() {
            hook(&payload)?;
        }
        Ok(())
    }

    fn require_active(&self) -> Result<ActiveModal> {
        self.inner
            .state
            .lock()
            .active()
            .cloned()
            .ok_or(TetherError::NoActiveModal)
    }
}

impl fmt::Debug for ModalController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalController")
            .field("state", &*self.inner.state.lock())
            .finish()
    }
}
