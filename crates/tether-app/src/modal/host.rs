//! Modal host
//!
//! Glue between the controller and whatever draws dialogs. After anything
//! that may have changed the controller's state, the host calls
//! [`ModalHost::sync`]; the mounted shell then always belongs to the active
//! modal, and no shell (and no keyboard registration) exists while idle.

use std::fmt;
use std::sync::Arc;

use tether_core::{KeyCode, KeyboardDispatcher, Result};

use super::controller::{ModalController, ModalId};
use super::registry::{ModalProps, ModalRegistry};
use crate::shell::{DialogShell, ShellDefaults};

struct Mounted<C> {
    id: ModalId,
    shell: DialogShell<C>,
}

/// Mounts the dialog shell for the controller's active modal.
pub struct ModalHost<C> {
    controller: ModalController,
    registry: ModalRegistry<C>,
    keyboard: Arc<dyn KeyboardDispatcher>,
    cancel_key: KeyCode,
    shell_defaults: ShellDefaults,
    mounted: Option<Mounted<C>>,
}

impl<C> ModalHost<C> {
    /// Create a host with nothing mounted
    pub fn new(
        controller: ModalController,
        registry: ModalRegistry<C>,
        keyboard: Arc<dyn KeyboardDispatcher>,
        cancel_key: KeyCode,
    ) -> Self {
        Self {
            controller,
            registry,
            keyboard,
            cancel_key,
            shell_defaults: ShellDefaults::default(),
            mounted: None,
        }
    }

    /// Defaults handed to handlers through [`ModalProps::shell`]
    pub fn with_shell_defaults(mut self, defaults: ShellDefaults) -> Self {
        self.shell_defaults = defaults;
        self
    }

    /// Bring the mounted shell in line with the controller.
    ///
    /// - Idle: any mounted shell is unmounted.
    /// - Same modal as mounted: the shell is kept as is.
    /// - New modal: the old shell is unmounted, the new modal's handler is
    ///   resolved and rendered, and its shell mounted.
    ///
    /// An unregistered kind or a failing handler leaves nothing mounted and
    /// returns the error; the controller stays active.
    pub fn sync(&mut self) -> Result<Option<&DialogShell<C>>> {
        let state = self.controller.state();
        let Some(active) = state.active() else {
            self.unmount();
            return Ok(None);
        };

        let current = self.mounted.as_ref().map(|mounted| mounted.id);
        if current != Some(active.id()) {
            self.unmount();
            let handler = self.registry.resolve(active.kind())?;
            let props = ModalProps::new(active, self.controller.clone())
                .with_shell_defaults(self.shell_defaults);
            let shell_props = handler.render(props)?;
            let shell = DialogShell::mount(shell_props, Arc::clone(&self.keyboard), self.cancel_key);
            tracing::debug!(id = %active.id(), kind = %active.kind(), "modal shell mounted");
            self.mounted = Some(Mounted {
                id: active.id(),
                shell,
            });
        }
        Ok(self.shell())
    }

    /// The mounted shell
    pub fn shell(&self) -> Option<&DialogShell<C>> {
        self.mounted.as_ref().map(|mounted| &mounted.shell)
    }

    /// Id of the modal whose shell is mounted
    pub fn mounted_id(&self) -> Option<ModalId> {
        self.mounted.as_ref().map(|mounted| mounted.id)
    }

    /// Controller handle
    pub fn controller(&self) -> &ModalController {
        &self.controller
    }

    /// Handler registry
    pub fn registry(&self) -> &ModalRegistry<C> {
        &self.registry
    }

    /// Unmount the shell, if any; returns the id it belonged to
    pub fn unmount(&mut self) -> Option<ModalId> {
        let mounted = self.mounted.take()?;
        mounted.shell.unmount();
        tracing::debug!(id = %mounted.id, "modal shell unmounted");
        Some(mounted.id)
    }
}

impl<C> fmt::Debug for ModalHost<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalHost")
            .field("controller", &self.controller)
            .field("registry", &self.registry)
            .field("cancel_key", &self.cancel_key)
            .field("mounted", &self.mounted_id())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::modal::{ModalDescriptor, ModalKind};
    use crate::shell::ShellProps;
    use assert_matches::assert_matches;
    use tether_core::{LocalKeyboard, TetherError};

    fn host() -> (LocalKeyboard, ModalHost<String>) {
        let keyboard = LocalKeyboard::new();
        let registry = ModalRegistry::new()
            .with("confirm", |props: ModalProps| -> Result<ShellProps<String>> {
                let question = props.arguments()["question"].as_str().unwrap_or("").to_string();
                Ok(props.shell().title("Confirm").body(question))
            })
            .unwrap();
        let host = ModalHost::new(
            ModalController::new(),
            registry,
            Arc::new(keyboard.clone()),
            KeyCode::Escape,
        );
        (keyboard, host)
    }

    #[test]
    fn test_idle_sync_mounts_nothing() {
        let (keyboard, mut host) = host();
        assert!(host.sync().unwrap().is_none());
        assert_eq!(keyboard.registration_count(), 0);
    }

    #[test]
    fn test_sync_mounts_active_modal() {
        let (keyboard, mut host) = host();
        let id = host.controller().open_modal(
            ModalDescriptor::new("confirm").with_arguments(serde_json::json!({ "question": "Delete?" })),
        );

        let shell = host.sync().unwrap().unwrap();
        assert_eq!(shell.layout().body.map(String::as_str), Some("Delete?"));
        assert_eq!(host.mounted_id(), Some(id));
        assert_eq!(keyboard.registrations_for(KeyCode::Escape), 1);
    }

    #[test]
    fn test_repeated_sync_keeps_shell() {
        let (keyboard, mut host) = host();
        host.controller().open_modal(ModalDescriptor::new("confirm"));
        host.sync().unwrap();
        host.sync().unwrap();
        assert_eq!(keyboard.registrations_for(KeyCode::Escape), 1);
    }

    #[test]
    fn test_cancel_key_then_sync_unmounts() {
        let (keyboard, mut host) = host();
        host.controller().open_modal(ModalDescriptor::new("confirm"));
        host.sync().unwrap();

        keyboard.press(KeyCode::Escape).unwrap();
        assert!(!host.controller().is_active());

        assert!(host.sync().unwrap().is_none());
        assert_eq!(keyboard.registration_count(), 0);
    }

    #[test]
    fn test_replacement_remounts() {
        let (keyboard, mut host) = host();
        host.controller().open_modal(ModalDescriptor::new("confirm"));
        host.sync().unwrap();
        let second = host.controller().open_modal(ModalDescriptor::new("confirm"));
        host.sync().unwrap();

        assert_eq!(host.mounted_id(), Some(second));
        assert_eq!(keyboard.registrations_for(KeyCode::Escape), 1);
    }

    #[test]
    fn test_unknown_kind_fails_sync() {
        let (keyboard, mut host) = host();
        host.controller().open_modal(ModalDescriptor::new("missing"));

        assert!(!host.registry().contains(&ModalKind::from("missing")));
        assert_matches!(host.sync(), Err(TetherError::UnknownModalKind { kind }) if kind == "missing");
        assert!(host.shell().is_none());
        assert!(host.controller().is_active());
        assert_eq!(keyboard.registration_count(), 0);
    }
}
