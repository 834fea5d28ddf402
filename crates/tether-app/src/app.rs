//! # Application Core
//!
//! [`AppCore`] is the one explicitly owned application instance. It is built
//! at startup from an [`AppConfig`], handed to whatever needs it, and torn
//! down with [`AppCore::shutdown`]. Nothing in this crate is global.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tether_core::{KeyValueStore, KeyboardDispatcher, Result};

use crate::config::AppConfig;
use crate::modal::{ModalController, ModalDescriptor, ModalHost, ModalId, ModalRegistry};
use crate::session::Session;
use crate::shell::DialogShell;

/// Session, modal controller and modal host for one application.
///
/// `S` is the session record type, `C` the content type dialog shells carry.
pub struct AppCore<S, C> {
    config: AppConfig,
    session: Session<S>,
    modals: ModalController,
    host: ModalHost<C>,
}

impl<S, C> AppCore<S, C>
where
    S: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Create an application whose session starts as `initial`
    pub fn new(
        config: AppConfig,
        store: Arc<dyn KeyValueStore>,
        keyboard: Arc<dyn KeyboardDispatcher>,
        registry: ModalRegistry<C>,
        initial: S,
    ) -> Result<Self> {
        config.validate()?;
        let session = Session::new(initial, store, config.session_key.clone())?;
        Ok(Self::assemble(config, session, keyboard, registry))
    }

    /// Create an application whose session is read back from `store`,
    /// starting as `fallback` when nothing was persisted
    pub fn restore(
        config: AppConfig,
        store: Arc<dyn KeyValueStore>,
        keyboard: Arc<dyn KeyboardDispatcher>,
        registry: ModalRegistry<C>,
        fallback: S,
    ) -> Result<Self> {
        config.validate()?;
        let session = Session::restore(store, config.session_key.clone(), fallback)?;
        Ok(Self::assemble(config, session, keyboard, registry))
    }

    fn assemble(
        config: AppConfig,
        session: Session<S>,
        keyboard: Arc<dyn KeyboardDispatcher>,
        registry: ModalRegistry<C>,
    ) -> Self {
        let modals = ModalController::new();
        let host = ModalHost::new(
            modals.clone(),
            registry,
            keyboard,
            config.cancel_key,
        )
        .with_shell_defaults(config.shell);
        tracing::info!(
            session_key = %config.session_key,
            cancel_key = %config.cancel_key,
            "application core ready"
        );
        Self {
            config,
            session,
            modals,
            host,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The persisted session
    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Modal controller handle
    pub fn modals(&self) -> &ModalController {
        &self.modals
    }

    /// Show `descriptor`; the shell appears on the next [`sync_modals`](Self::sync_modals)
    pub fn open_modal(&self, descriptor: ModalDescriptor) -> ModalId {
        self.modals.open_modal(descriptor)
    }

    /// Modal host
    pub fn host(&self) -> &ModalHost<C> {
        &self.host
    }

    /// Modal host, mutably
    pub fn host_mut(&mut self) -> &mut ModalHost<C> {
        &mut self.host
    }

    /// Bring the mounted shell in line with the controller
    pub fn sync_modals(&mut self) -> Result<Option<&DialogShell<C>>> {
        self.host.sync()
    }

    /// Unmount any shell, close any modal without hooks and dispose the
    /// session
    pub fn shutdown(mut self) {
        self.host.unmount();
        self.modals.close_modal();
        self.session.dispose();
        tracing::info!("application core shut down");
    }
}

impl<S: fmt::Debug, C> fmt::Debug for AppCore<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCore")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("host", &self.host)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::modal::ModalProps;
    use crate::session::{serialize_session, SessionRecord};
    use crate::shell::ShellProps;
    use assert_matches::assert_matches;
    use tether_core::{KeyCode, LocalKeyboard, MemoryStore, TetherError};

    fn registry() -> ModalRegistry<String> {
        ModalRegistry::new()
            .with("notice", |props: ModalProps| -> Result<ShellProps<String>> {
                Ok(props.shell().title("Notice"))
            })
            .unwrap()
    }

    fn core(memory: &MemoryStore, keyboard: &LocalKeyboard) -> AppCore<SessionRecord, String> {
        AppCore::new(
            AppConfig::default(),
            Arc::new(memory.clone()),
            Arc::new(keyboard.clone()),
            registry(),
            SessionRecord::empty(),
        )
        .unwrap()
    }

    #[test]
    fn test_session_writes_under_configured_key() {
        let memory = MemoryStore::new();
        let config = AppConfig {
            session_key: "app".to_string(),
            ..AppConfig::default()
        };
        let app: AppCore<SessionRecord, String> = AppCore::new(
            config,
            Arc::new(memory.clone()),
            Arc::new(LocalKeyboard::new()),
            registry(),
            SessionRecord::empty(),
        )
        .unwrap();

        assert_eq!(app.session().key(), "app");
        app.session().set(SessionRecord::for_user("a")).unwrap();
        assert!(memory.get_item("app").unwrap().is_some());
        assert!(memory.get_item("session").unwrap().is_none());
    }

    #[test]
    fn test_restore_picks_up_persisted_session() {
        let memory = MemoryStore::new();
        memory
            .set_item("session", &serialize_session(&SessionRecord::for_user("kim")).unwrap())
            .unwrap();

        let app: AppCore<SessionRecord, String> = AppCore::restore(
            AppConfig::default(),
            Arc::new(memory),
            Arc::new(LocalKeyboard::new()),
            registry(),
            SessionRecord::empty(),
        )
        .unwrap();
        assert_eq!(app.session().get().unwrap().user.as_deref(), Some("kim"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AppConfig {
            session_key: String::new(),
            ..AppConfig::default()
        };
        let result: Result<AppCore<SessionRecord, String>> = AppCore::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(LocalKeyboard::new()),
            registry(),
            SessionRecord::empty(),
        );
        assert_matches!(result, Err(TetherError::Config { .. }));
    }

    #[test]
    fn test_modal_round_trip_through_core() {
        let memory = MemoryStore::new();
        let keyboard = LocalKeyboard::new();
        let mut app = core(&memory, &keyboard);

        app.open_modal(ModalDescriptor::new("notice"));
        assert!(app.sync_modals().unwrap().is_some());

        keyboard.press(KeyCode::Escape).unwrap();
        assert!(app.sync_modals().unwrap().is_none());
        assert!(!app.modals().is_active());
    }

    #[test]
    fn test_unmounted_shell_returns_on_next_sync() {
        let memory = MemoryStore::new();
        let keyboard = LocalKeyboard::new();
        let mut app = core(&memory, &keyboard);
        let id = app.open_modal(ModalDescriptor::new("notice"));
        app.sync_modals().unwrap();

        assert_eq!(app.host_mut().unmount(), Some(id));
        assert_eq!(keyboard.registration_count(), 0);
        assert!(app.modals().is_active());

        app.sync_modals().unwrap();
        assert_eq!(app.host().mounted_id(), Some(id));
        assert_eq!(keyboard.registrations_for(KeyCode::Escape), 1);
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let memory = MemoryStore::new();
        let keyboard = LocalKeyboard::new();
        let mut app = core(&memory, &keyboard);
        let session = app.session().container().clone();
        let modals = app.modals().clone();

        app.open_modal(ModalDescriptor::new("notice"));
        app.sync_modals().unwrap();
        app.shutdown();

        assert_eq!(keyboard.registration_count(), 0);
        assert!(!modals.is_active());
        assert!(session.is_disposed());
    }
}
