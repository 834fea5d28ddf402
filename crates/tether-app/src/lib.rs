//! # Tether App
//!
//! Headless application layer on top of `tether-core`:
//!
//! - [`session`]: the session record, persisted to a key-value store on every
//!   change
//! - [`modal`]: one-at-a-time modal controller with cancel/submit lifecycle
//!   hooks, handler registry and host glue
//! - [`shell`]: the dialog shell interaction contract (backdrop, close
//!   affordance, cancel key, form capture)
//! - [`config`] and [`AppCore`]: the explicitly constructed application
//!   instance that owns all of the above
//!
//! ```rust,ignore
//! let registry = ModalRegistry::new().with("confirm", |props: ModalProps| {
//!     Ok(props.shell().title("Are you sure?").body("This cannot be undone."))
//! })?;
//! let mut app = AppCore::new(config, store, keyboard, registry, SessionRecord::empty())?;
//! app.open_modal(ModalDescriptor::new("confirm").after_submit(|_| Ok(())));
//! let shell = app.sync_modals()?;
//! ```

mod app;
pub mod config;
pub mod modal;
pub mod session;
pub mod shell;

pub use crate::app::AppCore;
pub use crate::config::AppConfig;
pub use crate::modal::{
    ActiveModal, ModalController, ModalDescriptor, ModalHandler, ModalHost, ModalId, ModalKind,
    ModalProps, ModalRegistry, ModalState,
};
pub use crate::session::{Session, SessionRecord, DEFAULT_SESSION_KEY};
pub use crate::shell::{
    ContentRegion, DialogShell, FooterAlign, ShellDefaults, ShellElement, ShellLayout,
    ShellOutcome, ShellProps, SubmitEvent,
};

pub use tether_core::{
    KeyCode, KeyValueStore, KeyboardDispatcher, LocalKeyboard, MemoryStore, Result, TetherError,
};
