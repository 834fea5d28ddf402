//! Keyboard shortcut contract
//!
//! The host owns the real key-event subscription. Tether only needs to
//! register `{key, handler}` pairs and release them again, which is what
//! [`KeyboardDispatcher`] describes. [`ShortcutGuard`] ties a registration to a
//! scope so it is released on every exit path. [`LocalKeyboard`] is an
//! in-process dispatcher for tests and headless hosts.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TetherError};

/// Keys that can be bound to a shortcut.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum KeyCode {
    /// Escape, the default cancel key
    Escape,
    /// Enter / Return
    Enter,
    /// Tab
    Tab,
    /// Backspace
    Backspace,
    /// Arrow up
    Up,
    /// Arrow down
    Down,
    /// Arrow left
    Left,
    /// Arrow right
    Right,
    /// A printable character
    Char(char),
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Escape => f.write_str("Escape"),
            Self::Enter => f.write_str("Enter"),
            Self::Tab => f.write_str("Tab"),
            Self::Backspace => f.write_str("Backspace"),
            Self::Up => f.write_str("ArrowUp"),
            Self::Down => f.write_str("ArrowDown"),
            Self::Left => f.write_str("ArrowLeft"),
            Self::Right => f.write_str("ArrowRight"),
            Self::Char(c) => write!(f, "{c}"),
        }
    }
}

impl FromStr for KeyCode {
    type Err = TetherError;

    fn from_str(s: &str) -> Result<Self> {
        let key = match s {
            "Escape" | "Esc" => Self::Escape,
            "Enter" | "Return" => Self::Enter,
            "Tab" => Self::Tab,
            "Backspace" => Self::Backspace,
            "ArrowUp" | "Up" => Self::Up,
            "ArrowDown" | "Down" => Self::Down,
            "ArrowLeft" | "Left" => Self::Left,
            "ArrowRight" | "Right" => Self::Right,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => return Err(TetherError::invalid(format!("unknown key code `{other}`"))),
                }
            }
        };
        Ok(key)
    }
}

impl TryFrom<String> for KeyCode {
    type Error = TetherError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<KeyCode> for String {
    fn from(key: KeyCode) -> Self {
        key.to_string()
    }
}

/// Handler invoked when a registered key is pressed.
pub type KeyHandler = Arc<dyn Fn() -> Result<()> + Send + Sync>;

/// A `{key, handler}` registration request.
#[derive(Clone)]
pub struct Shortcut {
    /// Key that triggers the handler
    pub key: KeyCode,
    /// Handler to run on each press
    pub handler: KeyHandler,
}

impl Shortcut {
    /// Build a shortcut from a key and a closure
    pub fn new<F>(key: KeyCode, handler: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        Self {
            key,
            handler: Arc::new(handler),
        }
    }
}

impl fmt::Debug for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shortcut").field("key", &self.key).finish()
    }
}

/// Identifier of an active registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShortcutId(u64);

/// External keyboard dispatcher.
///
/// Implementations invoke each active registration at most once per physical
/// key press, regardless of how many other registrations exist.
pub trait KeyboardDispatcher: Send + Sync {
    /// Start delivering presses of `shortcut.key` to `shortcut.handler`
    fn register(&self, shortcut: Shortcut) -> ShortcutId;

    /// Stop delivering to `id`; returns whether it was registered
    fn unregister(&self, id: ShortcutId) -> bool;
}

/// Scoped keyboard registration, released when dropped.
pub struct ShortcutGuard {
    id: ShortcutId,
    key: KeyCode,
    dispatcher: Arc<dyn KeyboardDispatcher>,
    released: bool,
}

impl ShortcutGuard {
    /// Register `shortcut` with `dispatcher` for the lifetime of the guard
    pub fn acquire(dispatcher: Arc<dyn KeyboardDispatcher>, shortcut: Shortcut) -> Self {
        let key = shortcut.key;
        let id = dispatcher.register(shortcut);
        tracing::trace!(?id, %key, "keyboard shortcut registered");
        Self {
            id,
            key,
            dispatcher,
            released: false,
        }
    }

    /// Registration id
    pub fn id(&self) -> ShortcutId {
        self.id
    }

    /// Key the registration listens for
    pub fn key(&self) -> KeyCode {
        self.key
    }

    /// Release the registration now
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if !self.released {
            self.released = true;
            self.dispatcher.unregister(self.id);
            tracing::trace!(id = ?self.id, key = %self.key, "keyboard shortcut released");
        }
    }
}

impl Drop for ShortcutGuard {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl fmt::Debug for ShortcutGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutGuard")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("released", &self.released)
            .finish()
    }
}

/// In-process keyboard dispatcher.
///
/// `press` delivers to every registration for the key in registration order.
/// A registration removed by an earlier handler during the same press is
/// skipped.
#[derive(Clone, Default)]
pub struct LocalKeyboard {
    registrations: Arc<Mutex<Vec<(ShortcutId, Shortcut)>>>,
    next_id: Arc<AtomicU64>,
}

impl LocalKeyboard {
    /// Create a dispatcher with no registrations
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one press of `key`.
    ///
    /// Returns how many handlers ran. The first handler error stops delivery
    /// and is returned.
    pub fn press(&self, key: KeyCode) -> Result<usize> {
        let targets: Vec<(ShortcutId, KeyHandler)> = self
            .registrations
            .lock()
            .iter()
            .filter(|(_, shortcut)| shortcut.key == key)
            .map(|(id, shortcut)| (*id, Arc::clone(&shortcut.handler)))
            .collect();

        let mut delivered = 0;
        for (id, handler) in targets {
            if !self.is_registered(id) {
                continue;
            }
            handler()?;
            delivered += 1;
        }
        tracing::trace!(%key, delivered, "key press delivered");
        Ok(delivered)
    }

    /// Whether `id` is currently registered
    pub fn is_registered(&self, id: ShortcutId) -> bool {
        self.registrations.lock().iter().any(|(rid, _)| *rid == id)
    }

    /// Number of active registrations across all keys
    pub fn registration_count(&self) -> usize {
        self.registrations.lock().len()
    }

    /// Number of active registrations for `key`
    pub fn registrations_for(&self, key: KeyCode) -> usize {
        self.registrations
            .lock()
            .iter()
            .filter(|(_, shortcut)| shortcut.key == key)
            .count()
    }
}

impl KeyboardDispatcher for LocalKeyboard {
    fn register(&self, shortcut: Shortcut) -> ShortcutId {
        let id = ShortcutId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registrations.lock().push((id, shortcut));
        id
    }

    fn unregister(&self, id: ShortcutId) -> bool {
        let mut registrations = self.registrations.lock();
        let before = registrations.len();
        registrations.retain(|(rid, _)| *rid != id);
        registrations.len() != before
    }
}

impl fmt::Debug for LocalKeyboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalKeyboard")
            .field("registrations", &self.registration_count())
            .finish()
    }
}
