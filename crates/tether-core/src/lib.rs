//! # Tether Core
//!
//! Foundation layer for Tether: the observable [`StateContainer`], the unified
//! [`TetherError`], the [`KeyValueStore`] persistence seam and the keyboard
//! shortcut contract used by dialog shells.
//!
//! This crate has no knowledge of modals or sessions; those live in
//! `tether-app`.

pub mod errors;
pub mod input;
pub mod reactive;
pub mod storage;

pub use errors::{Result, TetherError};
pub use input::{KeyCode, KeyHandler, KeyboardDispatcher, LocalKeyboard, Shortcut, ShortcutGuard, ShortcutId};
pub use reactive::{Binding, Reaction, ReactionId, StateContainer};
pub use storage::{KeyValueStore, MemoryStore};
