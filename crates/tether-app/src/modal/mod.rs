//! # Modal System
//!
//! One modal at a time, driven by a [`ModalController`]:
//!
//! - [`ModalDescriptor`]: what to show (a [`ModalKind`] tag, arguments and
//!   optional lifecycle hooks)
//! - [`ModalController`]: the `Idle` / `Active` state machine running the
//!   hooks around cancel and submit
//! - [`ModalRegistry`]: resolves a kind to the [`ModalHandler`] that renders it
//! - [`ModalHost`]: keeps a mounted [`DialogShell`](crate::shell::DialogShell)
//!   in step with the controller

mod controller;
mod descriptor;
mod host;
mod registry;

pub use controller::{ActiveModal, ModalController, ModalId, ModalState};
pub use descriptor::{CancelHook, ModalDescriptor, ModalKind, SubmitHook};
pub use host::ModalHost;
pub use registry::{ModalHandler, ModalProps, ModalRegistry};
