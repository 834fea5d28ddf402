//! Tether Testing Infrastructure
//!
//! Shared helpers for exercising reactive state, modal lifecycles and session
//! persistence without a real renderer or storage backend.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! tether-testkit = { path = "../tether-testkit" }
//! ```
//!
//! ```rust,ignore
//! use tether_testkit::*;
//!
//! #[test]
//! fn hooks_run_in_order() {
//!     let calls = CallRecorder::new();
//!     let descriptor = ModalDescriptor::new("confirm")
//!         .before_cancel(calls.hook("before"))
//!         .after_cancel(calls.hook("after"));
//!     // ...
//!     assert_calls!(calls, ["before", "after"]);
//! }
//! ```

pub mod assertions;
pub mod recorder;
pub mod stores;
pub mod strategies;

pub use recorder::{Call, CallRecorder, ValueLog};
pub use stores::{CountingStore, FailingStore};

#[doc(hidden)]
pub mod __private {
    pub use tether_core::KeyValueStore;
}
