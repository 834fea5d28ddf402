//! # Reactive Primitives
//!
//! - [`StateContainer<T>`]: a single-value holder that synchronously notifies
//!   its bound reactions, in registration order, on every replacement.
//! - [`Binding<T>`]: the handle returned by `bind`, used to remove a reaction.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tether_core::reactive::StateContainer;
//!
//! let theme = StateContainer::new("light".to_string());
//! let binding = theme.bind(|name: &String| {
//!     tracing::info!(%name, "theme changed");
//!     Ok(())
//! })?;
//!
//! theme.set("dark".to_string())?;
//! assert_eq!(theme.get()?, "dark");
//! binding.unbind();
//! ```

mod container;

pub use container::{Binding, Reaction, ReactionId, StateContainer};
