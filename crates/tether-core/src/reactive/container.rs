//! StateContainer<T> - an observable value with synchronous reactions
//!
//! `StateContainer<T>` holds exactly one current value and an ordered list of
//! reactions. Every `set` replaces the value and then runs each reaction, in
//! registration order, before returning.
//!
//! # Reentrancy
//!
//! A reaction that calls `set` on the container currently notifying it is
//! rejected with [`TetherError::ReentrantMutation`]. Reading the value and
//! binding/unbinding reactions from inside a reaction is allowed; the
//! notification in progress keeps using the reaction list it started with.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex, RwLock};

use crate::errors::{Result, TetherError};

/// A side effect run with every new value.
pub type Reaction<T> = Arc<dyn Fn(&T) -> Result<()> + Send + Sync>;

/// Identifier of a bound reaction, unique per container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReactionId(u64);

struct ContainerInner<T> {
    value: RwLock<T>,
    /// Incremented once per successful replacement.
    version: AtomicU64,
    reactions: Mutex<Vec<(ReactionId, Reaction<T>)>>,
    next_reaction: AtomicU64,
    disposed: AtomicBool,
    /// Held for the whole of `set`; the flag is raised while reactions run.
    dispatch_gate: ReentrantMutex<Cell<bool>>,
}

/// Raises the dispatch flag for the lifetime of the guard.
struct DispatchFlag<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> DispatchFlag<'a> {
    fn raise(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for DispatchFlag<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// An observable value with an ordered list of synchronous reactions.
///
/// Clones share the same value and reaction list.
///
/// # Example
///
/// ```rust,ignore
/// use tether_core::reactive::StateContainer;
///
/// let counter = StateContainer::new(0);
/// let binding = counter.bind(|n: &i32| {
///     println!("counter is now {n}");
///     Ok(())
/// })?;
///
/// counter.set(1)?; // prints "counter is now 1"
/// binding.unbind();
/// counter.set(2)?; // prints nothing
/// ```
pub struct StateContainer<T> {
    inner: Arc<ContainerInner<T>>,
}

impl<T> Clone for StateContainer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> StateContainer<T> {
    /// Create a container holding `initial` with no reactions.
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                value: RwLock::new(initial),
                version: AtomicU64::new(0),
                reactions: Mutex::new(Vec::new()),
                next_reaction: AtomicU64::new(0),
                disposed: AtomicBool::new(false),
                dispatch_gate: ReentrantMutex::new(Cell::new(false)),
            }),
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> Result<T> {
        self.ensure_live()?;
        Ok(self.inner.value.read().clone())
    }

    /// Number of successful replacements so far.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Replace the value, then run every reaction in registration order.
    ///
    /// Returns once all reactions have run. The first failing reaction stops
    /// the remaining ones and its error is returned; the new value stays in
    /// place either way.
    pub fn set(&self, next: T) -> Result<()> {
        self.ensure_live()?;

        let gate = self.inner.dispatch_gate.lock();
        if gate.get() {
            tracing::warn!("rejected reentrant set on state container");
            return Err(TetherError::ReentrantMutation);
        }
        // Another handle may have disposed the container while we waited.
        self.ensure_live()?;
        let _dispatching = DispatchFlag::raise(&gate);

        *self.inner.value.write() = next.clone();
        let version = self.inner.version.fetch_add(1, Ordering::AcqRel) + 1;

        let reactions: Vec<Reaction<T>> = self
            .inner
            .reactions
            .lock()
            .iter()
            .map(|(_, reaction)| Arc::clone(reaction))
            .collect();

        tracing::trace!(version, reactions = reactions.len(), "dispatching state change");
        for reaction in reactions {
            reaction(&next)?;
        }
        Ok(())
    }

    /// Read the current value, apply `f`, and `set` the result.
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(T) -> T,
    {
        let next = f(self.get()?);
        self.set(next)
    }

    /// Append a reaction.
    ///
    /// The reaction is not run for the current value; it sees only values
    /// passed to later `set` calls.
    pub fn bind<F>(&self, reaction: F) -> Result<Binding<T>>
    where
        F: Fn(&T) -> Result<()> + Send + Sync + 'static,
    {
        self.ensure_live()?;
        let id = ReactionId(self.inner.next_reaction.fetch_add(1, Ordering::Relaxed));
        self.inner.reactions.lock().push((id, Arc::new(reaction)));
        Ok(Binding {
            id,
            source: Arc::downgrade(&self.inner),
        })
    }

    /// Number of currently bound reactions.
    pub fn reaction_count(&self) -> usize {
        self.inner.reactions.lock().len()
    }

    /// Tear the container down, releasing its reactions.
    ///
    /// Every later `get`, `set`, `update` or `bind` fails with
    /// [`TetherError::ContainerDisposed`]. Calling this twice is harmless.
    pub fn dispose(&self) {
        if !self.inner.disposed.swap(true, Ordering::AcqRel) {
            let released = {
                let mut reactions = self.inner.reactions.lock();
                std::mem::take(&mut *reactions)
            };
            tracing::debug!(reactions = released.len(), "state container disposed");
        }
    }

    /// Whether `dispose` has been called.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_disposed() {
            Err(TetherError::ContainerDisposed)
        } else {
            Ok(())
        }
    }
}

impl<T: Clone + Send + Sync + Default + 'static> Default for StateContainer<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for StateContainer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateContainer")
            .field("value", &*self.inner.value.read())
            .field("version", &self.inner.version.load(Ordering::Acquire))
            .field("reactions", &self.inner.reactions.lock().len())
            .field("disposed", &self.inner.disposed.load(Ordering::Acquire))
            .finish()
    }
}

/// Handle to a bound reaction.
///
/// Dropping the handle leaves the reaction bound; call [`Binding::unbind`]
/// to remove it.
pub struct Binding<T> {
    id: ReactionId,
    source: Weak<ContainerInner<T>>,
}

impl<T> Binding<T> {
    /// The bound reaction's id.
    pub fn id(&self) -> ReactionId {
        self.id
    }

    /// Remove the reaction from its container.
    ///
    /// Returns `false` if it was already gone (container dropped or disposed).
    pub fn unbind(self) -> bool {
        let Some(inner) = self.source.upgrade() else {
            return false;
        };
        let mut reactions = inner.reactions.lock();
        let before = reactions.len();
        reactions.retain(|(id, _)| *id != self.id);
        reactions.len() != before
    }
}

impl<T> std::fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding").field("id", &self.id).finish()
    }
}
