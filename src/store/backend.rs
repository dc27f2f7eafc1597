//! State backend abstraction.
//!
//! This module defines the [`StateBackend`] trait through which the
//! coordinator dispatches actions and reads snapshots. Two implementations are
//! provided:
//!
//! - [`LocalStore`]: owns the state and runs [`reduce`] itself (default)
//! - [`ExternalStore`]: forwards actions to a host-owned state container and
//!   reads snapshots back from it
//!
//! Methods take `&self` so an external dispatch function may read the context
//! again while it handles an action.

use super::actions::ModalAction;
use super::reducer::{reduce, ModalStore, MountedSet};
use crate::domain::error::{ModalError, Result};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Where modal state lives.
///
/// # Examples
///
/// ```
/// use modalkit::store::{LocalStore, ModalAction, MountedSet, StateBackend};
/// use modalkit::ModalId;
///
/// let store = LocalStore::new();
/// store.dispatch(&ModalAction::show(ModalId::from("m1"), Default::default()), &MountedSet::new())?;
/// assert!(store.snapshot()?.contains(&ModalId::from("m1")));
/// # Ok::<(), modalkit::ModalError>(())
/// ```
pub trait StateBackend {
    /// Applies an action.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot accept actions yet.
    fn dispatch(&self, action: &ModalAction, mounted: &MountedSet) -> Result<()>;

    /// Returns the current state snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read yet.
    fn snapshot(&self) -> Result<Rc<ModalStore>>;
}

/// Backend that owns its state and applies the built-in reducer.
#[derive(Debug, Default)]
pub struct LocalStore {
    state: RefCell<Rc<ModalStore>>,
}

impl LocalStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateBackend for LocalStore {
    fn dispatch(&self, action: &ModalAction, mounted: &MountedSet) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let next = reduce(&*state, action, mounted);
        if !Rc::ptr_eq(&*state, &next) {
            tracing::debug!(action = action.kind(), modal_id = %action.modal_id(), "modal store updated");
        }
        *state = next;
        Ok(())
    }

    fn snapshot(&self) -> Result<Rc<ModalStore>> {
        Ok(Rc::clone(&*self.state.borrow()))
    }
}

type DispatchFn = Box<dyn Fn(&ModalAction, &MountedSet)>;
type SnapshotFn = Box<dyn Fn() -> Rc<ModalStore>>;

/// Backend that delegates to a host-owned state container.
///
/// The container is expected to apply [`reduce`] to its own copy of the
/// state inside the dispatch function. Either function may be installed
/// after construction; using the store before then is a usage error.
///
/// # Examples
///
/// ```
/// use modalkit::store::{reduce, ExternalStore, ModalStore};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let state = Rc::new(RefCell::new(Rc::new(ModalStore::new())));
/// let writer = Rc::clone(&state);
/// let reader = Rc::clone(&state);
///
/// let store = ExternalStore::new()
///     .with_dispatch(move |action, mounted| {
///         let next = reduce(&*writer.borrow(), action, mounted);
///         *writer.borrow_mut() = next;
///     })
///     .with_snapshot(move || Rc::clone(&*reader.borrow()));
/// # let _ = store;
/// ```
#[derive(Default)]
pub struct ExternalStore {
    dispatch: RefCell<Option<DispatchFn>>,
    snapshot: RefCell<Option<SnapshotFn>>,
}

impl ExternalStore {
    /// Creates a store with neither function installed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_dispatch(self, dispatch: impl Fn(&ModalAction, &MountedSet) + 'static) -> Self {
        self.install_dispatch(dispatch);
        self
    }

    #[must_use]
    pub fn with_snapshot(self, snapshot: impl Fn() -> Rc<ModalStore> + 'static) -> Self {
        self.install_snapshot(snapshot);
        self
    }

    /// Installs or replaces the dispatch function.
    pub fn install_dispatch(&self, dispatch: impl Fn(&ModalAction, &MountedSet) + 'static) {
        *self.dispatch.borrow_mut() = Some(Box::new(dispatch));
    }

    /// Installs or replaces the snapshot function.
    pub fn install_snapshot(&self, snapshot: impl Fn() -> Rc<ModalStore> + 'static) {
        *self.snapshot.borrow_mut() = Some(Box::new(snapshot));
    }
}

impl StateBackend for ExternalStore {
    fn dispatch(&self, action: &ModalAction, mounted: &MountedSet) -> Result<()> {
        let dispatch = self.dispatch.borrow();
        let dispatch = dispatch.as_ref().ok_or(ModalError::DispatchNotInstalled)?;
        tracing::debug!(action = action.kind(), modal_id = %action.modal_id(), "forwarding action to external store");
        dispatch(action, mounted);
        Ok(())
    }

    fn snapshot(&self) -> Result<Rc<ModalStore>> {
        let snapshot = self.snapshot.borrow();
        let snapshot = snapshot.as_ref().ok_or_else(|| {
            tracing::warn!("external modal store read before a snapshot function was installed");
            ModalError::SnapshotNotInstalled
        })?;
        Ok(snapshot())
    }
}

impl fmt::Debug for ExternalStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalStore")
            .field("dispatch_installed", &self.dispatch.borrow().is_some())
            .field("snapshot_installed", &self.snapshot.borrow().is_some())
            .finish()
    }
}
