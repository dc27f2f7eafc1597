//! Pure transition function for the modal store.
//!
//! [`reduce`] never mutates its input. Accepted transitions return a new
//! `Rc<ModalStore>`; rejected ones (hide/remove/set-flags on an absent entry)
//! and transitions that would change nothing return a clone of the input
//! `Rc`, so downstream change detection is a pointer comparison
//! (`Rc::ptr_eq`).

use super::actions::ModalAction;
use crate::domain::{ModalFlags, ModalId, ModalOptions, ModalState};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

/// Snapshot of every modal's state, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModalStore {
    entries: BTreeMap<ModalId, ModalState>,
}

impl ModalStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &ModalId) -> Option<&ModalState> {
        self.entries.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ModalId) -> bool {
        self.entries.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ModalId, &ModalState)> {
        self.entries.iter()
    }
}

/// Ids whose component currently has a live binding in the view tree.
///
/// Maintained by the binder; read by the reducer to decide between an
/// immediate and a delayed open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountedSet {
    ids: HashSet<ModalId>,
}

impl MountedSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, id: &ModalId) -> bool {
        self.ids.contains(id)
    }

    /// Returns `true` if the id was not already mounted.
    pub fn insert(&mut self, id: ModalId) -> bool {
        self.ids.insert(id)
    }

    /// Returns `true` if the id was mounted.
    pub fn remove(&mut self, id: &ModalId) -> bool {
        self.ids.remove(id)
    }
}

impl FromIterator<ModalId> for MountedSet {
    fn from_iter<I: IntoIterator<Item = ModalId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Applies `action` to `state`.
///
/// # Transitions
///
/// - `show`: upserts; `is_open = mounted`, `delay_open = !mounted`;
///   `keep_mounted` comes from the internal options in `data` when present.
///   Re-showing an identical entry is a no-op.
/// - `hide`: clears `is_open`; no-op if absent or already hidden.
/// - `remove`: deletes the entry; no-op if absent.
/// - `set-flags`: merges flags; no-op if absent or if the patch changes nothing.
///
/// # Example
///
/// ```rust
/// use modalkit::store::{reduce, ModalAction, ModalStore, MountedSet};
/// use modalkit::ModalId;
/// use std::rc::Rc;
///
/// let empty = Rc::new(ModalStore::new());
/// let next = reduce(&empty, &ModalAction::hide(ModalId::from("x")), &MountedSet::new());
/// assert!(Rc::ptr_eq(&empty, &next));
/// ```
#[must_use]
pub fn reduce(state: &Rc<ModalStore>, action: &ModalAction, mounted: &MountedSet) -> Rc<ModalStore> {
    let id = action.modal_id();

    match action {
        ModalAction::Show(payload) => {
            let already_mounted = mounted.contains(id);
            let data = payload.data.clone().unwrap_or_default();
            let previous = state.get(id);
            let keep_mounted = ModalOptions::from_data(&data).map_or_else(
                || previous.is_some_and(|entry| entry.keep_mounted),
                |options| options.keep_mounted,
            );

            let entry = ModalState {
                modal_id: id.clone(),
                data,
                is_open: already_mounted,
                delay_open: !already_mounted,
                keep_mounted,
            };
            if previous == Some(&entry) {
                return Rc::clone(state);
            }

            let mut next = (**state).clone();
            next.entries.insert(id.clone(), entry);
            Rc::new(next)
        }
        ModalAction::Hide(_) => {
            let Some(entry) = state.get(id).filter(|entry| entry.is_open) else {
                return Rc::clone(state);
            };
            let mut entry = entry.clone();
            entry.is_open = false;

            let mut next = (**state).clone();
            next.entries.insert(id.clone(), entry);
            Rc::new(next)
        }
        ModalAction::Remove(_) => {
            if !state.contains(id) {
                return Rc::clone(state);
            }
            let mut next = (**state).clone();
            next.entries.remove(id);
            Rc::new(next)
        }
        ModalAction::SetFlags(payload) => {
            let Some(entry) = state.get(id) else {
                return Rc::clone(state);
            };
            let flags = payload.flags.unwrap_or_default();
            let patched = apply_flags(entry, flags);
            if &patched == entry {
                return Rc::clone(state);
            }

            let mut next = (**state).clone();
            next.entries.insert(id.clone(), patched);
            Rc::new(next)
        }
    }
}

fn apply_flags(entry: &ModalState, flags: ModalFlags) -> ModalState {
    let mut patched = entry.clone();

    if let Some(is_open) = flags.is_open {
        patched.is_open = is_open;
    }
    if let Some(delay_open) = flags.delay_open {
        patched.delay_open = delay_open;
    }
    if let Some(keep_mounted) = flags.keep_mounted {
        patched.keep_mounted = keep_mounted;
    }

    if flags.keep_mounted.is_some() || flags.disable_close.is_some() {
        let mut options = patched.options();
        if let Some(keep_mounted) = flags.keep_mounted {
            options.keep_mounted = keep_mounted;
        }
        if let Some(disable_close) = flags.disable_close {
            options.disable_close = disable_close;
        }
        options.write_into(&mut patched.data);
    }

    patched
}
