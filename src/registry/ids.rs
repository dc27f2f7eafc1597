//! Identifier generation and component identity caching.

use crate::domain::{component_key, ComponentRef, ModalComponent, ModalId};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Monotonic counter producing `"{prefix}_{n}"` identifiers.
///
/// Ids never repeat within one generator until [`IdGenerator::reset`] is
/// called, which exists for deterministic test and snapshot output.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    next: u64,
}

impl IdGenerator {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// Returns the next identifier.
    pub fn next_id(&mut self) -> ModalId {
        let id = ModalId::new(format!("{}_{}", self.prefix, self.next));
        self.next += 1;
        id
    }

    /// Restarts the counter at zero.
    pub fn reset(&mut self) {
        self.next = 0;
    }
}

/// Side map from component identity to its generated id.
///
/// Keys are allocation addresses; the stored `Weak` confirms the address still
/// belongs to the same live component, so a freed-and-reused address is never
/// mistaken for the old component.
#[derive(Default)]
pub(crate) struct ComponentIds {
    entries: HashMap<usize, (Weak<dyn ModalComponent>, ModalId)>,
}

impl ComponentIds {
    pub(crate) fn get(&self, component: &ComponentRef) -> Option<ModalId> {
        let (weak, id) = self.entries.get(&component_key(component))?;
        let live = weak.upgrade()?;
        Rc::ptr_eq(&live, component).then(|| id.clone())
    }

    pub(crate) fn insert(&mut self, component: &ComponentRef, id: ModalId) {
        self.prune();
        self.entries
            .insert(component_key(component), (Rc::downgrade(component), id));
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    fn prune(&mut self) {
        self.entries.retain(|_, (weak, _)| weak.strong_count() > 0);
    }
}
