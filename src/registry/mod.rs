//! Registry of modal components.
//!
//! Maps identifiers to component references and optional static props, and
//! resolves [`ModalTarget`]s to identifiers. Opening a component that was never
//! registered assigns it a generated id (cached in a side map keyed by the
//! component's identity) and registers it transparently.
//!
//! # Example
//!
//! ```rust
//! use modalkit::registry::Registry;
//! use modalkit::{ComponentRef, ModalComponent, ModalTarget};
//! use std::rc::Rc;
//!
//! struct Confirm;
//! impl ModalComponent for Confirm {}
//!
//! let mut registry = Registry::new("_modal");
//! let confirm: ComponentRef = Rc::new(Confirm);
//!
//! let id = registry.resolve(&ModalTarget::from(&confirm)).unwrap();
//! assert_eq!(registry.resolve(&ModalTarget::from(&confirm)).unwrap(), id);
//! ```

pub mod ids;

pub use ids::IdGenerator;

use crate::domain::error::{ModalError, Result};
use crate::domain::{ComponentRef, ModalData, ModalId, ModalTarget};
use ids::ComponentIds;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A registered component and its static default props.
#[derive(Clone)]
pub struct RegistryEntry {
    pub component: ComponentRef,
    pub props: Option<ModalData>,
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("component", &self.component.name())
            .field("props", &self.props)
            .finish()
    }
}

/// Identifier to component mapping plus the id generator.
pub struct Registry {
    entries: HashMap<ModalId, RegistryEntry>,
    component_ids: ComponentIds,
    ids: IdGenerator,
}

impl Registry {
    /// Creates an empty registry generating ids with `id_prefix`.
    #[must_use]
    pub fn new(id_prefix: impl Into<String>) -> Self {
        Self {
            entries: HashMap::new(),
            component_ids: ComponentIds::default(),
            ids: IdGenerator::new(id_prefix),
        }
    }

    /// Registers `component` under `id`.
    ///
    /// Repeat registration overwrites the props but keeps the component that
    /// was registered first.
    pub fn register(&mut self, id: ModalId, component: ComponentRef, props: Option<ModalData>) {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                tracing::debug!(modal_id = %id, "modal already registered, updating props");
                entry.props = props;
            }
            None => {
                tracing::debug!(modal_id = %id, component = component.name(), "registering modal");
                self.entries.insert(id, RegistryEntry { component, props });
            }
        }
    }

    /// Removes the entry for `id`, returning it if present.
    pub fn unregister(&mut self, id: &ModalId) -> Option<RegistryEntry> {
        let removed = self.entries.remove(id);
        if removed.is_some() {
            tracing::debug!(modal_id = %id, "modal unregistered");
        }
        removed
    }

    #[must_use]
    pub fn get(&self, id: &ModalId) -> Option<&RegistryEntry> {
        self.entries.get(id)
    }

    #[must_use]
    pub fn is_registered(&self, id: &ModalId) -> bool {
        self.entries.contains_key(id)
    }

    /// Resolves a target to its identifier.
    ///
    /// Ids pass through unchanged. Components get their cached id, or a freshly
    /// generated one on first sight. This does not register the component;
    /// see [`Registry::resolve_and_register`].
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::MissingIdentifier`] for an empty id.
    pub fn resolve(&mut self, target: &ModalTarget) -> Result<ModalId> {
        match target {
            ModalTarget::Id(id) if id.is_empty() => Err(ModalError::MissingIdentifier),
            ModalTarget::Id(id) => Ok(id.clone()),
            ModalTarget::Component(component) => Ok(self.component_id(component)),
        }
    }

    /// Resolves a target and, for components, registers the component under
    /// the resolved id if nothing is registered there yet.
    ///
    /// `explicit_id` overrides the generated id for components and is cached
    /// for subsequent lookups of the same component.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::MissingIdentifier`] for an empty id.
    pub fn resolve_and_register(&mut self, target: &ModalTarget, explicit_id: Option<&ModalId>) -> Result<ModalId> {
        if explicit_id.is_some_and(ModalId::is_empty) {
            return Err(ModalError::MissingIdentifier);
        }

        match (target, explicit_id) {
            (ModalTarget::Component(component), Some(id)) => {
                self.component_ids.insert(component, id.clone());
                if !self.is_registered(id) {
                    self.register(id.clone(), Rc::clone(component), None);
                }
                Ok(id.clone())
            }
            (ModalTarget::Component(component), None) => {
                let id = self.component_id(component);
                if !self.is_registered(&id) {
                    self.register(id.clone(), Rc::clone(component), None);
                }
                Ok(id)
            }
            (ModalTarget::Id(_), Some(id)) => Ok(id.clone()),
            (ModalTarget::Id(_), None) => self.resolve(target),
        }
    }

    /// Resolves a target without generating an id. Components never seen
    /// before yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::MissingIdentifier`] for an empty id.
    pub fn lookup(&self, target: &ModalTarget) -> Result<Option<ModalId>> {
        match target {
            ModalTarget::Id(id) if id.is_empty() => Err(ModalError::MissingIdentifier),
            ModalTarget::Id(id) => Ok(Some(id.clone())),
            ModalTarget::Component(component) => Ok(self.component_ids.get(component)),
        }
    }

    /// Generates a fresh identifier.
    pub fn next_id(&mut self) -> ModalId {
        self.ids.next_id()
    }

    /// Restarts id generation and forgets cached component ids.
    pub fn reset_ids(&mut self) {
        self.ids.reset();
        self.component_ids.clear();
    }

    fn component_id(&mut self, component: &ComponentRef) -> ModalId {
        if let Some(id) = self.component_ids.get(component) {
            return id;
        }
        let id = self.ids.next_id();
        tracing::debug!(modal_id = %id, component = component.name(), "assigned generated modal id");
        self.component_ids.insert(component, id.clone());
        id
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.entries)
            .field("cached_component_ids", &self.component_ids.len())
            .field("ids", &self.ids)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModalComponent;
    use serde_json::json;

    struct Alert;
    impl ModalComponent for Alert {
        fn name(&self) -> &str {
            "Alert"
        }
    }

    struct Other;
    impl ModalComponent for Other {}

    #[test]
    fn repeat_registration_keeps_component_and_updates_props() {
        let mut registry = Registry::new("_modal");
        let alert: ComponentRef = Rc::new(Alert);
        let other: ComponentRef = Rc::new(Other);

        registry.register("m1".into(), Rc::clone(&alert), None);
        let mut props = ModalData::new();
        props.insert("title".into(), json!("hi"));
        registry.register("m1".into(), other, Some(props.clone()));

        let entry = registry.get(&"m1".into()).unwrap();
        assert!(Rc::ptr_eq(&entry.component, &alert));
        assert_eq!(entry.props, Some(props));
    }

    #[test]
    fn resolving_ids_passes_through() {
        let mut registry = Registry::new("_modal");
        assert_eq!(registry.resolve(&"m1".into()).unwrap().as_str(), "m1");
        assert!(matches!(registry.resolve(&"".into()), Err(ModalError::MissingIdentifier)));
    }

    #[test]
    fn components_get_stable_generated_ids() {
        let mut registry = Registry::new("dlg");
        let alert: ComponentRef = Rc::new(Alert);
        let other: ComponentRef = Rc::new(Other);

        let first = registry.resolve_and_register(&(&alert).into(), None).unwrap();
        let again = registry.resolve_and_register(&(&alert).into(), None).unwrap();
        let second = registry.resolve_and_register(&(&other).into(), None).unwrap();

        assert_eq!(first.as_str(), "dlg_0");
        assert_eq!(first, again);
        assert_eq!(second.as_str(), "dlg_1");
        assert!(registry.is_registered(&first));
    }

    #[test]
    fn explicit_id_registers_component_under_it() {
        let mut registry = Registry::new("_modal");
        let alert: ComponentRef = Rc::new(Alert);
        let id = ModalId::from("custom");

        let resolved = registry.resolve_and_register(&(&alert).into(), Some(&id)).unwrap();
        assert_eq!(resolved, id);
        assert!(registry.is_registered(&id));
        assert_eq!(registry.resolve(&(&alert).into()).unwrap(), id);
    }

    #[test]
    fn unregister_removes_entry() {
        let mut registry = Registry::new("_modal");
        registry.register("m1".into(), Rc::new(Alert), None);
        assert!(registry.unregister(&"m1".into()).is_some());
        assert!(registry.unregister(&"m1".into()).is_none());
    }
}
