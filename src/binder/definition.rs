//! Scoped registrations.

use crate::domain::error::Result;
use crate::domain::{ComponentRef, ModalData, ModalId};
use crate::lifecycle::coordinator::WeakContext;
use crate::lifecycle::ModalContext;

/// Registration that lasts as long as this guard.
///
/// Dropping the guard unregisters the id, mirroring a declared modal leaving
/// the view tree.
#[derive(Debug)]
#[must_use = "dropping the definition unregisters the modal"]
pub struct ModalDefinition {
    modal_id: ModalId,
    context: WeakContext,
}

impl ModalContext {
    /// Registers `component` under `id` for the lifetime of the returned
    /// guard.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ModalError::MissingIdentifier`] for an empty id.
    pub fn define(&self, id: impl Into<ModalId>, component: ComponentRef, props: Option<ModalData>) -> Result<ModalDefinition> {
        let modal_id = id.into();
        self.register(modal_id.clone(), component, props)?;
        Ok(ModalDefinition {
            modal_id,
            context: self.downgrade(),
        })
    }
}

impl ModalDefinition {
    #[must_use]
    pub fn modal_id(&self) -> &ModalId {
        &self.modal_id
    }

    /// Replaces the static props of the definition. No effect if the id was
    /// unregistered by other means.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ModalError::ContextDropped`] once the context is gone.
    pub fn set_props(&self, props: Option<ModalData>) -> Result<()> {
        let ctx = self.context.upgrade()?;
        let mut registry = ctx.registry().borrow_mut();
        if let Some(component) = registry.get(&self.modal_id).map(|entry| entry.component.clone()) {
            registry.register(self.modal_id.clone(), component, props);
        }
        Ok(())
    }
}

impl Drop for ModalDefinition {
    fn drop(&mut self) {
        if let Ok(ctx) = self.context.upgrade() {
            ctx.unregister(&self.modal_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::ModalComponent;
    use crate::{ModalConfig, ModalContext, ModalError};
    use serde_json::json;
    use std::rc::Rc;

    struct Drawer;
    impl ModalComponent for Drawer {}

    #[test]
    fn dropping_definition_unregisters() {
        let ctx = ModalContext::new(ModalConfig::default());
        let definition = ctx.define("drawer", Rc::new(Drawer), None).unwrap();
        assert!(ctx.is_registered(definition.modal_id()));

        drop(definition);
        assert!(!ctx.is_registered(&"drawer".into()));
    }

    #[test]
    fn props_can_be_replaced() {
        let ctx = ModalContext::new(ModalConfig::default());
        let definition = ctx.define("drawer", Rc::new(Drawer), None).unwrap();

        let mut props = crate::ModalData::new();
        props.insert("side".into(), json!("left"));
        definition.set_props(Some(props.clone())).unwrap();

        let registered = ctx.registry().borrow().get(definition.modal_id()).and_then(|e| e.props.clone());
        assert_eq!(registered, Some(props));
    }

    #[test]
    fn empty_id_is_rejected() {
        let ctx = ModalContext::new(ModalConfig::default());
        assert!(matches!(
            ctx.define("", Rc::new(Drawer), None),
            Err(ModalError::MissingIdentifier)
        ));
    }
}
