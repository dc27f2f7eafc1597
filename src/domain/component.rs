//! Component references and open/close targets.
//!
//! Rendering is owned by the host UI layer; the core only needs a stable
//! identity for each component so it can register it and cache a generated id
//! for it. Components are shared as [`ComponentRef`] (`Rc<dyn ModalComponent>`)
//! and compared by pointer identity.

use super::modal::ModalId;
use std::fmt;
use std::rc::Rc;

/// A dialog component the host UI knows how to render.
///
/// The trait carries no rendering contract; hosts downcast or wrap their own
/// widget types. `name` is used in diagnostics only.
pub trait ModalComponent {
    /// Human-readable component name for logs.
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// Shared handle to a component. Identity is the `Rc` allocation.
pub type ComponentRef = Rc<dyn ModalComponent>;

/// Returns an address usable as a map key for a component's identity.
#[must_use]
pub fn component_key(component: &ComponentRef) -> usize {
    Rc::as_ptr(component).cast::<()>() as usize
}

/// Either an explicit identifier or a component reference.
///
/// Operations accepting a target resolve it to a [`ModalId`] through the
/// registry, auto-assigning an id to components seen for the first time.
#[derive(Clone)]
pub enum ModalTarget {
    /// An explicit identifier.
    Id(ModalId),
    /// A component reference, resolved through the identity side map.
    Component(ComponentRef),
}

impl fmt::Debug for ModalTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => f.debug_tuple("Id").field(id).finish(),
            Self::Component(component) => f.debug_tuple("Component").field(&component.name()).finish(),
        }
    }
}

impl From<ModalId> for ModalTarget {
    fn from(id: ModalId) -> Self {
        Self::Id(id)
    }
}

impl From<&ModalId> for ModalTarget {
    fn from(id: &ModalId) -> Self {
        Self::Id(id.clone())
    }
}

impl From<&str> for ModalTarget {
    fn from(id: &str) -> Self {
        Self::Id(ModalId::from(id))
    }
}

impl From<String> for ModalTarget {
    fn from(id: String) -> Self {
        Self::Id(ModalId::from(id))
    }
}

impl From<ComponentRef> for ModalTarget {
    fn from(component: ComponentRef) -> Self {
        Self::Component(component)
    }
}

impl From<&ComponentRef> for ModalTarget {
    fn from(component: &ComponentRef) -> Self {
        Self::Component(Rc::clone(component))
    }
}
