//! Render list computed from the store for the host view layer.
//!
//! Every store entry stays in the view tree until it is removed: visible,
//! waiting for mount (`delay_open`), playing its exit transition, or kept
//! mounted after close. The host renders one component per [`RenderEntry`]
//! and mounts a [`ModalBinding`](super::ModalBinding) for it.
//!
//! # Example
//!
//! ```rust
//! use modalkit::{ModalComponent, ModalConfig, ModalContext, OpenConfig};
//! use std::rc::Rc;
//!
//! struct Confirm;
//! impl ModalComponent for Confirm {}
//!
//! let ctx = ModalContext::new(ModalConfig::default());
//! ctx.register("confirm", Rc::new(Confirm), None)?;
//! ctx.open("confirm", OpenConfig::new())?;
//!
//! let list = ctx.render_list()?;
//! assert_eq!(list.len(), 1);
//! assert!(list[0].state.delay_open);
//! # Ok::<(), modalkit::ModalError>(())
//! ```

use super::binding::BindingState;
use crate::domain::error::Result;
use crate::domain::{ComponentRef, ModalData, ModalId, ModalState};
use crate::lifecycle::ModalContext;
use std::fmt;

/// One component the host should keep in its view tree.
#[derive(Clone)]
pub struct RenderEntry {
    pub modal_id: ModalId,
    /// Registered component to render.
    pub component: ComponentRef,
    /// Static props from registration.
    pub props: Option<ModalData>,
    /// Full store record, including `delay_open`.
    pub state: ModalState,
}

impl RenderEntry {
    /// The subset of state a mounted binding exposes.
    #[must_use]
    pub fn binding_state(&self) -> BindingState {
        BindingState::from(&self.state)
    }
}

impl fmt::Debug for RenderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderEntry")
            .field("modal_id", &self.modal_id)
            .field("component", &self.component.name())
            .field("props", &self.props)
            .field("state", &self.state)
            .finish()
    }
}

impl ModalContext {
    /// Entries to render, ordered by id.
    ///
    /// Ids without a registered component render nothing and are reported
    /// with a warning, since the declaration may simply not exist yet.
    ///
    /// # Errors
    ///
    /// Propagates backend read errors.
    pub fn render_list(&self) -> Result<Vec<RenderEntry>> {
        let snapshot = self.snapshot()?;
        let registry = self.registry().borrow();

        let entries = snapshot
            .iter()
            .filter_map(|(id, state)| {
                let Some(registered) = registry.get(id) else {
                    tracing::warn!(modal_id = %id, "no registered component for modal, skipping render");
                    return None;
                };
                Some(RenderEntry {
                    modal_id: id.clone(),
                    component: registered.component.clone(),
                    props: registered.props.clone(),
                    state: state.clone(),
                })
            })
            .collect();
        Ok(entries)
    }
}
