//! Handle returned by [`ModalContext::open`](super::ModalContext::open).

use super::coordinator::WeakContext;
use super::deferred::LifecyclePromise;
use super::ledger::ArmedPromises;
use crate::domain::error::Result;
use crate::domain::{LifecycleState, ModalData, ModalFlags, ModalId, ModalResult, INTERNAL_CONFIG_KEY};
use std::fmt;

/// Control and observation surface for one open of a modal.
///
/// The promises are captured at open time. Reopening the same id while this
/// open is still pending hands out the same `result` and `closed` promises;
/// reopening after the close finished gives the new ref fresh ones.
#[derive(Clone)]
pub struct ModalRef {
    modal_id: ModalId,
    data: ModalData,
    context: WeakContext,
    promises: ArmedPromises,
}

impl ModalRef {
    pub(crate) fn new(modal_id: ModalId, data: ModalData, context: WeakContext, promises: ArmedPromises) -> Self {
        Self {
            modal_id,
            data,
            context,
            promises,
        }
    }

    #[must_use]
    pub fn modal_id(&self) -> &ModalId {
        &self.modal_id
    }

    /// Data as passed to `open`, merged with later [`ModalRef::update_data`]
    /// calls made through this ref.
    #[must_use]
    pub fn data(&self) -> &ModalData {
        &self.data
    }

    /// Current `disable_close` option read from the store. `false` once the
    /// entry is gone.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::ContextDropped`](crate::ModalError::ContextDropped)
    /// or propagates backend read errors.
    pub fn disable_close(&self) -> Result<bool> {
        let ctx = self.context.upgrade()?;
        Ok(ctx
            .modal_state(&self.modal_id)?
            .is_some_and(|state| state.options().disable_close))
    }

    /// Toggles `disable_close` on the live entry.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::ContextDropped`](crate::ModalError::ContextDropped)
    /// or propagates backend dispatch errors.
    pub fn set_disable_close(&self, disable_close: bool) -> Result<()> {
        let ctx = self.context.upgrade()?;
        ctx.set_flags(
            &self.modal_id,
            ModalFlags {
                disable_close: Some(disable_close),
                ..ModalFlags::default()
            },
        )
    }

    /// Requests a close with `result`.
    ///
    /// Settles `before_closed` and the main promise with `result` and starts
    /// the exit; `closed` settles with the same value once the exit
    /// transition ends. Calling this on a modal that is not open has no
    /// effect. Returns this ref's `closed` promise.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::ContextDropped`](crate::ModalError::ContextDropped)
    /// or propagates backend dispatch errors.
    pub fn close(&self, result: ModalResult) -> Result<LifecyclePromise> {
        let ctx = self.context.upgrade()?;
        ctx.close_with_result(&self.modal_id, result)?;
        Ok(self.after_closed())
    }

    /// Settles when the enter transition finishes.
    pub fn after_opened(&self) -> LifecyclePromise {
        self.promises.opened.clone()
    }

    /// Settles when the exit transition finishes, with the close result.
    pub fn after_closed(&self) -> LifecyclePromise {
        self.promises.closed.clone()
    }

    /// Settles as soon as a close is requested.
    pub fn before_closed(&self) -> LifecyclePromise {
        self.promises.before_closed.clone()
    }

    /// The open-call promise: settles with the close result, or `None` when
    /// the modal is closed without one or removed.
    pub fn result(&self) -> LifecyclePromise {
        self.promises.result.clone()
    }

    /// Merges `partial` into the modal's data and re-renders it.
    ///
    /// Only applies while the modal is open.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::ContextDropped`](crate::ModalError::ContextDropped)
    /// or propagates backend errors.
    pub fn update_data(&mut self, partial: ModalData) -> Result<()> {
        let ctx = self.context.upgrade()?;
        self.data.extend(
            partial
                .iter()
                .filter(|(key, _)| key.as_str() != INTERNAL_CONFIG_KEY)
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        ctx.update_data(&self.modal_id, partial)
    }

    /// Lifecycle tag for this modal; `None` once purged or removed.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::ContextDropped`](crate::ModalError::ContextDropped).
    pub fn state(&self) -> Result<Option<LifecycleState>> {
        Ok(self.context.upgrade()?.lifecycle_state(&self.modal_id))
    }
}

impl fmt::Debug for ModalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalRef")
            .field("modal_id", &self.modal_id)
            .field("data", &self.data)
            .field("promises", &self.promises)
            .finish_non_exhaustive()
    }
}
