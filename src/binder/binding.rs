//! Per-modal bindings handed to the rendering layer.

use crate::domain::error::{ModalError, Result};
use crate::domain::{LifecycleState, ModalData, ModalFlags, ModalId, ModalResult, ModalState, ModalTarget};
use crate::lifecycle::coordinator::WeakContext;
use crate::lifecycle::{LifecyclePromise, ModalContext, OpenConfig};
use crate::store::ModalAction;
use std::fmt;

/// Which transition an animation-end signal refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPhase {
    /// The enter transition finished.
    Enter,
    /// The exit transition finished.
    Exit,
}

/// State a mounted component renders from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingState {
    /// Caller data without the internal options key.
    pub data: ModalData,
    pub is_open: bool,
    pub keep_mounted: bool,
    pub disable_close: bool,
}

impl From<&ModalState> for BindingState {
    fn from(state: &ModalState) -> Self {
        let options = state.options();
        Self {
            data: state.user_data(),
            is_open: state.is_open,
            keep_mounted: state.keep_mounted,
            disable_close: options.disable_close,
        }
    }
}

/// A mounted modal component's view of its own lifecycle.
///
/// Created by [`ModalContext::mount`]. While any binding for the id exists
/// the id counts as mounted, so `show` makes the modal visible right away instead of deferring
/// it. Dropping the binding unmounts it; every accessor then returns
/// [`ModalError::Unbound`].
pub struct ModalBinding {
    modal_id: ModalId,
    context: WeakContext,
    mounted: bool,
}

impl ModalContext {
    /// Mounts the component for `target` and returns its binding.
    ///
    /// An entry opened before this mount (`delay_open`) is re-shown now that
    /// a component exists. If the modal was closed in the meantime the delay
    /// flag is just cleared so the exit signal can finish the close.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::MissingIdentifier`] for an empty id and
    /// propagates backend errors.
    pub fn mount(&self, target: impl Into<ModalTarget>) -> Result<ModalBinding> {
        let target = target.into();
        let id = self.registry().borrow_mut().resolve_and_register(&target, None)?;
        let _span = tracing::debug_span!("mount_modal", modal_id = %id).entered();

        if !self.acquire_mount(&id) {
            tracing::debug!("modal already mounted by another binding");
        }
        let binding = ModalBinding {
            modal_id: id,
            context: self.downgrade(),
            mounted: true,
        };
        binding.observe_delayed_open(self)?;
        Ok(binding)
    }
}

impl ModalBinding {
    #[must_use]
    pub fn modal_id(&self) -> &ModalId {
        &self.modal_id
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Current render state. An id with no store entry reads as closed with
    /// empty data.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::Unbound`] after unmount,
    /// [`ModalError::ContextDropped`], or backend read errors.
    pub fn state(&self) -> Result<BindingState> {
        let ctx = self.context()?;
        Ok(ctx
            .modal_state(&self.modal_id)?
            .as_ref()
            .map(BindingState::from)
            .unwrap_or_default())
    }

    /// Opens this modal with `data` and returns its `after_closed` promise.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::Unbound`] after unmount,
    /// [`ModalError::ContextDropped`], or backend errors.
    pub fn open(&self, data: Option<ModalData>) -> Result<LifecyclePromise> {
        let ctx = self.context()?;
        let config = OpenConfig {
            data,
            ..OpenConfig::default()
        };
        Ok(ctx.open(self.modal_id.clone(), config)?.after_closed())
    }

    /// Closes this modal with `result`. No effect unless it is open.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::Unbound`] after unmount,
    /// [`ModalError::ContextDropped`], or backend errors.
    pub fn close(&self, result: ModalResult) -> Result<LifecyclePromise> {
        self.context()?.close_with_result(&self.modal_id, result)
    }

    /// Closes without a result (outside click, escape).
    ///
    /// # Errors
    ///
    /// Same as [`ModalBinding::close`].
    pub fn dismiss(&self) -> Result<LifecyclePromise> {
        self.close(None)
    }

    /// Removes this modal from the store, settling its pending promises.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::Unbound`] after unmount,
    /// [`ModalError::ContextDropped`], or backend errors.
    pub fn remove(&self) -> Result<()> {
        self.context()?.remove_modal(&self.modal_id)
    }

    /// Animation-end callback with the phase inferred from visibility.
    ///
    /// Visible means the enter transition ended; hidden means the exit
    /// transition ended, which also removes the modal unless it keeps its
    /// mount.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::Unbound`] after unmount,
    /// [`ModalError::ContextDropped`], or backend errors.
    pub fn on_animation_end(&self) -> Result<()> {
        let ctx = self.context()?;
        let state = ctx.modal_state(&self.modal_id)?;
        let phase = if state.as_ref().is_some_and(|s| s.is_open) {
            AnimationPhase::Enter
        } else {
            AnimationPhase::Exit
        };
        self.finish_phase(&ctx, phase, state.as_ref())
    }

    /// Animation-end callback for a known phase.
    ///
    /// A phase contradicting the current visibility (an enter ending after
    /// the modal was already hidden, or the reverse) is stale and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::Unbound`] after unmount,
    /// [`ModalError::ContextDropped`], or backend errors.
    pub fn on_phase_end(&self, phase: AnimationPhase) -> Result<()> {
        let ctx = self.context()?;
        let state = ctx.modal_state(&self.modal_id)?;
        let visible = state.as_ref().is_some_and(|s| s.is_open);

        if visible != (phase == AnimationPhase::Enter) {
            tracing::warn!(modal_id = %self.modal_id, ?phase, visible, "stale animation phase ignored");
            return Ok(());
        }
        self.finish_phase(&ctx, phase, state.as_ref())
    }

    /// Unmounts the component. Idempotent.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        if let Ok(ctx) = self.context.upgrade() {
            if ctx.release_mount(&self.modal_id) {
                tracing::debug!(modal_id = %self.modal_id, "modal unmounted");
            } else {
                tracing::debug!(modal_id = %self.modal_id, "binding dropped, modal still mounted");
            }
        }
    }

    fn context(&self) -> Result<ModalContext> {
        if !self.mounted {
            return Err(ModalError::Unbound(self.modal_id.clone()));
        }
        self.context.upgrade()
    }

    fn observe_delayed_open(&self, ctx: &ModalContext) -> Result<()> {
        let Some(entry) = ctx.modal_state(&self.modal_id)? else {
            return Ok(());
        };
        if !entry.delay_open {
            return Ok(());
        }

        if ctx.lifecycle_state(&self.modal_id) == Some(LifecycleState::Open) {
            tracing::debug!("showing modal opened before mount");
            ctx.dispatch(&ModalAction::show(self.modal_id.clone(), entry.data))
        } else {
            tracing::debug!("modal closed before mount, clearing delayed open");
            ctx.set_flags(
                &self.modal_id,
                ModalFlags {
                    delay_open: Some(false),
                    ..ModalFlags::default()
                },
            )
        }
    }

    fn finish_phase(&self, ctx: &ModalContext, phase: AnimationPhase, state: Option<&ModalState>) -> Result<()> {
        match phase {
            AnimationPhase::Enter => {
                ctx.notify_opened(&self.modal_id);
                Ok(())
            }
            AnimationPhase::Exit => {
                ctx.notify_closed(&self.modal_id);
                if state.is_some_and(|s| s.keep_mounted) {
                    return Ok(());
                }
                ctx.remove_modal(&self.modal_id)
            }
        }
    }
}

impl Drop for ModalBinding {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl fmt::Debug for ModalBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalBinding")
            .field("modal_id", &self.modal_id)
            .field("mounted", &self.mounted)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModalConfig;
    use serde_json::json;

    #[test]
    fn open_before_mount_is_deferred_until_mount() {
        let ctx = ModalContext::new(ModalConfig::default());
        ctx.open("m1", OpenConfig::new()).unwrap();

        let state = ctx.modal_state(&"m1".into()).unwrap().unwrap();
        assert!(!state.is_open);
        assert!(state.delay_open);

        let binding = ctx.mount("m1").unwrap();
        let state = binding.state().unwrap();
        assert!(state.is_open);
        assert!(!ctx.modal_state(&"m1".into()).unwrap().unwrap().delay_open);
    }

    #[test]
    fn close_before_mount_completes_after_exit_signal() {
        let ctx = ModalContext::new(ModalConfig::default());
        let modal = ctx.open("m1", OpenConfig::new()).unwrap();
        let closed = ctx.close("m1").unwrap();

        let binding = ctx.mount("m1").unwrap();
        assert!(!binding.state().unwrap().is_open);
        assert!(!ctx.modal_state(&"m1".into()).unwrap().unwrap().delay_open);

        binding.on_animation_end().unwrap();
        assert_eq!(closed.peek(), Some(None));
        assert_eq!(modal.after_closed().peek(), Some(None));
        assert!(ctx.modal_state(&"m1".into()).unwrap().is_none());
    }

    #[test]
    fn animation_end_follows_visibility() {
        let ctx = ModalContext::new(ModalConfig::default());
        let binding = ctx.mount("m1").unwrap();
        let modal = ctx.open("m1", OpenConfig::new()).unwrap();

        binding.on_animation_end().unwrap();
        assert!(modal.after_opened().is_settled());

        binding.close(Some(json!("ok"))).unwrap();
        binding.on_animation_end().unwrap();
        assert_eq!(modal.after_closed().peek(), Some(Some(json!("ok"))));
        assert_eq!(modal.state().unwrap(), Some(LifecycleState::Closed));
    }

    #[test]
    fn stale_phase_is_ignored() {
        let ctx = ModalContext::new(ModalConfig::default());
        let binding = ctx.mount("m1").unwrap();
        let modal = ctx.open("m1", OpenConfig::new()).unwrap();

        binding.on_phase_end(AnimationPhase::Exit).unwrap();
        assert!(!modal.after_closed().is_settled());
        assert_eq!(modal.state().unwrap(), Some(LifecycleState::Open));
    }

    #[test]
    fn keep_mounted_survives_exit() {
        let ctx = ModalContext::new(ModalConfig::default());
        let binding = ctx.mount("m1").unwrap();
        ctx.open("m1", OpenConfig::new().keep_mounted(true)).unwrap();

        binding.dismiss().unwrap();
        binding.on_phase_end(AnimationPhase::Exit).unwrap();

        let state = binding.state().unwrap();
        assert!(!state.is_open);
        assert!(state.keep_mounted);
    }

    #[test]
    fn unmounted_binding_reports_unbound() {
        let ctx = ModalContext::new(ModalConfig::default());
        let mut binding = ctx.mount("m1").unwrap();
        binding.unmount();

        assert!(matches!(binding.state(), Err(ModalError::Unbound(_))));
        assert!(!ctx.mounted().borrow().contains(&"m1".into()));
    }

    #[test]
    fn dropping_binding_unmounts() {
        let ctx = ModalContext::new(ModalConfig::default());
        drop(ctx.mount("m1").unwrap());
        ctx.open("m1", OpenConfig::new()).unwrap();
        assert!(ctx.modal_state(&"m1".into()).unwrap().unwrap().delay_open);
    }

    #[test]
    fn remount_outlives_the_replaced_binding() {
        let ctx = ModalContext::new(ModalConfig::default());
        let old = ctx.mount("m1").unwrap();
        let live = ctx.mount("m1").unwrap();
        drop(old);

        ctx.open("m1", OpenConfig::new()).unwrap();
        let state = live.state().unwrap();
        assert!(state.is_open);
        assert!(!ctx.modal_state(&"m1".into()).unwrap().unwrap().delay_open);

        drop(live);
        assert!(!ctx.mounted().borrow().contains(&"m1".into()));
    }

    #[test]
    fn exit_signal_for_unopened_modal_is_ignored() {
        let ctx = ModalContext::new(ModalConfig::default());
        let binding = ctx.mount("ghost").unwrap();

        binding.on_animation_end().unwrap();
        assert_eq!(ctx.lifecycle_state(&"ghost".into()), None);
        assert!(ctx.next_purge_deadline().is_none());
    }
}
