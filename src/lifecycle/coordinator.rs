//! Lifecycle coordinator: the orchestration surface over registry, store,
//! and callback ledger.
//!
//! [`ModalContext`] owns every piece of per-application modal state. It is a
//! cheap-clone handle; handles derived from it ([`ModalRef`], bindings,
//! definitions) keep only a weak reference and report
//! [`ModalError::ContextDropped`] once the context is gone.
//!
//! The view-facing constructors live next to the types they return, in
//! `crate::binder`:
//!
//! - [`ModalContext::mount`] in `binder/binding.rs`
//! - [`ModalContext::define`] in `binder/definition.rs`
//! - [`ModalContext::render_list`] in `binder/render.rs`
//!
//! # State machine
//!
//! ```text
//! (unopened) --open--> open --close/close_all--> closing --exit signal--> closed --purge--> (gone)
//!                       ^                                                   |
//!                       +------------------------- open --------------------+
//! remove: any state --> (gone), except that a `closed` tag waits for its purge
//! ```
//!
//! All operations run synchronously on the caller's thread. The only
//! asynchrony is the settlement of [`LifecyclePromise`]s, which happens when
//! the host reports transition ends or when a close/remove call resolves them.
//!
//! # Example
//!
//! ```rust
//! use modalkit::{ModalConfig, ModalContext, OpenConfig};
//! use serde_json::json;
//!
//! let ctx = ModalContext::new(ModalConfig::default());
//! let _binding = ctx.mount("confirm")?;
//!
//! let modal = ctx.open("confirm", OpenConfig::new().with_data_entry("x", json!(1)))?;
//! let closed = modal.close(Some(json!("yes")))?;
//!
//! ctx.notify_closed(modal.modal_id());
//! assert_eq!(closed.peek(), Some(Some(json!("yes"))));
//! # Ok::<(), modalkit::ModalError>(())
//! ```

use super::deferred::LifecyclePromise;
use super::ledger::CallbackLedger;
use super::modal_ref::ModalRef;
use super::purge::PurgeSchedule;
use crate::domain::error::{ModalError, Result};
use crate::domain::{
    ComponentRef, LifecycleState, ModalData, ModalFlags, ModalId, ModalOptions, ModalResult,
    ModalState, ModalTarget, INTERNAL_CONFIG_KEY,
};
use crate::registry::Registry;
use crate::store::{LocalStore, ModalAction, ModalStore, MountedSet, StateBackend};
use crate::ModalConfig;
use futures::future::{join_all, FutureExt};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};
use std::time::Instant;

/// Options for [`ModalContext::open`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenConfig {
    /// Caller data exposed to the rendered component.
    pub data: Option<ModalData>,
    /// Keep the component in the view tree after close. Falls back to
    /// [`ModalConfig::default_keep_mounted`].
    pub keep_mounted: Option<bool>,
    /// Identifier to use instead of resolving or generating one.
    pub modal_id: Option<ModalId>,
    /// Ignore outside clicks and escape. Falls back to
    /// [`ModalConfig::default_disable_close`].
    pub disable_close: Option<bool>,
}

impl OpenConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_data(mut self, data: ModalData) -> Self {
        self.data = Some(data);
        self
    }

    /// Adds a single key to the data payload.
    #[must_use]
    pub fn with_data_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.get_or_insert_with(ModalData::new).insert(key.into(), value);
        self
    }

    #[must_use]
    pub const fn keep_mounted(mut self, keep_mounted: bool) -> Self {
        self.keep_mounted = Some(keep_mounted);
        self
    }

    #[must_use]
    pub fn modal_id(mut self, modal_id: impl Into<ModalId>) -> Self {
        self.modal_id = Some(modal_id.into());
        self
    }

    #[must_use]
    pub const fn disable_close(mut self, disable_close: bool) -> Self {
        self.disable_close = Some(disable_close);
        self
    }
}

pub(crate) struct ContextInner {
    config: ModalConfig,
    backend: Box<dyn StateBackend>,
    registry: RefCell<Registry>,
    mounted: RefCell<MountedSet>,
    /// Live bindings per mounted id.
    mount_counts: RefCell<HashMap<ModalId, usize>>,
    ledger: RefCell<CallbackLedger>,
    lifecycle: RefCell<HashMap<ModalId, LifecycleState>>,
    purges: RefCell<PurgeSchedule>,
}

/// Owner of all modal state for one application or session.
#[derive(Clone)]
pub struct ModalContext {
    inner: Rc<ContextInner>,
}

/// Weak handle held by refs, bindings, and definitions.
#[derive(Clone)]
pub(crate) struct WeakContext(Weak<ContextInner>);

impl WeakContext {
    pub(crate) fn upgrade(&self) -> Result<ModalContext> {
        self.0
            .upgrade()
            .map(|inner| ModalContext { inner })
            .ok_or(ModalError::ContextDropped)
    }
}

impl ModalContext {
    /// Creates a context that keeps state in a [`LocalStore`].
    #[must_use]
    pub fn new(config: ModalConfig) -> Self {
        Self::with_backend(config, LocalStore::new())
    }

    /// Creates a context dispatching to `backend`, e.g. an
    /// [`ExternalStore`](crate::store::ExternalStore).
    #[must_use]
    pub fn with_backend(config: ModalConfig, backend: impl StateBackend + 'static) -> Self {
        tracing::debug!(id_prefix = %config.id_prefix, "creating modal context");
        let registry = Registry::new(config.id_prefix.clone());
        Self {
            inner: Rc::new(ContextInner {
                config,
                backend: Box::new(backend),
                registry: RefCell::new(registry),
                mounted: RefCell::new(MountedSet::new()),
                mount_counts: RefCell::new(HashMap::new()),
                ledger: RefCell::new(CallbackLedger::new()),
                lifecycle: RefCell::new(HashMap::new()),
                purges: RefCell::new(PurgeSchedule::new()),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ModalConfig {
        &self.inner.config
    }

    pub(crate) fn downgrade(&self) -> WeakContext {
        WeakContext(Rc::downgrade(&self.inner))
    }

    // ------------------------------------------------------------------
    // Registry
    // ------------------------------------------------------------------

    /// Registers `component` under `id` with optional static props.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::MissingIdentifier`] for an empty id.
    pub fn register(&self, id: impl Into<ModalId>, component: ComponentRef, props: Option<ModalData>) -> Result<()> {
        let id = id.into();
        if id.is_empty() {
            return Err(ModalError::MissingIdentifier);
        }
        self.inner.registry.borrow_mut().register(id, component, props);
        Ok(())
    }

    /// Removes the registry entry for `id`. Unknown ids are ignored.
    pub fn unregister(&self, id: &ModalId) {
        self.inner.registry.borrow_mut().unregister(id);
    }

    #[must_use]
    pub fn is_registered(&self, id: &ModalId) -> bool {
        self.inner.registry.borrow().is_registered(id)
    }

    /// Resolves a target to its id, generating and caching one for
    /// components seen for the first time.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::MissingIdentifier`] for an empty id.
    pub fn resolve_id(&self, target: impl Into<ModalTarget>) -> Result<ModalId> {
        self.inner.registry.borrow_mut().resolve(&target.into())
    }

    /// Restarts identifier generation. Intended for deterministic tests and
    /// snapshot output.
    pub fn reset_ids(&self) {
        self.inner.registry.borrow_mut().reset_ids();
    }

    pub(crate) fn registry(&self) -> &RefCell<Registry> {
        &self.inner.registry
    }

    // ------------------------------------------------------------------
    // Store
    // ------------------------------------------------------------------

    /// Current store snapshot. Compare snapshots with `Rc::ptr_eq` to detect
    /// changes.
    ///
    /// # Errors
    ///
    /// Propagates backend read errors.
    pub fn snapshot(&self) -> Result<Rc<ModalStore>> {
        self.inner.backend.snapshot()
    }

    /// Store entry for `id`, if any.
    ///
    /// # Errors
    ///
    /// Propagates backend read errors.
    pub fn modal_state(&self, id: &ModalId) -> Result<Option<ModalState>> {
        Ok(self.snapshot()?.get(id).cloned())
    }

    pub(crate) fn dispatch(&self, action: &ModalAction) -> Result<()> {
        let mounted = self.inner.mounted.borrow().clone();
        self.inner.backend.dispatch(action, &mounted)
    }

    pub(crate) fn mounted(&self) -> &RefCell<MountedSet> {
        &self.inner.mounted
    }

    /// Counts one more binding for `id`. Returns `true` for the first one.
    pub(crate) fn acquire_mount(&self, id: &ModalId) -> bool {
        let mut counts = self.inner.mount_counts.borrow_mut();
        let count = counts.entry(id.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            self.inner.mounted.borrow_mut().insert(id.clone());
            true
        } else {
            false
        }
    }

    /// Drops one binding for `id`. The id leaves the mounted set with the
    /// last one, and `true` is returned.
    pub(crate) fn release_mount(&self, id: &ModalId) -> bool {
        let mut counts = self.inner.mount_counts.borrow_mut();
        let Some(count) = counts.get_mut(id) else {
            return false;
        };
        *count -= 1;
        if *count > 0 {
            return false;
        }
        counts.remove(id);
        self.inner.mounted.borrow_mut().remove(id);
        true
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Opens a modal and returns a handle to its lifecycle.
    ///
    /// Components that were never registered are registered under their
    /// resolved (or explicit) id. The effective `disable_close` and
    /// `keep_mounted` are attached to the data under
    /// [`INTERNAL_CONFIG_KEY`].
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::MissingIdentifier`] for an empty id and
    /// propagates backend dispatch errors.
    pub fn open(&self, target: impl Into<ModalTarget>, config: OpenConfig) -> Result<ModalRef> {
        let target = target.into();
        let _span = tracing::debug_span!("open_modal", target = ?target).entered();

        let id = self
            .inner
            .registry
            .borrow_mut()
            .resolve_and_register(&target, config.modal_id.as_ref())?;

        if !self.is_registered(&id) {
            tracing::warn!(modal_id = %id, "opening modal with no registered component");
        }

        let options = ModalOptions {
            disable_close: config
                .disable_close
                .unwrap_or(self.inner.config.default_disable_close),
            keep_mounted: config
                .keep_mounted
                .unwrap_or(self.inner.config.default_keep_mounted),
        };
        let user_data = config.data.unwrap_or_default();
        let mut payload = user_data.clone();
        options.write_into(&mut payload);

        self.dispatch(&ModalAction::show(id.clone(), payload))?;

        self.inner.lifecycle.borrow_mut().insert(id.clone(), LifecycleState::Open);
        if self.inner.purges.borrow_mut().cancel(&id) {
            tracing::debug!(modal_id = %id, "reopened before purge, purge cancelled");
        }
        let promises = self.inner.ledger.borrow_mut().arm(&id);

        tracing::debug!(
            modal_id = %id,
            disable_close = options.disable_close,
            keep_mounted = options.keep_mounted,
            "modal opened"
        );
        Ok(ModalRef::new(id, user_data, self.downgrade(), promises))
    }

    /// Closes a modal by target: hides it and returns its `closed` promise.
    ///
    /// Used for closes that do not originate from a [`ModalRef`] (outside
    /// clicks, host commands). The main open-promise settles with `None`.
    /// Unknown targets yield an already-settled `None` promise.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::MissingIdentifier`] for an empty id and
    /// propagates backend errors.
    pub fn close(&self, target: impl Into<ModalTarget>) -> Result<LifecyclePromise> {
        let Some(id) = self.lookup(&target.into())? else {
            return Ok(LifecyclePromise::resolved(None));
        };
        self.close_modal(&id)
    }

    /// Closes every modal that is open or closing.
    ///
    /// The returned future completes once every collected `closed` promise
    /// has settled; individual exits finish in any order.
    ///
    /// # Errors
    ///
    /// Propagates backend dispatch errors.
    pub fn close_all(&self) -> Result<impl Future<Output = ()> + 'static> {
        let _span = tracing::debug_span!("close_all_modals").entered();

        let mut active: Vec<ModalId> = self
            .inner
            .lifecycle
            .borrow()
            .iter()
            .filter(|(_, state)| state.is_active())
            .map(|(id, _)| id.clone())
            .collect();
        active.sort();

        let mut pending = Vec::with_capacity(active.len());
        for id in &active {
            {
                let mut ledger = self.inner.ledger.borrow_mut();
                ledger.resolve_before_closed(id, None);
                ledger.resolve_main(id, None);
            }
            pending.push(self.close_modal(id)?);
        }

        tracing::debug!(count = active.len(), "closing all modals");
        Ok(join_all(pending).map(|_| ()))
    }

    /// Removes a modal from the store and settles all its pending promises
    /// with `None`.
    ///
    /// A `closed` lifecycle tag is left for its scheduled purge so trailing
    /// `get_state()` calls still observe it; any other tag is dropped now.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::MissingIdentifier`] for an empty id and
    /// propagates backend dispatch errors.
    pub fn remove(&self, target: impl Into<ModalTarget>) -> Result<()> {
        let Some(id) = self.lookup(&target.into())? else {
            return Ok(());
        };
        self.remove_modal(&id)
    }

    /// Ids whose lifecycle state is `open`, sorted.
    #[must_use]
    pub fn get_open(&self) -> Vec<ModalId> {
        let mut open: Vec<ModalId> = self
            .inner
            .lifecycle
            .borrow()
            .iter()
            .filter(|(_, state)| **state == LifecycleState::Open)
            .map(|(id, _)| id.clone())
            .collect();
        open.sort();
        open
    }

    #[must_use]
    pub fn has_open(&self) -> bool {
        self.inner
            .lifecycle
            .borrow()
            .values()
            .any(|state| *state == LifecycleState::Open)
    }

    /// Lifecycle tag for `id`; `None` when unopened or purged.
    #[must_use]
    pub fn lifecycle_state(&self, id: &ModalId) -> Option<LifecycleState> {
        self.inner.lifecycle.borrow().get(id).copied()
    }

    /// Reports that the enter transition for `id` finished.
    pub fn notify_opened(&self, id: &ModalId) {
        if self.inner.ledger.borrow_mut().resolve_opened(id) {
            tracing::debug!(modal_id = %id, "modal enter finished");
        }
    }

    /// Reports that the exit transition for `id` finished: settles `closed`
    /// with the carried close result and marks the modal closed.
    ///
    /// Only an `open` or `closing` modal becomes `closed`; exit signals for
    /// unopened or already closed ids leave the lifecycle tag alone.
    pub fn notify_closed(&self, id: &ModalId) {
        if self.inner.ledger.borrow_mut().resolve_closed(id) {
            tracing::debug!(modal_id = %id, "modal exit finished");
        }
        if self.lifecycle_state(id).is_some_and(LifecycleState::is_active) {
            self.mark_closed(id);
        } else {
            tracing::debug!(modal_id = %id, "exit signal for inactive modal, lifecycle unchanged");
        }
    }

    /// Tags `id` as closed and schedules its purge.
    pub fn mark_closed(&self, id: &ModalId) {
        self.inner
            .lifecycle
            .borrow_mut()
            .insert(id.clone(), LifecycleState::Closed);
        self.inner.purges.borrow_mut().schedule(id.clone(), Instant::now());
    }

    /// Purges closed-modal bookkeeping whose delay has elapsed. Returns the
    /// number of ids purged.
    pub fn run_due_purges(&self, now: Instant) -> usize {
        let due = self.inner.purges.borrow_mut().take_due(now);
        for id in &due {
            {
                let mut lifecycle = self.inner.lifecycle.borrow_mut();
                if lifecycle.get(id) == Some(&LifecycleState::Closed) {
                    lifecycle.remove(id);
                }
            }
            self.inner.ledger.borrow_mut().purge_closed(id);
            tracing::debug!(modal_id = %id, "closed modal purged");
        }
        due.len()
    }

    /// Deadline of the next scheduled purge, for arming a host timer.
    #[must_use]
    pub fn next_purge_deadline(&self) -> Option<Instant> {
        self.inner.purges.borrow().next_deadline()
    }

    // ------------------------------------------------------------------
    // Operations shared with refs and bindings
    // ------------------------------------------------------------------

    /// Close requested with a result (`ModalRef::close`, binding `close`).
    pub(crate) fn close_with_result(&self, id: &ModalId, result: ModalResult) -> Result<LifecyclePromise> {
        let _span = tracing::debug_span!("close_with_result", modal_id = %id).entered();

        match self.lifecycle_state(id) {
            None | Some(LifecycleState::Closed) => {
                tracing::debug!("modal not open, close ignored");
                return Ok(self.settled_closed(id));
            }
            Some(LifecycleState::Open | LifecycleState::Closing) => {}
        }

        self.inner
            .lifecycle
            .borrow_mut()
            .insert(id.clone(), LifecycleState::Closing);
        {
            // The first close owns the result; `closed` must settle with the
            // value `before_closed` already saw.
            let mut ledger = self.inner.ledger.borrow_mut();
            if ledger.resolve_before_closed(id, result.clone()) {
                ledger.set_close_result(id, result.clone());
            } else {
                tracing::debug!("close already requested, keeping first result");
            }
            ledger.resolve_main(id, result);
        }
        self.close_modal(id)
    }

    pub(crate) fn close_modal(&self, id: &ModalId) -> Result<LifecyclePromise> {
        let _span = tracing::debug_span!("close_modal", modal_id = %id).entered();

        let state = self.lifecycle_state(id);
        if state == Some(LifecycleState::Closed) {
            return Ok(self.settled_closed(id));
        }
        if state.is_none() && !self.snapshot()?.contains(id) {
            tracing::debug!("unknown modal, close ignored");
            return Ok(LifecyclePromise::resolved(None));
        }

        self.dispatch(&ModalAction::hide(id.clone()))?;
        self.inner
            .lifecycle
            .borrow_mut()
            .insert(id.clone(), LifecycleState::Closing);

        let mut ledger = self.inner.ledger.borrow_mut();
        ledger.resolve_main(id, None);
        tracing::debug!("modal closing");
        Ok(ledger.ensure_closed(id))
    }

    pub(crate) fn remove_modal(&self, id: &ModalId) -> Result<()> {
        let _span = tracing::debug_span!("remove_modal", modal_id = %id).entered();

        self.dispatch(&ModalAction::remove(id.clone()))?;
        let settled = self.inner.ledger.borrow_mut().force_settle(id);

        let mut lifecycle = self.inner.lifecycle.borrow_mut();
        if lifecycle.get(id) != Some(&LifecycleState::Closed) {
            lifecycle.remove(id);
            self.inner.purges.borrow_mut().cancel(id);
        }
        tracing::debug!(settled, "modal removed");
        Ok(())
    }

    /// Merges `partial` into the data of an open modal and re-shows it.
    pub(crate) fn update_data(&self, id: &ModalId, partial: ModalData) -> Result<()> {
        if self.lifecycle_state(id) != Some(LifecycleState::Open) {
            tracing::debug!(modal_id = %id, "modal not open, data update ignored");
            return Ok(());
        }
        let Some(entry) = self.modal_state(id)? else {
            return Ok(());
        };

        let mut data = entry.data;
        for (key, value) in partial {
            if key != INTERNAL_CONFIG_KEY {
                data.insert(key, value);
            }
        }
        self.dispatch(&ModalAction::show(id.clone(), data))
    }

    pub(crate) fn set_flags(&self, id: &ModalId, flags: ModalFlags) -> Result<()> {
        if flags.is_empty() {
            return Ok(());
        }
        self.dispatch(&ModalAction::set_flags(id.clone(), flags))
    }

    /// Resolves a target without generating ids for unseen components.
    pub(crate) fn lookup(&self, target: &ModalTarget) -> Result<Option<ModalId>> {
        self.inner.registry.borrow().lookup(target)
    }

    fn settled_closed(&self, id: &ModalId) -> LifecyclePromise {
        self.inner
            .ledger
            .borrow()
            .closed_promise(id)
            .unwrap_or_else(|| LifecyclePromise::resolved(None))
    }
}

impl fmt::Debug for WeakContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakContext")
            .field("alive", &(self.0.strong_count() > 0))
            .finish()
    }
}

impl fmt::Debug for ModalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalContext")
            .field("config", &self.inner.config)
            .field("lifecycle", &self.inner.lifecycle.borrow())
            .finish_non_exhaustive()
    }
}
