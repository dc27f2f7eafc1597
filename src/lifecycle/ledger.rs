//! Per-modal deferred lifecycle promises.
//!
//! Each modal id owns up to four deferreds:
//!
//! - `opened`: settled when the enter transition finishes
//! - `before_closed`: settled when a close is requested, before the exit transition
//! - `main`: the open-call promise, settled with the close result
//! - `closed`: settled when the exit transition finishes
//!
//! The first three live in the main callback entry. `closed` lives in a
//! separate slot that outlives the main entry, so `after_closed()` keeps
//! returning the same value after the close sequence has run. Every resolve
//! takes the deferred out of the ledger, which makes a second resolution on the
//! same id a no-op.

use super::deferred::{Deferred, LifecyclePromise};
use crate::domain::{ModalId, ModalResult};
use std::collections::HashMap;

#[derive(Debug, Default)]
struct CallbackEntry {
    opened: Option<Deferred>,
    before_closed: Option<Deferred>,
    main: Option<Deferred>,
}

impl CallbackEntry {
    fn is_empty(&self) -> bool {
        self.opened.is_none() && self.before_closed.is_none() && self.main.is_none()
    }
}

#[derive(Debug)]
struct ClosedSlot {
    deferred: Option<Deferred>,
    promise: LifecyclePromise,
    /// Close result carried from `close(result)` to the exit signal.
    result: ModalResult,
}

impl ClosedSlot {
    fn new() -> Self {
        let deferred = Deferred::new();
        let promise = deferred.promise();
        Self {
            deferred: Some(deferred),
            promise,
            result: None,
        }
    }

    fn is_pending(&self) -> bool {
        self.deferred.is_some()
    }
}

/// Promises handed to a `ModalRef` by [`CallbackLedger::arm`].
#[derive(Debug, Clone)]
pub struct ArmedPromises {
    pub opened: LifecyclePromise,
    pub before_closed: LifecyclePromise,
    pub closed: LifecyclePromise,
    pub result: LifecyclePromise,
}

/// Deferred bookkeeping for every modal id.
#[derive(Debug, Default)]
pub struct CallbackLedger {
    entries: HashMap<ModalId, CallbackEntry>,
    closed: HashMap<ModalId, ClosedSlot>,
}

impl CallbackLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepares the deferreds for an open of `id`.
    ///
    /// `opened` and `before_closed` are always fresh (replaced ones settle
    /// with `None`). `main` and `closed` are reused while still pending; a
    /// settled `closed` slot is replaced.
    pub fn arm(&mut self, id: &ModalId) -> ArmedPromises {
        let entry = self.entries.entry(id.clone()).or_default();

        let opened = Deferred::new();
        let before_closed = Deferred::new();
        let opened_promise = opened.promise();
        let before_closed_promise = before_closed.promise();
        entry.opened = Some(opened);
        entry.before_closed = Some(before_closed);

        let result = entry.main.get_or_insert_with(Deferred::new).promise();

        let slot = self.closed.entry(id.clone()).or_insert_with(ClosedSlot::new);
        if !slot.is_pending() {
            *slot = ClosedSlot::new();
        }
        slot.result = None;

        ArmedPromises {
            opened: opened_promise,
            before_closed: before_closed_promise,
            closed: slot.promise.clone(),
            result,
        }
    }

    /// Settles and clears `opened`. Returns `false` if nothing was pending.
    pub fn resolve_opened(&mut self, id: &ModalId) -> bool {
        self.take(id, |entry| entry.opened.take())
            .map(|deferred| deferred.resolve(None))
            .is_some()
    }

    /// Settles and clears `before_closed`. Returns `false` if nothing was pending.
    pub fn resolve_before_closed(&mut self, id: &ModalId, value: ModalResult) -> bool {
        self.take(id, |entry| entry.before_closed.take())
            .map(|deferred| deferred.resolve(value))
            .is_some()
    }

    /// Settles and clears the main open-promise. Returns `false` if nothing was pending.
    pub fn resolve_main(&mut self, id: &ModalId, value: ModalResult) -> bool {
        self.take(id, |entry| entry.main.take())
            .map(|deferred| deferred.resolve(value))
            .is_some()
    }

    /// Records the value the `closed` promise will settle with.
    ///
    /// Ignored when the slot has already settled.
    pub fn set_close_result(&mut self, id: &ModalId, value: ModalResult) {
        let slot = self.closed.entry(id.clone()).or_insert_with(ClosedSlot::new);
        if slot.is_pending() {
            slot.result = value;
        }
    }

    /// Returns the `closed` promise for `id`, creating a pending slot if none
    /// exists. A retained settled slot is returned as is.
    pub fn ensure_closed(&mut self, id: &ModalId) -> LifecyclePromise {
        self.closed
            .entry(id.clone())
            .or_insert_with(ClosedSlot::new)
            .promise
            .clone()
    }

    /// Returns the `closed` promise for `id` if a slot exists.
    #[must_use]
    pub fn closed_promise(&self, id: &ModalId) -> Option<LifecyclePromise> {
        self.closed.get(id).map(|slot| slot.promise.clone())
    }

    /// Settles `closed` with the carried close result, keeping the settled
    /// slot for late queries. Returns `false` if nothing was pending.
    pub fn resolve_closed(&mut self, id: &ModalId) -> bool {
        let Some(slot) = self.closed.get_mut(id) else {
            return false;
        };
        let Some(deferred) = slot.deferred.take() else {
            return false;
        };
        deferred.resolve(slot.result.take());
        true
    }

    /// Drops a retained `closed` slot. Pending slots are settled with `None`.
    pub fn purge_closed(&mut self, id: &ModalId) {
        if let Some(mut slot) = self.closed.remove(id) {
            if let Some(deferred) = slot.deferred.take() {
                deferred.resolve(None);
            }
        }
    }

    /// Settles every pending promise for `id` with `None` and clears the
    /// main entry. A `closed` slot that already settled is kept so its value
    /// stays available until purged.
    pub fn force_settle(&mut self, id: &ModalId) -> usize {
        let mut settled = 0;

        if let Some(entry) = self.entries.remove(id) {
            for deferred in [entry.opened, entry.before_closed, entry.main].into_iter().flatten() {
                deferred.resolve(None);
                settled += 1;
            }
        }

        if self.closed.get(id).is_some_and(ClosedSlot::is_pending) {
            self.purge_closed(id);
            settled += 1;
        }

        settled
    }

    /// Returns `true` if any deferred or closed slot is tracked for `id`.
    #[must_use]
    pub fn tracks(&self, id: &ModalId) -> bool {
        self.entries.contains_key(id) || self.closed.contains_key(id)
    }

    fn take(
        &mut self,
        id: &ModalId,
        pick: impl FnOnce(&mut CallbackEntry) -> Option<Deferred>,
    ) -> Option<Deferred> {
        let entry = self.entries.get_mut(id)?;
        let deferred = pick(entry);
        if entry.is_empty() {
            self.entries.remove(id);
        }
        deferred
    }
}
