//! Delayed cleanup of closed modals.
//!
//! After the exit signal a modal's lifecycle state and settled `closed`
//! promise are kept for [`PURGE_DELAY`] so trailing `get_state()` and
//! `after_closed()` calls still see them. The schedule is driven by the host:
//! it arms a timer at [`PurgeSchedule::next_deadline`] and hands the current
//! instant to [`PurgeSchedule::take_due`]. Reopening an id cancels its purge.

use crate::domain::ModalId;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// How long closed-modal bookkeeping is retained.
pub const PURGE_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Default)]
pub struct PurgeSchedule {
    deadlines: HashMap<ModalId, Instant>,
}

impl PurgeSchedule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `id` for purge at `now + PURGE_DELAY`, replacing any earlier
    /// deadline.
    pub fn schedule(&mut self, id: ModalId, now: Instant) {
        self.deadlines.insert(id, now + PURGE_DELAY);
    }

    /// Cancels a pending purge. Returns `true` if one was scheduled.
    pub fn cancel(&mut self, id: &ModalId) -> bool {
        self.deadlines.remove(id).is_some()
    }

    #[must_use]
    pub fn is_scheduled(&self, id: &ModalId) -> bool {
        self.deadlines.contains_key(id)
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Removes and returns every id whose deadline is at or before `now`,
    /// sorted for deterministic processing.
    pub fn take_due(&mut self, now: Instant) -> Vec<ModalId> {
        let mut due: Vec<ModalId> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, _)| id.clone())
            .collect();
        due.sort();
        for id in &due {
            self.deadlines.remove(id);
        }
        due
    }
}
