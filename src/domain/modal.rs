//! Modal domain model: identifiers, per-modal state, and lifecycle tags.
//!
//! A modal is addressed by a [`ModalId`]. The reactive store keeps one
//! [`ModalState`] per id (visibility and caller data); the coordinator keeps a
//! coarser [`LifecycleState`] next to it for `get_state()` queries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::fmt;

/// Reserved key inside [`ModalData`] carrying the internal [`ModalOptions`].
///
/// Bindings strip this key before exposing data to the rendered component.
pub const INTERNAL_CONFIG_KEY: &str = "__modalConfig";

/// Opaque key-value payload supplied by the caller when opening a modal.
pub type ModalData = Map<String, Value>;

/// Value a modal settles with. `None` when closed without a result.
pub type ModalResult = Option<Value>;

/// Unique key naming a modal instance within a context.
///
/// Either supplied by the caller or generated by the registry as
/// `"{prefix}_{n}"`. Reusing an id overwrites the prior store entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModalId(String);

impl ModalId {
    /// Creates an id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty id, which is never a valid modal key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ModalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModalId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ModalId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for ModalId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Internal configuration attached to a modal's data under
/// [`INTERNAL_CONFIG_KEY`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModalOptions {
    /// Whether outside clicks and escape are ignored by the rendered dialog.
    pub disable_close: bool,
    /// Whether the component stays in the view tree after it has closed.
    pub keep_mounted: bool,
}

impl ModalOptions {
    /// Reads the options embedded in `data`, if any.
    ///
    /// Malformed option objects are treated as absent.
    #[must_use]
    pub fn from_data(data: &ModalData) -> Option<Self> {
        data.get(INTERNAL_CONFIG_KEY)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Writes these options into `data` under the reserved key.
    pub fn write_into(self, data: &mut ModalData) {
        let value = serde_json::to_value(self).unwrap_or(Value::Null);
        data.insert(INTERNAL_CONFIG_KEY.to_string(), value);
    }
}

/// Per-modal record held in the reactive store.
///
/// Invariant: `is_open` is only ever set by a `show` dispatched while the id
/// is mounted. `delay_open` is transient and cleared once the bound component
/// observes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalState {
    /// Identifier this record belongs to.
    pub modal_id: ModalId,
    /// Caller data, including the internal options object.
    #[serde(default)]
    pub data: ModalData,
    /// Visibility flag observed by the view.
    pub is_open: bool,
    /// Open was requested before the component mounted.
    pub delay_open: bool,
    /// Suppresses removal from the view tree after close.
    pub keep_mounted: bool,
}

impl ModalState {
    /// Returns the caller data without the reserved internal key.
    #[must_use]
    pub fn user_data(&self) -> ModalData {
        let mut data = self.data.clone();
        data.remove(INTERNAL_CONFIG_KEY);
        data
    }

    /// Returns the internal options, falling back to defaults.
    #[must_use]
    pub fn options(&self) -> ModalOptions {
        ModalOptions::from_data(&self.data).unwrap_or_default()
    }
}

/// Partial flag update merged into an existing [`ModalState`].
///
/// `disable_close` and `keep_mounted` also patch the internal options object
/// so that bindings and the reducer agree on them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_open: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_open: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_mounted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_close: Option<bool>,
}

impl ModalFlags {
    /// Returns `true` when no flag is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.is_open.is_none()
            && self.delay_open.is_none()
            && self.keep_mounted.is_none()
            && self.disable_close.is_none()
    }
}

/// Coarse lifecycle classification tracked by the coordinator.
///
/// Transitions: `open -> closing -> closed`, with `open` re-entered on reopen.
/// Absence of a state means unopened or purged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Open requested and not yet closed.
    Open,
    /// Close requested; waiting for the exit signal.
    Closing,
    /// Exit signal received.
    Closed,
}

impl LifecycleState {
    /// Returns `true` for `Open` and `Closing`, the states `close_all` acts on.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Open | Self::Closing)
    }
}
