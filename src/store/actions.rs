//! Actions accepted by the modal reducer.
//!
//! This module defines [`ModalAction`], the only way the modal store changes.
//! The same type is the wire contract for hosts that keep modal state in their
//! own unidirectional-data-flow container: actions serialize as
//! `{"type": "...", "payload": {"modalId": "...", "data"?: {...}, "flags"?: {...}}}`.
//!
//! # Example
//!
//! ```rust
//! use modalkit::store::ModalAction;
//! use modalkit::ModalId;
//!
//! let action = ModalAction::hide(ModalId::from("confirm"));
//! let json = serde_json::to_value(&action).unwrap();
//! assert_eq!(json["type"], "modal/hide");
//! assert_eq!(json["payload"]["modalId"], "confirm");
//! ```

use crate::domain::{ModalData, ModalFlags, ModalId};
use serde::{Deserialize, Serialize};

/// Payload shared by every action variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPayload {
    /// Target modal.
    pub modal_id: ModalId,

    /// Caller data, only present on `show`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ModalData>,

    /// Flag patch, only present on `set-flags`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<ModalFlags>,
}

/// Commands dispatched to the modal store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ModalAction {
    /// Upserts the entry; visible immediately if mounted, delayed otherwise.
    #[serde(rename = "modal/show")]
    Show(ActionPayload),

    /// Clears the visibility flag, keeping the entry.
    #[serde(rename = "modal/hide")]
    Hide(ActionPayload),

    /// Deletes the entry.
    #[serde(rename = "modal/remove")]
    Remove(ActionPayload),

    /// Merges flags into an existing entry.
    #[serde(rename = "modal/set-flags")]
    SetFlags(ActionPayload),
}

impl ModalAction {
    #[must_use]
    pub const fn show(modal_id: ModalId, data: ModalData) -> Self {
        Self::Show(ActionPayload {
            modal_id,
            data: Some(data),
            flags: None,
        })
    }

    #[must_use]
    pub const fn hide(modal_id: ModalId) -> Self {
        Self::Hide(ActionPayload {
            modal_id,
            data: None,
            flags: None,
        })
    }

    #[must_use]
    pub const fn remove(modal_id: ModalId) -> Self {
        Self::Remove(ActionPayload {
            modal_id,
            data: None,
            flags: None,
        })
    }

    #[must_use]
    pub const fn set_flags(modal_id: ModalId, flags: ModalFlags) -> Self {
        Self::SetFlags(ActionPayload {
            modal_id,
            data: None,
            flags: Some(flags),
        })
    }

    /// Returns the payload regardless of variant.
    #[must_use]
    pub const fn payload(&self) -> &ActionPayload {
        match self {
            Self::Show(payload)
            | Self::Hide(payload)
            | Self::Remove(payload)
            | Self::SetFlags(payload) => payload,
        }
    }

    /// Returns the targeted modal id.
    #[must_use]
    pub const fn modal_id(&self) -> &ModalId {
        &self.payload().modal_id
    }

    /// Short name used in log fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Show(_) => "show",
            Self::Hide(_) => "hide",
            Self::Remove(_) => "remove",
            Self::SetFlags(_) => "set-flags",
        }
    }
}
