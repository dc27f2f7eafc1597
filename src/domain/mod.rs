//! Domain layer for modal lifecycle management.
//!
//! This module contains the core types shared by every other layer,
//! independent of how state is stored or how dialogs are rendered.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`modal`]: Identifiers, per-modal state, flags, and lifecycle tags
//! - [`component`]: Component references and open/close targets
//!
//! # Examples
//!
//! ```
//! use modalkit::domain::{ModalId, ModalState};
//!
//! let state = ModalState {
//!     modal_id: ModalId::from("confirm"),
//!     is_open: true,
//!     ..ModalState::default()
//! };
//! assert!(state.user_data().is_empty());
//! ```

pub mod component;
pub mod error;
pub mod modal;

pub use component::{component_key, ComponentRef, ModalComponent, ModalTarget};
pub use error::{ModalError, Result};
pub use modal::{
    LifecycleState, ModalData, ModalFlags, ModalId, ModalOptions, ModalResult, ModalState,
    INTERNAL_CONFIG_KEY,
};
