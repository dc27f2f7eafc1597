//! Reactive modal state: actions, the pure reducer, and pluggable backends.
//!
//! # Modules
//!
//! - `actions`: [`ModalAction`], the reducer input and external wire contract
//! - `reducer`: [`ModalStore`], [`MountedSet`], and the pure [`reduce`] function
//! - `backend`: [`StateBackend`] with [`LocalStore`] and [`ExternalStore`]

pub mod actions;
pub mod backend;
pub mod reducer;

pub use actions::{ActionPayload, ModalAction};
pub use backend::{ExternalStore, LocalStore, StateBackend};
pub use reducer::{reduce, ModalStore, MountedSet};
