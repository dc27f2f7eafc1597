//! Error types for modal lifecycle operations.
//!
//! This module defines the centralized error type [`ModalError`] and a type alias
//! [`Result`] used throughout the crate. Only usage errors and configuration
//! failures are represented here: closing, removing, or flagging an identifier
//! that no longer exists is a silent no-op and never produces an error.

use super::modal::ModalId;
use thiserror::Error;

/// The main error type for modal operations.
///
/// Most variants are programmer errors surfaced immediately to the caller
/// (a handle used after its context was dropped, a binding used after unmount).
/// The remaining variants cover configuration loading.
///
/// # Examples
///
/// ```
/// use modalkit::ModalError;
///
/// fn require_id(id: &str) -> Result<(), ModalError> {
///     if id.is_empty() {
///         return Err(ModalError::MissingIdentifier);
///     }
///     Ok(())
/// }
///
/// assert!(require_id("").is_err());
/// ```
#[derive(Debug, Error)]
pub enum ModalError {
    /// The owning `ModalContext` has been dropped.
    ///
    /// Returned by `ModalRef`, `ModalBinding`, and `ModalDefinition` when they
    /// outlive the context they were created from.
    #[error("modal context is no longer alive")]
    ContextDropped,

    /// An external state backend was dispatched to before a dispatch
    /// function was installed.
    #[error("no dispatch function installed on the external modal store")]
    DispatchNotInstalled,

    /// An external state backend was read before a snapshot function was
    /// installed.
    #[error("no snapshot function installed on the external modal store")]
    SnapshotNotInstalled,

    /// An empty identifier was supplied where a modal id is required.
    #[error("modal identifier is missing or empty")]
    MissingIdentifier,

    /// A binding accessor or control was used after the binding unmounted.
    #[error("modal binding for `{0}` is no longer mounted")]
    Unbound(ModalId),

    /// Configuration is invalid.
    ///
    /// The string describes the specific configuration problem.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration TOML could not be parsed.
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for modal operations.
pub type Result<T> = std::result::Result<T, ModalError>;
