//! Modalkit: lifecycle coordination for modals, dialogs, and drawers.
//!
//! Modalkit keeps the bookkeeping behind imperative dialogs out of the view
//! layer:
//! - A registry mapping modal identifiers to components and static props
//! - A reducer-driven store of per-modal visibility and data
//! - Awaitable lifecycle promises (`after_opened`, `before_closed`, `after_closed`, open result)
//! - A coordinator implementing open/close/close-all/remove with delayed purging
//! - A binding contract for whatever UI layer draws the dialogs

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Application code                                   │  ← open/close calls
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Lifecycle Layer (lifecycle/)                       │  ← Coordinator
//! │  - ModalContext operations                          │
//! │  - Callback ledger of deferred promises             │
//! │  - Purge schedule                                   │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Registry      │   │ Store         │   │ Binder        │
//! │ (registry/)   │   │ (store/)      │   │ (binder/)     │
//! │ - Components  │   │ - Actions     │   │ - Bindings    │
//! │ - Id gen      │   │ - Reducer     │   │ - Render list │
//! │ - Identity    │   │ - Backends    │   │ - Definitions │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain Layer (domain/)                             │
//! │  - Modal ids, state, flags, lifecycle tags          │
//! │  - Component references and targets                 │
//! │  - Error types                                      │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - tracing subscriber setup                         │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`domain`]: Core domain types (ids, state, errors)
//! - [`registry`]: Component registry and id generation
//! - [`store`]: Actions, the pure reducer, and state backends
//! - [`lifecycle`]: Coordinator, refs, and lifecycle promises
//! - [`binder`]: Bindings and render list for the view layer
//! - [`observability`]: Tracing subscriber setup
//!
//! # Configuration
//!
//! ```toml
//! # modals.toml
//! id_prefix = "_modal"
//! default_disable_close = false
//! default_keep_mounted = false
//! trace_level = "debug"
//! ```
//!
//! # Lifecycle Flow
//!
//! 1. **Open**: `ModalContext::open` resolves the id, writes a `show` into the
//!    store, and arms the promises of a [`ModalRef`].
//! 2. **Mount**: the host renders every [`RenderEntry`] and mounts a
//!    [`ModalBinding`]. A modal opened before its component mounted becomes
//!    visible at this point.
//! 3. **Enter**: the host reports the end of the enter transition; `after_opened`
//!    settles.
//! 4. **Close**: `ModalRef::close(result)` settles `before_closed` and the open
//!    result, then hides the modal.
//! 5. **Exit**: the host reports the end of the exit transition; `after_closed`
//!    settles with the result and the modal is removed unless kept mounted.
//! 6. **Purge**: a few seconds later the closed bookkeeping is dropped.
//!
//! # Example
//!
//! ```rust
//! use futures::executor::block_on;
//! use modalkit::{initialize, ModalComponent, ModalConfig, OpenConfig};
//! use serde_json::json;
//! use std::rc::Rc;
//!
//! struct Confirm;
//! impl ModalComponent for Confirm {}
//!
//! let ctx = initialize(&ModalConfig::default());
//! ctx.register("confirm", Rc::new(Confirm), None)?;
//! let binding = ctx.mount("confirm")?;
//!
//! let modal = ctx.open("confirm", OpenConfig::new().with_data_entry("title", json!("Delete?")))?;
//! binding.on_animation_end()?;
//!
//! binding.close(Some(json!(true)))?;
//! binding.on_animation_end()?;
//!
//! assert_eq!(block_on(modal.result()), Some(json!(true)));
//! assert_eq!(block_on(modal.after_closed()), Some(json!(true)));
//! # Ok::<(), modalkit::ModalError>(())
//! ```

pub mod binder;
pub mod domain;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod store;

pub use binder::{AnimationPhase, BindingState, ModalBinding, ModalDefinition, RenderEntry};
pub use domain::{
    ComponentRef, LifecycleState, ModalComponent, ModalData, ModalError, ModalId, ModalResult,
    ModalState, ModalTarget, Result,
};
pub use lifecycle::{LifecyclePromise, ModalContext, ModalRef, OpenConfig, PURGE_DELAY};
pub use store::{reduce, ExternalStore, LocalStore, ModalAction, ModalStore, MountedSet, StateBackend};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Modal layer configuration.
///
/// Can be built from a string map (host or plugin configuration) with
/// [`ModalConfig::from_map`], or loaded from TOML with
/// [`ModalConfig::from_toml_str`] and [`ModalConfig::from_file`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModalConfig {
    /// Prefix for generated identifiers, producing `"{prefix}_{n}"`.
    ///
    /// Default: `"_modal"`
    pub id_prefix: String,

    /// `disable_close` for opens that do not set it. Default: `false`
    pub default_disable_close: bool,

    /// `keep_mounted` for opens that do not set it. Default: `false`
    pub default_keep_mounted: bool,

    /// Tracing level filter.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`. Default: `"info"`
    pub trace_level: Option<String>,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            id_prefix: "_modal".to_string(),
            default_disable_close: false,
            default_keep_mounted: false,
            trace_level: None,
        }
    }
}

impl ModalConfig {
    /// Parses configuration from a string map.
    ///
    /// # Parsing Rules
    ///
    /// - `id_prefix`: trimmed; empty values fall back to `"_modal"`
    /// - `default_disable_close`, `default_keep_mounted`: `"true"`/`"false"`
    ///   (falls back to `false` on parse error)
    /// - `trace_level`: String → `Option<String>`
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use modalkit::ModalConfig;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("id_prefix".to_string(), "dlg".to_string());
    /// map.insert("default_keep_mounted".to_string(), "yes".to_string());
    ///
    /// let config = ModalConfig::from_map(&map);
    /// assert_eq!(config.id_prefix, "dlg");
    /// assert!(!config.default_keep_mounted);
    /// ```
    #[must_use]
    pub fn from_map(config: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();

        let id_prefix = config
            .get("id_prefix")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map_or(defaults.id_prefix, String::from);

        let flag = |key: &str| {
            config
                .get(key)
                .and_then(|s| s.trim().parse::<bool>().ok())
                .unwrap_or(false)
        };

        Self {
            id_prefix,
            default_disable_close: flag("default_disable_close"),
            default_keep_mounted: flag("default_keep_mounted"),
            trace_level: config.get("trace_level").cloned(),
        }
    }

    /// Parses and validates TOML configuration. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::ConfigParse`] for malformed TOML or unknown keys,
    /// and [`ModalError::Config`] for an empty `id_prefix`.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::Io`] if the file cannot be read, otherwise as
    /// [`ModalConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.id_prefix.trim().is_empty() {
            return Err(ModalError::Config("id_prefix must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Creates a [`ModalContext`] backed by a [`LocalStore`].
///
/// Does not install a tracing subscriber; call
/// [`observability::init_tracing`] first if the host has none.
///
/// # Example
///
/// ```rust
/// use modalkit::{initialize, ModalConfig};
///
/// let ctx = initialize(&ModalConfig::default());
/// assert!(!ctx.has_open());
/// ```
#[must_use]
pub fn initialize(config: &ModalConfig) -> ModalContext {
    tracing::debug!("initializing modal context");
    ModalContext::new(config.clone())
}
