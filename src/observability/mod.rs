//! Structured logging for modal lifecycle events.
//!
//! Every coordinator operation runs inside a `debug` span named after the
//! operation (`open_modal`, `close_modal`, `remove_modal`, ...) carrying the
//! modal id. Soft failures (rendering an unregistered id, a stale animation
//! phase) are `warn` events.
//!
//! # Configuration
//!
//! Level is controlled via:
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. `trace_level` in [`ModalConfig`](crate::ModalConfig)
//! 3. Default: `"info"`
//!
//! # Usage
//!
//! ```rust
//! use modalkit::observability::init_tracing;
//! use modalkit::ModalConfig;
//!
//! init_tracing(&ModalConfig::default());
//! tracing::debug!("modal layer ready");
//! ```
//!
//! Hosts that install their own subscriber can skip this entirely; the crate
//! only emits through the `tracing` macros.

mod init;

pub use init::init_tracing;
