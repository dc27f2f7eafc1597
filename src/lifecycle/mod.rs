//! Modal lifecycle: deferred promises, the per-id callback ledger, purge
//! scheduling, and the [`ModalContext`] coordinator tying them to the
//! registry and store.
//!
//! # Lifecycle promises
//!
//! | Promise | Settles when | Value |
//! |---|---|---|
//! | `after_opened` | enter transition ends | `None` |
//! | `before_closed` | close requested | close result |
//! | `result` | close requested or modal removed | close result or `None` |
//! | `after_closed` | exit transition ends | close result |

pub mod coordinator;
pub mod deferred;
pub mod ledger;
pub mod modal_ref;
pub mod purge;

pub use coordinator::{ModalContext, OpenConfig};
pub use deferred::{Deferred, LifecyclePromise};
pub use ledger::{ArmedPromises, CallbackLedger};
pub use modal_ref::ModalRef;
pub use purge::{PurgeSchedule, PURGE_DELAY};
