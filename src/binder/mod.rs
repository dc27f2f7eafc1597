//! Contract toward the host rendering layer.
//!
//! The core never draws anything. Instead the host:
//!
//! 1. asks [`ModalContext::render_list`](crate::ModalContext::render_list)
//!    which components belong in the view tree,
//! 2. mounts a [`ModalBinding`] for each rendered component and reads its
//!    [`BindingState`],
//! 3. reports transition ends through [`ModalBinding::on_animation_end`] or
//!    [`ModalBinding::on_phase_end`].
//!
//! Declared modals use [`ModalDefinition`] guards so their registration ends
//! with the declaration's scope.

pub mod binding;
pub mod definition;
pub mod render;

pub use binding::{AnimationPhase, BindingState, ModalBinding};
pub use definition::ModalDefinition;
pub use render::RenderEntry;
