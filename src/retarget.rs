//! Removing joints from the skeleton while keeping the world orientation of
//! the joints that remain
mod engine;
mod removal;

// Re-exports
pub use {
    engine::{global_rotations, local_rotation, retarget},
    removal::{AncestorChain, JointRemovalSpec, NamedRemoval, RemovalConfig},
};
