//! Domain layer types and invariants.

pub mod entities;
pub mod home;
pub mod normalize;
pub mod placement;
pub mod types;
