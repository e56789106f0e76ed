pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("unrecognized piece kind identifier")]
pub struct InvalidPieceKindError;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("rotation state outside 0..=3")]
pub struct InvalidRotationError;
