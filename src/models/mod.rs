//! Resonance line-shape models.
//!
//! Models are implemented as small, pure functions so that fitting code can
//! stay generic over the `LineShape` tag.

pub mod lineshape;

pub use lineshape::*;
