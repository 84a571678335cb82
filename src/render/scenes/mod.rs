//! One layout function per scene type.
//!
//! Each layout draws onto a [`Layers`](crate::render::base::Layers) pair: elements shared by both
//! keyframes go through `Layers::both`/`Layers::header`, the revealed content only onto `end`.
//! Every layout adds at least one end-only shape that does not depend on fonts, so the two
//! keyframes always differ.

pub mod basic;
pub mod comparison;
pub mod educational;
