//! Scene rendering: layouts, rasterization and keyframe interpolation.

pub mod base;
pub mod interpolate;
pub mod registry;
pub mod scenes;
pub mod svg;
pub mod text;
pub mod theme;

pub use interpolate::{Ease, FrameSequence, SceneClip};
pub use registry::{KeyframePair, SceneRenderer, render_scene};
