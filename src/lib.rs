//! `scenereel` turns documents, structured YAML and programmatic configs into narrated videos.
//!
//! Sources are adapted into a [`VideoSet`] of typed scenes. The [`Orchestrator`] then runs
//! script generation, speech synthesis, keyframe rendering and encoding over it.
//!
//! ```no_run
//! use scenereel::{InputSource, Orchestrator, PipelineConfig, SourceKind};
//!
//! let source = InputSource::from_arg("docs/guide.md", SourceKind::Auto);
//! let ctx = Orchestrator::new(PipelineConfig::default()).run_blocking(source)?;
//! println!("{:?}", ctx.state);
//! # Ok::<(), scenereel::ReelError>(())
//! ```
#![forbid(unsafe_code)]

pub mod adapters;
pub mod collab;
pub mod encode;
pub mod facade;
pub mod foundation;
pub mod pipeline;
pub mod render;
pub mod scene;

pub use adapters::{
    DocumentSource, InputSource, ProgrammaticSource, SourceKind, YamlSource, adapt, adapt_blocking,
    export::export,
};
pub use foundation::config::{AdaptOptions, EnhancerBackend, PipelineConfig, RetryPolicy};
pub use foundation::core::{CANVAS, Fps, FrameIndex, FrameRange, Rgb8};
pub use foundation::error::{ErrorKind, ReelError, ReelResult};
pub use pipeline::{
    CancelHandle, Orchestrator, PipelineContext, PipelineEvent, RunState, RunSummary, StageKind,
    StateStore,
};
pub use render::{KeyframePair, SceneRenderer, render_scene};
pub use scene::model::{Scene, SceneContent, SceneType, Video, VideoSet};
