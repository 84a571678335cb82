//! Staged production pipeline.
//!
//! An [`Orchestrator`] runs the five [`stages`] in order over one [`PipelineContext`], publishing
//! [`PipelineEvent`]s as it goes. After every stage the run is saved through a [`StateStore`] so
//! it can be resumed.

pub mod context;
pub mod events;
pub mod orchestrator;
pub mod stage;
pub mod stages;
pub mod state;

pub use context::{
    PipelineContext, RunReport, RunState, SceneAudio, SceneKey, SceneTiming, ScriptStats,
    VideoTiming,
};
pub use events::{EventBus, PipelineEvent};
pub use orchestrator::{CancelHandle, Orchestrator, enhancer_for};
pub use stage::{Stage, StageError, StageKind, StageReport, StageResult, StageStatus};
pub use state::{RunRecord, RunSummary, StateStore};
