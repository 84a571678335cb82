use std::path::PathBuf;

use async_trait::async_trait;

use crate::{
    foundation::error::{ErrorKind, ReelError, ReelResult},
    pipeline::context::PipelineContext,
    pipeline::events::EventBus,
};

/// Pipeline stages in execution order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Input,
    Script,
    Audio,
    Render,
    Output,
}

impl StageKind {
    pub const ORDER: [StageKind; 5] = [
        StageKind::Input,
        StageKind::Script,
        StageKind::Audio,
        StageKind::Render,
        StageKind::Output,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::Input => "input",
            StageKind::Script => "script",
            StageKind::Audio => "audio",
            StageKind::Render => "render",
            StageKind::Output => "output",
        }
    }

    /// Human-readable stage name.
    pub fn label(self) -> &'static str {
        match self {
            StageKind::Input => "Input Adaptation",
            StageKind::Script => "Script Generation",
            StageKind::Audio => "Audio Generation",
            StageKind::Render => "Video Rendering",
            StageKind::Output => "Output Assembly",
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Succeeded,
    Failed,
}

/// Serializable summary of a [`ReelError`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StageError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ReelError> for StageError {
    fn from(e: &ReelError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// Outcome of one stage, appended to the run's ordered log.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StageResult {
    pub stage: StageKind,
    pub status: StageStatus,
    /// Attempts made, including the first.
    pub attempts: u32,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StageError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<PathBuf>,
}

/// What a successful stage produced besides its context mutations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StageReport {
    pub warnings: Vec<String>,
    pub artifacts: Vec<PathBuf>,
}

impl StageReport {
    pub fn warn(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::warn!("{msg}");
        self.warnings.push(msg);
    }
}

/// One step of the pipeline.
///
/// A stage writes its outputs into the context only once it has succeeded, so a failed attempt
/// can be retried against an unchanged context.
#[async_trait]
pub trait Stage: Send + Sync {
    fn kind(&self) -> StageKind;

    async fn run(&self, ctx: &mut PipelineContext, events: &EventBus) -> ReelResult<StageReport>;
}
