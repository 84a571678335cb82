use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{foundation::error::ErrorKind, pipeline::stage::StageKind};

const DEFAULT_CAPACITY: usize = 256;

/// Progress notifications published while a run executes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    PipelineStarted {
        run_id: Uuid,
        source: String,
    },
    StageStarted {
        stage: StageKind,
    },
    StageProgress {
        stage: StageKind,
        done: usize,
        total: usize,
        item: String,
    },
    StageRetrying {
        stage: StageKind,
        attempt: u32,
        error: String,
    },
    StageCompleted {
        stage: StageKind,
        duration_ms: u64,
    },
    /// A resumed run reached a stage that already succeeded.
    StageSkipped {
        stage: StageKind,
    },
    StageFailed {
        stage: StageKind,
        kind: ErrorKind,
        error: String,
    },
    PipelineCompleted {
        run_id: Uuid,
    },
    PipelineFailed {
        run_id: Uuid,
        stage: StageKind,
        error: String,
    },
}

/// Fan-out of [`PipelineEvent`]s; every event is also logged.
///
/// Sending never blocks and never fails: with no subscribers the event is only logged, and slow
/// subscribers observe `RecvError::Lagged`.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<PipelineEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: PipelineEvent) {
        match &event {
            PipelineEvent::PipelineStarted { run_id, source } => {
                tracing::info!(%run_id, %source, "pipeline started");
            }
            PipelineEvent::StageStarted { stage } => {
                tracing::info!(stage = stage.label(), "stage started");
            }
            PipelineEvent::StageProgress {
                stage,
                done,
                total,
                item,
            } => {
                tracing::debug!(stage = stage.as_str(), done, total, item = %item, "stage progress");
            }
            PipelineEvent::StageRetrying {
                stage,
                attempt,
                error,
            } => {
                tracing::warn!(stage = stage.as_str(), attempt, error = %error, "retrying stage");
            }
            PipelineEvent::StageCompleted { stage, duration_ms } => {
                tracing::info!(stage = stage.label(), duration_ms, "stage completed");
            }
            PipelineEvent::StageSkipped { stage } => {
                tracing::info!(stage = stage.label(), "stage already completed, skipping");
            }
            PipelineEvent::StageFailed { stage, kind, error } => {
                tracing::error!(stage = stage.label(), ?kind, error = %error, "stage failed");
            }
            PipelineEvent::PipelineCompleted { run_id } => {
                tracing::info!(%run_id, "pipeline completed");
            }
            PipelineEvent::PipelineFailed {
                run_id,
                stage,
                error,
            } => {
                tracing::error!(%run_id, stage = stage.as_str(), error = %error, "pipeline aborted");
            }
        }
        let _ = self.tx.send(event);
    }
}
