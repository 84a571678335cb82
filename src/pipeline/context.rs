//! State threaded through the stages of one run.

use std::{collections::BTreeMap, path::PathBuf};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    adapters::InputSource,
    encode::EncodedArtifact,
    foundation::config::PipelineConfig,
    foundation::error::ErrorKind,
    pipeline::stage::{StageKind, StageResult, StageStatus},
    render::interpolate::FrameSequence,
    scene::model::VideoSet,
};

/// `(video_id, scene_id)`; scene ids are only unique within a video.
pub type SceneKey = (String, String);

/// Lifecycle of a run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    Pending,
    Running {
        stage: StageKind,
    },
    Completed,
    Aborted {
        stage: StageKind,
        kind: ErrorKind,
        error: String,
    },
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Aborted { .. })
    }
}

/// Narration audio of one scene.
///
/// `audio_file` is `None` for scenes without narration. A placeholder is a silent track written
/// after synthesis failed.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneAudio {
    pub scene_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<PathBuf>,
    /// Scene length in seconds after padding and clamping.
    pub duration: f64,
    pub placeholder: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

/// Word count and estimated speaking time of a video's narration.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScriptStats {
    pub words: usize,
    pub estimated_secs: f64,
    pub narrated_scenes: usize,
}

/// One scene's slot in a video timeline. `end_frame_index` is exclusive.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneTiming {
    pub scene_id: String,
    pub start_frame_index: u64,
    pub end_frame_index: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<PathBuf>,
    pub duration: f64,
}

/// Timing manifest of one rendered video, scenes in playback order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VideoTiming {
    pub video_id: String,
    pub fps: f64,
    pub total_frames: u64,
    pub total_duration: f64,
    pub scenes: Vec<SceneTiming>,
}

/// Everything a run knows. Owned by the orchestrator and mutated by one stage at a time.
#[derive(Clone, Debug)]
pub struct PipelineContext {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub config: PipelineConfig,
    pub source: InputSource,
    pub state: RunState,
    pub video_set: Option<VideoSet>,
    pub script_stats: BTreeMap<String, ScriptStats>,
    pub audio: BTreeMap<SceneKey, SceneAudio>,
    pub sequences: BTreeMap<String, FrameSequence>,
    pub timings: BTreeMap<String, VideoTiming>,
    pub outputs: BTreeMap<String, EncodedArtifact>,
    pub artifacts: Vec<PathBuf>,
    pub warnings: Vec<String>,
    pub stage_results: Vec<StageResult>,
}

impl PipelineContext {
    pub fn new(config: PipelineConfig, source: InputSource) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            config,
            source,
            state: RunState::Pending,
            video_set: None,
            script_stats: BTreeMap::new(),
            audio: BTreeMap::new(),
            sequences: BTreeMap::new(),
            timings: BTreeMap::new(),
            outputs: BTreeMap::new(),
            artifacts: Vec::new(),
            warnings: Vec::new(),
            stage_results: Vec::new(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state == RunState::Completed
    }

    /// Directory holding every artifact of `video_id`.
    pub fn video_dir(&self, video_id: &str) -> PathBuf {
        self.config.output_dir.join(video_id)
    }

    pub fn scene_audio(&self, video_id: &str, scene_id: &str) -> Option<&SceneAudio> {
        self.audio
            .get(&(video_id.to_string(), scene_id.to_string()))
    }

    /// Result of `stage`, if it ran.
    pub fn stage_result(&self, stage: StageKind) -> Option<&StageResult> {
        self.stage_results.iter().rev().find(|r| r.stage == stage)
    }

    /// Whether `stage` has a successful result, in this run or the one it resumes.
    pub fn stage_succeeded(&self, stage: StageKind) -> bool {
        self.stage_results
            .iter()
            .any(|r| r.stage == stage && r.status == StageStatus::Succeeded)
    }

    /// Serializable summary written as `pipeline_report.json`.
    pub fn report(&self) -> RunReport<'_> {
        RunReport {
            run_id: self.run_id,
            source: self.source.describe(),
            state: &self.state,
            set_id: self.video_set.as_ref().map(|s| s.set_id.as_str()),
            outputs: &self.outputs,
            warnings: &self.warnings,
            stages: &self.stage_results,
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct RunReport<'a> {
    pub run_id: Uuid,
    pub source: String,
    pub state: &'a RunState,
    pub set_id: Option<&'a str>,
    pub outputs: &'a BTreeMap<String, EncodedArtifact>,
    pub warnings: &'a [String],
    pub stages: &'a [StageResult],
}
