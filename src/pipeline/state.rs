//! Run records persisted after every stage so a failed or interrupted run can be resumed.
//!
//! Records live under `<output_dir>/.scenereel/runs/<run_id>.json`. Frame sequences are not
//! stored; they are rebuilt from the timing manifests when a resumed run still has to encode.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    adapters::InputSource,
    encode::EncodedArtifact,
    foundation::config::PipelineConfig,
    foundation::error::{ReelError, ReelResult},
    pipeline::context::{PipelineContext, RunState, SceneAudio, ScriptStats, VideoTiming},
    pipeline::stage::{StageKind, StageResult, StageStatus},
    scene::model::VideoSet,
};

/// Directory, relative to the output directory, holding run records.
pub const STATE_DIR: &str = ".scenereel/runs";

/// Narration audio of one scene, keyed by its video.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StoredAudio {
    pub video_id: String,
    #[serde(flatten)]
    pub audio: SceneAudio,
}

/// Everything needed to continue a run, as written to disk.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RunRecord {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub source: InputSource,
    pub config: PipelineConfig,
    pub state: RunState,
    #[serde(default)]
    pub video_set: Option<VideoSet>,
    #[serde(default)]
    pub script_stats: BTreeMap<String, ScriptStats>,
    #[serde(default)]
    pub audio: Vec<StoredAudio>,
    #[serde(default)]
    pub timings: BTreeMap<String, VideoTiming>,
    #[serde(default)]
    pub outputs: BTreeMap<String, EncodedArtifact>,
    #[serde(default)]
    pub artifacts: Vec<PathBuf>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub stage_results: Vec<StageResult>,
}

impl RunRecord {
    pub fn from_context(ctx: &PipelineContext) -> Self {
        Self {
            run_id: ctx.run_id,
            started_at: ctx.started_at,
            updated_at: Utc::now(),
            source: ctx.source.clone(),
            config: ctx.config.clone(),
            state: ctx.state.clone(),
            video_set: ctx.video_set.clone(),
            script_stats: ctx.script_stats.clone(),
            audio: ctx
                .audio
                .iter()
                .map(|((video_id, _), audio)| StoredAudio {
                    video_id: video_id.clone(),
                    audio: audio.clone(),
                })
                .collect(),
            timings: ctx.timings.clone(),
            outputs: ctx.outputs.clone(),
            artifacts: ctx.artifacts.clone(),
            warnings: ctx.warnings.clone(),
            stage_results: ctx.stage_results.clone(),
        }
    }

    /// Context holding the record's state, ready to continue. Frame sequences start empty.
    pub fn into_context(self) -> PipelineContext {
        let mut ctx = PipelineContext::new(self.config, self.source);
        ctx.run_id = self.run_id;
        ctx.started_at = self.started_at;
        ctx.state = self.state;
        ctx.video_set = self.video_set;
        ctx.script_stats = self.script_stats;
        ctx.audio = self
            .audio
            .into_iter()
            .map(|a| ((a.video_id, a.audio.scene_id.clone()), a.audio))
            .collect();
        ctx.timings = self.timings;
        ctx.outputs = self.outputs;
        ctx.artifacts = self.artifacts;
        ctx.warnings = self.warnings;
        ctx.stage_results = self.stage_results;
        ctx
    }

    pub fn succeeded(&self, stage: StageKind) -> bool {
        self.stage_results
            .iter()
            .any(|r| r.stage == stage && r.status == StageStatus::Succeeded)
    }

    /// First stage in pipeline order that has not succeeded.
    pub fn next_stage(&self) -> Option<StageKind> {
        StageKind::ORDER.into_iter().find(|s| !self.succeeded(*s))
    }

    pub fn can_resume(&self) -> bool {
        self.state != RunState::Completed && self.next_stage().is_some()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            run_id: self.run_id,
            source: self.source.describe(),
            state: self.state.clone(),
            updated_at: self.updated_at,
            next_stage: self.next_stage().filter(|_| self.can_resume()),
        }
    }
}

/// One line of [`StateStore::list`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub source: String,
    pub state: RunState,
    pub updated_at: DateTime<Utc>,
    /// Stage a resume would start at; `None` when the run cannot be resumed.
    pub next_stage: Option<StageKind>,
}

/// Directory of [`RunRecord`] files.
#[derive(Clone, Debug)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store of the runs writing into `output_dir`.
    pub fn for_output(output_dir: &Path) -> Self {
        Self::new(output_dir.join(STATE_DIR))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, run_id: Uuid) -> PathBuf {
        self.dir.join(format!("{run_id}.json"))
    }

    /// Write `record`, replacing any earlier version atomically.
    pub async fn save(&self, record: &RunRecord) -> ReelResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| anyhow::Error::new(e).context(format!("create '{}'", self.dir.display())))?;
        let path = self.path(record.run_id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| anyhow::Error::new(e).context(format!("write '{}'", tmp.display())))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| anyhow::Error::new(e).context(format!("replace '{}'", path.display())))?;
        Ok(path)
    }

    pub async fn load(&self, run_id: Uuid) -> ReelResult<RunRecord> {
        let path = self.path(run_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ReelError::source_not_found(format!(
                    "no saved run {run_id} in '{}'",
                    self.dir.display()
                )));
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read '{}'", path.display()))
                    .into());
            }
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn can_resume(&self, run_id: Uuid) -> bool {
        self.load(run_id).await.is_ok_and(|r| r.can_resume())
    }

    /// Every readable record, most recently updated first. Unreadable files are skipped.
    pub async fn list(&self) -> ReelResult<Vec<RunSummary>> {
        let mut out = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("list '{}'", self.dir.display()))
                    .into());
            }
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| anyhow::Error::new(e).context(format!("list '{}'", self.dir.display())))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let record = match tokio::fs::read(&path).await {
                Ok(bytes) => serde_json::from_slice::<RunRecord>(&bytes),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "run record unreadable");
                    continue;
                }
            };
            match record {
                Ok(r) => out.push(r.summary()),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "run record malformed"),
            }
        }
        out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(out)
    }

    /// Delete records last updated before `now - max_age`; returns how many were removed.
    pub async fn cleanup_older_than(&self, max_age: chrono::Duration) -> ReelResult<usize> {
        let cutoff = Utc::now() - max_age;
        let mut removed = 0;
        for run in self.list().await? {
            if run.updated_at < cutoff {
                tokio::fs::remove_file(self.path(run.run_id))
                    .await
                    .map_err(|e| anyhow::Error::new(e).context(format!("remove run {}", run.run_id)))?;
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::info!(removed, dir = %self.dir.display(), "old run records removed");
        }
        Ok(removed)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/state.rs"]
mod tests;
