use std::collections::BTreeSet;
use std::sync::Mutex;

use crate::encode::encoder::{AudioTrack, EncodeJob, EncodedArtifact, VideoEncoder, ensure_parent_dir};
use crate::foundation::error::{ReelError, ReelResult};

/// What a [`RecordingEncoder`] saw for one video.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedJob {
    pub video_id: String,
    pub scene_ids: Vec<String>,
    pub frame_count: u64,
    pub audio: Vec<AudioTrack>,
}

/// In-memory encoder for tests and debugging.
///
/// Records every job, writes a small placeholder file so the artifact is non-empty, and fails
/// with an `EncodingError` for videos listed in `fail_videos`.
#[derive(Debug, Default)]
pub struct RecordingEncoder {
    jobs: Mutex<Vec<RecordedJob>>,
    fail_videos: BTreeSet<String>,
}

impl RecordingEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every job for `video_id`.
    pub fn failing_for(mut self, video_id: impl Into<String>) -> Self {
        self.fail_videos.insert(video_id.into());
        self
    }

    /// Jobs seen so far, in call order.
    pub fn jobs(&self) -> Vec<RecordedJob> {
        self.jobs.lock().map(|j| j.clone()).unwrap_or_default()
    }
}

impl VideoEncoder for RecordingEncoder {
    fn name(&self) -> &str {
        "recording"
    }

    fn extension(&self) -> &str {
        "txt"
    }

    fn encode(&self, job: &EncodeJob) -> ReelResult<EncodedArtifact> {
        let record = RecordedJob {
            video_id: job.video_id.clone(),
            scene_ids: job.frames.clips().iter().map(|c| c.scene_id.clone()).collect(),
            frame_count: job.frames.len(),
            audio: job.audio.clone(),
        };
        if let Ok(mut jobs) = self.jobs.lock() {
            jobs.push(record);
        }
        if self.fail_videos.contains(&job.video_id) {
            return Err(ReelError::encoding(format!(
                "recording encoder configured to fail '{}'",
                job.video_id
            )));
        }

        ensure_parent_dir(&job.output_path)?;
        let body = format!(
            "{} frames={} audio={}\n",
            job.video_id,
            job.frames.len(),
            job.audio.len()
        );
        std::fs::write(&job.output_path, body).map_err(|e| {
            ReelError::encoding(format!("write '{}': {e}", job.output_path.display()))
        })?;
        EncodedArtifact::from_output(&job.output_path, job.frames.len())
    }
}
