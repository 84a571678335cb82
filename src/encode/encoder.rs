use std::path::{Path, PathBuf};

use crate::{
    foundation::core::Fps,
    foundation::error::{ReelError, ReelResult},
    render::interpolate::FrameSequence,
};

/// One narration track placed on the video timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioTrack {
    pub scene_id: String,
    pub path: PathBuf,
    /// Offset from the start of the video, in seconds.
    pub start_secs: f64,
}

/// Everything the encoder needs for one video.
#[derive(Clone, Debug)]
pub struct EncodeJob {
    pub video_id: String,
    /// Frames in timeline order.
    pub frames: FrameSequence,
    pub audio: Vec<AudioTrack>,
    pub fps: Fps,
    pub output_path: PathBuf,
}

/// A finished, non-empty output file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EncodedArtifact {
    pub path: PathBuf,
    pub bytes: u64,
    pub frames: u64,
}

impl EncodedArtifact {
    /// Stat `path`; a missing or empty file is an `EncodingError`.
    pub fn from_output(path: &Path, frames: u64) -> ReelResult<Self> {
        let bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        if bytes == 0 {
            return Err(ReelError::encoding(format!(
                "encoder left no output at '{}'",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
            bytes,
            frames,
        })
    }
}

/// Encoder contract: called once per video, from a blocking context.
///
/// Frames are pulled from the job in strictly increasing order.
pub trait VideoEncoder: Send + Sync {
    fn name(&self) -> &str;

    /// File extension of the primary output, without the dot.
    fn extension(&self) -> &str;

    fn encode(&self, job: &EncodeJob) -> ReelResult<EncodedArtifact>;
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}
