use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::RgbImage;

use crate::encode::encoder::{AudioTrack, EncodeJob, EncodedArtifact, VideoEncoder, ensure_parent_dir};
use crate::foundation::error::{ReelError, ReelResult};

/// Preview encoder: each scene's start/end keyframes as PNG plus a JSON manifest.
///
/// The manifest is the primary output; PNGs go to a `<video_id>_keyframes` directory next to it.
/// Needs no external tools, which makes it the dry-run encoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyframeEncoder;

#[derive(Debug, serde::Serialize)]
struct ClipEntry {
    scene_id: String,
    start_frame_index: u64,
    end_frame_index: u64,
    anim_frames: u64,
    start_png: PathBuf,
    end_png: PathBuf,
}

#[derive(Debug, serde::Serialize)]
struct Manifest<'a> {
    video_id: &'a str,
    fps: f64,
    frame_count: u64,
    clips: Vec<ClipEntry>,
    audio: &'a [AudioTrack],
}

/// Encode `img` as PNG at `path`.
pub fn write_png(img: &RgbImage, path: &Path) -> ReelResult<()> {
    ensure_parent_dir(path)?;
    img.save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| ReelError::encoding(format!("write png '{}': {e}", path.display())))
}

fn keyframe_dir(job: &EncodeJob) -> PathBuf {
    let parent = job.output_path.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!("{}_keyframes", job.video_id))
}

impl VideoEncoder for KeyframeEncoder {
    fn name(&self) -> &str {
        "keyframes"
    }

    fn extension(&self) -> &str {
        "json"
    }

    fn encode(&self, job: &EncodeJob) -> ReelResult<EncodedArtifact> {
        if job.frames.is_empty() {
            return Err(ReelError::encoding(format!(
                "video '{}' has no frames",
                job.video_id
            )));
        }
        let dir = keyframe_dir(job);
        let mut clips = Vec::with_capacity(job.frames.clips().len());
        for clip in job.frames.clips() {
            let start_png = dir.join(format!("{}_start.png", clip.scene_id));
            let end_png = dir.join(format!("{}_end.png", clip.scene_id));
            write_png(&clip.keyframes.start, &start_png)?;
            write_png(&clip.keyframes.end, &end_png)?;
            clips.push(ClipEntry {
                scene_id: clip.scene_id.clone(),
                start_frame_index: clip.range.start.0,
                end_frame_index: clip.range.end.0,
                anim_frames: clip.anim_frames,
                start_png,
                end_png,
            });
        }

        let manifest = Manifest {
            video_id: &job.video_id,
            fps: job.fps.as_f64(),
            frame_count: job.frames.len(),
            clips,
            audio: &job.audio,
        };
        ensure_parent_dir(&job.output_path)?;
        let json = serde_json::to_vec_pretty(&manifest)?;
        std::fs::write(&job.output_path, json)
            .with_context(|| format!("write '{}'", job.output_path.display()))?;
        EncodedArtifact::from_output(&job.output_path, job.frames.len())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/keyframes.rs"]
mod tests;
