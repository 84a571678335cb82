use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;

use crate::{
    encode::{AudioTrack, EncodeJob, EncodedArtifact, VideoEncoder},
    foundation::core::Fps,
    foundation::error::{ReelError, ReelResult},
    pipeline::context::{PipelineContext, VideoTiming},
    pipeline::events::{EventBus, PipelineEvent},
    pipeline::stage::{Stage, StageKind, StageReport},
    pipeline::stages::{require_set, write_json},
};

/// Muxes each rendered video with its narration and writes a metadata file next to it.
///
/// A video that fails to encode is skipped with a warning; the stage fails only when no video
/// could be encoded.
pub struct OutputStage {
    encoder: Arc<dyn VideoEncoder>,
}

#[derive(Debug, serde::Serialize)]
struct VideoMetadata<'a> {
    video_id: &'a str,
    title: &'a str,
    description: &'a str,
    scene_count: usize,
    total_duration: f64,
    frame_count: u64,
    fps: f64,
    artifact: &'a std::path::Path,
    bytes: u64,
    encoder: &'a str,
    generated_at: String,
}

/// Narration tracks of `timing`, placed at each scene's first frame.
pub fn audio_tracks(timing: &VideoTiming, fps: Fps) -> Vec<AudioTrack> {
    timing
        .scenes
        .iter()
        .filter_map(|s| {
            s.audio_file.as_ref().map(|path| AudioTrack {
                scene_id: s.scene_id.clone(),
                path: path.clone(),
                start_secs: fps.frames_to_secs(s.start_frame_index),
            })
        })
        .collect()
}

impl OutputStage {
    pub fn new(encoder: Arc<dyn VideoEncoder>) -> Self {
        Self { encoder }
    }

    fn output_path(&self, ctx: &PipelineContext, video_id: &str) -> PathBuf {
        ctx.video_dir(video_id)
            .join(format!("{video_id}.{}", self.encoder.extension()))
    }
}

#[async_trait]
impl Stage for OutputStage {
    fn kind(&self) -> StageKind {
        StageKind::Output
    }

    #[tracing::instrument(level = "info", name = "output_stage", skip_all)]
    async fn run(&self, ctx: &mut PipelineContext, events: &EventBus) -> ReelResult<StageReport> {
        let set = require_set(ctx)?;
        let fps = ctx.config.fps()?;
        if ctx.sequences.is_empty() {
            return Err(ReelError::validation(
                "no rendered video in context; render stage has not run",
            ));
        }

        let mut report = StageReport::default();
        let mut outputs = BTreeMap::new();
        let total = ctx.sequences.len();
        for video in &set.videos {
            let (Some(frames), Some(timing)) = (
                ctx.sequences.get(&video.video_id),
                ctx.timings.get(&video.video_id),
            ) else {
                continue;
            };
            let job = EncodeJob {
                video_id: video.video_id.clone(),
                frames: frames.clone(),
                audio: audio_tracks(timing, fps),
                fps,
                output_path: self.output_path(ctx, &video.video_id),
            };
            tracing::info!(
                video = %video.video_id,
                frames = job.frames.len(),
                tracks = job.audio.len(),
                encoder = self.encoder.name(),
                "encoding video"
            );

            let encoder = Arc::clone(&self.encoder);
            let encoded: ReelResult<EncodedArtifact> =
                tokio::task::spawn_blocking(move || encoder.encode(&job))
                    .await
                    .unwrap_or_else(|e| Err(ReelError::encoding(format!("encoder panicked: {e}"))));

            events.emit(PipelineEvent::StageProgress {
                stage: StageKind::Output,
                done: outputs.len() + 1,
                total,
                item: video.video_id.clone(),
            });
            let artifact = match encoded {
                Ok(a) => a,
                Err(e) => {
                    report.warn(format!("video '{}': encoding failed ({e})", video.video_id));
                    continue;
                }
            };

            let metadata = VideoMetadata {
                video_id: &video.video_id,
                title: &video.title,
                description: &video.description,
                scene_count: timing.scenes.len(),
                total_duration: timing.total_duration,
                frame_count: timing.total_frames,
                fps: fps.as_f64(),
                artifact: &artifact.path,
                bytes: artifact.bytes,
                encoder: self.encoder.name(),
                generated_at: chrono::Utc::now().to_rfc3339(),
            };
            let metadata_path = ctx
                .video_dir(&video.video_id)
                .join(format!("{}_metadata.json", video.video_id));
            write_json(&metadata_path, &metadata).await?;
            report.artifacts.push(artifact.path.clone());
            report.artifacts.push(metadata_path);
            outputs.insert(video.video_id.clone(), artifact);
        }

        if outputs.is_empty() {
            return Err(ReelError::encoding(format!(
                "no video could be encoded: {}",
                report.warnings.join("; ")
            )));
        }
        ctx.outputs = outputs;
        Ok(report)
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/pipeline/output.rs"]
mod tests;
