use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use rayon::prelude::*;

use crate::{
    encode::keyframes::write_png,
    foundation::core::{Fps, Rgb8},
    foundation::error::{ReelError, ReelResult},
    pipeline::context::{PipelineContext, SceneAudio, SceneTiming, VideoTiming},
    pipeline::events::{EventBus, PipelineEvent},
    pipeline::stage::{Stage, StageKind, StageReport},
    pipeline::stages::{require_set, write_json},
    render::interpolate::{Ease, FrameSequence},
    render::registry::{KeyframePair, SceneRenderer},
    scene::model::{Scene, VideoSet},
};

/// Renders every scene's keyframes in parallel and lays them out on per-video timelines.
pub struct RenderStage {
    renderer: Arc<SceneRenderer>,
}

struct Job {
    video: usize,
    scene: Scene,
    accent: Option<Rgb8>,
}

type Rendered = (usize, String, ReelResult<KeyframePair>);

pub(crate) fn build_thread_pool(threads: Option<usize>) -> ReelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ReelError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("scenereel-render-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ReelError::render(format!("failed to build rayon thread pool: {e}")))
}

/// Render `jobs` on a dedicated pool; results keep the order of `jobs`.
fn render_all(renderer: &SceneRenderer, jobs: Vec<Job>, threads: Option<usize>) -> ReelResult<Vec<Rendered>> {
    let pool = build_thread_pool(threads)?;
    Ok(pool.install(|| {
        jobs.into_par_iter()
            .map(|job| {
                let result = renderer.render(&job.scene, job.accent);
                (job.video, job.scene.id, result)
            })
            .collect()
    }))
}

/// Timeline of one video from its rendered scenes.
///
/// Scene length comes from the audio stage; scenes without an audio entry last `min_duration`.
pub fn layout_video(
    video_id: &str,
    rendered: Vec<(String, Arc<KeyframePair>)>,
    audio: impl Fn(&str) -> Option<SceneAudio>,
    min_duration: impl Fn(&str) -> f64,
    fps: Fps,
    anim_secs: f64,
    ease: Ease,
) -> (FrameSequence, VideoTiming) {
    let mut seq = FrameSequence::new(ease);
    let anim_frames = fps.secs_to_frames_round(anim_secs);
    let mut scenes = Vec::with_capacity(rendered.len());
    for (scene_id, keyframes) in rendered {
        let entry = audio(&scene_id);
        let duration = entry
            .as_ref()
            .map(|a| a.duration)
            .unwrap_or_else(|| min_duration(&scene_id));
        let frames = fps.secs_to_frames_round(duration).max(1);
        let range = seq.push(scene_id.clone(), keyframes, frames, anim_frames);
        scenes.push(SceneTiming {
            scene_id,
            start_frame_index: range.start.0,
            end_frame_index: range.end.0,
            audio_file: entry.and_then(|a| a.audio_file),
            duration,
        });
    }
    let timing = VideoTiming {
        video_id: video_id.to_string(),
        fps: fps.as_f64(),
        total_frames: seq.len(),
        total_duration: fps.frames_to_secs(seq.len()),
        scenes,
    };
    (seq, timing)
}

fn jobs_for(set: &VideoSet) -> Vec<Job> {
    set.videos
        .iter()
        .enumerate()
        .flat_map(|(i, v)| {
            let accent = v.accent_color.or(set.defaults.accent_color);
            v.scenes.iter().map(move |s| Job {
                video: i,
                scene: s.clone(),
                accent,
            })
        })
        .collect()
}

impl RenderStage {
    pub fn new(renderer: Arc<SceneRenderer>) -> Self {
        Self { renderer }
    }

    /// Rebuild `ctx.sequences` after an earlier successful render of the same run.
    ///
    /// Keyframes are rendered again. Clip boundaries come from the timing manifests unchanged.
    #[tracing::instrument(level = "info", skip_all)]
    pub async fn restore_sequences(&self, ctx: &mut PipelineContext) -> ReelResult<()> {
        let set = require_set(ctx)?;
        let fps = ctx.config.fps()?;
        let anim_frames = fps.secs_to_frames_round(ctx.config.anim_duration_secs);

        let mut jobs = Vec::new();
        for (i, video) in set.videos.iter().enumerate() {
            let Some(timing) = ctx.timings.get(&video.video_id) else {
                continue;
            };
            let accent = video.accent_color.or(set.defaults.accent_color);
            for slot in &timing.scenes {
                let scene = video.scene(&slot.scene_id).ok_or_else(|| {
                    ReelError::validation(format!(
                        "timing of '{}' names unknown scene '{}'",
                        video.video_id, slot.scene_id
                    ))
                })?;
                jobs.push(Job {
                    video: i,
                    scene: scene.clone(),
                    accent,
                });
            }
        }

        let renderer = Arc::clone(&self.renderer);
        let threads = ctx.config.render.threads;
        let rendered = tokio::task::spawn_blocking(move || render_all(&renderer, jobs, threads))
            .await
            .map_err(|e| ReelError::render(format!("render worker panicked: {e}")))??;
        let mut keyframes = BTreeMap::new();
        for (video, scene_id, result) in rendered {
            keyframes.insert((video, scene_id), Arc::new(result?));
        }

        let mut sequences = BTreeMap::new();
        for (i, video) in set.videos.iter().enumerate() {
            let Some(timing) = ctx.timings.get(&video.video_id) else {
                continue;
            };
            let mut seq = FrameSequence::new(ctx.config.render.ease);
            for slot in &timing.scenes {
                let kf = keyframes
                    .remove(&(i, slot.scene_id.clone()))
                    .ok_or_else(|| ReelError::render(format!("scene '{}' not re-rendered", slot.scene_id)))?;
                let frames = slot.end_frame_index.saturating_sub(slot.start_frame_index);
                seq.push(slot.scene_id.clone(), kf, frames, anim_frames);
            }
            tracing::debug!(video = %video.video_id, frames = seq.len(), "sequence restored");
            sequences.insert(video.video_id.clone(), seq);
        }
        ctx.sequences = sequences;
        Ok(())
    }
}

#[async_trait]
impl Stage for RenderStage {
    fn kind(&self) -> StageKind {
        StageKind::Render
    }

    #[tracing::instrument(level = "info", name = "render_stage", skip_all)]
    async fn run(&self, ctx: &mut PipelineContext, events: &EventBus) -> ReelResult<StageReport> {
        let set = require_set(ctx)?;
        let cfg = ctx.config.render.clone();
        let fps = ctx.config.fps()?;

        let jobs = jobs_for(set);
        let total = jobs.len();
        tracing::info!(scenes = total, threads = ?cfg.threads, "rendering keyframes");
        let renderer = Arc::clone(&self.renderer);
        let threads = cfg.threads;
        let rendered = tokio::task::spawn_blocking(move || render_all(&renderer, jobs, threads))
            .await
            .map_err(|e| ReelError::render(format!("render worker panicked: {e}")))??;

        let mut report = StageReport::default();
        let mut per_video: BTreeMap<usize, Vec<(String, Arc<KeyframePair>)>> = BTreeMap::new();
        for (done, (video, scene_id, result)) in rendered.into_iter().enumerate() {
            let video_id = &set.videos[video].video_id;
            events.emit(PipelineEvent::StageProgress {
                stage: StageKind::Render,
                done: done + 1,
                total,
                item: format!("{video_id}/{scene_id}"),
            });
            match result {
                Ok(pair) => per_video
                    .entry(video)
                    .or_default()
                    .push((scene_id, Arc::new(pair))),
                Err(e) if cfg.fail_fast => return Err(e),
                Err(e) => report.warn(format!("{video_id}/{scene_id}: scene not rendered ({e})")),
            }
        }

        let mut sequences = BTreeMap::new();
        let mut timings = BTreeMap::new();
        for (i, video) in set.videos.iter().enumerate() {
            let Some(rendered) = per_video.remove(&i) else {
                report.warn(format!(
                    "video '{}': no scene rendered, skipping",
                    video.video_id
                ));
                continue;
            };
            let video_dir = ctx.video_dir(&video.video_id);

            if cfg.write_keyframes {
                let dir = video_dir.join("keyframes");
                let pngs: Vec<(PathBuf, PathBuf, Arc<KeyframePair>)> = rendered
                    .iter()
                    .map(|(id, kf)| {
                        (
                            dir.join(format!("{id}_start.png")),
                            dir.join(format!("{id}_end.png")),
                            Arc::clone(kf),
                        )
                    })
                    .collect();
                let written = tokio::task::spawn_blocking(move || -> ReelResult<Vec<PathBuf>> {
                    let mut out = Vec::with_capacity(pngs.len() * 2);
                    for (start, end, kf) in pngs {
                        write_png(&kf.start, &start)?;
                        write_png(&kf.end, &end)?;
                        out.push(start);
                        out.push(end);
                    }
                    Ok(out)
                })
                .await
                .map_err(|e| ReelError::render(format!("keyframe writer panicked: {e}")))??;
                report.artifacts.extend(written);
            }

            let (seq, timing) = layout_video(
                &video.video_id,
                rendered,
                |scene_id| ctx.scene_audio(&video.video_id, scene_id).cloned(),
                |scene_id| video.scene(scene_id).map_or(0.0, |s| s.min_duration),
                fps,
                ctx.config.anim_duration_secs,
                cfg.ease,
            );
            tracing::info!(
                video = %video.video_id,
                frames = timing.total_frames,
                secs = timing.total_duration,
                "timeline ready"
            );
            let timing_path = video_dir.join(format!("{}_timing.json", video.video_id));
            write_json(&timing_path, &timing).await?;
            report.artifacts.push(timing_path);
            sequences.insert(video.video_id.clone(), seq);
            timings.insert(video.video_id.clone(), timing);
        }

        if sequences.is_empty() {
            return Err(ReelError::render(format!(
                "no scene could be rendered: {}",
                report.warnings.join("; ")
            )));
        }
        ctx.sequences = sequences;
        ctx.timings = timings;
        Ok(report)
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/pipeline/render.rs"]
mod tests;
