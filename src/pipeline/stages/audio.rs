use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use tokio::{sync::Semaphore, task::JoinSet};

use crate::{
    collab::tts::{DEFAULT_VOICE, SpeechSynthesizer, SynthesizedAudio, resolve_voice, write_silence},
    foundation::config::AudioConfig,
    foundation::error::{ReelError, ReelResult},
    pipeline::context::{PipelineContext, SceneAudio, SceneKey},
    pipeline::events::{EventBus, PipelineEvent},
    pipeline::stage::{Stage, StageKind, StageReport},
    pipeline::stages::{require_set, write_json},
    scene::model::{Scene, Video, VideoSet},
};

/// One synthesis request per narrated scene, run concurrently.
///
/// Results are re-associated by `(video_id, scene_id)`, never by completion order. A failed
/// request leaves a silent placeholder of the scene's `min_duration`.
pub struct AudioStage {
    tts: Arc<dyn SpeechSynthesizer>,
}

struct Request {
    key: SceneKey,
    text: String,
    voice: String,
    out_path: PathBuf,
}

#[derive(serde::Serialize)]
struct TimingReport<'a> {
    video_id: &'a str,
    total_duration: f64,
    scenes: Vec<&'a SceneAudio>,
}

/// Voice for `scene`: its own, else the video's voices rotated over narrated scenes, else the
/// set default, else [`DEFAULT_VOICE`].
pub fn voice_for(scene: &Scene, narrated_index: usize, video: &Video, set: &VideoSet) -> String {
    if let Some(v) = &scene.voice {
        return v.clone();
    }
    if !video.voices.is_empty() {
        return video.voices[narrated_index % video.voices.len()].clone();
    }
    set.defaults
        .voice
        .clone()
        .unwrap_or_else(|| DEFAULT_VOICE.to_string())
}

impl AudioStage {
    pub fn new(tts: Arc<dyn SpeechSynthesizer>) -> Self {
        Self { tts }
    }

    fn requests(&self, set: &VideoSet, audio_root: impl Fn(&str) -> PathBuf) -> Vec<Request> {
        let mut out = Vec::new();
        for video in &set.videos {
            let dir = audio_root(&video.video_id);
            let narrated = video.scenes.iter().filter(|s| s.has_narration());
            for (i, scene) in narrated.enumerate() {
                let voice = voice_for(scene, i, video, set);
                out.push(Request {
                    key: (video.video_id.clone(), scene.id.clone()),
                    text: scene.narration.trim().to_string(),
                    voice,
                    out_path: dir.join(format!("{}.{}", scene.id, self.tts.extension())),
                });
            }
        }
        out
    }

    async fn synthesize_all(
        &self,
        requests: Vec<Request>,
        cfg: &AudioConfig,
        events: &EventBus,
    ) -> BTreeMap<SceneKey, (String, ReelResult<SynthesizedAudio>)> {
        let total = requests.len();
        let limit = Arc::new(Semaphore::new(cfg.max_concurrency.max(1)));
        let timeout = Duration::from_secs(cfg.request_timeout_secs.max(1));
        let mut tasks = JoinSet::new();
        for req in requests {
            let tts = Arc::clone(&self.tts);
            let limit = Arc::clone(&limit);
            tasks.spawn(async move {
                let result = match limit.acquire_owned().await {
                    Ok(_permit) => {
                        let voice_id = resolve_voice(&req.voice);
                        match tokio::time::timeout(
                            timeout,
                            tts.synthesize(&req.text, voice_id, &req.out_path),
                        )
                        .await
                        {
                            Ok(r) => r,
                            Err(_) => Err(ReelError::unavailable(format!(
                                "{} timed out after {}s",
                                tts.name(),
                                timeout.as_secs()
                            ))),
                        }
                    }
                    Err(_) => Err(ReelError::unavailable("synthesis limiter closed")),
                };
                (req.key, req.voice, result)
            });
        }

        let mut results = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((key, voice, result)) => {
                    events.emit(PipelineEvent::StageProgress {
                        stage: StageKind::Audio,
                        done: results.len() + 1,
                        total,
                        item: format!("{}/{}", key.0, key.1),
                    });
                    results.insert(key, (voice, result));
                }
                // The scene is filled with a placeholder below.
                Err(e) => tracing::warn!(error = %e, "synthesis task failed"),
            }
        }
        results
    }
}

async fn remove_partial(path: &Path) {
    if tokio::fs::metadata(path).await.is_ok() {
        let _ = tokio::fs::remove_file(path).await;
    }
}

#[async_trait]
impl Stage for AudioStage {
    fn kind(&self) -> StageKind {
        StageKind::Audio
    }

    #[tracing::instrument(level = "info", name = "audio_stage", skip_all)]
    async fn run(&self, ctx: &mut PipelineContext, events: &EventBus) -> ReelResult<StageReport> {
        let set = require_set(ctx)?;
        let cfg = ctx.config.audio.clone();
        let out_root = ctx.config.output_dir.clone();
        let audio_dir = |video_id: &str| out_root.join(video_id).join("audio");

        let requests = self.requests(set, &audio_dir);
        let expected: BTreeMap<SceneKey, PathBuf> = requests
            .iter()
            .map(|r| (r.key.clone(), r.out_path.clone()))
            .collect();
        tracing::info!(requests = requests.len(), backend = self.tts.name(), "synthesizing narration");
        let mut results = self.synthesize_all(requests, &cfg, events).await;

        let mut report = StageReport::default();
        let mut audio = BTreeMap::new();
        for video in &set.videos {
            let dir = audio_dir(&video.video_id);
            let mut entries = Vec::with_capacity(video.scenes.len());
            for scene in &video.scenes {
                let key = (video.video_id.clone(), scene.id.clone());
                let entry = if !scene.has_narration() {
                    SceneAudio {
                        scene_id: scene.id.clone(),
                        audio_file: None,
                        duration: scene.min_duration,
                        placeholder: false,
                        voice: None,
                    }
                } else {
                    let (voice, result) = results.remove(&key).unwrap_or_else(|| {
                        (
                            String::new(),
                            Err(ReelError::unavailable("synthesis task did not finish")),
                        )
                    });
                    let voice = (!voice.is_empty()).then_some(voice);
                    match result {
                        Ok(a) => SceneAudio {
                            scene_id: scene.id.clone(),
                            duration: scene.clamp_duration(a.duration_secs + cfg.padding_secs),
                            audio_file: Some(a.audio_file),
                            placeholder: false,
                            voice,
                        },
                        Err(e) => {
                            if let Some(partial) = expected.get(&key) {
                                remove_partial(partial).await;
                            }
                            report.warn(format!(
                                "{}/{}: speech synthesis failed, using {}s of silence ({e})",
                                video.video_id, scene.id, scene.min_duration
                            ));
                            let path = dir.join(format!("{}_placeholder.wav", scene.id));
                            let written = write_silence(
                                path.clone(),
                                scene.min_duration,
                                cfg.placeholder_sample_rate,
                            )
                            .await;
                            let audio_file = match written {
                                Ok(()) => Some(path),
                                Err(err) => {
                                    remove_partial(&path).await;
                                    report.warn(format!(
                                        "{}/{}: placeholder audio not written ({err})",
                                        video.video_id, scene.id
                                    ));
                                    None
                                }
                            };
                            SceneAudio {
                                scene_id: scene.id.clone(),
                                audio_file,
                                duration: scene.min_duration,
                                placeholder: true,
                                voice,
                            }
                        }
                    }
                };
                tracing::debug!(video = %video.video_id, scene = %scene.id, duration = entry.duration, "scene audio");
                entries.push((key, entry));
            }

            let timing = TimingReport {
                video_id: &video.video_id,
                total_duration: entries.iter().map(|(_, e)| e.duration).sum(),
                scenes: entries.iter().map(|(_, e)| e).collect(),
            };
            let report_path = dir.join("timing_report.json");
            write_json(&report_path, &timing).await?;
            report.artifacts.push(report_path);
            audio.extend(entries);
        }

        ctx.audio = audio;
        Ok(report)
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/pipeline/audio.rs"]
mod tests;
