use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;

use crate::{
    collab::enhance::{NarrationEnhancer, fallback_narration},
    foundation::error::ReelResult,
    pipeline::context::{PipelineContext, ScriptStats},
    pipeline::events::{EventBus, PipelineEvent},
    pipeline::stage::{Stage, StageKind, StageReport},
    pipeline::stages::require_set,
    scene::model::Scene,
    scene::narration::{estimated_speech_secs, word_count},
};

/// Optional narration rewrite and translation, plus narration statistics.
///
/// An unavailable enhancer is never fatal: the scene keeps its original narration and the
/// fallback is recorded as a warning.
pub struct ScriptStage {
    enhancer: Arc<dyn NarrationEnhancer>,
}

impl ScriptStage {
    pub fn new(enhancer: Arc<dyn NarrationEnhancer>) -> Self {
        Self { enhancer }
    }

    async fn rewrite(
        &self,
        scene: &Scene,
        target: Option<(&str, &str)>,
        report: &mut StageReport,
    ) -> ReelResult<String> {
        let original = scene.narration.as_str();
        let enhanced = match self.enhancer.enhance(original, scene.scene_type()).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => fallback_narration(original),
            Err(e) if e.is_recoverable() => {
                report.warn(format!(
                    "scene '{}': enhancement unavailable, keeping original narration ({e})",
                    scene.id
                ));
                return Ok(fallback_narration(original));
            }
            Err(e) => return Err(e),
        };
        let Some((source, target)) = target else {
            return Ok(enhanced);
        };
        match self.enhancer.translate(&enhanced, source, target).await {
            Ok(text) if !text.trim().is_empty() => Ok(text),
            Ok(_) => Ok(enhanced),
            Err(e) if e.is_recoverable() => {
                report.warn(format!(
                    "scene '{}': translation to {target} unavailable, keeping original narration ({e})",
                    scene.id
                ));
                Ok(fallback_narration(original))
            }
            Err(e) => Err(e),
        }
    }
}

fn stats(scenes: &[Scene]) -> ScriptStats {
    let narrated: Vec<&Scene> = scenes.iter().filter(|s| s.has_narration()).collect();
    ScriptStats {
        words: narrated.iter().map(|s| word_count(&s.narration)).sum(),
        estimated_secs: narrated
            .iter()
            .map(|s| estimated_speech_secs(&s.narration))
            .sum(),
        narrated_scenes: narrated.len(),
    }
}

#[async_trait]
impl Stage for ScriptStage {
    fn kind(&self) -> StageKind {
        StageKind::Script
    }

    #[tracing::instrument(level = "info", name = "script_stage", skip_all)]
    async fn run(&self, ctx: &mut PipelineContext, events: &EventBus) -> ReelResult<StageReport> {
        let mut set = require_set(ctx)?.clone();
        let mut report = StageReport::default();
        let cfg = &ctx.config.script;

        if cfg.enhance {
            let target = cfg
                .translation_target()
                .map(|t| (cfg.source_language.as_str(), t));
            let total: usize = set
                .videos
                .iter()
                .map(|v| v.scenes.iter().filter(|s| s.has_narration()).count())
                .sum();
            let mut done = 0;
            for video in &mut set.videos {
                for scene in &mut video.scenes {
                    if !scene.has_narration() {
                        continue;
                    }
                    let text = self.rewrite(scene, target, &mut report).await?;
                    scene.narration = text;
                    done += 1;
                    events.emit(PipelineEvent::StageProgress {
                        stage: StageKind::Script,
                        done,
                        total,
                        item: format!("{}/{}", video.video_id, scene.id),
                    });
                }
            }
        } else {
            tracing::debug!("narration enhancement disabled");
        }

        let mut all_stats = BTreeMap::new();
        for video in &set.videos {
            let s = stats(&video.scenes);
            tracing::info!(
                video = %video.video_id,
                words = s.words,
                estimated_secs = s.estimated_secs,
                narrated = s.narrated_scenes,
                "narration ready"
            );
            all_stats.insert(video.video_id.clone(), s);
        }

        ctx.video_set = Some(set);
        ctx.script_stats = all_stats;
        Ok(report)
    }
}
