use async_trait::async_trait;

use crate::{
    adapters::adapt,
    foundation::error::ReelResult,
    pipeline::context::PipelineContext,
    pipeline::events::EventBus,
    pipeline::stage::{Stage, StageKind, StageReport},
};

/// Adapts the run's source into a validated video set.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputStage;

#[async_trait]
impl Stage for InputStage {
    fn kind(&self) -> StageKind {
        StageKind::Input
    }

    #[tracing::instrument(level = "info", name = "input_stage", skip_all)]
    async fn run(&self, ctx: &mut PipelineContext, _events: &EventBus) -> ReelResult<StageReport> {
        let set = adapt(&ctx.source, &ctx.config.adapt).await?;
        tracing::info!(
            set = %set.set_id,
            videos = set.videos.len(),
            scenes = set.scene_count(),
            "input adapted"
        );
        ctx.video_set = Some(set);
        Ok(StageReport::default())
    }
}
