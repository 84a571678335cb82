use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use uuid::Uuid;

use crate::{
    adapters::InputSource,
    collab::{ChatEnhancer, CommandSynthesizer, LocalEnhancer, NarrationEnhancer, SpeechSynthesizer},
    encode::{FfmpegEncoder, VideoEncoder},
    facade::block_on,
    foundation::config::{EnhancerBackend, PipelineConfig, ScriptConfig},
    foundation::error::{ReelError, ReelResult},
    pipeline::context::{PipelineContext, RunState},
    pipeline::events::{EventBus, PipelineEvent},
    pipeline::stage::{Stage, StageError, StageKind, StageResult, StageStatus},
    pipeline::state::{RunRecord, RunSummary, StateStore},
    pipeline::stages::{AudioStage, InputStage, OutputStage, RenderStage, ScriptStage, write_json},
    render::registry::SceneRenderer,
};

/// Cooperative cancellation flag shared with a running pipeline.
///
/// Checked before each stage; a stage already running finishes first. A cancellation applies to
/// the run in progress, or to the next one when none is running, and is cleared when that run
/// ends.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Enhancer named by `cfg.enhancer`; the local one when the chat client cannot be built.
pub fn enhancer_for(cfg: &ScriptConfig) -> Arc<dyn NarrationEnhancer> {
    match cfg.enhancer {
        EnhancerBackend::Local => Arc::new(LocalEnhancer),
        EnhancerBackend::Chat => match ChatEnhancer::from_config(&cfg.chat) {
            Ok(chat) => Arc::new(chat),
            Err(e) => {
                tracing::warn!(error = %e, "chat enhancer unavailable, using the local one");
                Arc::new(LocalEnhancer)
            }
        },
    }
}

/// Runs Input → Script → Audio → Render → Output against one context.
///
/// Recoverable stage errors are retried per the stage's [`RetryPolicy`]; any other error (or an
/// exhausted retry budget) aborts the run. The context keeps every artifact produced before the
/// failing stage.
///
/// [`RetryPolicy`]: crate::foundation::config::RetryPolicy
#[derive(Clone)]
pub struct Orchestrator {
    config: PipelineConfig,
    tts: Arc<dyn SpeechSynthesizer>,
    enhancer: Arc<dyn NarrationEnhancer>,
    encoder: Arc<dyn VideoEncoder>,
    renderer: Arc<SceneRenderer>,
    events: EventBus,
    cancel: CancelHandle,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("tts", &self.tts.name())
            .field("enhancer", &self.enhancer.name())
            .field("encoder", &self.encoder.name())
            .field("output_dir", &self.config.output_dir)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Orchestrator with the production collaborators: edge-tts, the configured enhancer and
    /// ffmpeg.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            tts: Arc::new(CommandSynthesizer::edge_tts()),
            enhancer: enhancer_for(&config.script),
            config,
            encoder: Arc::new(FfmpegEncoder::default()),
            renderer: Arc::new(SceneRenderer::new()),
            events: EventBus::default(),
            cancel: CancelHandle::default(),
        }
    }

    pub fn with_tts(mut self, tts: Arc<dyn SpeechSynthesizer>) -> Self {
        self.tts = tts;
        self
    }

    pub fn with_enhancer(mut self, enhancer: Arc<dyn NarrationEnhancer>) -> Self {
        self.enhancer = enhancer;
        self
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn VideoEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<SceneRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run records of this orchestrator's output directory.
    pub fn state_store(&self) -> StateStore {
        StateStore::for_output(&self.config.output_dir)
    }

    /// Receiver for the events of subsequent runs.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    fn stages(&self) -> Vec<Box<dyn Stage>> {
        vec![
            Box::new(InputStage),
            Box::new(ScriptStage::new(Arc::clone(&self.enhancer))),
            Box::new(AudioStage::new(Arc::clone(&self.tts))),
            Box::new(RenderStage::new(Arc::clone(&self.renderer))),
            Box::new(OutputStage::new(Arc::clone(&self.encoder))),
        ]
    }

    /// Run every stage on `source`.
    ///
    /// Never fails: the outcome is the returned context's [`RunState`].
    #[tracing::instrument(level = "info", name = "pipeline", skip_all, fields(source = %source.describe()))]
    pub async fn run(&self, source: InputSource) -> PipelineContext {
        let ctx = PipelineContext::new(self.config.clone(), source);
        self.execute(ctx).await
    }

    /// Continue a saved run from its first stage that has not succeeded.
    ///
    /// Fails when no record of `run_id` exists or the run already completed. The saved
    /// configuration is used; collaborators are this orchestrator's.
    #[tracing::instrument(level = "info", name = "pipeline", skip(self))]
    pub async fn resume(&self, run_id: Uuid) -> ReelResult<PipelineContext> {
        let record = self.state_store().load(run_id).await?;
        if !record.can_resume() {
            return Err(ReelError::validation(format!(
                "run {run_id} already completed"
            )));
        }
        tracing::info!(%run_id, next = ?record.next_stage(), "resuming run");
        let mut ctx = record.into_context();
        ctx.state = RunState::Pending;
        Ok(self.execute(ctx).await)
    }

    /// Saved runs, most recent first.
    pub async fn list_runs(&self) -> ReelResult<Vec<RunSummary>> {
        self.state_store().list().await
    }

    /// Delete run records not updated within `max_age`.
    pub async fn cleanup_runs(&self, max_age: chrono::Duration) -> ReelResult<usize> {
        self.state_store().cleanup_older_than(max_age).await
    }

    /// Blocking [`Orchestrator::run`] through the synchronous façade.
    pub fn run_blocking(&self, source: InputSource) -> ReelResult<PipelineContext> {
        let this = self.clone();
        block_on(async move { Ok(this.run(source).await) })
    }

    /// Blocking [`Orchestrator::resume`] through the synchronous façade.
    pub fn resume_blocking(&self, run_id: Uuid) -> ReelResult<PipelineContext> {
        let this = self.clone();
        block_on(async move { this.resume(run_id).await })
    }

    async fn execute(&self, mut ctx: PipelineContext) -> PipelineContext {
        self.events.emit(PipelineEvent::PipelineStarted {
            run_id: ctx.run_id,
            source: ctx.source.describe(),
        });

        if let Err(e) = ctx.config.validate() {
            self.abort(&mut ctx, StageKind::Input, &e);
        } else {
            for stage in self.stages() {
                let kind = stage.kind();
                if ctx.stage_succeeded(kind) {
                    self.events.emit(PipelineEvent::StageSkipped { stage: kind });
                    continue;
                }
                if self.cancel.is_cancelled() {
                    let e = ReelError::cancelled(format!("cancelled before {}", kind.label()));
                    self.abort(&mut ctx, kind, &e);
                    break;
                }
                if let Err(e) = self.prepare(kind, &mut ctx).await {
                    self.abort(&mut ctx, kind, &e);
                    break;
                }
                if let Err(e) = self.run_stage(stage.as_ref(), &mut ctx).await {
                    self.abort(&mut ctx, kind, &e);
                    break;
                }
                self.checkpoint(&ctx).await;
            }
        }

        if !ctx.state.is_terminal() {
            ctx.state = RunState::Completed;
            self.events
                .emit(PipelineEvent::PipelineCompleted { run_id: ctx.run_id });
        }
        self.cancel.clear();
        self.checkpoint(&ctx).await;
        let report_path = ctx.config.output_dir.join("pipeline_report.json");
        match write_json(&report_path, &ctx.report()).await {
            Ok(()) => {
                if !ctx.artifacts.contains(&report_path) {
                    ctx.artifacts.push(report_path);
                }
            }
            Err(e) => tracing::warn!(error = %e, "pipeline report not written"),
        }
        ctx
    }

    /// Rebuild in-memory state a resumed run needs before `stage`.
    async fn prepare(&self, stage: StageKind, ctx: &mut PipelineContext) -> ReelResult<()> {
        if stage == StageKind::Output
            && ctx.sequences.is_empty()
            && ctx.stage_succeeded(StageKind::Render)
        {
            RenderStage::new(Arc::clone(&self.renderer))
                .restore_sequences(ctx)
                .await?;
        }
        Ok(())
    }

    /// Persist `ctx` for [`Orchestrator::resume`]. A failed write only loses resumability.
    async fn checkpoint(&self, ctx: &PipelineContext) {
        let store = StateStore::for_output(&ctx.config.output_dir);
        if let Err(e) = store.save(&RunRecord::from_context(ctx)).await {
            tracing::warn!(run_id = %ctx.run_id, error = %e, "run state not saved");
        }
    }

    async fn run_stage(&self, stage: &dyn Stage, ctx: &mut PipelineContext) -> ReelResult<()> {
        let kind = stage.kind();
        let policy = ctx.config.retry_for(kind);
        ctx.state = RunState::Running { stage: kind };
        self.events.emit(PipelineEvent::StageStarted { stage: kind });

        let started = Instant::now();
        let mut attempt = 1;
        loop {
            match stage.run(ctx, &self.events).await {
                Ok(report) => {
                    let duration_ms = started.elapsed().as_millis() as u64;
                    ctx.warnings.extend(report.warnings.iter().cloned());
                    ctx.artifacts.extend(report.artifacts.iter().cloned());
                    ctx.stage_results.push(StageResult {
                        stage: kind,
                        status: StageStatus::Succeeded,
                        attempts: attempt,
                        duration_ms,
                        error: None,
                        warnings: report.warnings,
                        artifacts: report.artifacts,
                    });
                    self.events.emit(PipelineEvent::StageCompleted {
                        stage: kind,
                        duration_ms,
                    });
                    return Ok(());
                }
                Err(e) if e.is_recoverable() && attempt < policy.max_attempts => {
                    self.events.emit(PipelineEvent::StageRetrying {
                        stage: kind,
                        attempt,
                        error: e.to_string(),
                    });
                    tokio::time::sleep(policy.delay_before(attempt)).await;
                    attempt += 1;
                }
                Err(e) => {
                    ctx.stage_results.push(StageResult {
                        stage: kind,
                        status: StageStatus::Failed,
                        attempts: attempt,
                        duration_ms: started.elapsed().as_millis() as u64,
                        error: Some(StageError::from(&e)),
                        warnings: Vec::new(),
                        artifacts: Vec::new(),
                    });
                    return Err(e);
                }
            }
        }
    }

    fn abort(&self, ctx: &mut PipelineContext, stage: StageKind, e: &ReelError) {
        self.events.emit(PipelineEvent::StageFailed {
            stage,
            kind: e.kind(),
            error: e.to_string(),
        });
        self.events.emit(PipelineEvent::PipelineFailed {
            run_id: ctx.run_id,
            stage,
            error: e.to_string(),
        });
        ctx.state = RunState::Aborted {
            stage,
            kind: e.kind(),
            error: e.to_string(),
        };
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/orchestrator.rs"]
mod tests;
