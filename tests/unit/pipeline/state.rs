use super::*;
use crate::adapters::{DocumentSource, InputSource};
use crate::foundation::error::ErrorKind;

fn context(dir: &Path) -> PipelineContext {
    let config = PipelineConfig {
        output_dir: dir.to_path_buf(),
        ..PipelineConfig::default()
    };
    let mut ctx = PipelineContext::new(
        config,
        InputSource::Document(DocumentSource::Text {
            text: "# Notes\n".into(),
            name: "notes".into(),
        }),
    );
    ctx.audio.insert(
        ("notes".into(), "intro".into()),
        SceneAudio {
            scene_id: "intro".into(),
            audio_file: Some(dir.join("notes/audio/intro.wav")),
            duration: 3.0,
            placeholder: false,
            voice: Some("male".into()),
        },
    );
    ctx.warnings.push("kept".into());
    ctx
}

fn result(stage: StageKind, status: StageStatus) -> StageResult {
    StageResult {
        stage,
        status,
        attempts: 1,
        duration_ms: 5,
        error: None,
        warnings: Vec::new(),
        artifacts: Vec::new(),
    }
}

#[tokio::test]
async fn saved_record_restores_the_context() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path());
    ctx.stage_results.push(result(StageKind::Input, StageStatus::Succeeded));
    let store = StateStore::for_output(dir.path());

    let path = store.save(&RunRecord::from_context(&ctx)).await.unwrap();
    assert_eq!(path, dir.path().join(".scenereel/runs").join(format!("{}.json", ctx.run_id)));
    assert!(!path.with_extension("json.tmp").exists());

    let restored = store.load(ctx.run_id).await.unwrap().into_context();
    assert_eq!(restored.run_id, ctx.run_id);
    assert_eq!(restored.source, ctx.source);
    assert_eq!(restored.config.output_dir, ctx.config.output_dir);
    assert_eq!(restored.warnings, ["kept"]);
    let audio = restored.scene_audio("notes", "intro").unwrap();
    assert_eq!(audio.voice.as_deref(), Some("male"));
    assert!(restored.sequences.is_empty());
    assert!(restored.stage_succeeded(StageKind::Input));
}

#[test]
fn next_stage_follows_pipeline_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path());
    ctx.stage_results.push(result(StageKind::Input, StageStatus::Succeeded));
    ctx.stage_results.push(result(StageKind::Script, StageStatus::Succeeded));
    ctx.stage_results.push(result(StageKind::Audio, StageStatus::Failed));
    let record = RunRecord::from_context(&ctx);
    assert_eq!(record.next_stage(), Some(StageKind::Audio));
    assert!(record.can_resume());

    for stage in [StageKind::Audio, StageKind::Render, StageKind::Output] {
        ctx.stage_results.push(result(stage, StageStatus::Succeeded));
    }
    ctx.state = RunState::Completed;
    let record = RunRecord::from_context(&ctx);
    assert_eq!(record.next_stage(), None);
    assert!(!record.can_resume());
    assert_eq!(record.summary().next_stage, None);
}

#[tokio::test]
async fn missing_record_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::for_output(dir.path());
    let err = store.load(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceNotFound);
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_is_newest_first_and_cleanup_drops_old_runs() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::for_output(dir.path());

    let mut old = RunRecord::from_context(&context(dir.path()));
    old.updated_at = Utc::now() - chrono::Duration::days(30);
    store.save(&old).await.unwrap();
    let fresh = RunRecord::from_context(&context(dir.path()));
    store.save(&fresh).await.unwrap();
    std::fs::write(store.dir().join("garbage.json"), "{ not json").unwrap();

    let runs = store.list().await.unwrap();
    let ids: Vec<Uuid> = runs.iter().map(|r| r.run_id).collect();
    assert_eq!(ids, [fresh.run_id, old.run_id]);
    assert_eq!(runs[0].source, "document:<inline notes>");
    assert_eq!(runs[0].next_stage, Some(StageKind::Input));

    let removed = store.cleanup_older_than(chrono::Duration::days(7)).await.unwrap();
    assert_eq!(removed, 1);
    assert!(!store.path(old.run_id).exists());
    assert!(store.path(fresh.run_id).exists());
}
