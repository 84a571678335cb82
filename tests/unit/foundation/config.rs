use super::*;

#[test]
fn partial_json_fills_defaults() {
    let cfg: PipelineConfig =
        serde_json::from_str(r#"{ "fps": 24, "audio": { "padding_secs": 0.5 } }"#).unwrap();
    assert_eq!(cfg.fps, 24);
    assert_eq!(cfg.audio.padding_secs, 0.5);
    assert_eq!(cfg.audio.max_concurrency, 4);
    assert_eq!(cfg.adapt.max_scenes, 8);
    assert!(cfg.adapt.auto_narration);
    cfg.validate().unwrap();
}

#[test]
fn validate_rejects_bad_values() {
    let mut cfg = PipelineConfig {
        fps: 0,
        ..PipelineConfig::default()
    };
    assert!(cfg.validate().is_err());

    cfg.fps = 30;
    cfg.adapt.max_scenes = 1;
    assert!(cfg.validate().is_err());

    cfg.adapt.max_scenes = 4;
    cfg.retry.max_attempts = 0;
    assert!(cfg.validate().is_err());

    cfg.retry.max_attempts = 1;
    cfg.audio.max_concurrency = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn stage_retry_override_wins() {
    let mut cfg = PipelineConfig::default();
    cfg.stage_retry.insert(
        StageKind::Audio,
        RetryPolicy {
            max_attempts: 7,
            backoff_ms: 0,
        },
    );
    assert_eq!(cfg.retry_for(StageKind::Audio).max_attempts, 7);
    assert_eq!(cfg.retry_for(StageKind::Render).max_attempts, 3);

    let json = serde_json::to_string(&cfg).unwrap();
    let back: PipelineConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn translation_target_ignores_same_language() {
    let mut script = ScriptConfig::default();
    assert_eq!(script.translation_target(), None);
    script.target_language = Some("EN".to_string());
    assert_eq!(script.translation_target(), None);
    script.target_language = Some("es".to_string());
    assert_eq!(script.translation_target(), Some("es"));
}

#[test]
fn from_json_file_reads_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.json");
    std::fs::write(&path, r#"{ "output_dir": "out", "render": { "fail_fast": true } }"#).unwrap();
    let cfg = PipelineConfig::from_json_file(&path).unwrap();
    assert_eq!(cfg.output_dir, PathBuf::from("out"));
    assert!(cfg.render.fail_fast);

    std::fs::write(&path, r#"{ "fps": 0 }"#).unwrap();
    assert!(PipelineConfig::from_json_file(&path).is_err());
}

#[test]
fn chat_settings_load_without_leaking_the_key() {
    let cfg: PipelineConfig = serde_json::from_str(
        r#"{ "script": { "enhance": true, "enhancer": "chat",
             "chat": { "model": "narrator", "api_key": "sk-secret", "api_key_env": "SCENEREEL_UNSET_KEY_VAR" } } }"#,
    )
    .unwrap();
    assert_eq!(cfg.script.enhancer, EnhancerBackend::Chat);
    assert_eq!(cfg.script.chat.model, "narrator");
    assert_eq!(cfg.script.chat.timeout_secs, 60);
    assert_eq!(cfg.script.chat.resolve_api_key().as_deref(), Some("sk-secret"));

    let json = serde_json::to_string(&cfg).unwrap();
    assert!(!json.contains("sk-secret"));

    let mut blank = cfg.script.chat.clone();
    blank.api_key = Some("  ".to_string());
    assert_eq!(blank.resolve_api_key(), None);

    let mut bad = cfg;
    bad.script.chat.timeout_secs = 0;
    assert!(bad.validate().is_err());
}
