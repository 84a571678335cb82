use std::path::Path;

use image::RgbImage;

use super::*;
use crate::adapters::{InputSource, ProgrammaticSource};
use crate::encode::RecordingEncoder;
use crate::foundation::config::PipelineConfig;
use crate::pipeline::context::SceneAudio;
use crate::pipeline::stages::render::layout_video;
use crate::render::{Ease, KeyframePair};
use crate::scene::model::{Scene, SceneContent, TitleContent, Video, VideoSet};

fn scene(id: &str) -> Scene {
    Scene::new(
        id,
        SceneContent::Title(TitleContent {
            title: id.into(),
            subtitle: String::new(),
        }),
    )
    .with_durations(1.0, 5.0)
}

/// Context as the render stage leaves it, with narration on every scene but the first.
fn rendered_context(dir: &Path) -> PipelineContext {
    let mut set = VideoSet::new("set", "Set");
    for id in ["alpha", "beta"] {
        set.videos.push(
            Video::new(id, format!("Video {id}"))
                .with_scene(scene("a"))
                .with_scene(scene("b"))
                .with_scene(scene("c")),
        );
    }
    let config = PipelineConfig {
        output_dir: dir.to_path_buf(),
        fps: 10,
        ..PipelineConfig::default()
    };
    let fps = config.fps().unwrap();
    let mut ctx = PipelineContext::new(
        config,
        InputSource::Programmatic(ProgrammaticSource::Set(set.clone())),
    );
    let pair = Arc::new(KeyframePair {
        start: RgbImage::new(2, 2),
        end: RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3])),
    });
    for video in &set.videos {
        let rendered = ["a", "b", "c"]
            .iter()
            .map(|id| (id.to_string(), Arc::clone(&pair)))
            .collect();
        let (seq, timing) = layout_video(
            &video.video_id,
            rendered,
            |id| {
                Some(SceneAudio {
                    scene_id: id.to_string(),
                    audio_file: (id != "a").then(|| dir.join(format!("{id}.wav"))),
                    duration: 2.0,
                    placeholder: false,
                    voice: None,
                })
            },
            |_| 1.0,
            fps,
            0.5,
            Ease::Linear,
        );
        ctx.sequences.insert(video.video_id.clone(), seq);
        ctx.timings.insert(video.video_id.clone(), timing);
    }
    ctx.video_set = Some(set);
    ctx
}

#[test]
fn audio_tracks_start_at_their_scene() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = rendered_context(dir.path());
    let tracks = audio_tracks(&ctx.timings["alpha"], Fps::new(10, 1).unwrap());
    let placed: Vec<(&str, f64)> = tracks
        .iter()
        .map(|t| (t.scene_id.as_str(), t.start_secs))
        .collect();
    assert_eq!(placed, [("b", 2.0), ("c", 4.0)]);
}

#[tokio::test]
async fn encodes_every_video_and_writes_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = rendered_context(dir.path());
    let encoder = Arc::new(RecordingEncoder::new());
    let stage = OutputStage::new(encoder.clone());

    let report = stage.run(&mut ctx, &EventBus::default()).await.unwrap();
    assert!(report.warnings.is_empty());
    assert_eq!(ctx.outputs.len(), 2);

    let jobs = encoder.jobs();
    assert_eq!(jobs[0].video_id, "alpha");
    assert_eq!(jobs[0].scene_ids, ["a", "b", "c"]);
    assert_eq!(jobs[0].frame_count, 60);
    assert_eq!(jobs[0].audio.len(), 2);

    let artifact = &ctx.outputs["beta"];
    assert_eq!(artifact.path, dir.path().join("beta/beta.txt"));
    let meta: serde_json::Value = serde_json::from_slice(
        &std::fs::read(dir.path().join("beta/beta_metadata.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(meta["title"], "Video beta");
    assert_eq!(meta["scene_count"], 3);
    assert_eq!(meta["frame_count"], 60);
    assert_eq!(meta["encoder"], "recording");
    assert!(meta["generated_at"].as_str().unwrap().contains('T'));
}

#[tokio::test]
async fn one_failed_video_does_not_fail_the_stage() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = rendered_context(dir.path());
    let stage = OutputStage::new(Arc::new(RecordingEncoder::new().failing_for("alpha")));

    let report = stage.run(&mut ctx, &EventBus::default()).await.unwrap();
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("alpha"));
    assert!(ctx.outputs.contains_key("beta"));
    assert!(!ctx.outputs.contains_key("alpha"));
    assert!(!dir.path().join("alpha/alpha_metadata.json").exists());
}

#[tokio::test]
async fn all_failed_videos_fail_the_stage() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = rendered_context(dir.path());
    let encoder = RecordingEncoder::new().failing_for("alpha").failing_for("beta");
    let stage = OutputStage::new(Arc::new(encoder));

    let err = stage.run(&mut ctx, &EventBus::default()).await.unwrap_err();
    assert!(matches!(err, ReelError::Encoding(_)));
    // Each video's own failure is part of the stage error.
    let msg = err.to_string();
    assert!(msg.contains("configured to fail 'alpha'"), "{msg}");
    assert!(msg.contains("configured to fail 'beta'"), "{msg}");
    assert!(ctx.outputs.is_empty());
}
