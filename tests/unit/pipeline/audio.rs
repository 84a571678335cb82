use std::time::Duration;

use super::*;
use crate::adapters::{InputSource, ProgrammaticSource};
use crate::collab::tts::{wav_duration, write_silent_wav};
use crate::foundation::config::PipelineConfig;
use crate::scene::model::{SceneContent, TitleContent};

/// Speaks each narration as `<n>` seconds of silence, answering later for shorter texts so
/// completion order is the reverse of request order.
struct ReversedLatencyTts;

#[async_trait]
impl SpeechSynthesizer for ReversedLatencyTts {
    fn name(&self) -> &str {
        "reversed"
    }

    async fn synthesize(
        &self,
        text: &str,
        _voice_id: &str,
        out_path: &Path,
    ) -> ReelResult<SynthesizedAudio> {
        let secs: f64 = text.parse().map_err(|_| ReelError::validation("not a number"))?;
        tokio::time::sleep(Duration::from_millis((10.0 - secs) as u64 * 15)).await;
        write_silent_wav(out_path, secs, 8_000)?;
        Ok(SynthesizedAudio {
            audio_file: out_path.to_path_buf(),
            duration_secs: secs,
        })
    }
}

struct DownTts;

#[async_trait]
impl SpeechSynthesizer for DownTts {
    fn name(&self) -> &str {
        "down"
    }

    async fn synthesize(&self, _: &str, _: &str, out_path: &Path) -> ReelResult<SynthesizedAudio> {
        // Leave a partial file behind like a crashed backend would.
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        std::fs::write(out_path, b"partial").ok();
        Err(ReelError::unavailable("tts backend offline"))
    }
}

fn title(id: &str, narration: &str) -> Scene {
    Scene::new(
        id,
        SceneContent::Title(TitleContent {
            title: id.to_string(),
            subtitle: String::new(),
        }),
    )
    .with_narration(narration)
    .with_durations(1.0, 20.0)
}

fn context(dir: &Path, set: VideoSet) -> PipelineContext {
    let config = PipelineConfig {
        output_dir: dir.to_path_buf(),
        audio: AudioConfig {
            padding_secs: 0.5,
            max_concurrency: 8,
            placeholder_sample_rate: 8_000,
            request_timeout_secs: 10,
        },
        ..PipelineConfig::default()
    };
    let mut ctx = PipelineContext::new(
        config,
        InputSource::Programmatic(ProgrammaticSource::Set(set.clone())),
    );
    ctx.video_set = Some(set);
    ctx
}

fn demo_set() -> VideoSet {
    let mut set = VideoSet::new("demo", "Demo");
    set.videos.push(
        Video::new("first", "First")
            .with_scene(title("s1", "5"))
            .with_scene(title("s2", "4"))
            .with_scene(title("s3", ""))
            .with_scene(title("s4", "2")),
    );
    set.videos
        .push(Video::new("second", "Second").with_scene(title("s1", "1")));
    set
}

#[tokio::test]
async fn results_follow_scene_identity_not_completion_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path(), demo_set());
    let stage = AudioStage::new(Arc::new(ReversedLatencyTts));

    let report = stage.run(&mut ctx, &EventBus::default()).await.unwrap();
    assert!(report.warnings.is_empty());

    for (video, scene, secs) in [("first", "s1", 5.0), ("first", "s2", 4.0), ("first", "s4", 2.0), ("second", "s1", 1.0)] {
        let audio = ctx.scene_audio(video, scene).unwrap();
        let file = audio.audio_file.as_ref().unwrap();
        assert!(file.ends_with(format!("{video}/audio/{scene}.wav")));
        assert!((wav_duration(file).unwrap() - secs).abs() < 1e-6);
        assert!((audio.duration - (secs + 0.5)).abs() < 1e-9);
        assert!(!audio.placeholder);
    }

    let silent = ctx.scene_audio("first", "s3").unwrap();
    assert!(silent.audio_file.is_none());
    assert_eq!(silent.duration, 1.0);
}

#[tokio::test]
async fn failed_synthesis_falls_back_to_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path(), demo_set());
    let stage = AudioStage::new(Arc::new(DownTts));

    let report = stage.run(&mut ctx, &EventBus::default()).await.unwrap();
    assert_eq!(report.warnings.len(), 4);

    let audio = ctx.scene_audio("first", "s2").unwrap();
    assert!(audio.placeholder);
    assert_eq!(audio.duration, 1.0);
    let file = audio.audio_file.as_ref().unwrap();
    assert!(file.ends_with("first/audio/s2_placeholder.wav"));
    assert!((wav_duration(file).unwrap() - 1.0).abs() < 1e-6);
    assert!(!dir.path().join("first/audio/s2.wav").exists());
}

#[tokio::test]
async fn writes_a_timing_report_per_video() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path(), demo_set());
    let stage = AudioStage::new(Arc::new(ReversedLatencyTts));
    let report = stage.run(&mut ctx, &EventBus::default()).await.unwrap();

    let path = dir.path().join("first/audio/timing_report.json");
    assert!(report.artifacts.contains(&path));
    let json: serde_json::Value = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
    let ids: Vec<&str> = json["scenes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["scene_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["s1", "s2", "s3", "s4"]);
    assert!((json["total_duration"].as_f64().unwrap() - 13.5).abs() < 1e-9);
}

#[test]
fn voices_rotate_over_narrated_scenes() {
    let mut set = VideoSet::new("demo", "Demo");
    set.defaults.voice = Some("female".into());
    let mut video = Video::new("v", "V");
    video.voices = vec!["male".into(), "female".into()];
    let plain = title("a", "hello");
    let pinned = title("b", "hello").with_voice("male_warm");

    assert_eq!(voice_for(&plain, 0, &video, &set), "male");
    assert_eq!(voice_for(&plain, 1, &video, &set), "female");
    assert_eq!(voice_for(&plain, 2, &video, &set), "male");
    assert_eq!(voice_for(&pinned, 1, &video, &set), "male_warm");

    video.voices.clear();
    assert_eq!(voice_for(&plain, 0, &video, &set), "female");
    set.defaults.voice = None;
    assert_eq!(voice_for(&plain, 0, &video, &set), DEFAULT_VOICE);
}
