use super::*;

#[test]
fn named_voices_map_to_tts_ids() {
    assert_eq!(resolve_voice("male"), "en-US-AndrewMultilingualNeural");
    assert_eq!(resolve_voice("female_friendly"), "en-US-AvaMultilingualNeural");
    assert_eq!(resolve_voice("de-DE-KatjaNeural"), "de-DE-KatjaNeural");
}

#[test]
fn silent_wav_has_requested_length() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/silence.wav");
    write_silent_wav(&path, 2.5, 8_000).unwrap();
    assert!((wav_duration(&path).unwrap() - 2.5).abs() < 1e-9);

    write_silent_wav(&path, 0.0, 8_000).unwrap();
    assert_eq!(wav_duration(&path).unwrap(), 0.0);
    assert!(write_silent_wav(&path, 1.0, 0).is_err());
}

#[test]
fn argument_template_is_expanded() {
    let synth = CommandSynthesizer::edge_tts();
    let args = synth.expand("Hi {there}", "en-US-AriaNeural", Path::new("/tmp/a.mp3"));
    assert_eq!(
        args,
        vec![
            "--voice",
            "en-US-AriaNeural",
            "--text",
            "Hi {there}",
            "--write-media",
            "/tmp/a.mp3"
        ]
    );
}

#[tokio::test]
async fn missing_program_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let synth = CommandSynthesizer::new("scenereel-no-such-tts-binary", vec!["{out}".into()]);
    let err = synth
        .synthesize("hello", "male", &dir.path().join("a.wav"))
        .await
        .unwrap_err();
    assert!(err.is_recoverable(), "{err}");
}

#[tokio::test]
async fn silent_synthesizer_tracks_word_count() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("s.wav");
    let audio = SilentSynthesizer { sample_rate: 8_000 }
        .synthesize("one two three four five", "male", &out)
        .await
        .unwrap();
    assert_eq!(audio.audio_file, out);
    assert!((audio.duration_secs - 2.0).abs() < 1e-9);
}

#[tokio::test]
async fn wav_duration_is_measured_without_ffprobe() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("x.WAV");
    write_silent_wav(&path, 1.0, 16_000).unwrap();
    assert!((measure_duration(&path).await.unwrap() - 1.0).abs() < 1e-9);
}

#[tokio::test(flavor = "current_thread")]
async fn silence_is_written_off_the_async_thread() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/quiet.wav");
    write_silence(path.clone(), 1.5, 8_000).await.unwrap();
    assert!((wav_duration(&path).unwrap() - 1.5).abs() < 1e-6);
    assert!(write_silence(path, 1.0, 0).await.is_err());
}
