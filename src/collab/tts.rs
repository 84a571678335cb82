//! Text-to-speech collaborator and WAV helpers.

use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use async_trait::async_trait;

use crate::{
    foundation::error::{ReelError, ReelResult},
    scene::narration::estimated_speech_secs,
};

/// Voice used when neither the scene, the video nor the set names one.
pub const DEFAULT_VOICE: &str = "male";

/// Named voices and the TTS voice ids they stand for.
pub const VOICE_MAP: [(&str, &str); 4] = [
    ("male", "en-US-AndrewMultilingualNeural"),
    ("male_warm", "en-US-BrandonMultilingualNeural"),
    ("female", "en-US-AriaNeural"),
    ("female_friendly", "en-US-AvaMultilingualNeural"),
];

/// TTS voice id for a named voice; unknown names pass through unchanged.
pub fn resolve_voice(name: &str) -> &str {
    VOICE_MAP
        .iter()
        .find(|(alias, _)| *alias == name)
        .map_or(name, |(_, id)| id)
}

/// A finished synthesis request.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthesizedAudio {
    pub audio_file: PathBuf,
    pub duration_secs: f64,
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn name(&self) -> &str;

    /// Extension of the files this backend writes, without the dot.
    fn extension(&self) -> &str {
        "wav"
    }

    /// Speak `text` with `voice_id` into `out_path`.
    ///
    /// Any backend failure should surface as `CollaboratorUnavailable`.
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        out_path: &Path,
    ) -> ReelResult<SynthesizedAudio>;
}

/// Runs an external TTS program once per request.
///
/// Argument templates may contain `{text}`, `{voice}` and `{out}`.
#[derive(Clone, Debug)]
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
    extension: String,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            extension: "wav".to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// `edge-tts --voice {voice} --text {text} --write-media {out}`.
    pub fn edge_tts() -> Self {
        Self::new(
            "edge-tts",
            ["--voice", "{voice}", "--text", "{text}", "--write-media", "{out}"]
                .map(String::from)
                .to_vec(),
        )
        .with_extension("mp3")
    }

    fn expand(&self, text: &str, voice_id: &str, out_path: &Path) -> Vec<String> {
        let out = out_path.display().to_string();
        self.args
            .iter()
            .map(|a| {
                a.replace("{voice}", voice_id)
                    .replace("{out}", &out)
                    .replace("{text}", text)
            })
            .collect()
    }
}

impl Default for CommandSynthesizer {
    fn default() -> Self {
        Self::edge_tts()
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    fn name(&self) -> &str {
        &self.program
    }

    fn extension(&self) -> &str {
        &self.extension
    }

    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        out_path: &Path,
    ) -> ReelResult<SynthesizedAudio> {
        if let Some(parent) = out_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                anyhow::Error::new(e).context(format!("create '{}'", parent.display()))
            })?;
        }
        let output = tokio::process::Command::new(&self.program)
            .args(self.expand(text, voice_id, out_path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ReelError::unavailable(format!("failed to run {}: {e}", self.program)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReelError::unavailable(format!(
                "{} exited with status {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let size = tokio::fs::metadata(out_path).await.map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            return Err(ReelError::unavailable(format!(
                "{} produced no audio at {}",
                self.program,
                out_path.display()
            )));
        }
        let duration_secs = measure_duration(out_path).await?;
        Ok(SynthesizedAudio {
            audio_file: out_path.to_path_buf(),
            duration_secs,
        })
    }
}

/// Offline backend: writes silence as long as the narration would take to speak.
#[derive(Clone, Copy, Debug)]
pub struct SilentSynthesizer {
    pub sample_rate: u32,
}

impl Default for SilentSynthesizer {
    fn default() -> Self {
        Self {
            sample_rate: 24_000,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for SilentSynthesizer {
    fn name(&self) -> &str {
        "silent"
    }

    async fn synthesize(
        &self,
        text: &str,
        _voice_id: &str,
        out_path: &Path,
    ) -> ReelResult<SynthesizedAudio> {
        let secs = estimated_speech_secs(text);
        write_silence(out_path.to_path_buf(), secs, self.sample_rate).await?;
        Ok(SynthesizedAudio {
            audio_file: out_path.to_path_buf(),
            duration_secs: wav_duration(out_path)?,
        })
    }
}

/// [`write_silent_wav`] on the blocking pool.
pub async fn write_silence(path: PathBuf, secs: f64, sample_rate: u32) -> ReelResult<()> {
    tokio::task::spawn_blocking(move || write_silent_wav(&path, secs, sample_rate))
        .await
        .map_err(|e| ReelError::Other(anyhow::anyhow!("silent audio writer failed: {e}")))?
}

/// Write a mono 16-bit WAV of `secs` seconds of silence.
pub fn write_silent_wav(path: &Path, secs: f64, sample_rate: u32) -> ReelResult<()> {
    if sample_rate == 0 {
        return Err(ReelError::validation("sample rate must be > 0"));
    }
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create '{}'", parent.display()))?;
    }
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let samples = (secs.max(0.0) * f64::from(sample_rate)).round() as u64;
    let wav_err = |e: hound::Error| {
        ReelError::Other(anyhow::anyhow!("write wav '{}': {e}", path.display()))
    };
    let mut writer = hound::WavWriter::create(path, spec).map_err(wav_err)?;
    for _ in 0..samples {
        writer.write_sample(0i16).map_err(wav_err)?;
    }
    writer.finalize().map_err(wav_err)
}

/// Duration of a WAV file from its header.
pub fn wav_duration(path: &Path) -> ReelResult<f64> {
    let reader = hound::WavReader::open(path).map_err(|e| {
        ReelError::Other(anyhow::anyhow!("read wav '{}': {e}", path.display()))
    })?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(ReelError::validation(format!(
            "wav '{}' has a zero sample rate",
            path.display()
        )));
    }
    Ok(f64::from(reader.duration()) / f64::from(spec.sample_rate))
}

/// Duration of any audio file: WAV headers directly, other formats through `ffprobe`.
pub async fn measure_duration(path: &Path) -> ReelResult<f64> {
    let is_wav = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
    if is_wav {
        return wav_duration(path);
    }

    let output = tokio::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| ReelError::unavailable(format!("failed to run ffprobe: {e}")))?;
    if !output.status.success() {
        return Err(ReelError::unavailable(format!(
            "ffprobe failed on '{}': {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    let text = String::from_utf8_lossy(&output.stdout);
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| {
            ReelError::unavailable(format!(
                "ffprobe returned no duration for '{}'",
                path.display()
            ))
        })
}

#[cfg(test)]
#[path = "../../tests/unit/collab/tts.rs"]
mod tests;
