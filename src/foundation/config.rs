use std::{collections::BTreeMap, path::Path, path::PathBuf, time::Duration};

use anyhow::Context as _;

use crate::{
    foundation::core::{Fps, Rgb8},
    foundation::error::{ReelError, ReelResult},
    pipeline::stage::StageKind,
    render::interpolate::Ease,
};

/// Run configuration threaded through the pipeline context.
///
/// Every field has a default, so a partial JSON file is a valid configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root directory for every artifact of the run.
    pub output_dir: PathBuf,
    /// Output frame rate (frames per second).
    pub fps: u32,
    /// Length of each scene's entrance animation, in seconds.
    pub anim_duration_secs: f64,
    /// Options forwarded to the input adapters.
    pub adapt: AdaptOptions,
    /// Script generation stage settings.
    pub script: ScriptConfig,
    /// Audio generation stage settings.
    pub audio: AudioConfig,
    /// Video rendering stage settings.
    pub render: RenderConfig,
    /// Retry policy used by stages without an override.
    pub retry: RetryPolicy,
    /// Per-stage retry overrides.
    pub stage_retry: BTreeMap<StageKind, RetryPolicy>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            fps: 30,
            anim_duration_secs: 1.0,
            adapt: AdaptOptions::default(),
            script: ScriptConfig::default(),
            audio: AudioConfig::default(),
            render: RenderConfig::default(),
            retry: RetryPolicy::default(),
            stage_retry: BTreeMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Read a JSON configuration file.
    pub fn from_json_file(path: &Path) -> ReelResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> ReelResult<()> {
        Fps::new(self.fps, 1)?;
        if !self.anim_duration_secs.is_finite() || self.anim_duration_secs < 0.0 {
            return Err(ReelError::validation(
                "anim_duration_secs must be finite and >= 0",
            ));
        }
        if self.audio.max_concurrency == 0 {
            return Err(ReelError::validation("audio.max_concurrency must be > 0"));
        }
        if !self.audio.padding_secs.is_finite() || self.audio.padding_secs < 0.0 {
            return Err(ReelError::validation(
                "audio.padding_secs must be finite and >= 0",
            ));
        }
        if self.adapt.max_scenes < 2 {
            return Err(ReelError::validation(
                "adapt.max_scenes must be >= 2 (title and outro)",
            ));
        }
        if let Some(target) = self.adapt.target_duration
            && (!target.is_finite() || target <= 0.0)
        {
            return Err(ReelError::validation("adapt.target_duration must be > 0"));
        }
        if self.script.chat.timeout_secs == 0 {
            return Err(ReelError::validation("script.chat.timeout_secs must be > 0"));
        }
        if let Some(0) = self.render.threads {
            return Err(ReelError::validation("render.threads must be >= 1 when set"));
        }
        self.retry.validate()?;
        for policy in self.stage_retry.values() {
            policy.validate()?;
        }
        Ok(())
    }

    pub fn fps(&self) -> ReelResult<Fps> {
        Fps::new(self.fps, 1)
    }

    /// Retry policy for `stage`, falling back to the global policy.
    pub fn retry_for(&self, stage: StageKind) -> RetryPolicy {
        self.stage_retry
            .get(&stage)
            .copied()
            .unwrap_or(self.retry)
    }
}

/// Options shared by the input adapters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AdaptOptions {
    /// Upper bound on scenes per video produced by the document adapter (title and outro included).
    pub max_scenes: usize,
    /// Desired video length in seconds; shrinks the document adapter's content budget.
    pub target_duration: Option<f64>,
    /// Document adapter: one video per level-2 heading group.
    pub split_by_h2: bool,
    /// Accent color override applied to every adapted video.
    pub accent_color: Option<Rgb8>,
    /// Voice override applied to every adapted scene.
    pub voice: Option<String>,
    /// Derive narration from scene fields when a structured-config scene has none.
    pub auto_narration: bool,
    /// Explicit video id for single-video sources.
    pub video_id: Option<String>,
}

impl Default for AdaptOptions {
    fn default() -> Self {
        Self {
            max_scenes: 8,
            target_duration: None,
            split_by_h2: false,
            accent_color: None,
            voice: None,
            auto_narration: true,
            video_id: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Rewrite narration through the enhancement collaborator.
    pub enhance: bool,
    pub source_language: String,
    /// Translate narration when this differs from `source_language`.
    pub target_language: Option<String>,
    /// Which enhancement backend the default orchestrator builds.
    pub enhancer: EnhancerBackend,
    /// Settings of the chat-completions backend.
    pub chat: ChatConfig,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            enhance: false,
            source_language: "en".to_string(),
            target_language: None,
            enhancer: EnhancerBackend::Local,
            chat: ChatConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhancerBackend {
    /// In-process tidying, no translation.
    #[default]
    Local,
    /// OpenAI-compatible chat-completions endpoint.
    Chat,
}

/// Connection settings of an OpenAI-compatible chat-completions service.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// API root; `/chat/completions` is appended.
    pub base_url: String,
    pub model: String,
    /// Key used as a bearer token. Never written back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Environment variable read when `api_key` is unset.
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4.1-mini".to_string(),
            api_key: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
            max_tokens: 500,
            temperature: 0.4,
        }
    }
}

impl ChatConfig {
    /// Configured key, else the value of `api_key_env`. Blank keys count as missing.
    pub fn resolve_api_key(&self) -> Option<String> {
        let usable = |k: &String| !k.trim().is_empty();
        self.api_key
            .clone()
            .filter(usable)
            .or_else(|| std::env::var(&self.api_key_env).ok().filter(usable))
    }
}

impl ScriptConfig {
    /// Target language when translation is required.
    pub fn translation_target(&self) -> Option<&str> {
        self.target_language
            .as_deref()
            .filter(|t| !t.eq_ignore_ascii_case(&self.source_language))
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Seconds of silence added after synthesized speech before clamping.
    pub padding_secs: f64,
    /// Maximum number of concurrent synthesis requests.
    pub max_concurrency: usize,
    /// Sample rate of silent placeholder tracks.
    pub placeholder_sample_rate: u32,
    /// Per-request timeout; a timed out request counts as unavailable.
    pub request_timeout_secs: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            padding_secs: 1.0,
            max_concurrency: 4,
            placeholder_sample_rate: 24_000,
            request_timeout_secs: 120,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Abort the stage on the first scene that fails to render.
    pub fail_fast: bool,
    /// Also write each scene's keyframes as PNG files.
    pub write_keyframes: bool,
    /// Worker threads for scene rendering (`None` = rayon default).
    pub threads: Option<usize>,
    /// Easing of the entrance animation between keyframes.
    pub ease: Ease,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before each retry, multiplied by the attempt number.
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 200,
        }
    }
}

impl RetryPolicy {
    pub fn validate(&self) -> ReelResult<()> {
        if self.max_attempts == 0 {
            return Err(ReelError::validation("retry max_attempts must be >= 1"));
        }
        Ok(())
    }

    pub fn delay_before(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_ms.saturating_mul(u64::from(attempt)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
