//! Narration enhancer backed by an OpenAI-compatible chat-completions service.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    collab::enhance::NarrationEnhancer,
    foundation::config::ChatConfig,
    foundation::error::{ReelError, ReelResult},
    scene::model::SceneType,
};

/// Words the prompts ask the model to avoid.
pub const BANNED_WORDS: [&str; 12] = [
    "powerful",
    "amazing",
    "revolutionary",
    "game-changing",
    "transform",
    "unleash",
    "empower",
    "elevate",
    "journey",
    "seamlessly",
    "effortlessly",
    "cutting-edge",
];

const SYSTEM_PROMPT: &str = "You write voice-over narration for technical educational videos. \
Answer with the narration text only: no quotes, no markdown, no explanations.";

pub struct ChatEnhancer {
    base_url: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
    temperature: f32,
    client: reqwest::Client,
}

impl std::fmt::Debug for ChatEnhancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatEnhancer")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("has_key", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl ChatEnhancer {
    /// Build from config. A missing key is not an error here: every request then reports the
    /// service as unavailable and the script stage keeps the original narration.
    pub fn from_config(cfg: &ChatConfig) -> ReelResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| ReelError::Other(anyhow::anyhow!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_key: cfg.resolve_api_key(),
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
            client,
        })
    }

    async fn complete(&self, prompt: String) -> ReelResult<String> {
        let Some(key) = &self.api_key else {
            return Err(ReelError::unavailable("chat enhancer has no API key"));
        };
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ReelError::unavailable(format!("chat request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ReelError::unavailable(format!("chat response unreadable: {e}")))?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ReelError::unavailable(format!(
                "chat service returned {status}: {message}"
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| ReelError::unavailable(format!("malformed chat response: {e}")))?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|t| clean_completion(&t))
            .unwrap_or_default();
        if text.is_empty() {
            return Err(ReelError::unavailable("chat service returned no text"));
        }
        Ok(text)
    }
}

#[async_trait]
impl NarrationEnhancer for ChatEnhancer {
    fn name(&self) -> &str {
        "chat"
    }

    #[tracing::instrument(level = "debug", skip(self, narration))]
    async fn enhance(&self, narration: &str, scene_type: SceneType) -> ReelResult<String> {
        self.complete(enhance_prompt(narration, scene_type)).await
    }

    #[tracing::instrument(level = "debug", skip(self, narration))]
    async fn translate(&self, narration: &str, source: &str, target: &str) -> ReelResult<String> {
        self.complete(translate_prompt(narration, source, target))
            .await
    }
}

/// What the viewer sees while a scene of `scene_type` is narrated.
fn scene_context(scene_type: SceneType) -> &'static str {
    match scene_type {
        SceneType::Title => "an opening title slide",
        SceneType::Command => "terminal commands being shown",
        SceneType::List => "a bulleted list of key points",
        SceneType::Outro => "a closing slide with a call to action",
        SceneType::CodeComparison => "a before/after code comparison",
        SceneType::Quote => "a quotation on screen",
        SceneType::LearningObjectives => "the lesson's learning objectives",
        SceneType::Problem => "a coding problem statement",
        SceneType::Solution => "a worked solution in code",
        SceneType::Checkpoint => "a progress review of completed topics",
        SceneType::Quiz => "a multiple-choice quiz question",
        SceneType::Exercise => "practice instructions",
    }
}

/// Word range the rewrite should land in.
fn word_target(scene_type: SceneType) -> (u32, u32) {
    match scene_type {
        SceneType::Title | SceneType::Outro | SceneType::Quote => (8, 20),
        SceneType::Command | SceneType::List | SceneType::Quiz => (15, 35),
        _ => (20, 60),
    }
}

pub fn enhance_prompt(narration: &str, scene_type: SceneType) -> String {
    let (lo, hi) = word_target(scene_type);
    format!(
        "Rewrite this narration for {context}.\n\n\
         Original narration: \"{narration}\"\n\n\
         Requirements:\n\
         - {lo} to {hi} words, natural when spoken aloud\n\
         - keep every technical fact and name\n\
         - technical documentation tone, not marketing\n\
         - never use: {banned}\n",
        context = scene_context(scene_type),
        banned = BANNED_WORDS.join(", "),
    )
}

pub fn translate_prompt(narration: &str, source: &str, target: &str) -> String {
    format!(
        "Translate this video narration from '{source}' to '{target}'. Keep code, commands and \
         product names unchanged. Keep it natural when spoken aloud.\n\nNarration: \"{narration}\"\n"
    )
}

/// Trim whitespace and one pair of wrapping quotes.
fn clean_completion(text: &str) -> String {
    let t = text.trim();
    let t = t
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(t);
    t.trim().to_string()
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[cfg(test)]
#[path = "../../tests/unit/collab/chat.rs"]
mod tests;
