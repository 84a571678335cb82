//! Narration enhancement and translation collaborator.

use async_trait::async_trait;

use crate::{
    foundation::error::{ReelError, ReelResult},
    scene::model::SceneType,
};

#[async_trait]
pub trait NarrationEnhancer: Send + Sync {
    fn name(&self) -> &str;

    /// Rewrite `narration` for a scene of type `scene_type`.
    async fn enhance(&self, narration: &str, scene_type: SceneType) -> ReelResult<String>;

    /// Translate `narration` from `source` to `target` (language codes).
    async fn translate(&self, narration: &str, source: &str, target: &str) -> ReelResult<String>;
}

/// Narration used when the enhancer is unavailable: the original, whitespace-normalized.
pub fn fallback_narration(original: &str) -> String {
    original.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Deterministic in-process enhancer.
///
/// Enhancement tidies whitespace, capitalization and the closing punctuation. It has no
/// translation backend, so `translate` is always unavailable.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalEnhancer;

#[async_trait]
impl NarrationEnhancer for LocalEnhancer {
    fn name(&self) -> &str {
        "local"
    }

    async fn enhance(&self, narration: &str, _scene_type: SceneType) -> ReelResult<String> {
        let text = fallback_narration(narration);
        let mut chars = text.chars();
        let Some(first) = chars.next() else {
            return Ok(text);
        };
        let mut out: String = first.to_uppercase().chain(chars).collect();
        if !out.ends_with(['.', '!', '?', '…']) {
            out.push('.');
        }
        Ok(out)
    }

    async fn translate(&self, _narration: &str, source: &str, target: &str) -> ReelResult<String> {
        Err(ReelError::unavailable(format!(
            "no translation backend configured for {source} -> {target}"
        )))
    }
}
