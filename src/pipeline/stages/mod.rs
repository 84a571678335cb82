//! The five pipeline stages.

use std::path::Path;

use crate::foundation::error::{ReelError, ReelResult};

pub mod audio;
pub mod input;
pub mod output;
pub mod render;
pub mod script;

pub use audio::AudioStage;
pub use input::InputStage;
pub use output::OutputStage;
pub use render::RenderStage;
pub use script::ScriptStage;

/// Pretty-print `value` as JSON at `path`, creating parent directories.
pub(crate) async fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> ReelResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow::Error::new(e).context(format!("create '{}'", parent.display())))?;
    }
    let json = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| anyhow::Error::new(e).context(format!("write '{}'", path.display())))?;
    Ok(())
}

/// The video set produced by the input stage.
pub(crate) fn require_set(
    ctx: &crate::pipeline::context::PipelineContext,
) -> ReelResult<&crate::scene::model::VideoSet> {
    ctx.video_set
        .as_ref()
        .ok_or_else(|| ReelError::validation("no video set in context; input stage has not run"))
}
