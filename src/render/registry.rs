use std::sync::Arc;

use image::RgbImage;

use crate::{
    foundation::core::Rgb8,
    foundation::error::{ReelError, ReelResult},
    render::base::Layers,
    render::scenes::{basic, comparison, educational},
    render::svg::Rasterizer,
    render::theme::BG_LIGHT,
    scene::model::{Scene, SceneContent},
};

/// Start and end keyframes of one scene, both `1920x1080` RGB.
#[derive(Clone, Debug)]
pub struct KeyframePair {
    pub start: RgbImage,
    pub end: RgbImage,
}

impl KeyframePair {
    pub fn dimensions(&self) -> (u32, u32) {
        self.start.dimensions()
    }

    /// `true` when both keyframes carry identical pixels.
    pub fn is_static(&self) -> bool {
        self.start.as_raw() == self.end.as_raw()
    }
}

/// Maps every scene type to its layout and rasterizes the result.
///
/// Layout functions are pure; the renderer only owns the font database, so it can be shared
/// across rendering threads behind an `Arc`.
#[derive(Clone, Debug)]
pub struct SceneRenderer {
    raster: Rasterizer,
}

impl SceneRenderer {
    /// Renderer using the system fonts.
    pub fn new() -> Self {
        Self::with_rasterizer(Rasterizer::new(&[], BG_LIGHT))
    }

    pub fn with_rasterizer(raster: Rasterizer) -> Self {
        Self { raster }
    }

    pub fn rasterizer(&self) -> &Rasterizer {
        &self.raster
    }

    /// Render the start/end keyframes of `scene` in the video's accent color.
    ///
    /// A missing accent is a `RenderError`; adapters always resolve one.
    #[tracing::instrument(level = "debug", skip_all, fields(scene = %scene.id, kind = scene.scene_type().as_str()))]
    pub fn render(&self, scene: &Scene, accent: Option<Rgb8>) -> ReelResult<KeyframePair> {
        let accent = accent.ok_or_else(|| {
            ReelError::render(format!("scene '{}' has no accent color", scene.id))
        })?;
        let layers = compose(&scene.content, accent);
        let start = self.raster.rasterize(&layers.start)?;
        let end = self.raster.rasterize(&layers.end)?;
        if start.as_raw() == end.as_raw() {
            return Err(ReelError::render(format!(
                "scene '{}' produced identical keyframes",
                scene.id
            )));
        }
        Ok(KeyframePair { start, end })
    }
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Vector layers for a scene's two keyframes.
pub fn compose(content: &SceneContent, accent: Rgb8) -> Layers {
    match content {
        SceneContent::Title(c) => basic::title(c, accent),
        SceneContent::Command(c) => basic::command(c, accent),
        SceneContent::List(c) => basic::list(c, accent),
        SceneContent::Outro(c) => basic::outro(c, accent),
        SceneContent::Quote(c) => basic::quote(c, accent),
        SceneContent::Quiz(c) => educational::quiz(c, accent),
        SceneContent::LearningObjectives(c) => educational::learning_objectives(c, accent),
        SceneContent::Exercise(c) => educational::exercise(c, accent),
        SceneContent::Problem(c) => educational::problem(c, accent),
        SceneContent::Solution(c) => educational::solution(c, accent),
        SceneContent::CodeComparison(c) => comparison::code_comparison(c, accent),
        SceneContent::Checkpoint(c) => comparison::checkpoint(c, accent),
    }
}

/// One-shot render with a fresh [`SceneRenderer`].
pub fn render_scene(scene: &Scene, accent: Option<Rgb8>) -> ReelResult<KeyframePair> {
    SceneRenderer::new().render(scene, accent)
}

/// Shared renderer handle for worker threads.
pub type SharedRenderer = Arc<SceneRenderer>;

#[cfg(test)]
#[path = "../../tests/unit/render/registry.rs"]
mod tests;
