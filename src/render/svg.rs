use std::{fmt::Write as _, path::Path, sync::Arc};

use anyhow::Context as _;
use image::RgbImage;

use crate::{
    foundation::core::{Canvas, Rgb8},
    foundation::error::{ReelError, ReelResult},
    render::text::escape_xml,
    render::theme::{MONO, SANS},
};

/// Horizontal anchoring of a text run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_svg(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// Font and paint of a text run.
#[derive(Clone, Copy, Debug)]
pub struct TextStyle {
    pub size: f32,
    pub fill: Rgb8,
    pub bold: bool,
    pub mono: bool,
    pub anchor: Anchor,
}

impl TextStyle {
    pub fn new(size: f32, fill: Rgb8) -> Self {
        Self {
            size,
            fill,
            bold: false,
            mono: false,
            anchor: Anchor::Start,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn mono(mut self) -> Self {
        self.mono = true;
        self
    }

    pub fn with_fill(mut self, fill: Rgb8) -> Self {
        self.fill = fill;
        self
    }

    pub fn centered(mut self) -> Self {
        self.anchor = Anchor::Middle;
        self
    }

    pub fn anchored(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }
}

/// Append-only SVG document with a fixed canvas.
///
/// Elements are painted in insertion order; cloning a document forks the layer stack, which is how
/// start and end keyframes share their base layers.
#[derive(Clone, Debug)]
pub struct SvgDoc {
    canvas: Canvas,
    body: String,
}

impl SvgDoc {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            body: String::new(),
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: Rgb8, opacity: f32) -> &mut Self {
        self.rounded_rect(x, y, w, h, 0.0, fill, opacity)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        fill: Rgb8,
        opacity: f32,
    ) -> &mut Self {
        let _ = write!(
            self.body,
            r#"<rect x="{x:.1}" y="{y:.1}" width="{:.1}" height="{:.1}" rx="{radius:.1}" fill="{fill}" fill-opacity="{:.3}"/>"#,
            w.max(0.0),
            h.max(0.0),
            opacity.clamp(0.0, 1.0),
        );
        self
    }

    /// Rounded rectangle outline.
    #[allow(clippy::too_many_arguments)]
    pub fn outline(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        stroke: Rgb8,
        width: f32,
    ) -> &mut Self {
        let _ = write!(
            self.body,
            r#"<rect x="{x:.1}" y="{y:.1}" width="{:.1}" height="{:.1}" rx="{radius:.1}" fill="none" stroke="{stroke}" stroke-width="{width:.1}"/>"#,
            w.max(0.0),
            h.max(0.0),
        );
        self
    }

    pub fn circle(&mut self, cx: f32, cy: f32, r: f32, fill: Rgb8, opacity: f32) -> &mut Self {
        let _ = write!(
            self.body,
            r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="{:.1}" fill="{fill}" fill-opacity="{:.3}"/>"#,
            r.max(0.0),
            opacity.clamp(0.0, 1.0),
        );
        self
    }

    pub fn ellipse(
        &mut self,
        cx: f32,
        cy: f32,
        rx: f32,
        ry: f32,
        fill: Rgb8,
        opacity: f32,
    ) -> &mut Self {
        let _ = write!(
            self.body,
            r#"<ellipse cx="{cx:.1}" cy="{cy:.1}" rx="{:.1}" ry="{:.1}" fill="{fill}" fill-opacity="{:.3}"/>"#,
            rx.max(0.0),
            ry.max(0.0),
            opacity.clamp(0.0, 1.0),
        );
        self
    }

    /// Stroked polyline/path data (`M x y L x y ...`).
    pub fn path(&mut self, d: &str, stroke: Rgb8, width: f32, opacity: f32) -> &mut Self {
        let _ = write!(
            self.body,
            r#"<path d="{d}" fill="none" stroke="{stroke}" stroke-width="{width:.1}" stroke-opacity="{:.3}" stroke-linecap="round" stroke-linejoin="round"/>"#,
            opacity.clamp(0.0, 1.0),
        );
        self
    }

    /// One line of text with its baseline at `y`. Empty text emits nothing.
    pub fn text(&mut self, x: f32, y: f32, text: &str, style: TextStyle) -> &mut Self {
        let escaped = escape_xml(text);
        if escaped.trim().is_empty() {
            return self;
        }
        let family = if style.mono { MONO } else { SANS };
        let weight = if style.bold { "bold" } else { "normal" };
        let _ = write!(
            self.body,
            r#"<text x="{x:.1}" y="{y:.1}" font-family="{family}" font-size="{:.1}" font-weight="{weight}" fill="{}" text-anchor="{}" xml:space="preserve">{escaped}</text>"#,
            style.size,
            style.fill,
            style.anchor.as_svg(),
        );
        self
    }

    /// Consecutive lines starting at baseline `y`, `line_height` apart. Returns the next baseline.
    pub fn text_lines(
        &mut self,
        x: f32,
        y: f32,
        lines: &[String],
        line_height: f32,
        style: TextStyle,
    ) -> f32 {
        let mut baseline = y;
        for line in lines {
            self.text(x, baseline, line, style);
            baseline += line_height;
        }
        baseline
    }

    pub fn finish(&self) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">{body}</svg>"#,
            w = self.canvas.width,
            h = self.canvas.height,
            body = self.body
        )
    }
}

/// Rasterizes [`SvgDoc`]s into opaque RGB frames.
///
/// Holds an immutable font database built once; rasterizing is otherwise stateless, so one
/// rasterizer can be shared across threads.
#[derive(Clone)]
pub struct Rasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
    background: Rgb8,
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("faces", &self.fontdb.len())
            .field("background", &self.background)
            .finish()
    }
}

impl Rasterizer {
    /// Rasterizer using the system fonts plus any fonts found in `font_dirs`.
    pub fn new(font_dirs: &[&Path], background: Rgb8) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        for dir in font_dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font database loaded");
        Self {
            fontdb: Arc::new(db),
            background,
        }
    }

    /// Rasterizer with a caller-provided font database.
    pub fn with_fontdb(fontdb: Arc<usvg::fontdb::Database>, background: Rgb8) -> Self {
        Self { fontdb, background }
    }

    pub fn font_faces(&self) -> usize {
        self.fontdb.len()
    }

    pub fn rasterize(&self, doc: &SvgDoc) -> ReelResult<RgbImage> {
        let canvas = doc.canvas();
        let svg = doc.finish();
        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            font_resolver: make_font_resolver(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opts).context("parse scene svg")?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(canvas.width, canvas.height)
            .ok_or_else(|| ReelError::render("failed to allocate scene pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );

        let rgb = premul_rgba_to_rgb(pixmap.data(), self.background);
        RgbImage::from_raw(canvas.width, canvas.height, rgb)
            .ok_or_else(|| ReelError::render("rasterized frame has unexpected size"))
    }
}

/// Flatten premultiplied RGBA8 over an opaque background into RGB8.
pub fn premul_rgba_to_rgb(src: &[u8], bg: Rgb8) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len() / 4 * 3);
    for px in src.chunks_exact(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            out.extend_from_slice(&px[..3]);
            continue;
        }
        let inv = 255 - a;
        for (c, b) in px[..3].iter().zip([bg.r, bg.g, bg.b]) {
            let v = u16::from(*c) + mul_div255(u16::from(b), inv);
            out.push(v.min(255) as u8);
        }
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        let _ = db.load_font_file(&path);
    }
}

fn make_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }
            families.push(usvg::fontdb::Family::SansSerif);
            families.push(usvg::fontdb::Family::Monospace);

            let style = match font.style() {
                usvg::FontStyle::Normal => usvg::fontdb::Style::Normal,
                usvg::FontStyle::Italic => usvg::fontdb::Style::Italic,
                usvg::FontStyle::Oblique => usvg::fontdb::Style::Oblique,
            };

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style,
            };

            if let Some(id) = fontdb.query(&query) {
                return Some(id);
            }
            // Any face beats dropping the text node.
            fontdb.faces().next().map(|f| f.id)
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
