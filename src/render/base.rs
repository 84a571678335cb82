//! Layers shared by every scene layout: the branded base frame and the header block.

use std::fmt::Write as _;

use crate::{
    foundation::core::{CANVAS, Rgb8},
    render::svg::{SvgDoc, TextStyle},
    render::text::{fit_width, text_width, truncate},
    render::theme::{
        BG_LIGHT, BG_WHITE, CARD_BG, CARD_SHADOW, SIZE_DESC, SIZE_HEADER, TEXT_DARK, TEXT_GRAY,
    },
};

pub const WIDTH: f32 = CANVAS.width as f32;
pub const HEIGHT: f32 = CANVAS.height as f32;

/// Left edge of content after the accent bar.
pub const CONTENT_X: f32 = 120.0;
/// Usable content width.
pub const CONTENT_W: f32 = WIDTH - 2.0 * CONTENT_X;

pub const HEADER_MAX_CHARS: usize = 70;
pub const DESCRIPTION_MAX_CHARS: usize = 150;

/// The start/end layer stacks of one scene.
#[derive(Clone, Debug)]
pub struct Layers {
    pub start: SvgDoc,
    pub end: SvgDoc,
}

impl Layers {
    /// Both keyframes begin as the branded base frame.
    pub fn new(accent: Rgb8) -> Self {
        let mut base = SvgDoc::new(CANVAS);
        draw_base_frame(&mut base, accent);
        Self {
            start: base.clone(),
            end: base,
        }
    }

    /// Header block on both keyframes; returns the y coordinate below it.
    pub fn header(&mut self, accent: Rgb8, header: &str, description: &str) -> f32 {
        header_block(&mut self.start, accent, header, description);
        header_block(&mut self.end, accent, header, description)
    }

    /// Draw the same elements on both keyframes.
    pub fn both(&mut self, f: impl Fn(&mut SvgDoc)) {
        f(&mut self.start);
        f(&mut self.end);
    }
}

/// Mesh background, grid, accent bar, bottom stripe and logo tile.
pub fn draw_base_frame(doc: &mut SvgDoc, accent: Rgb8) {
    doc.rect(0.0, 0.0, WIDTH, HEIGHT, BG_LIGHT, 1.0);

    doc.ellipse(1700.0, 100.0, 500.0, 400.0, accent, 15.0 / 255.0);
    doc.ellipse(200.0, 950.0, 400.0, 350.0, accent, 20.0 / 255.0);
    doc.ellipse(1700.0, 950.0, 300.0, 250.0, accent, 12.0 / 255.0);

    let mut grid = String::new();
    let mut x = 0.0;
    while x < WIDTH {
        let _ = write!(grid, "M{x:.0} 0 L{x:.0} {HEIGHT:.0} ");
        x += 40.0;
    }
    let mut y = 0.0;
    while y < HEIGHT {
        let _ = write!(grid, "M0 {y:.0} L{WIDTH:.0} {y:.0} ");
        y += 40.0;
    }
    doc.path(grid.trim_end(), CARD_SHADOW, 1.0, 30.0 / 255.0);

    doc.rect(0.0, 0.0, 12.0, HEIGHT, accent, 1.0);
    doc.rect(0.0, HEIGHT - 12.0, WIDTH, 12.0, accent, 120.0 / 255.0);

    let (logo_x, logo_y, logo) = (WIDTH - 120.0, HEIGHT - 90.0, 60.0);
    doc.rounded_rect(logo_x, logo_y, logo, logo, 12.0, accent, 1.0);
    doc.rounded_rect(logo_x + 18.0, logo_y + 18.0, 24.0, 24.0, 6.0, BG_WHITE, 0.9);
}

/// White card with a soft shadow.
pub fn card(doc: &mut SvgDoc, x: f32, y: f32, w: f32, h: f32, radius: f32) {
    doc.rounded_rect(x + 4.0, y + 6.0, w, h, radius, CARD_SHADOW, 0.5);
    doc.rounded_rect(x, y, w, h, radius, CARD_BG, 1.0);
}

/// Icon tile, header and optional description at the top-left of the frame.
///
/// Returns the y coordinate below the block.
pub fn header_block(doc: &mut SvgDoc, accent: Rgb8, header: &str, description: &str) -> f32 {
    let icon = 90.0;
    doc.rounded_rect(CONTENT_X, 90.0, icon, icon, 20.0, accent, 0.15);
    doc.rounded_rect(CONTENT_X + 27.0, 117.0, 36.0, 36.0, 8.0, accent, 1.0);

    let text_x = CONTENT_X + icon + 40.0;
    let max_w = WIDTH - text_x - CONTENT_X;
    let header = fit_width(
        &truncate(header.trim(), HEADER_MAX_CHARS),
        max_w,
        SIZE_HEADER,
        false,
    );
    doc.text(
        text_x,
        150.0,
        &header,
        TextStyle::new(SIZE_HEADER, TEXT_DARK).bold(),
    );

    let description = description.trim();
    if description.is_empty() {
        return 230.0;
    }
    let description = fit_width(
        &truncate(description, DESCRIPTION_MAX_CHARS),
        max_w,
        SIZE_DESC,
        false,
    );
    doc.text(
        text_x,
        210.0,
        &description,
        TextStyle::new(SIZE_DESC, TEXT_GRAY),
    );
    260.0
}

/// Pill-shaped label; returns its width.
pub fn badge(doc: &mut SvgDoc, x: f32, y: f32, label: &str, color: Rgb8, size: f32) -> f32 {
    let w = text_width(label, size, false) + size * 1.6;
    let h = size * 1.9;
    doc.rounded_rect(x, y, w, h, h / 2.0, color, 1.0);
    doc.text(
        x + w / 2.0,
        y + h * 0.68,
        label,
        TextStyle::new(size, BG_WHITE).bold().centered(),
    );
    w
}
