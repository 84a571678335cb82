use crate::foundation::core::Rgb8;
use crate::scene::model::Difficulty;

pub const BG_LIGHT: Rgb8 = Rgb8::new(245, 248, 252);
pub const BG_WHITE: Rgb8 = Rgb8::new(255, 255, 255);
pub const TEXT_DARK: Rgb8 = Rgb8::new(15, 23, 42);
pub const TEXT_GRAY: Rgb8 = Rgb8::new(100, 116, 139);
pub const TEXT_LIGHT: Rgb8 = Rgb8::new(148, 163, 184);
pub const CODE_BLUE: Rgb8 = Rgb8::new(59, 130, 246);
pub const CARD_BG: Rgb8 = Rgb8::new(255, 255, 255);
pub const CARD_SHADOW: Rgb8 = Rgb8::new(203, 213, 225);
pub const CODE_BG: Rgb8 = Rgb8::new(30, 41, 59);

pub const ACCENT_GREEN: Rgb8 = Rgb8::new(16, 185, 129);
pub const ACCENT_ORANGE: Rgb8 = Rgb8::new(255, 107, 53);
pub const ACCENT_PINK: Rgb8 = Rgb8::new(236, 72, 153);

pub const SIZE_TITLE: f32 = 120.0;
pub const SIZE_HEADER: f32 = 64.0;
pub const SIZE_SUBTITLE: f32 = 48.0;
pub const SIZE_DESC: f32 = 38.0;
pub const SIZE_CODE: f32 = 32.0;
pub const SIZE_SMALL: f32 = 28.0;
pub const SIZE_TINY: f32 = 24.0;

pub const SANS: &str = "Arial, Helvetica, 'DejaVu Sans', 'Liberation Sans', sans-serif";
pub const MONO: &str = "Consolas, 'DejaVu Sans Mono', 'Liberation Mono', monospace";

pub fn difficulty_color(d: Difficulty) -> Rgb8 {
    match d {
        Difficulty::Easy => ACCENT_GREEN,
        Difficulty::Medium => ACCENT_ORANGE,
        Difficulty::Hard => ACCENT_PINK,
    }
}
