use std::fmt;

use crate::foundation::error::{ReelError, ReelResult};

/// Output canvas of every rendered frame.
pub const CANVAS: Canvas = Canvas {
    width: 1920,
    height: 1080,
};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    pub start: FrameIndex,
    pub end: FrameIndex, // exclusive
}

impl FrameRange {
    pub fn new(start: FrameIndex, end: FrameIndex) -> ReelResult<Self> {
        if start.0 > end.0 {
            return Err(ReelError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> ReelResult<Self> {
        if den == 0 {
            return Err(ReelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ReelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Number of whole frames covering `secs`, rounded to the nearest frame.
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn rgb_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 3
    }
}

/// Opaque 8-bit RGB color.
///
/// Deserializes from a named accent (`"blue"`, `"purple"`, ...), a `#rrggbb` string or a
/// `[r, g, b]` sequence. Always serializes as `[r, g, b]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Named accents accepted wherever an [`Rgb8`] is parsed from text.
pub const NAMED_ACCENTS: [(&str, Rgb8); 6] = [
    ("blue", Rgb8::new(59, 130, 246)),
    ("purple", Rgb8::new(139, 92, 246)),
    ("orange", Rgb8::new(255, 107, 53)),
    ("green", Rgb8::new(16, 185, 129)),
    ("pink", Rgb8::new(236, 72, 153)),
    ("cyan", Rgb8::new(34, 211, 238)),
];

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a named accent or `#rrggbb`.
    pub fn parse(s: &str) -> ReelResult<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(ReelError::validation(format!("invalid hex color '{s}'")));
            }
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16)
                    .map_err(|_| ReelError::validation(format!("invalid hex color '{s}'")))
            };
            return Ok(Self::new(channel(0)?, channel(2)?, channel(4)?));
        }

        let lower = s.to_ascii_lowercase();
        NAMED_ACCENTS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, c)| *c)
            .ok_or_else(|| {
                ReelError::validation(format!(
                    "unknown accent color '{s}' (expected one of blue, purple, orange, green, pink, cyan or #rrggbb)"
                ))
            })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl serde::Serialize for Rgb8 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.r, self.g, self.b].serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Rgb8 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Triple([u8; 3]),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => Rgb8::parse(&s).map_err(serde::de::Error::custom),
            Repr::Triple([r, g, b]) => Ok(Rgb8::new(r, g, b)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
