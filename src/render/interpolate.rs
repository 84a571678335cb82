//! Intermediate frames between a scene's keyframes.
//!
//! A [`FrameSequence`] is an ordered list of scene clips. Frames are produced on demand from the
//! clip's keyframes, so a long video never holds more than its keyframes in memory.

use std::sync::Arc;

use image::RgbImage;

use crate::{
    foundation::core::{CANVAS, FrameIndex, FrameRange},
    foundation::error::{ReelError, ReelResult},
    render::registry::KeyframePair,
};

/// Easing applied to the entrance animation progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    OutQuad,
    #[default]
    OutCubic,
    InOutCubic,
}

impl Ease {
    /// Map normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }
}

/// Linear mix of two equally sized RGB8 buffers into `out` (`t = 0` is `a`, `t = 1` is `b`).
pub fn blend_into(a: &[u8], b: &[u8], t: f64, out: &mut Vec<u8>) {
    out.clear();
    if t <= 0.0 {
        out.extend_from_slice(a);
        return;
    }
    if t >= 1.0 {
        out.extend_from_slice(b);
        return;
    }
    let w = (t * 256.0).round() as u32;
    let inv = 256 - w;
    out.extend(
        a.iter()
            .zip(b)
            .map(|(&x, &y)| ((u32::from(x) * inv + u32::from(y) * w + 128) >> 8) as u8),
    );
}

/// One scene's slot in a video's frame sequence.
#[derive(Clone, Debug)]
pub struct SceneClip {
    pub scene_id: String,
    pub keyframes: Arc<KeyframePair>,
    /// Frames covered by the clip in the video timeline.
    pub range: FrameRange,
    /// Frames spent on the entrance animation; the end keyframe is held afterwards.
    pub anim_frames: u64,
}

impl SceneClip {
    /// Animation progress of the clip-local frame `local`.
    pub fn progress(&self, local: u64) -> f64 {
        if self.anim_frames == 0 {
            return 1.0;
        }
        (local as f64 / self.anim_frames as f64).min(1.0)
    }
}

/// Ordered clips of one video, rendered lazily frame by frame.
#[derive(Clone, Debug, Default)]
pub struct FrameSequence {
    clips: Vec<SceneClip>,
    ease: Ease,
}

impl FrameSequence {
    pub fn new(ease: Ease) -> Self {
        Self {
            clips: Vec::new(),
            ease,
        }
    }

    /// Append a clip of `frames` frames; returns the range it occupies.
    ///
    /// A clip always covers at least one frame, and its last frame always shows the end
    /// keyframe: the animation is cut short to leave one hold frame.
    pub fn push(
        &mut self,
        scene_id: impl Into<String>,
        keyframes: Arc<KeyframePair>,
        frames: u64,
        anim_frames: u64,
    ) -> FrameRange {
        let frames = frames.max(1);
        let start = self.len();
        let end = start + frames;
        let range = FrameRange {
            start: FrameIndex(start),
            end: FrameIndex(end),
        };
        self.clips.push(SceneClip {
            scene_id: scene_id.into(),
            keyframes,
            range,
            anim_frames: anim_frames.min(frames - 1),
        });
        range
    }

    pub fn clips(&self) -> &[SceneClip] {
        &self.clips
    }

    pub fn ease(&self) -> Ease {
        self.ease
    }

    /// Total frame count.
    pub fn len(&self) -> u64 {
        self.clips.last().map_or(0, |c| c.range.end.0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clip containing `frame` and the clip-local offset.
    pub fn clip_at(&self, frame: FrameIndex) -> Option<(&SceneClip, u64)> {
        let idx = self
            .clips
            .partition_point(|c| c.range.end.0 <= frame.0);
        let clip = self.clips.get(idx)?;
        clip.range
            .contains(frame)
            .then(|| (clip, frame.0 - clip.range.start.0))
    }

    /// Write the RGB8 pixels of `frame` into `out`.
    pub fn frame_into(&self, frame: FrameIndex, out: &mut Vec<u8>) -> ReelResult<()> {
        let (clip, local) = self.clip_at(frame).ok_or_else(|| {
            ReelError::render(format!(
                "frame {} is outside the sequence (len {})",
                frame.0,
                self.len()
            ))
        })?;
        let t = self.ease.apply(clip.progress(local));
        blend_into(
            clip.keyframes.start.as_raw(),
            clip.keyframes.end.as_raw(),
            t,
            out,
        );
        Ok(())
    }

    pub fn frame(&self, frame: FrameIndex) -> ReelResult<RgbImage> {
        let mut buf = Vec::with_capacity(CANVAS.rgb_len());
        self.frame_into(frame, &mut buf)?;
        let (w, h) = self
            .clip_at(frame)
            .map(|(c, _)| c.keyframes.dimensions())
            .unwrap_or((CANVAS.width, CANVAS.height));
        RgbImage::from_raw(w, h, buf)
            .ok_or_else(|| ReelError::render("interpolated frame has unexpected size"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/interpolate.rs"]
mod tests;
