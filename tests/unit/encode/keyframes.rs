use std::sync::Arc;

use image::Rgb;

use super::*;
use crate::foundation::core::Fps;
use crate::render::{FrameSequence, KeyframePair, interpolate::Ease};

#[test]
fn writes_pngs_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let pair = Arc::new(KeyframePair {
        start: RgbImage::new(4, 4),
        end: RgbImage::from_pixel(4, 4, Rgb([0, 200, 0])),
    });
    let mut frames = FrameSequence::new(Ease::OutCubic);
    frames.push("intro", pair.clone(), 6, 2);
    frames.push("outro", pair, 4, 2);
    let job = EncodeJob {
        video_id: "demo".into(),
        frames,
        audio: Vec::new(),
        fps: Fps::new(24, 1).unwrap(),
        output_path: dir.path().join("demo.json"),
    };

    let artifact = KeyframeEncoder.encode(&job).unwrap();
    assert_eq!(artifact.frames, 10);
    assert!(artifact.bytes > 0);

    let png = dir.path().join("demo_keyframes/outro_end.png");
    let decoded = image::open(&png).unwrap().to_rgb8();
    assert_eq!(decoded.get_pixel(0, 0), &Rgb([0, 200, 0]));

    let manifest: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&artifact.path).unwrap()).unwrap();
    assert_eq!(manifest["frame_count"], 10);
    assert_eq!(manifest["clips"][1]["scene_id"], "outro");
    assert_eq!(manifest["clips"][1]["start_frame_index"], 6);
    assert_eq!(manifest["clips"][1]["end_frame_index"], 10);
}
