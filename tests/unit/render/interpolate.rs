use super::*;

fn solid(w: u32, h: u32, v: u8) -> RgbImage {
    RgbImage::from_pixel(w, h, image::Rgb([v, v, v]))
}

fn pair(a: u8, b: u8) -> Arc<KeyframePair> {
    Arc::new(KeyframePair {
        start: solid(4, 2, a),
        end: solid(4, 2, b),
    })
}

#[test]
fn ease_endpoints_are_fixed() {
    for ease in [Ease::Linear, Ease::OutQuad, Ease::OutCubic, Ease::InOutCubic] {
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(1.0), 1.0);
        assert_eq!(ease.apply(2.0), 1.0);
    }
    assert!(Ease::OutCubic.apply(0.5) > 0.5);
}

#[test]
fn blend_mixes_channels() {
    let mut out = Vec::new();
    blend_into(&[0, 100, 200], &[200, 100, 0], 0.5, &mut out);
    assert_eq!(out, vec![100, 100, 100]);
    blend_into(&[1, 2], &[3, 4], 0.0, &mut out);
    assert_eq!(out, vec![1, 2]);
    blend_into(&[1, 2], &[3, 4], 1.0, &mut out);
    assert_eq!(out, vec![3, 4]);
}

#[test]
fn clips_are_laid_out_back_to_back() {
    let mut seq = FrameSequence::new(Ease::Linear);
    let a = seq.push("a", pair(0, 200), 10, 4);
    let b = seq.push("b", pair(50, 50), 0, 0);
    assert_eq!((a.start.0, a.end.0), (0, 10));
    assert_eq!((b.start.0, b.end.0), (10, 11));
    assert_eq!(seq.len(), 11);

    let (clip, local) = seq.clip_at(FrameIndex(9)).unwrap();
    assert_eq!((clip.scene_id.as_str(), local), ("a", 9));
    let (clip, local) = seq.clip_at(FrameIndex(10)).unwrap();
    assert_eq!((clip.scene_id.as_str(), local), ("b", 0));
    assert!(seq.clip_at(FrameIndex(11)).is_none());
}

#[test]
fn animation_then_hold() {
    let mut seq = FrameSequence::new(Ease::Linear);
    seq.push("a", pair(0, 200), 10, 4);

    assert_eq!(seq.frame(FrameIndex(0)).unwrap().get_pixel(0, 0).0, [0, 0, 0]);
    assert_eq!(
        seq.frame(FrameIndex(2)).unwrap().get_pixel(0, 0).0,
        [100, 100, 100]
    );
    for f in 4..10 {
        assert_eq!(
            seq.frame(FrameIndex(f)).unwrap().get_pixel(3, 1).0,
            [200, 200, 200]
        );
    }
}

#[test]
fn short_clip_still_reaches_its_end_keyframe() {
    let mut seq = FrameSequence::new(Ease::Linear);
    seq.push("short", pair(0, 200), 3, 30);
    seq.push("single", pair(10, 90), 1, 30);
    assert_eq!(seq.clips()[0].anim_frames, 2);
    assert_eq!(seq.clips()[1].anim_frames, 0);

    assert_eq!(seq.frame(FrameIndex(0)).unwrap().get_pixel(0, 0).0, [0, 0, 0]);
    assert_eq!(
        seq.frame(FrameIndex(2)).unwrap().get_pixel(0, 0).0,
        [200, 200, 200]
    );
    assert_eq!(seq.frame(FrameIndex(3)).unwrap().get_pixel(0, 0).0, [90, 90, 90]);
}

#[test]
fn out_of_range_frame_is_an_error() {
    let seq = FrameSequence::new(Ease::OutCubic);
    assert!(seq.is_empty());
    let mut buf = Vec::new();
    assert!(seq.frame_into(FrameIndex(0), &mut buf).is_err());
}
