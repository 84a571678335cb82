use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
    assert_eq!(r.len_frames(), 3);
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(2)).is_err());
}

#[test]
fn fps_secs_to_frames_rounds() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.secs_to_frames_round(3.0), 90);
    assert_eq!(fps.secs_to_frames_round(0.49), 15);
    assert!((fps.frames_to_secs(45) - 1.5).abs() < 1e-9);
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn rgb_parses_names_hex_and_triples() {
    assert_eq!(Rgb8::parse("blue").unwrap(), Rgb8::new(59, 130, 246));
    assert_eq!(Rgb8::parse("  Purple ").unwrap(), Rgb8::new(139, 92, 246));
    assert_eq!(Rgb8::parse("#ff6b35").unwrap(), Rgb8::new(255, 107, 53));
    assert!(Rgb8::parse("chartreuse").is_err());
    assert!(Rgb8::parse("#12345").is_err());

    let c: Rgb8 = serde_json::from_str("[1, 2, 3]").unwrap();
    assert_eq!(c, Rgb8::new(1, 2, 3));
    let c: Rgb8 = serde_json::from_str("\"green\"").unwrap();
    assert_eq!(serde_json::to_string(&c).unwrap(), "[16,185,129]");
    assert!(serde_json::from_str::<Rgb8>("\"nope\"").is_err());
}

#[test]
fn canvas_rgb_len_matches_full_hd() {
    assert_eq!(CANVAS.rgb_len(), 1920 * 1080 * 3);
}
