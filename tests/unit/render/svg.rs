use super::*;

const SMALL: Canvas = Canvas {
    width: 64,
    height: 32,
};

#[test]
fn doc_emits_elements_in_order() {
    let mut doc = SvgDoc::new(SMALL);
    doc.rect(0.0, 0.0, 64.0, 32.0, Rgb8::new(255, 0, 0), 1.0)
        .circle(10.0, 10.0, 4.0, Rgb8::new(0, 0, 255), 0.5);
    doc.text(1.0, 20.0, "a<b", TextStyle::new(12.0, Rgb8::new(0, 0, 0)).bold());
    let svg = doc.finish();
    let rect_at = svg.find("<rect").unwrap();
    let circle_at = svg.find("<circle").unwrap();
    assert!(rect_at < circle_at);
    assert!(svg.contains("fill=\"#ff0000\""));
    assert!(svg.contains("a&lt;b"));
    assert!(svg.contains("viewBox=\"0 0 64 32\""));
}

#[test]
fn empty_text_is_skipped() {
    let mut doc = SvgDoc::new(SMALL);
    doc.text(0.0, 10.0, "   ", TextStyle::new(12.0, Rgb8::new(0, 0, 0)));
    assert!(!doc.finish().contains("<text"));
}

#[test]
fn rasterize_fills_canvas_with_shapes() {
    let raster = Rasterizer::with_fontdb(
        Arc::new(usvg::fontdb::Database::new()),
        Rgb8::new(0, 0, 0),
    );
    let mut doc = SvgDoc::new(SMALL);
    doc.rect(0.0, 0.0, 32.0, 32.0, Rgb8::new(255, 0, 0), 1.0);
    let img = raster.rasterize(&doc).unwrap();
    assert_eq!(img.dimensions(), (64, 32));
    assert_eq!(img.get_pixel(4, 4).0, [255, 0, 0]);
    // Uncovered pixels take the background color.
    assert_eq!(img.get_pixel(60, 4).0, [0, 0, 0]);
}

#[test]
fn premul_flatten_over_background() {
    let src = [128u8, 0, 0, 128, 10, 20, 30, 255];
    let out = premul_rgba_to_rgb(&src, Rgb8::new(0, 0, 0));
    assert_eq!(out, vec![128, 0, 0, 10, 20, 30]);
    let out = premul_rgba_to_rgb(&[0, 0, 0, 0], Rgb8::new(9, 8, 7));
    assert_eq!(out, vec![9, 8, 7]);
}
