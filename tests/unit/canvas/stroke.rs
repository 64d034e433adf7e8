use super::*;
use crate::foundation::core::Canvas;

fn mask(w: u32, h: u32) -> MaskLayer {
    MaskLayer::new(Canvas::new(w, h).unwrap())
}

#[test]
fn brush_size_must_be_positive_and_finite() {
    assert!(BrushSize::new(1.0).is_ok());
    for bad in [0.0, -3.0, f64::NAN, f64::INFINITY] {
        let err = BrushSize::new(bad).unwrap_err();
        assert!(matches!(err, PaintoverError::Validation(_)));
    }
    assert_eq!(BrushSize::default().px(), 40.0);
}

#[test]
fn brush_size_deserializes_through_validation() {
    let b: BrushSize = serde_json::from_str("12.5").unwrap();
    assert_eq!(b.px(), 12.5);
    assert!(serde_json::from_str::<BrushSize>("-1").is_err());
}

#[test]
fn zero_length_segment_paints_a_dot() {
    let mut m = mask(100, 100);
    let mut r = StrokeRenderer::new(BrushSize::new(20.0).unwrap(), HIGHLIGHT_COLOR);
    r.begin(Some(Point::new(50.0, 50.0)));
    r.extend(Point::new(50.0, 50.0), &mut m).unwrap();

    assert!(m.coverage(50, 50) > 0);
    assert!(m.coverage(58, 50) > 0);
    assert_eq!(m.coverage(65, 50), 0);
    assert_eq!(m.coverage(50, 35), 0);
    // Area of a radius-10 disc is about 314.
    let painted = m.painted_px();
    assert!((280..=400).contains(&painted), "painted={painted}");
}

#[test]
fn segment_uses_highlight_color_with_round_caps() {
    let mut m = mask(100, 40);
    let mut r = StrokeRenderer::new(BrushSize::new(10.0).unwrap(), HIGHLIGHT_COLOR);
    r.begin(Some(Point::new(20.0, 20.0)));
    r.extend(Point::new(80.0, 20.0), &mut m).unwrap();

    let px = m.as_raster().pixel(50, 20);
    let expected = HIGHLIGHT_COLOR.premul().to_array();
    for c in 0..4 {
        assert!(px[c].abs_diff(expected[c]) <= 2, "px={px:?}");
    }
    // Round cap reaches half the diameter past each endpoint.
    assert!(m.coverage(17, 20) > 0);
    assert!(m.coverage(83, 20) > 0);
    assert_eq!(m.coverage(90, 20), 0);
    assert_eq!(m.coverage(50, 30), 0);
}

#[test]
fn overlapping_segments_accumulate_source_over() {
    let mut m = mask(60, 60);
    let mut r = StrokeRenderer::new(BrushSize::new(10.0).unwrap(), HIGHLIGHT_COLOR);
    r.begin(Some(Point::new(10.0, 30.0)));
    r.extend(Point::new(50.0, 30.0), &mut m).unwrap();
    let once = m.coverage(30, 30);
    r.end();
    r.begin(Some(Point::new(30.0, 10.0)));
    r.extend(Point::new(30.0, 50.0), &mut m).unwrap();
    assert!(m.coverage(30, 30) > once);
}

#[test]
fn extend_without_begin_or_start_point_is_noop() {
    let mut m = mask(20, 20);
    let mut r = StrokeRenderer::default();
    r.extend(Point::new(10.0, 10.0), &mut m).unwrap();
    assert!(m.is_empty());

    r.begin(None);
    r.extend(Point::new(10.0, 10.0), &mut m).unwrap();
    assert!(m.is_empty());
    assert!(r.is_drawing());
}

#[test]
fn end_clears_state_and_stops_painting() {
    let mut m = mask(20, 20);
    let mut r = StrokeRenderer::default();
    r.begin(Some(Point::new(5.0, 5.0)));
    r.end();
    assert!(!r.is_drawing());
    assert_eq!(r.last_point(), None);
    r.extend(Point::new(10.0, 10.0), &mut m).unwrap();
    assert!(m.is_empty());
}

#[test]
fn extend_advances_last_point() {
    let mut m = mask(50, 50);
    let mut r = StrokeRenderer::new(BrushSize::new(4.0).unwrap(), HIGHLIGHT_COLOR);
    r.begin(Some(Point::new(5.0, 5.0)));
    r.extend(Point::new(25.0, 5.0), &mut m).unwrap();
    assert_eq!(r.last_point(), Some(Point::new(25.0, 5.0)));
}

#[test]
fn strokes_partially_off_canvas_are_clipped() {
    let mut m = mask(30, 30);
    let mut r = StrokeRenderer::new(BrushSize::new(10.0).unwrap(), HIGHLIGHT_COLOR);
    r.begin(Some(Point::new(-20.0, 15.0)));
    r.extend(Point::new(5.0, 15.0), &mut m).unwrap();
    assert!(m.coverage(0, 15) > 0);
    assert_eq!(m.coverage(20, 15), 0);

    r.begin(Some(Point::new(-100.0, -100.0)));
    r.extend(Point::new(-90.0, -100.0), &mut m).unwrap();
}

#[test]
fn clear_erases_painted_mask() {
    let mut m = mask(20, 20);
    let mut r = StrokeRenderer::default();
    r.begin(Some(Point::new(10.0, 10.0)));
    r.extend(Point::new(10.0, 10.0), &mut m).unwrap();
    assert!(!m.is_empty());
    r.clear(&mut m);
    assert!(m.is_empty());
}

#[test]
fn stroke_bounds_cover_brush_radius() {
    let s = Stroke {
        from: Point::new(10.0, 10.0),
        to: Point::new(20.0, 10.0),
        brush: BrushSize::new(6.0).unwrap(),
    };
    assert_eq!(s.bounds(), Rect::new(7.0, 7.0, 23.0, 13.0));
    assert!(!s.is_dot());
}
