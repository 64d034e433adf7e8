use super::*;

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    let c = Canvas::new(3, 2).unwrap();
    assert_eq!(c.rgba8_len(), 24);
}

#[test]
fn straight_to_premul_rounds() {
    let c = Rgba8::new(239, 68, 68, 179);
    let p = c.premul();
    assert_eq!(p.a, 179);
    assert_eq!(p.r, ((239u16 * 179 + 127) / 255) as u8);
}

#[test]
fn rgba8_serde_as_array() {
    let c: Rgba8 = serde_json::from_str("[1, 2, 3, 4]").unwrap();
    assert_eq!(c, Rgba8::new(1, 2, 3, 4));
    assert_eq!(serde_json::to_string(&c).unwrap(), "[1,2,3,4]");
}

#[test]
fn raster_rejects_wrong_len_and_reads_pixels() {
    let canvas = Canvas::new(2, 2).unwrap();
    assert!(RasterImage::from_premul_rgba8(canvas, ColorFormat::Rgba, vec![0; 15]).is_err());

    let img = RasterImage::filled(canvas, ColorFormat::Rgb, Rgba8Premul::from_straight_rgba(9, 8, 7, 255));
    assert_eq!(img.pixel(1, 1), [9, 8, 7, 255]);
    assert_eq!(img.pixel(2, 0), [0, 0, 0, 0]);
    assert_eq!(img.format(), ColorFormat::Rgb);
}
