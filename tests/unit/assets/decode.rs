use std::io::Cursor;

use super::*;

fn png_bytes(img: image::DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();

    let prepared = decode_image(&png_bytes(image::DynamicImage::ImageRgba8(img))).unwrap();
    assert_eq!(prepared.width(), 1);
    assert_eq!(prepared.height(), 1);
    assert_eq!(prepared.format(), ColorFormat::Rgba);
    assert_eq!(
        prepared.data(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_rgb_png_is_opaque_rgb_format() {
    let img = image::RgbImage::from_pixel(3, 2, image::Rgb([1, 2, 3]));
    let prepared = decode_image(&png_bytes(image::DynamicImage::ImageRgb8(img))).unwrap();
    assert_eq!(prepared.format(), ColorFormat::Rgb);
    assert_eq!(prepared.pixel(2, 1), [1, 2, 3, 255]);
}

#[test]
fn decode_garbage_is_decode_error() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, PaintoverError::Decode(_)));
}
