use crate::foundation::core::{Canvas, ColorFormat, RasterImage};
use crate::foundation::error::{PaintoverError, PaintoverResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decode encoded image bytes and convert to premultiplied RGBA8.
///
/// Fails with [`PaintoverError::Decode`] when the bytes are not a supported raster format.
pub fn decode_image(bytes: &[u8]) -> PaintoverResult<RasterImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| PaintoverError::decode(format!("decode image from memory: {e}")))?;
    let format = if dyn_img.color().has_alpha() {
        ColorFormat::Rgba
    } else {
        ColorFormat::Rgb
    };
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let canvas = Canvas::new(width, height)
        .map_err(|_| PaintoverError::decode("decoded image has zero-sized dimensions"))?;

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    RasterImage::from_premul_rgba8(canvas, format, rgba8_premul)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
