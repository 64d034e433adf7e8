use std::sync::Arc;

use crate::foundation::core::{Point, RasterImage};
use crate::foundation::error::{PaintoverError, PaintoverResult};

fn surface_dims(width: u32, height: u32) -> PaintoverResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(PaintoverError::surface(format!(
            "cannot create a {width}x{height} drawing surface"
        )));
    }
    let w: u16 = width
        .try_into()
        .map_err(|_| PaintoverError::surface("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PaintoverError::surface("surface height exceeds u16"))?;
    Ok((w, h))
}

/// Rasterize the draw calls issued by `draw` into a fresh transparent surface.
///
/// Returns the surface contents as premultiplied RGBA8.
pub(crate) fn render_layer(
    width: u32,
    height: u32,
    draw: impl FnOnce(&mut vello_cpu::RenderContext) -> PaintoverResult<()>,
) -> PaintoverResult<Vec<u8>> {
    let (w, h) = surface_dims(width, height)?;
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    draw(&mut ctx)?;
    ctx.flush();

    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);
    Ok(pixmap.data_as_u8_slice().to_vec())
}

fn pixmap_from_raster(img: &RasterImage) -> PaintoverResult<vello_cpu::Pixmap> {
    let (w, h) = surface_dims(img.width(), img.height())?;
    // Pixmap stores PremulRgba8; raster bytes are already premultiplied.
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = img
        .data()
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

/// Image paint sampling `img` in its own pixel space.
pub(crate) fn image_paint(img: &RasterImage) -> PaintoverResult<vello_cpu::Image> {
    let pixmap = pixmap_from_raster(img)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

pub(crate) fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
