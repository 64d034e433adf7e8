use crate::foundation::core::{Canvas, RasterImage};

/// Painted selection buffer matching the active image's dimensions.
///
/// Starts fully transparent; strokes accumulate with source-over. Only alpha matters to the
/// compositor, the highlight color is for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskLayer {
    raster: RasterImage,
}

impl MaskLayer {
    /// Empty mask for a canvas.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            raster: RasterImage::transparent(canvas),
        }
    }

    /// Pixel dimensions.
    pub fn canvas(&self) -> Canvas {
        self.raster.canvas()
    }

    /// Erase every pixel to transparent.
    pub fn clear(&mut self) {
        self.raster.data_mut().fill(0);
    }

    /// Whether nothing has been painted.
    pub fn is_empty(&self) -> bool {
        self.raster.data().chunks_exact(4).all(|px| px[3] == 0)
    }

    /// Alpha coverage at `(x, y)`; zero outside the canvas.
    pub fn coverage(&self, x: u32, y: u32) -> u8 {
        self.raster.pixel(x, y)[3]
    }

    /// Number of pixels with non-zero coverage.
    pub fn painted_px(&self) -> usize {
        self.raster
            .data()
            .chunks_exact(4)
            .filter(|px| px[3] != 0)
            .count()
    }

    /// The mask as a premultiplied raster (display color included).
    pub fn as_raster(&self) -> &RasterImage {
        &self.raster
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        self.raster.data_mut()
    }

    /// Build a mask from an existing raster, e.g. a mask image loaded from disk.
    pub fn from_raster(raster: RasterImage) -> Self {
        Self { raster }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/mask.rs"]
mod tests;
