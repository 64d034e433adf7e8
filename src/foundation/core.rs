use crate::foundation::error::{PaintoverError, PaintoverResult};

pub use kurbo::{Point, Rect, Vec2};

/// Pixel dimensions of a raster surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Build a canvas, rejecting empty dimensions.
    pub fn new(width: u32, height: u32) -> PaintoverResult<Self> {
        if width == 0 || height == 0 {
            return Err(PaintoverError::validation(format!(
                "canvas dimensions must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Number of bytes needed for an RGBA8 buffer of this size.
    pub fn rgba8_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }
}

/// Color layout of the encoded source a raster was decoded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ColorFormat {
    /// Opaque RGB source (JPEG, RGB PNG).
    Rgb,
    /// Source carrying an alpha channel.
    Rgba,
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Premultiply a straight-alpha color.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Byte order used by every buffer in this crate.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Straight-alpha RGBA8 color as it appears in configuration (`[r, g, b, a]`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[u8; 4]", into = "[u8; 4]")]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Construct from channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Premultiplied form of this color.
    pub fn premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from(v: [u8; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Rgba8> for [u8; 4] {
    fn from(c: Rgba8) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

/// Owned, decoded raster in premultiplied RGBA8.
///
/// Every raster in the pipeline (source photo, mask, payload, generated result) uses this layout,
/// so buffers can be composited against each other without conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    canvas: Canvas,
    format: ColorFormat,
    rgba8_premul: Vec<u8>,
}

impl RasterImage {
    /// Wrap premultiplied RGBA8 bytes.
    pub fn from_premul_rgba8(
        canvas: Canvas,
        format: ColorFormat,
        rgba8_premul: Vec<u8>,
    ) -> PaintoverResult<Self> {
        if rgba8_premul.len() != canvas.rgba8_len() {
            return Err(PaintoverError::validation(format!(
                "raster byte len {} does not match {}x{}",
                rgba8_premul.len(),
                canvas.width,
                canvas.height
            )));
        }
        Ok(Self {
            canvas,
            format,
            rgba8_premul,
        })
    }

    /// Fully transparent raster.
    pub fn transparent(canvas: Canvas) -> Self {
        Self {
            canvas,
            format: ColorFormat::Rgba,
            rgba8_premul: vec![0; canvas.rgba8_len()],
        }
    }

    /// Solid raster filled with `color`.
    pub fn filled(canvas: Canvas, format: ColorFormat, color: Rgba8Premul) -> Self {
        let px = color.to_array();
        let mut rgba8_premul = vec![0; canvas.rgba8_len()];
        for d in rgba8_premul.chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
        Self {
            canvas,
            format,
            rgba8_premul,
        }
    }

    /// Pixel dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    /// Color format of the source this raster was decoded from.
    pub fn format(&self) -> ColorFormat {
        self.format
    }

    /// Row-major premultiplied RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.rgba8_premul
    }

    /// Mutable access to the premultiplied bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.rgba8_premul
    }

    /// Premultiplied pixel at `(x, y)`; transparent outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.canvas.width || y >= self.canvas.height {
            return [0, 0, 0, 0];
        }
        let idx = ((y as usize) * (self.canvas.width as usize) + (x as usize)) * 4;
        [
            self.rgba8_premul[idx],
            self.rgba8_premul[idx + 1],
            self.rgba8_premul[idx + 2],
            self.rgba8_premul[idx + 3],
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
