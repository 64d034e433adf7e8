use std::sync::Arc;

use crate::assets::embedded::{DEFAULT_LOGO_PNG, NAME_FONT_TTF, SUBTITLE_FONT_TTF};
use crate::assets::encode::{EncodedImage, ImageMime, encode_raster};
use crate::assets::text::{ShapedLine, TextLayoutEngine};
use crate::foundation::core::{Canvas, Point, RasterImage, Rect, Rgba8, Vec2};
use crate::foundation::error::{PaintoverError, PaintoverResult};
use crate::foundation::math::clamp_f64;
use crate::render::blend::{premul_over_region, tint_by_alpha};
use crate::render::blur::{blur_rgba8_premul, shadow_blur_params};
use crate::render::surface::{image_paint, render_layer};

/// Error text when the generated image cannot be decoded.
pub const IMAGE_LOAD_FAILED: &str = "Failed to load image for watermarking.";
/// Error text when the logo cannot be decoded.
pub const LOGO_LOAD_FAILED: &str = "Failed to load logo for watermarking.";

/// Text, colors and proportions of the watermark overlay.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WatermarkStyle {
    /// Bottom line (author name).
    pub name_text: String,
    /// Line above the name.
    pub subtitle_text: String,
    /// Fill of the name line.
    pub name_color: Rgba8,
    /// Fill of the subtitle line.
    pub subtitle_color: Rgba8,
    /// Text drop-shadow color.
    pub shadow_color: Rgba8,
    /// Shadow blur in pixels; the gaussian sigma is half of it.
    pub shadow_blur: f32,
    /// Shadow offset in pixels.
    pub shadow_offset: [f64; 2],
    /// Lower bound of the edge padding.
    pub min_padding: f64,
    /// Edge padding as a fraction of the image width.
    pub padding_ratio: f64,
    /// Name font size as a fraction of the image width.
    pub name_size_ratio: f64,
    /// Name font size bounds `[min, max]`.
    pub name_size_range: [f64; 2],
    /// Subtitle font size as a fraction of the image width.
    pub subtitle_size_ratio: f64,
    /// Subtitle font size bounds `[min, max]`.
    pub subtitle_size_range: [f64; 2],
    /// Vertical gap between the two lines.
    pub line_spacing: f64,
    /// Logo height relative to the text block height.
    pub logo_scale: f64,
    /// Horizontal gap between logo and text block.
    pub logo_gap: f64,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            name_text: "Opu chowdhury".to_string(),
            subtitle_text: "image generate by AI image editor".to_string(),
            name_color: Rgba8::new(255, 255, 255, 204),
            subtitle_color: Rgba8::new(255, 255, 255, 153),
            shadow_color: Rgba8::new(0, 0, 0, 179),
            shadow_blur: 5.0,
            shadow_offset: [2.0, 2.0],
            min_padding: 20.0,
            padding_ratio: 0.015,
            name_size_ratio: 0.025,
            name_size_range: [14.0, 36.0],
            subtitle_size_ratio: 0.015,
            subtitle_size_range: [10.0, 22.0],
            line_spacing: 8.0,
            logo_scale: 1.2,
            logo_gap: 15.0,
        }
    }
}

impl WatermarkStyle {
    /// `(name, subtitle)` font sizes for an image `width` pixels wide.
    pub fn font_sizes(&self, width: u32) -> (f64, f64) {
        let w = f64::from(width);
        let [nlo, nhi] = self.name_size_range;
        let [slo, shi] = self.subtitle_size_range;
        (
            clamp_f64(w * self.name_size_ratio, nlo, nhi),
            clamp_f64(w * self.subtitle_size_ratio, slo, shi),
        )
    }
}

/// Placement of the overlay on an image of a given size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatermarkLayout {
    /// Distance from the right and bottom edges.
    pub padding: f64,
    /// Name font size.
    pub name_size: f64,
    /// Subtitle font size.
    pub subtitle_size: f64,
    /// Wider of the two measured lines.
    pub text_block_width: f64,
    /// `name_size + subtitle_size + line_spacing`.
    pub text_block_height: f64,
    /// Logo destination rectangle.
    pub logo: Rect,
    /// Right edge both lines are aligned to.
    pub text_right: f64,
    /// Bottom of the name line.
    pub name_bottom: f64,
    /// Bottom of the subtitle line.
    pub subtitle_bottom: f64,
}

impl WatermarkLayout {
    /// Place the overlay; a pure function of its inputs.
    ///
    /// `name_width` and `subtitle_width` are the lines measured at [`WatermarkStyle::font_sizes`].
    pub fn compute(
        canvas: Canvas,
        style: &WatermarkStyle,
        name_width: f64,
        subtitle_width: f64,
        logo_size: Canvas,
    ) -> Self {
        let w = f64::from(canvas.width);
        let h = f64::from(canvas.height);
        let padding = (w * style.padding_ratio).max(style.min_padding);
        let (name_size, subtitle_size) = style.font_sizes(canvas.width);
        let text_block_height = name_size + subtitle_size + style.line_spacing;
        let text_block_width = name_width.max(subtitle_width);

        let logo_h = text_block_height * style.logo_scale;
        let logo_w = logo_h * f64::from(logo_size.width) / f64::from(logo_size.height);
        let logo_x = w - padding - text_block_width - style.logo_gap - logo_w;
        let logo_y = h - padding - logo_h;

        let text_right = w - padding;
        let name_bottom = h - padding;
        Self {
            padding,
            name_size,
            subtitle_size,
            text_block_width,
            text_block_height,
            logo: Rect::new(logo_x, logo_y, logo_x + logo_w, logo_y + logo_h),
            text_right,
            name_bottom,
            subtitle_bottom: name_bottom - name_size - style.line_spacing,
        }
    }

    /// Bounding box of both text lines.
    pub fn text_block(&self) -> Rect {
        Rect::new(
            self.text_right - self.text_block_width,
            self.name_bottom - self.text_block_height,
            self.text_right,
            self.name_bottom,
        )
    }
}

/// Stamps the name, subtitle and logo onto generated images.
#[derive(Clone, Debug)]
pub struct Watermarker {
    style: WatermarkStyle,
    name_font: Arc<Vec<u8>>,
    subtitle_font: Arc<Vec<u8>>,
}

impl Default for Watermarker {
    fn default() -> Self {
        Self::new(WatermarkStyle::default())
    }
}

impl Watermarker {
    /// Watermarker using the embedded fonts.
    pub fn new(style: WatermarkStyle) -> Self {
        Self {
            style,
            name_font: Arc::new(NAME_FONT_TTF.to_vec()),
            subtitle_font: Arc::new(SUBTITLE_FONT_TTF.to_vec()),
        }
    }

    /// Active style.
    pub fn style(&self) -> &WatermarkStyle {
        &self.style
    }

    /// The embedded default logo.
    pub fn default_logo() -> EncodedImage {
        EncodedImage::new(ImageMime::Png, DEFAULT_LOGO_PNG.to_vec())
    }

    /// Watermark `result` with `logo`; the output is always PNG at the result's size.
    ///
    /// Both inputs are decoded before anything is drawn; the first decode failure is returned.
    /// The decodes are synchronous, so the join runs them one after the other on the calling task.
    #[tracing::instrument(skip_all, fields(result = ?result, logo = ?logo))]
    pub async fn apply(
        &self,
        result: &EncodedImage,
        logo: &EncodedImage,
    ) -> PaintoverResult<EncodedImage> {
        let (image, logo) = tokio::try_join!(
            async {
                result.decode().map_err(|e| {
                    tracing::warn!(error = %e, "result decode failed");
                    PaintoverError::decode(IMAGE_LOAD_FAILED)
                })
            },
            async {
                logo.decode().map_err(|e| {
                    tracing::warn!(error = %e, "logo decode failed");
                    PaintoverError::decode(LOGO_LOAD_FAILED)
                })
            },
        )?;
        let out = self.stamp(image, &logo)?;
        encode_raster(&out, ImageMime::Png, 1.0)
    }

    /// Draw the overlay onto a decoded image.
    pub fn stamp(&self, mut image: RasterImage, logo: &RasterImage) -> PaintoverResult<RasterImage> {
        let canvas = image.canvas();
        let (name_size, subtitle_size) = self.style.font_sizes(canvas.width);

        let mut engine = TextLayoutEngine::new();
        let name = engine.layout_line(&self.style.name_text, &self.name_font, name_size as f32)?;
        let subtitle = engine.layout_line(
            &self.style.subtitle_text,
            &self.subtitle_font,
            subtitle_size as f32,
        )?;

        let layout = WatermarkLayout::compute(
            canvas,
            &self.style,
            name.width(),
            subtitle.width(),
            logo.canvas(),
        );
        tracing::debug!(?layout, "watermark layout");

        let (radius, sigma) = shadow_blur_params(self.style.shadow_blur);
        let [dx, dy] = self.style.shadow_offset;
        let margin = f64::from(radius) + dx.abs().max(dy.abs()) + 2.0;
        let region = layout
            .logo
            .union(layout.text_block())
            .inflate(margin, margin)
            .expand()
            .intersect(Rect::new(
                0.0,
                0.0,
                f64::from(canvas.width),
                f64::from(canvas.height),
            ));
        if region.width() <= 0.0 || region.height() <= 0.0 {
            return Ok(image);
        }
        let (rx, ry) = (region.x0 as u32, region.y0 as u32);
        let (rw, rh) = (region.width() as u32, region.height() as u32);
        let local = Vec2::new(region.x0, region.y0);

        let logo_rect = layout.logo - local;
        let logo_paint = image_paint(logo)?;
        let logo_layer = render_layer(rw, rh, |ctx| {
            ctx.set_transform(
                vello_cpu::kurbo::Affine::translate((logo_rect.x0, logo_rect.y0))
                    * vello_cpu::kurbo::Affine::scale_non_uniform(
                        logo_rect.width() / f64::from(logo.width()),
                        logo_rect.height() / f64::from(logo.height()),
                    ),
            );
            ctx.set_paint(logo_paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(logo.width()),
                f64::from(logo.height()),
            ));
            Ok(())
        })?;

        let lines = [
            (&subtitle, layout.subtitle_bottom, self.style.subtitle_color),
            (&name, layout.name_bottom, self.style.name_color),
        ];
        let draw_text = |offset: Vec2| {
            render_layer(rw, rh, |ctx| {
                for (line, bottom, color) in &lines {
                    let origin = line_origin(line, layout.text_right, *bottom) - local + offset;
                    line.fill(ctx, origin, to_cpu_color(*color));
                }
                Ok(())
            })
        };

        let mut shadow = draw_text(Vec2::new(dx, dy))?;
        tint_by_alpha(&mut shadow, self.style.shadow_color.premul());
        let shadow = blur_rgba8_premul(&shadow, rw, rh, radius, sigma)?;
        let text = draw_text(Vec2::ZERO)?;

        for layer in [&logo_layer, &shadow, &text] {
            premul_over_region(image.data_mut(), canvas, layer, rw, rh, rx, ry)?;
        }
        Ok(image)
    }
}

fn line_origin(line: &ShapedLine, right: f64, bottom: f64) -> Point {
    Point::new(right - line.width(), bottom - line.height())
}

fn to_cpu_color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

#[cfg(test)]
#[path = "../../tests/unit/composite/watermark.rs"]
mod tests;
