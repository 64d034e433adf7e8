use crate::assets::encode::{EncodedImage, ImageMime, encode_raster};
use crate::canvas::mask::MaskLayer;
use crate::foundation::core::{ColorFormat, RasterImage, Rgba8Premul};
use crate::foundation::error::PaintoverResult;
use crate::render::blend::{keep_over_backdrop, premul_over_in_place, source_in_fill};
use crate::render::surface::{image_paint, render_layer};

/// Default JPEG export quality, as a `0..=1` fraction.
pub const DEFAULT_JPEG_QUALITY: f32 = 0.95;

/// How a painted mask is turned into the inpainting payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskConvention {
    /// Opaque white where the user painted over the photo, transparent elsewhere.
    #[default]
    Selection,
    /// The photo with the opaque white selection drawn over it.
    PaintOver,
}

/// Which generation the payload is built for.
#[derive(Clone, Copy, Debug)]
pub enum GenerationMode<'a> {
    /// Edit the painted region.
    Inpaint {
        /// Painted selection; must match the source dimensions.
        mask: &'a MaskLayer,
    },
    /// Use the whole photo as a reference.
    Photoshoot,
}

impl GenerationMode<'_> {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Inpaint { .. } => "inpaint",
            Self::Photoshoot => "photoshoot",
        }
    }
}

/// Uploaded photo: the bytes as received plus their decoded raster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedImage {
    encoded: EncodedImage,
    raster: RasterImage,
}

impl LoadedImage {
    /// Decode `encoded`.
    pub fn from_encoded(encoded: EncodedImage) -> PaintoverResult<Self> {
        let raster = encoded.decode()?;
        Ok(Self { encoded, raster })
    }

    /// Bytes as uploaded.
    pub fn encoded(&self) -> &EncodedImage {
        &self.encoded
    }

    /// Decoded pixels.
    pub fn raster(&self) -> &RasterImage {
        &self.raster
    }

    /// Upload format.
    pub fn mime(&self) -> ImageMime {
        self.encoded.mime
    }
}

/// Knobs for [`build_payload`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PayloadOptions {
    /// Mask convention for inpainting.
    pub convention: MaskConvention,
    /// Quality used when the source is a JPEG.
    pub jpeg_quality: f32,
}

impl Default for PayloadOptions {
    fn default() -> Self {
        Self {
            convention: MaskConvention::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Build the image sent to the generation service.
///
/// Photoshoot sends the upload unchanged. Inpainting turns the mask into an opaque white
/// selection constrained to non-transparent source pixels and encodes it in the upload's format.
///
/// # Panics
///
/// When the mask and source dimensions differ.
#[tracing::instrument(skip_all, fields(mode = mode.label(), mime = %source.mime()))]
pub fn build_payload(
    source: &LoadedImage,
    mode: GenerationMode<'_>,
    options: PayloadOptions,
) -> PaintoverResult<EncodedImage> {
    let mask = match mode {
        GenerationMode::Photoshoot => return Ok(source.encoded.clone()),
        GenerationMode::Inpaint { mask } => mask,
    };
    let canvas = source.raster.canvas();
    assert_eq!(
        mask.canvas(),
        canvas,
        "mask dimensions must match the loaded image"
    );

    let white = Rgba8Premul::from_straight_rgba(255, 255, 255, 255);
    let mut selection = mask.as_raster().data().to_vec();
    source_in_fill(&mut selection, white);

    let data = match options.convention {
        MaskConvention::Selection => {
            let paint = image_paint(&source.raster)?;
            let backdrop = render_layer(canvas.width, canvas.height, |ctx| {
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(canvas.width),
                    f64::from(canvas.height),
                ));
                Ok(())
            })?;
            keep_over_backdrop(&mut selection, &backdrop)?;
            selection
        }
        MaskConvention::PaintOver => {
            let mut out = source.raster.data().to_vec();
            premul_over_in_place(&mut out, &selection)?;
            out
        }
    };

    let payload = RasterImage::from_premul_rgba8(canvas, ColorFormat::Rgba, data)?;
    let encoded = encode_raster(&payload, source.mime(), options.jpeg_quality)?;
    tracing::debug!(bytes = encoded.bytes.len(), "payload encoded");
    Ok(encoded)
}

#[cfg(test)]
#[path = "../../tests/unit/composite/payload.rs"]
mod tests;
