use std::io::Cursor;

use anyhow::Context;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::ImageEncoder as _;

use crate::assets::decode::decode_image;
use crate::foundation::core::RasterImage;
use crate::foundation::error::{PaintoverError, PaintoverResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;

/// Encoded raster formats accepted for upload and produced for transmission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ImageMime {
    /// `image/png`
    #[serde(rename = "image/png")]
    Png,
    /// `image/jpeg`
    #[serde(rename = "image/jpeg")]
    Jpeg,
}

impl ImageMime {
    /// MIME type string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Parse a MIME type, accepting only PNG and JPEG.
    pub fn parse(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    fn sniff(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes).ok()? {
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImageMime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoded image bytes tagged with their MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Format of `bytes`.
    pub mime: ImageMime,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime", &self.mime)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl EncodedImage {
    /// Wrap already-encoded bytes.
    pub fn new(mime: ImageMime, bytes: Vec<u8>) -> Self {
        Self { mime, bytes }
    }

    /// `data:<mime>;base64,<payload>` form.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }

    /// Parse a `data:` URL or a bare base64 payload.
    ///
    /// Bare payloads have their format sniffed from the decoded bytes.
    pub fn from_data_url(s: &str) -> PaintoverResult<Self> {
        let s = s.trim();
        let (declared, payload) = match s.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest
                    .split_once(',')
                    .ok_or_else(|| PaintoverError::decode("data URL is missing ','"))?;
                let mime = header
                    .strip_suffix(";base64")
                    .ok_or_else(|| PaintoverError::decode("data URL is not base64-encoded"))?;
                let mime = ImageMime::parse(mime).ok_or_else(|| {
                    PaintoverError::decode(format!("unsupported data URL type '{mime}'"))
                })?;
                (Some(mime), payload)
            }
            None => (None, s),
        };

        let bytes = BASE64
            .decode(payload)
            .map_err(|e| PaintoverError::decode(format!("invalid base64 payload: {e}")))?;
        let mime = match declared {
            Some(m) => m,
            None => ImageMime::sniff(&bytes).ok_or_else(|| {
                PaintoverError::decode("base64 payload is not a PNG or JPEG image")
            })?,
        };
        Ok(Self { mime, bytes })
    }

    /// Decode into a raster.
    pub fn decode(&self) -> PaintoverResult<RasterImage> {
        decode_image(&self.bytes)
    }
}

/// Encode a raster as `mime`.
///
/// `quality` is a `0..=1` fraction applied when the format supports it. Formats without an
/// alpha channel are flattened over black, as a canvas export does.
pub fn encode_raster(
    img: &RasterImage,
    mime: ImageMime,
    quality: f32,
) -> PaintoverResult<EncodedImage> {
    let (width, height) = (img.width(), img.height());
    let mut bytes = Vec::new();
    match mime {
        ImageMime::Png => {
            let mut straight = img.data().to_vec();
            unpremultiply_rgba8_in_place(&mut straight);
            let rgba = image::RgbaImage::from_raw(width, height, straight)
                .context("wrap rgba8 buffer for png encode")?;
            image::DynamicImage::ImageRgba8(rgba)
                .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
                .context("encode png")?;
        }
        ImageMime::Jpeg => {
            // Premultiplied color over black is the premultiplied color itself.
            let rgb: Vec<u8> = img
                .data()
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            let q = (quality.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8;
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, q)
                .write_image(&rgb, width, height, image::ExtendedColorType::Rgb8)
                .context("encode jpeg")?;
        }
    }
    Ok(EncodedImage { mime, bytes })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/encode.rs"]
mod tests;
