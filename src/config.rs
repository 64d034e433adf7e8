use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::canvas::stroke::{BrushSize, HIGHLIGHT_COLOR};
use crate::composite::payload::{DEFAULT_JPEG_QUALITY, MaskConvention, PayloadOptions};
use crate::composite::watermark::WatermarkStyle;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{PaintoverError, PaintoverResult};

/// Credits charged per successful generation.
pub const DEFAULT_GENERATION_COST: i64 = 5;

/// File name offered for the final image.
pub const DEFAULT_DOWNLOAD_FILENAME: &str = "generated-by-ai-editor.png";

/// Editor settings; every field has a default, so `{}` is a valid config.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Credits charged per generation.
    pub generation_cost: i64,
    /// Brush diameter a new session starts with.
    pub default_brush_size: BrushSize,
    /// Display color of painted strokes.
    pub brush_color: Rgba8,
    /// Quality of JPEG payloads, `0..=1`.
    pub jpeg_quality: f32,
    /// How the mask is turned into the inpainting payload.
    pub mask_convention: MaskConvention,
    /// Watermark text and proportions.
    pub watermark: WatermarkStyle,
    /// Name offered when downloading the result.
    pub download_filename: String,
    /// Where to send users who ran out of credits.
    pub upsell_url: Option<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            generation_cost: DEFAULT_GENERATION_COST,
            default_brush_size: BrushSize::default(),
            brush_color: HIGHLIGHT_COLOR,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            mask_convention: MaskConvention::default(),
            watermark: WatermarkStyle::default(),
            download_filename: DEFAULT_DOWNLOAD_FILENAME.to_string(),
            upsell_url: None,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(s: &str) -> PaintoverResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| PaintoverError::validation(format!("parse editor config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a JSON config file.
    pub fn from_json_path(path: impl AsRef<Path>) -> PaintoverResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PaintoverError::validation(format!("open editor config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            PaintoverError::validation(format!("parse editor config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> PaintoverResult<()> {
        if self.generation_cost < 0 {
            return Err(PaintoverError::validation(
                "generation_cost must be non-negative",
            ));
        }
        if !(self.jpeg_quality.is_finite() && (0.0..=1.0).contains(&self.jpeg_quality)) {
            return Err(PaintoverError::validation(
                "jpeg_quality must be within 0..=1",
            ));
        }
        if self.download_filename.trim().is_empty() {
            return Err(PaintoverError::validation(
                "download_filename must not be empty",
            ));
        }
        let wm = &self.watermark;
        for (name, [lo, hi]) in [
            ("name_size_range", wm.name_size_range),
            ("subtitle_size_range", wm.subtitle_size_range),
        ] {
            if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && lo <= hi) {
                return Err(PaintoverError::validation(format!(
                    "watermark.{name} must be positive with min <= max"
                )));
            }
        }
        if !(wm.logo_scale.is_finite() && wm.logo_scale > 0.0) {
            return Err(PaintoverError::validation(
                "watermark.logo_scale must be positive",
            ));
        }
        Ok(())
    }

    /// Payload settings derived from this config.
    pub fn payload_options(&self) -> PayloadOptions {
        PayloadOptions {
            convention: self.mask_convention,
            jpeg_quality: self.jpeg_quality,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
