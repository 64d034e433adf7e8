//! Assets compiled into the binary so watermarking needs no filesystem access.

/// Default watermark logo (64x64 RGBA PNG).
pub const DEFAULT_LOGO_PNG: &[u8] = include_bytes!("../../assets/logo.png");

/// Font for the watermark name line (DejaVu Serif Bold Italic).
pub const NAME_FONT_TTF: &[u8] = include_bytes!("../../assets/fonts/DejaVuSerif-BoldItalic.ttf");

/// Font for the watermark subtitle line (DejaVu Sans).
pub const SUBTITLE_FONT_TTF: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
