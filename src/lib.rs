//! Paintover is a mask-painting and inpainting pipeline for photo editors.
//!
//! A user paints over part of a photo, the painted region is turned into a payload for a
//! generative image service together with a text prompt, and the returned image is stamped with a
//! watermark before it is offered for download:
//!
//! - Map pointer input to image pixels with [`map_pointer`]
//! - Accumulate brush strokes into a [`MaskLayer`] through a [`StrokeRenderer`]
//! - Turn the mask into the service payload with [`build_payload`]
//! - Stamp the result with a [`Watermarker`]
//! - Drive a whole request, credits included, with an [`Orchestrator`], or let an
//!   [`EditorSession`] hold the editor state around it
//!
//! The generation service and the credit ledger are external; they plug in through the
//! [`GenerationService`] and [`CreditStore`] traits.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod canvas;
mod composite;
mod config;
mod foundation;
mod generate;
mod render;
mod session;

pub use crate::foundation::core::{
    Canvas, ColorFormat, Point, RasterImage, Rect, Rgba8, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{
    GENERIC_FAILURE_MESSAGE, INSUFFICIENT_CREDITS_MESSAGE, PaintoverError, PaintoverResult,
    UNKNOWN_FAILURE_MESSAGE,
};

pub use crate::assets::decode::decode_image;
pub use crate::assets::encode::{EncodedImage, ImageMime, encode_raster};
pub use crate::canvas::coords::{CanvasRect, PointerEvent, map_pointer};
pub use crate::canvas::mask::MaskLayer;
pub use crate::canvas::stroke::{
    BrushSize, DEFAULT_BRUSH_PX, HIGHLIGHT_COLOR, Stroke, StrokeRenderer,
};
pub use crate::composite::payload::{
    DEFAULT_JPEG_QUALITY, GenerationMode, LoadedImage, MaskConvention, PayloadOptions,
    build_payload,
};
pub use crate::composite::watermark::{
    IMAGE_LOAD_FAILED, LOGO_LOAD_FAILED, WatermarkLayout, WatermarkStyle, Watermarker,
};
pub use crate::config::{DEFAULT_DOWNLOAD_FILENAME, DEFAULT_GENERATION_COST, EditorConfig};
pub use crate::generate::credits::{
    Account, AccountListener, CreditStore, InMemoryCreditStore, Subscription, UserId,
};
pub use crate::generate::orchestrator::{
    BUSY_MESSAGE, GenerationOutcome, GenerationRequest, GenerationStage, MISSING_INPUT_MESSAGE,
    NOT_SIGNED_IN_MESSAGE, Orchestrator,
};
pub use crate::generate::progress::{LOADING_MESSAGE_PERIOD, LOADING_MESSAGES, loading_message};
pub use crate::generate::service::GenerationService;
pub use crate::session::{
    Download, EditorMode, EditorSession, UNSUPPORTED_UPLOAD_MESSAGE, Upsell,
};
