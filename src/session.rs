//! Editor state around the drawing and generation pipeline.
//!
//! [`EditorSession`] owns the loaded photo, the mask being painted, brush and mode, the last
//! result and the last user-facing error. Pointer input flows through the coordinate mapper and
//! stroke renderer; [`EditorSession::generate`] hands everything to an [`Orchestrator`].

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::assets::encode::{EncodedImage, ImageMime};
use crate::canvas::coords::{CanvasRect, PointerEvent, map_pointer};
use crate::canvas::mask::MaskLayer;
use crate::canvas::stroke::{BrushSize, StrokeRenderer};
use crate::composite::payload::{GenerationMode, LoadedImage};
use crate::config::EditorConfig;
use crate::foundation::error::{INSUFFICIENT_CREDITS_MESSAGE, PaintoverError, PaintoverResult};
use crate::generate::credits::{Account, CreditStore, Subscription};
use crate::generate::orchestrator::{BUSY_MESSAGE, GenerationRequest, Orchestrator};
use crate::generate::progress;
use crate::generate::service::GenerationService;

/// Shown when an upload is neither PNG nor JPEG.
pub const UNSUPPORTED_UPLOAD_MESSAGE: &str = "Please upload a JPEG or PNG image.";

/// What a generation does with the photo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorMode {
    /// Repaint the masked region.
    #[default]
    Inpainting,
    /// Use the photo as a character reference for a new image.
    Photoshoot,
}

/// Final artifact offered to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Download {
    /// Suggested file name.
    pub filename: String,
    /// PNG bytes.
    pub bytes: Vec<u8>,
}

/// Prompt to buy more credits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Upsell {
    /// Text to show.
    pub message: String,
    /// Where to buy credits, if configured.
    pub url: Option<String>,
}

/// State of one editing session.
pub struct EditorSession {
    config: EditorConfig,
    mode: EditorMode,
    image: Option<LoadedImage>,
    mask: Option<MaskLayer>,
    renderer: StrokeRenderer,
    result: Option<EncodedImage>,
    error: Option<String>,
    upsell: Option<Upsell>,
    account: Arc<Mutex<Option<Account>>>,
    subscriptions: Vec<Subscription>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("mode", &self.mode)
            .field("image", &self.image.as_ref().map(|i| i.raster().canvas()))
            .field("brush", &self.renderer.brush())
            .field("has_result", &self.result.is_some())
            .field("error", &self.error)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    /// Empty session.
    pub fn new(config: EditorConfig) -> Self {
        let renderer = StrokeRenderer::new(config.default_brush_size, config.brush_color);
        Self {
            config,
            mode: EditorMode::default(),
            image: None,
            mask: None,
            renderer,
            result: None,
            error: None,
            upsell: None,
            account: Arc::new(Mutex::new(None)),
            subscriptions: Vec::new(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current mode.
    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// Loaded photo.
    pub fn image(&self) -> Option<&LoadedImage> {
        self.image.as_ref()
    }

    /// Mask for the loaded photo.
    pub fn mask(&self) -> Option<&MaskLayer> {
        self.mask.as_ref()
    }

    /// Current brush.
    pub fn brush_size(&self) -> BrushSize {
        self.renderer.brush()
    }

    /// Watermarked result of the last successful generation.
    pub fn result(&self) -> Option<&EncodedImage> {
        self.result.as_ref()
    }

    /// Message of the last failure.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Set when the last generation failed for lack of credits.
    pub fn upsell(&self) -> Option<&Upsell> {
        self.upsell.as_ref()
    }

    /// Last account reported by watched credit stores.
    pub fn account(&self) -> Option<Account> {
        self.account
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Load a new photo, replacing the previous one along with its mask and result.
    pub fn upload(&mut self, bytes: Vec<u8>, mime: &str) -> PaintoverResult<()> {
        let Some(mime) = ImageMime::parse(mime) else {
            return Err(self.fail(PaintoverError::validation(UNSUPPORTED_UPLOAD_MESSAGE)));
        };
        let loaded = match LoadedImage::from_encoded(EncodedImage::new(mime, bytes)) {
            Ok(loaded) => loaded,
            Err(e) => return Err(self.fail(e)),
        };
        tracing::debug!(canvas = ?loaded.raster().canvas(), %mime, "image uploaded");
        self.mask = Some(MaskLayer::new(loaded.raster().canvas()));
        self.image = Some(loaded);
        self.renderer.end();
        self.result = None;
        self.error = None;
        self.upsell = None;
        Ok(())
    }

    /// Switch mode; the mask starts over.
    pub fn set_mode(&mut self, mode: EditorMode) {
        self.mode = mode;
        self.renderer.end();
        if let Some(mask) = &mut self.mask {
            mask.clear();
        }
    }

    /// Change the brush diameter.
    pub fn set_brush_size(&mut self, px: f64) -> PaintoverResult<()> {
        self.renderer.set_brush(BrushSize::new(px)?);
        Ok(())
    }

    /// Start a stroke; ignored until a photo is loaded.
    pub fn pointer_down(&mut self, event: &PointerEvent, rect: CanvasRect) {
        let Some(mask) = &self.mask else {
            return;
        };
        self.renderer.begin(map_pointer(event, rect, mask.canvas()));
    }

    /// Continue the active stroke.
    pub fn pointer_move(&mut self, event: &PointerEvent, rect: CanvasRect) -> PaintoverResult<()> {
        let Some(mask) = &mut self.mask else {
            return Ok(());
        };
        match map_pointer(event, rect, mask.canvas()) {
            Some(point) => self.renderer.extend(point, mask),
            None => Ok(()),
        }
    }

    /// Finish the active stroke.
    pub fn pointer_up(&mut self) {
        self.renderer.end();
    }

    /// Erase everything painted so far.
    pub fn clear_mask(&mut self) {
        if let Some(mask) = &mut self.mask {
            self.renderer.clear(mask);
        }
    }

    /// Run a generation for the current photo, mode and mask.
    ///
    /// A request rejected before it starts (missing input, signed out, too few credits, another
    /// request running) keeps the previous result. Once the request starts the previous result is
    /// gone; on failure [`error`](Self::error) holds the message to show.
    pub async fn generate<S: GenerationService, C: CreditStore>(
        &mut self,
        orchestrator: &Orchestrator<S, C>,
        prompt: &str,
    ) -> PaintoverResult<()> {
        self.error = None;
        self.upsell = None;
        self.renderer.end();

        let mode = match (self.mode, &self.mask) {
            (EditorMode::Inpainting, Some(mask)) => GenerationMode::Inpaint { mask },
            (EditorMode::Inpainting, None) | (EditorMode::Photoshoot, _) => {
                GenerationMode::Photoshoot
            }
        };
        let request = GenerationRequest {
            image: self.image.as_ref(),
            prompt,
            mode,
        };
        let rejected = if orchestrator.is_in_flight() {
            Some(PaintoverError::validation(BUSY_MESSAGE))
        } else {
            orchestrator.validate(&request).err()
        };
        if let Some(e) = rejected {
            tracing::debug!(error = %e, "generation rejected, keeping previous result");
            return Err(self.fail(e));
        }

        self.result = None;
        let outcome = orchestrator.generate(request).await;
        match outcome {
            Ok(outcome) => {
                self.result = Some(outcome.image);
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, err: PaintoverError) -> PaintoverError {
        if matches!(err, PaintoverError::InsufficientCredits { .. }) {
            self.upsell = Some(Upsell {
                message: INSUFFICIENT_CREDITS_MESSAGE.to_string(),
                url: self.config.upsell_url.clone(),
            });
        }
        self.error = Some(err.user_message());
        err
    }

    /// The result as a download, once one exists.
    pub fn download(&self) -> Option<Download> {
        self.result.as_ref().map(|r| Download {
            filename: self.config.download_filename.clone(),
            bytes: r.bytes.clone(),
        })
    }

    /// Follow account changes in `store` until the session is dropped or released.
    pub fn watch_account<C: CreditStore>(&mut self, store: &C) {
        let slot = Arc::clone(&self.account);
        let sub = store.subscribe(Arc::new(move |account: Option<&Account>| {
            *slot.lock().unwrap_or_else(|e| e.into_inner()) = account.cloned();
        }));
        self.subscriptions.push(sub);
    }

    /// Unregister every account listener now.
    pub fn release_subscriptions(&mut self) {
        self.subscriptions.clear();
    }

    /// Progress text for a request that started `elapsed` ago.
    pub fn loading_message(elapsed: Duration) -> &'static str {
        progress::loading_message(elapsed)
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
