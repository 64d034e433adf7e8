use std::sync::atomic::{AtomicBool, Ordering};

use crate::assets::encode::EncodedImage;
use crate::composite::payload::{GenerationMode, LoadedImage, PayloadOptions, build_payload};
use crate::composite::watermark::{IMAGE_LOAD_FAILED, Watermarker};
use crate::config::{DEFAULT_GENERATION_COST, EditorConfig};
use crate::foundation::error::{PaintoverError, PaintoverResult};
use crate::generate::credits::{Account, CreditStore};
use crate::generate::service::GenerationService;

/// Shown when the image or the prompt is missing.
pub const MISSING_INPUT_MESSAGE: &str = "Please upload an image and provide a prompt.";
/// Shown when nobody is signed in.
pub const NOT_SIGNED_IN_MESSAGE: &str = "You must be logged in to generate images.";
/// Shown when a request is started while another one runs.
pub const BUSY_MESSAGE: &str = "A generation is already in progress.";

/// Where a generation request currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenerationStage {
    /// No request running.
    Idle,
    /// Checking inputs, sign-in and balance.
    Validating,
    /// Building the inpainting payload.
    Compositing,
    /// Waiting for the generation service.
    Requesting,
    /// Stamping the result.
    Watermarking,
    /// Charging the account.
    Debiting,
    /// The request failed; followed by `Idle`.
    Failed,
}

/// One generation request.
#[derive(Clone, Copy, Debug)]
pub struct GenerationRequest<'a> {
    /// Loaded photo, if any.
    pub image: Option<&'a LoadedImage>,
    /// User instruction.
    pub prompt: &'a str,
    /// Inpaint with a mask, or photoshoot.
    pub mode: GenerationMode<'a>,
}

/// Successful generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationOutcome {
    /// Watermarked PNG.
    pub image: EncodedImage,
    /// Balance after the debit.
    pub balance: i64,
}

type StageObserver = Box<dyn Fn(GenerationStage) + Send + Sync>;

struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs validate, composite, request, watermark and debit for one request at a time.
pub struct Orchestrator<S, C> {
    service: S,
    credits: C,
    watermarker: Watermarker,
    logo: EncodedImage,
    cost: i64,
    payload_options: PayloadOptions,
    in_flight: AtomicBool,
    observer: Option<StageObserver>,
}

impl<S, C> std::fmt::Debug for Orchestrator<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("cost", &self.cost)
            .field("payload_options", &self.payload_options)
            .field("in_flight", &self.is_in_flight())
            .finish_non_exhaustive()
    }
}

impl<S, C> Orchestrator<S, C> {
    /// Whether a request is running.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

impl<S: GenerationService, C: CreditStore> Orchestrator<S, C> {
    /// Orchestrator with default cost, payload options, watermark style and logo.
    pub fn new(service: S, credits: C) -> Self {
        Self {
            service,
            credits,
            watermarker: Watermarker::default(),
            logo: Watermarker::default_logo(),
            cost: DEFAULT_GENERATION_COST,
            payload_options: PayloadOptions::default(),
            in_flight: AtomicBool::new(false),
            observer: None,
        }
    }

    /// Orchestrator configured from `config`.
    pub fn from_config(service: S, credits: C, config: &EditorConfig) -> Self {
        Self {
            watermarker: Watermarker::new(config.watermark.clone()),
            cost: config.generation_cost,
            payload_options: config.payload_options(),
            ..Self::new(service, credits)
        }
    }

    /// Replace the watermark logo.
    pub fn with_logo(mut self, logo: EncodedImage) -> Self {
        self.logo = logo;
        self
    }

    /// Report every stage change to `observer`.
    pub fn with_stage_observer(
        mut self,
        observer: impl Fn(GenerationStage) + Send + Sync + 'static,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Credits charged per generation.
    pub fn cost(&self) -> i64 {
        self.cost
    }

    /// The credit store.
    pub fn credits(&self) -> &C {
        &self.credits
    }

    /// The generation service.
    pub fn service(&self) -> &S {
        &self.service
    }

    fn enter(&self, stage: GenerationStage) {
        tracing::debug!(?stage, "generation stage");
        if let Some(observer) = &self.observer {
            observer(stage);
        }
    }

    /// Run one request end to end.
    ///
    /// The account is charged only after the watermarked result exists; any failure leaves the
    /// balance untouched. A second call while one is running fails immediately.
    #[tracing::instrument(skip_all, fields(mode = request.mode.label()))]
    pub async fn generate(
        &self,
        request: GenerationRequest<'_>,
    ) -> PaintoverResult<GenerationOutcome> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            tracing::warn!("generation rejected, another request is in flight");
            return Err(PaintoverError::validation(BUSY_MESSAGE));
        };

        match self.run(request).await {
            Ok(outcome) => {
                self.enter(GenerationStage::Idle);
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(error = %e, "generation failed");
                self.enter(GenerationStage::Failed);
                self.enter(GenerationStage::Idle);
                Err(e)
            }
        }
    }

    async fn run(&self, request: GenerationRequest<'_>) -> PaintoverResult<GenerationOutcome> {
        self.enter(GenerationStage::Validating);
        let (image, account) = self.validate(&request)?;

        let payload = match request.mode {
            GenerationMode::Inpaint { .. } => {
                self.enter(GenerationStage::Compositing);
                build_payload(image, request.mode, self.payload_options)?
            }
            GenerationMode::Photoshoot => image.encoded().clone(),
        };

        self.enter(GenerationStage::Requesting);
        let raw = match request.mode {
            GenerationMode::Inpaint { .. } => {
                self.service
                    .generate_inpainted(&payload, request.prompt)
                    .await?
            }
            GenerationMode::Photoshoot => {
                self.service
                    .generate_from_reference(&payload, request.prompt)
                    .await?
            }
        };

        self.enter(GenerationStage::Watermarking);
        let result = EncodedImage::from_data_url(&raw).map_err(|e| {
            tracing::warn!(error = %e, "service returned an unreadable image");
            PaintoverError::decode(IMAGE_LOAD_FAILED)
        })?;
        let image = self.watermarker.apply(&result, &self.logo).await?;

        self.enter(GenerationStage::Debiting);
        let balance = account.credits - self.cost;
        self.credits.set_balance(&account.user, balance).await?;
        tracing::info!(user = %account.user, balance, "generation complete");

        Ok(GenerationOutcome { image, balance })
    }

    pub(crate) fn validate<'r>(
        &self,
        request: &GenerationRequest<'r>,
    ) -> PaintoverResult<(&'r LoadedImage, Account)> {
        let image = match request.image {
            Some(image) if !request.prompt.trim().is_empty() => image,
            _ => return Err(PaintoverError::validation(MISSING_INPUT_MESSAGE)),
        };
        let account = self
            .credits
            .current_account()
            .ok_or_else(|| PaintoverError::validation(NOT_SIGNED_IN_MESSAGE))?;
        if account.credits < self.cost {
            return Err(PaintoverError::InsufficientCredits {
                balance: account.credits,
                cost: self.cost,
            });
        }
        Ok((image, account))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/orchestrator.rs"]
mod tests;
