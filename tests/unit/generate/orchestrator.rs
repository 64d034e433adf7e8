use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex};

use super::*;
use crate::assets::encode::{ImageMime, encode_raster};
use crate::canvas::mask::MaskLayer;
use crate::foundation::core::{Canvas, ColorFormat, RasterImage, Rgba8Premul};
use crate::foundation::error::INSUFFICIENT_CREDITS_MESSAGE;
use crate::generate::credits::{InMemoryCreditStore, UserId};

fn png(w: u32, h: u32) -> EncodedImage {
    let raster = RasterImage::filled(
        Canvas::new(w, h).unwrap(),
        ColorFormat::Rgb,
        Rgba8Premul::from_straight_rgba(90, 90, 200, 255),
    );
    encode_raster(&raster, ImageMime::Png, 1.0).unwrap()
}

#[derive(Default)]
struct StubService {
    inpaint_calls: AtomicUsize,
    reference_calls: AtomicUsize,
    fail_with: Option<String>,
    reply: Option<String>,
    seen: Mutex<Vec<(ImageMime, String)>>,
}

impl StubService {
    fn replying(w: u32, h: u32) -> Self {
        Self {
            reply: Some(png(w, h).to_data_url()),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.inpaint_calls.load(Ordering::SeqCst) + self.reference_calls.load(Ordering::SeqCst)
    }

    fn answer(&self, payload: &EncodedImage, prompt: &str) -> PaintoverResult<String> {
        self.seen
            .lock()
            .unwrap()
            .push((payload.mime, prompt.to_string()));
        if let Some(msg) = &self.fail_with {
            return Err(PaintoverError::service(msg.clone()));
        }
        Ok(self.reply.clone().unwrap_or_default())
    }
}

impl GenerationService for StubService {
    async fn generate_inpainted(
        &self,
        payload: &EncodedImage,
        prompt: &str,
    ) -> PaintoverResult<String> {
        self.inpaint_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(payload, prompt)
    }

    async fn generate_from_reference(
        &self,
        payload: &EncodedImage,
        prompt: &str,
    ) -> PaintoverResult<String> {
        self.reference_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(payload, prompt)
    }
}

fn loaded(w: u32, h: u32) -> LoadedImage {
    LoadedImage::from_encoded(png(w, h)).unwrap()
}

fn ada() -> UserId {
    UserId("ada".to_string())
}

#[tokio::test]
async fn photoshoot_runs_all_stages_and_debits_once() {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let store = InMemoryCreditStore::with_account("ada", 12);
    let orch = Orchestrator::new(StubService::replying(64, 48), store.clone()).with_stage_observer({
        let stages = Arc::clone(&stages);
        move |s| stages.lock().unwrap().push(s)
    });
    let image = loaded(32, 32);

    let out = orch
        .generate(GenerationRequest {
            image: Some(&image),
            prompt: "studio portrait",
            mode: GenerationMode::Photoshoot,
        })
        .await
        .unwrap();

    assert_eq!(out.balance, 7);
    assert_eq!(store.balance(&ada()), Some(7));
    assert_eq!(out.image.mime, ImageMime::Png);
    assert_eq!(out.image.decode().unwrap().canvas(), Canvas::new(64, 48).unwrap());
    assert_eq!(orch.service().reference_calls.load(Ordering::SeqCst), 1);
    assert_eq!(orch.service().inpaint_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        *stages.lock().unwrap(),
        vec![
            GenerationStage::Validating,
            GenerationStage::Requesting,
            GenerationStage::Watermarking,
            GenerationStage::Debiting,
            GenerationStage::Idle,
        ]
    );
    assert!(!orch.is_in_flight());
}

#[tokio::test]
async fn inpaint_composites_before_requesting() {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let orch = Orchestrator::new(
        StubService::replying(16, 16),
        InMemoryCreditStore::with_account("ada", 5),
    )
    .with_stage_observer({
        let stages = Arc::clone(&stages);
        move |s| stages.lock().unwrap().push(s)
    });
    let image = loaded(16, 16);
    let mask = MaskLayer::new(image.raster().canvas());

    let out = orch
        .generate(GenerationRequest {
            image: Some(&image),
            prompt: "add a hat",
            mode: GenerationMode::Inpaint { mask: &mask },
        })
        .await
        .unwrap();
    assert_eq!(out.balance, 0);
    assert_eq!(orch.service().inpaint_calls.load(Ordering::SeqCst), 1);
    assert_eq!(stages.lock().unwrap()[1], GenerationStage::Compositing);
    assert_eq!(
        orch.service().seen.lock().unwrap()[0],
        (ImageMime::Png, "add a hat".to_string())
    );
}

#[tokio::test]
async fn missing_image_or_blank_prompt_is_rejected() {
    let orch = Orchestrator::new(
        StubService::replying(8, 8),
        InMemoryCreditStore::with_account("ada", 50),
    );
    let image = loaded(8, 8);

    for (img, prompt) in [(None, "hat"), (Some(&image), "   ")] {
        let err = orch
            .generate(GenerationRequest {
                image: img,
                prompt,
                mode: GenerationMode::Photoshoot,
            })
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), MISSING_INPUT_MESSAGE);
    }
    assert_eq!(orch.service().calls(), 0);
}

#[tokio::test]
async fn signed_out_user_is_rejected() {
    let orch = Orchestrator::new(StubService::replying(8, 8), InMemoryCreditStore::new());
    let image = loaded(8, 8);
    let err = orch
        .generate(GenerationRequest {
            image: Some(&image),
            prompt: "hat",
            mode: GenerationMode::Photoshoot,
        })
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), NOT_SIGNED_IN_MESSAGE);
    assert_eq!(orch.service().calls(), 0);
}

#[tokio::test]
async fn balance_equal_to_cost_is_enough() {
    let store = InMemoryCreditStore::with_account("ada", 5);
    let orch = Orchestrator::new(StubService::replying(8, 8), store.clone());
    let image = loaded(8, 8);
    orch.generate(GenerationRequest {
        image: Some(&image),
        prompt: "hat",
        mode: GenerationMode::Photoshoot,
    })
    .await
    .unwrap();
    assert_eq!(store.balance(&ada()), Some(0));
}

#[tokio::test]
async fn balance_below_cost_never_calls_service() {
    let store = InMemoryCreditStore::with_account("ada", 4);
    let orch = Orchestrator::new(StubService::replying(8, 8), store.clone());
    let image = loaded(8, 8);
    let err = orch
        .generate(GenerationRequest {
            image: Some(&image),
            prompt: "hat",
            mode: GenerationMode::Photoshoot,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PaintoverError::InsufficientCredits {
            balance: 4,
            cost: 5
        }
    ));
    assert_eq!(err.user_message(), INSUFFICIENT_CREDITS_MESSAGE);
    assert_eq!(orch.service().calls(), 0);
    assert_eq!(store.balance(&ada()), Some(4));
}

#[tokio::test]
async fn service_error_is_surfaced_verbatim_without_debit() {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let store = InMemoryCreditStore::with_account("ada", 10);
    let service = StubService {
        fail_with: Some("Model overloaded, try later.".to_string()),
        ..StubService::default()
    };
    let orch = Orchestrator::new(service, store.clone()).with_stage_observer({
        let stages = Arc::clone(&stages);
        move |s| stages.lock().unwrap().push(s)
    });
    let image = loaded(8, 8);
    let err = orch
        .generate(GenerationRequest {
            image: Some(&image),
            prompt: "hat",
            mode: GenerationMode::Photoshoot,
        })
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Model overloaded, try later.");
    assert_eq!(store.balance(&ada()), Some(10));
    let stages = stages.lock().unwrap();
    assert_eq!(
        stages[stages.len() - 2..],
        [GenerationStage::Failed, GenerationStage::Idle]
    );
}

#[tokio::test]
async fn unreadable_result_fails_watermarking_without_debit() {
    let store = InMemoryCreditStore::with_account("ada", 10);
    let service = StubService {
        reply: Some("data:image/png;base64,AAAA".to_string()),
        ..StubService::default()
    };
    let orch = Orchestrator::new(service, store.clone());
    let image = loaded(8, 8);
    let err = orch
        .generate(GenerationRequest {
            image: Some(&image),
            prompt: "hat",
            mode: GenerationMode::Photoshoot,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PaintoverError::Decode(ref m) if m == IMAGE_LOAD_FAILED));
    assert_eq!(store.balance(&ada()), Some(10));
    assert!(!orch.is_in_flight());
}

#[test]
fn in_flight_guard_rejects_reentry_and_releases_on_drop() {
    let flag = AtomicBool::new(false);
    let first = InFlight::acquire(&flag).unwrap();
    assert!(InFlight::acquire(&flag).is_none());
    drop(first);
    assert!(InFlight::acquire(&flag).is_some());
}

#[tokio::test]
async fn config_sets_cost() {
    let config = EditorConfig {
        generation_cost: 2,
        ..EditorConfig::default()
    };
    let store = InMemoryCreditStore::with_account("ada", 3);
    let orch = Orchestrator::from_config(StubService::replying(8, 8), store.clone(), &config);
    assert_eq!(orch.cost(), 2);
    let image = loaded(8, 8);
    let out = orch
        .generate(GenerationRequest {
            image: Some(&image),
            prompt: "hat",
            mode: GenerationMode::Photoshoot,
        })
        .await
        .unwrap();
    assert_eq!(out.balance, 1);
}

fn describe<S, C>(orch: &Orchestrator<S, C>) -> String {
    format!("{orch:?}")
}

#[test]
fn debug_reports_cost_and_in_flight_without_bounds() {
    let orch = Orchestrator::new(StubService::replying(8, 8), InMemoryCreditStore::new());
    let text = describe(&orch);
    assert!(text.contains("cost: 5"), "{text}");
    assert!(text.contains("in_flight: false"), "{text}");
}
