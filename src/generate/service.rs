use crate::assets::encode::EncodedImage;
use crate::foundation::error::PaintoverResult;

/// External generative-model client.
///
/// Both calls return the generated image as a `data:` URL or a bare base64 PNG payload. Failures
/// should be [`crate::PaintoverError::Service`]; their message is shown to the user verbatim.
#[allow(async_fn_in_trait)]
pub trait GenerationService {
    /// Regenerate the region selected in `payload` according to `prompt`.
    async fn generate_inpainted(
        &self,
        payload: &EncodedImage,
        prompt: &str,
    ) -> PaintoverResult<String>;

    /// Generate a new image using `payload` as the character reference.
    async fn generate_from_reference(
        &self,
        payload: &EncodedImage,
        prompt: &str,
    ) -> PaintoverResult<String>;
}

impl<S: GenerationService> GenerationService for &S {
    async fn generate_inpainted(
        &self,
        payload: &EncodedImage,
        prompt: &str,
    ) -> PaintoverResult<String> {
        (**self).generate_inpainted(payload, prompt).await
    }

    async fn generate_from_reference(
        &self,
        payload: &EncodedImage,
        prompt: &str,
    ) -> PaintoverResult<String> {
        (**self).generate_from_reference(payload, prompt).await
    }
}
