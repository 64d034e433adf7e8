/// Convenience result type used across paintover.
pub type PaintoverResult<T> = Result<T, PaintoverError>;

/// Message shown for surface and decode failures.
pub const GENERIC_FAILURE_MESSAGE: &str = "Image generation failed. Please try again.";

/// Message shown when the balance does not cover a generation.
pub const INSUFFICIENT_CREDITS_MESSAGE: &str =
    "You do not have enough credits. Please upgrade your plan.";

/// Message shown for errors without a more specific mapping.
pub const UNKNOWN_FAILURE_MESSAGE: &str = "An unknown error occurred.";

/// Top-level error taxonomy used by editor APIs.
#[derive(thiserror::Error, Debug)]
pub enum PaintoverError {
    /// Missing image or prompt, bad parameters, unauthenticated user.
    #[error("validation error: {0}")]
    Validation(String),

    /// The account balance is below the generation cost.
    #[error("insufficient credits: balance {balance}, cost {cost}")]
    InsufficientCredits {
        /// Balance at validation time.
        balance: i64,
        /// Cost of one generation.
        cost: i64,
    },

    /// A drawing surface could not be created.
    #[error("surface error: {0}")]
    Surface(String),

    /// An image or logo payload failed to decode.
    #[error("decode error: {0}")]
    Decode(String),

    /// The external generation service failed; the message is the service's own.
    #[error("{0}")]
    Service(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PaintoverError {
    /// Build a [`PaintoverError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PaintoverError::Surface`] value.
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    /// Build a [`PaintoverError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`PaintoverError::Service`] value.
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Text to show the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::InsufficientCredits { .. } => INSUFFICIENT_CREDITS_MESSAGE.to_string(),
            Self::Surface(_) | Self::Decode(_) => GENERIC_FAILURE_MESSAGE.to_string(),
            Self::Service(msg) => msg.clone(),
            Self::Other(_) => UNKNOWN_FAILURE_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
