use std::time::Duration;

/// Progress texts cycled while a generation request is in flight.
pub const LOADING_MESSAGES: [&str; 6] = [
    "Analyzing facial geometry...",
    "Mapping unique features...",
    "Understanding scene requirements...",
    "Crafting the new composition...",
    "Applying hyper-realistic lighting...",
    "This detailed process can take a moment...",
];

/// How long each loading message stays on screen.
pub const LOADING_MESSAGE_PERIOD: Duration = Duration::from_secs(3);

/// Message to show `elapsed` after the request started; wraps around after the last one.
pub fn loading_message(elapsed: Duration) -> &'static str {
    let step = elapsed.as_millis() / LOADING_MESSAGE_PERIOD.as_millis();
    LOADING_MESSAGES[(step % LOADING_MESSAGES.len() as u128) as usize]
}

#[cfg(test)]
#[path = "../../tests/unit/generate/progress.rs"]
mod tests;
