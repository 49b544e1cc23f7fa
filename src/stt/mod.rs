//! Speech input.
//!
//! Recognition is a narrow seam: capture one phrase from the microphone and
//! return its transcript. The production implementation uses the offline
//! Vosk runtime behind the `vosk-stt` cargo feature (it links `libvosk` and
//! needs a downloaded model); without the feature the typed command surface
//! is the only input path.

use crate::error::Result;
use cpal::traits::HostTrait;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "vosk-stt")]
mod vosk_stt;

#[cfg(feature = "vosk-stt")]
pub use vosk_stt::VoskStt;

/// Returns true when an input audio device is present.
#[must_use]
pub fn microphone_available() -> bool {
    cpal::default_host().default_input_device().is_some()
}

/// Speech recognition seam. `capture_phrase` blocks while recording and must
/// only be called off the interactive task.
pub trait Transcriber: Send + Sync {
    /// Record from the microphone for at most `timeout` and return the
    /// transcript. An empty string means no intelligible speech was heard.
    ///
    /// # Errors
    ///
    /// Returns an error when the device cannot be opened or the recognizer
    /// fails.
    fn capture_phrase(&self, timeout: Duration) -> Result<String>;
}

/// Build the transcriber compiled into this binary, if any.
///
/// # Errors
///
/// Returns an error when the recognizer is compiled in but cannot be
/// initialised (missing model, no input device).
pub fn build_transcriber() -> Result<Option<Arc<dyn Transcriber>>> {
    #[cfg(feature = "vosk-stt")]
    {
        VoskStt::from_env().map(|stt| Some(Arc::new(stt) as Arc<dyn Transcriber>))
    }
    #[cfg(not(feature = "vosk-stt"))]
    {
        Ok(None)
    }
}
