//! Speech synthesis.
//!
//! The production engine is the platform text-to-speech service via the
//! `tts` crate (SAPI on Windows, AVFoundation on macOS, speech-dispatcher on
//! Linux). When the engine fails mid-utterance, one OS-specific fallback
//! command is attempted before the error is reported to the user.

mod system;

pub use system::SystemTts;

use crate::cancel::StopFlag;
use crate::error::{AssistantError, Result};
use crate::settings::Settings;

/// A voice offered by the platform engine.
#[derive(Debug, Clone)]
pub struct VoiceInfo {
    /// Engine-specific voice identifier.
    pub id: String,
    /// Human-readable voice name.
    pub name: String,
    /// Voice language tag.
    pub language: String,
}

/// Speech output seam.
///
/// `speak` blocks until playback completes and must only be called off the
/// interactive task (the session wraps it in `spawn_blocking`). The stop
/// flag is polled during playback so a stop request cuts speech short.
pub trait Synthesizer: Send + Sync {
    /// Speak `text`, blocking until playback finishes or a stop is requested.
    ///
    /// # Errors
    ///
    /// Returns an error when both the engine and the OS fallback fail.
    fn speak(&self, text: &str, stop: &StopFlag) -> Result<()>;

    /// Stop any in-flight speech.
    ///
    /// # Errors
    ///
    /// Returns an error when the engine rejects the request.
    fn stop(&self) -> Result<()>;

    /// Enumerate the voices available on this system.
    ///
    /// # Errors
    ///
    /// Returns an error when the engine cannot list voices.
    fn voices(&self) -> Result<Vec<VoiceInfo>>;

    /// Apply voice index, rate, and volume from the settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the engine rejects a property.
    fn apply(&self, settings: &Settings) -> Result<()>;
}

/// Stand-in used when the platform engine cannot be constructed.
///
/// Every speak attempt surfaces the stored construction error so the user
/// keeps seeing why speech output is unavailable; text replies still work.
pub struct SilentTts {
    reason: String,
}

impl SilentTts {
    /// Wraps the engine construction error.
    #[must_use]
    pub fn new(reason: String) -> Self {
        Self { reason }
    }
}

impl Synthesizer for SilentTts {
    fn speak(&self, _text: &str, _stop: &StopFlag) -> Result<()> {
        Err(AssistantError::Tts(self.reason.clone()))
    }

    fn stop(&self) -> Result<()> {
        Ok(())
    }

    fn voices(&self) -> Result<Vec<VoiceInfo>> {
        Ok(Vec::new())
    }

    fn apply(&self, _settings: &Settings) -> Result<()> {
        Ok(())
    }
}

/// One OS-specific fallback when the engine fails: shell out to the
/// platform's stock speech command.
pub(crate) fn fallback_say(text: &str) -> Result<()> {
    let status = fallback_command(text)
        .status()
        .map_err(|e| AssistantError::Tts(format!("speech fallback failed to start: {e}")))?;
    if status.success() {
        Ok(())
    } else {
        Err(AssistantError::Tts(format!(
            "speech fallback exited with {status}"
        )))
    }
}

#[cfg(target_os = "windows")]
fn fallback_command(text: &str) -> std::process::Command {
    let script = format!(
        "Add-Type -AssemblyName System.Speech; \
         (New-Object System.Speech.Synthesis.SpeechSynthesizer).Speak('{}')",
        text.replace('\'', "''")
    );
    let mut cmd = std::process::Command::new("powershell");
    cmd.args(["-NoProfile", "-Command", &script]);
    cmd
}

#[cfg(target_os = "macos")]
fn fallback_command(text: &str) -> std::process::Command {
    let mut cmd = std::process::Command::new("say");
    cmd.arg(text);
    cmd
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn fallback_command(text: &str) -> std::process::Command {
    let mut cmd = std::process::Command::new("espeak");
    cmd.arg(text);
    cmd
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn silent_tts_reports_its_reason() {
        let silent = SilentTts::new("no engine".into());
        let err = silent.speak("hello", &StopFlag::new()).unwrap_err();
        assert!(err.to_string().contains("no engine"));
    }

    #[test]
    fn silent_tts_has_no_voices() {
        let silent = SilentTts::new("no engine".into());
        assert!(silent.voices().unwrap().is_empty());
        assert!(silent.stop().is_ok());
        assert!(silent.apply(&Settings::default()).is_ok());
    }

    #[test]
    fn fallback_command_carries_the_text() {
        let cmd = fallback_command("hello world");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy()).collect();
        assert!(args.iter().any(|a| a.contains("hello world")));
    }
}
