//! Platform speech engine via the `tts` crate.

use super::{fallback_say, Synthesizer, VoiceInfo};
use crate::cancel::StopFlag;
use crate::error::{AssistantError, Result};
use crate::settings::{Settings, MAX_SPEECH_RATE, MIN_SPEECH_RATE};
use std::sync::Mutex;
use std::time::Duration;

/// Poll interval while waiting for playback to finish.
const SPEAK_POLL: Duration = Duration::from_millis(50);

/// Platform text-to-speech engine.
pub struct SystemTts {
    engine: Mutex<tts::Tts>,
}

impl SystemTts {
    /// Construct the platform engine and apply the saved settings.
    ///
    /// # Errors
    ///
    /// Returns an error when no platform speech backend is available.
    pub fn new(settings: &Settings) -> Result<Self> {
        let engine = tts::Tts::default()
            .map_err(|e| AssistantError::Tts(format!("failed to initialise speech engine: {e}")))?;
        let this = Self {
            engine: Mutex::new(engine),
        };
        // Settings application is best-effort at construction time; a voice
        // index out of range still leaves a working default voice.
        if let Err(e) = this.apply(settings) {
            tracing::warn!(error = %e, "could not apply saved voice settings");
        }
        Ok(this)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, tts::Tts>> {
        self.engine
            .lock()
            .map_err(|_| AssistantError::Tts("speech engine lock poisoned".into()))
    }
}

impl Synthesizer for SystemTts {
    fn speak(&self, text: &str, stop: &StopFlag) -> Result<()> {
        if stop.is_requested() {
            return Ok(());
        }
        let result = {
            let mut engine = self.lock()?;
            speak_and_wait(&mut engine, text, stop)
        };
        match result {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::warn!(error = %err, "speech engine failed, trying OS fallback");
                fallback_say(text).map_err(|fallback| {
                    AssistantError::Tts(format!("{err} (fallback also failed: {fallback})"))
                })
            }
        }
    }

    fn stop(&self) -> Result<()> {
        let mut engine = self.lock()?;
        if engine.supported_features().stop {
            engine
                .stop()
                .map_err(|e| AssistantError::Tts(e.to_string()))?;
        }
        Ok(())
    }

    fn voices(&self) -> Result<Vec<VoiceInfo>> {
        let engine = self.lock()?;
        let voices = engine
            .voices()
            .map_err(|e| AssistantError::Tts(e.to_string()))?;
        Ok(voices
            .iter()
            .map(|v| VoiceInfo {
                id: v.id(),
                name: v.name(),
                language: v.language().to_string(),
            })
            .collect())
    }

    fn apply(&self, settings: &Settings) -> Result<()> {
        let mut engine = self.lock()?;
        let features = engine.supported_features();

        if features.voice {
            let voices = engine
                .voices()
                .map_err(|e| AssistantError::Tts(e.to_string()))?;
            if let Some(voice) = voices.get(settings.voice_id) {
                engine
                    .set_voice(voice)
                    .map_err(|e| AssistantError::Tts(e.to_string()))?;
            }
        }
        if features.rate {
            let rate = map_rate(
                engine.min_rate(),
                engine.normal_rate(),
                engine.max_rate(),
                settings.speech_rate,
            );
            engine
                .set_rate(rate)
                .map_err(|e| AssistantError::Tts(e.to_string()))?;
        }
        if features.volume {
            let volume = map_volume(engine.min_volume(), engine.max_volume(), settings.volume);
            engine
                .set_volume(volume)
                .map_err(|e| AssistantError::Tts(e.to_string()))?;
        }
        Ok(())
    }
}

fn speak_and_wait(engine: &mut tts::Tts, text: &str, stop: &StopFlag) -> Result<()> {
    let features = engine.supported_features();
    engine
        .speak(text, true)
        .map_err(|e| AssistantError::Tts(e.to_string()))?;
    if !features.is_speaking {
        return Ok(());
    }
    loop {
        if stop.is_requested() {
            if features.stop {
                let _ = engine.stop();
            }
            return Ok(());
        }
        match engine.is_speaking() {
            Ok(true) => std::thread::sleep(SPEAK_POLL),
            Ok(false) => return Ok(()),
            Err(e) => return Err(AssistantError::Tts(e.to_string())),
        }
    }
}

/// Map the 50–300 wpm setting onto the engine's rate range.
///
/// 150 wpm is pinned to the engine's normal rate; the halves scale linearly
/// toward the engine minimum and maximum.
fn map_rate(min: f32, normal: f32, max: f32, wpm: u32) -> f32 {
    const MID: f32 = 150.0;
    let wpm = wpm.clamp(MIN_SPEECH_RATE, MAX_SPEECH_RATE) as f32;
    if wpm >= MID {
        normal + (wpm - MID) / (MAX_SPEECH_RATE as f32 - MID) * (max - normal)
    } else {
        min + (wpm - MIN_SPEECH_RATE as f32) / (MID - MIN_SPEECH_RATE as f32) * (normal - min)
    }
}

/// Map the 0.1–1.0 volume setting onto the engine's volume range.
fn map_volume(min: f32, max: f32, volume: f32) -> f32 {
    min + volume.clamp(0.0, 1.0) * (max - min)
}
