//! Offline speech recognition with the Vosk runtime.
//!
//! Captures audio with `cpal` at the device's native format, downmixes to
//! mono i16, and feeds the samples to a Vosk recognizer. Recording ends at
//! the timeout or after a stretch of trailing silence once speech has been
//! heard.

use super::Transcriber;
use crate::error::{AssistantError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use vosk::{Model, Recognizer};

/// Samples below this amplitude count as silence.
const SILENCE_THRESHOLD: i16 = 500;
/// Trailing silence that ends a phrase once speech has started.
const SILENCE_TIMEOUT: Duration = Duration::from_millis(800);
/// Minimum recording time before the silence cut-off applies.
const MIN_CAPTURE: Duration = Duration::from_millis(1000);

/// Offline Vosk recognizer bound to the default input device.
pub struct VoskStt {
    model: Model,
    device: cpal::Device,
}

impl VoskStt {
    /// Load the model named by `VOSK_MODEL_PATH` and bind the default
    /// microphone.
    ///
    /// # Errors
    ///
    /// Returns an error when the variable is unset, the model cannot be
    /// loaded, or no input device exists.
    pub fn from_env() -> Result<Self> {
        let model_path = std::env::var("VOSK_MODEL_PATH").map_err(|_| {
            AssistantError::Stt("VOSK_MODEL_PATH must point to a Vosk model directory".into())
        })?;
        let model = Model::new(model_path.as_str()).ok_or_else(|| {
            AssistantError::Stt(format!("failed to load Vosk model from '{model_path}'"))
        })?;
        let device = cpal::default_host()
            .default_input_device()
            .ok_or_else(|| AssistantError::Audio("no input audio device found".into()))?;
        if let Ok(name) = device.name() {
            tracing::info!(microphone = %name, "speech recognition ready");
        }
        Ok(Self { model, device })
    }
}

impl Transcriber for VoskStt {
    fn capture_phrase(&self, timeout: Duration) -> Result<String> {
        let config = self
            .device
            .default_input_config()
            .map_err(|e| AssistantError::Audio(format!("no default input config: {e}")))?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        let mut recognizer = Recognizer::new(&self.model, sample_rate)
            .ok_or_else(|| AssistantError::Stt("failed to create Vosk recognizer".into()))?;
        recognizer.set_words(false);
        recognizer.set_max_alternatives(0);

        let (tx, rx) = mpsc::channel::<Vec<i16>>();
        let err_fn = |err| tracing::error!(error = %err, "input audio stream error");

        let stream = match config.sample_format() {
            SampleFormat::I16 => {
                let tx = tx.clone();
                self.device
                    .build_input_stream(
                        &config.into(),
                        move |data: &[i16], _| {
                            let _ = tx.send(downmix(data, channels, |s| s));
                        },
                        err_fn,
                        None,
                    )
                    .map_err(|e| AssistantError::Audio(e.to_string()))?
            }
            SampleFormat::U16 => {
                let tx = tx.clone();
                self.device
                    .build_input_stream(
                        &config.into(),
                        move |data: &[u16], _| {
                            let _ = tx.send(downmix(data, channels, |s| (s as i32 - 32768) as i16));
                        },
                        err_fn,
                        None,
                    )
                    .map_err(|e| AssistantError::Audio(e.to_string()))?
            }
            SampleFormat::F32 => {
                let tx = tx.clone();
                self.device
                    .build_input_stream(
                        &config.into(),
                        move |data: &[f32], _| {
                            let _ = tx.send(downmix(data, channels, |s| {
                                (s * 32768.0).clamp(-32768.0, 32767.0) as i16
                            }));
                        },
                        err_fn,
                        None,
                    )
                    .map_err(|e| AssistantError::Audio(e.to_string()))?
            }
            other => {
                return Err(AssistantError::Audio(format!(
                    "unsupported sample format: {other:?}"
                )));
            }
        };

        stream
            .play()
            .map_err(|e| AssistantError::Audio(format!("failed to start input stream: {e}")))?;

        let start = Instant::now();
        let mut samples: Vec<i16> = Vec::new();
        let mut last_speech = Instant::now();
        let mut speech_started = false;

        while start.elapsed() < timeout {
            let remaining = timeout.saturating_sub(start.elapsed());
            match rx.recv_timeout(remaining) {
                Ok(chunk) => {
                    let has_speech = chunk.iter().any(|s| s.wrapping_abs() > SILENCE_THRESHOLD);
                    samples.extend_from_slice(&chunk);
                    if has_speech {
                        speech_started = true;
                        last_speech = Instant::now();
                    }
                    if speech_started
                        && start.elapsed() > MIN_CAPTURE
                        && last_speech.elapsed() > SILENCE_TIMEOUT
                    {
                        break;
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout) => break,
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }

        drop(stream);
        drop(tx);

        if samples.is_empty() {
            return Ok(String::new());
        }
        recognizer
            .accept_waveform(&samples)
            .map_err(|e| AssistantError::Stt(format!("recognizer rejected audio: {e}")))?;
        let transcript = recognizer
            .final_result()
            .single()
            .map(|r| r.text.to_string())
            .unwrap_or_default();
        Ok(transcript)
    }
}

/// Take the first sample of each interleaved frame, converting with `conv`.
fn downmix<T: Copy>(data: &[T], channels: usize, conv: impl Fn(T) -> i16) -> Vec<i16> {
    let channels = channels.max(1);
    data.chunks(channels).map(|frame| conv(frame[0])).collect()
}
