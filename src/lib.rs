//! Elisa: a keyword-driven personal voice assistant.
//!
//! Elisa captures speech or typed input, matches it against a fixed set of
//! keyword-triggered intents (play media, time/date, web search, weather,
//! open a URL, encyclopedia lookup, canned replies, settings), and produces
//! a spoken and textual response.
//!
//! # Architecture
//!
//! All mutable state (settings, conversation log, stop flag) lives in one
//! [`Session`] object passed to every handler. Blocking work (microphone
//! capture, speech synthesis, network calls) runs on a single background
//! worker task at a time; the interactive surface is only ever updated
//! through [`UiEvent`]s delivered over a channel. A shared [`StopFlag`] is
//! polled between response steps so a stop request aborts the remaining work
//! without preempting an in-flight call.

pub mod cancel;
pub mod error;
pub mod event;
pub mod history;
pub mod intent;
pub mod services;
pub mod session;
pub mod settings;
pub mod stt;
pub mod theme;
pub mod tts;

pub use cancel::StopFlag;
pub use error::{AssistantError, Result};
pub use event::UiEvent;
pub use session::Session;
pub use settings::Settings;
pub use theme::Theme;
