//! End-to-end checks of the assistant's observable behaviour: settings
//! persistence, history bounds, wake-word handling, and cooperative
//! cancellation, all through the public API with mock services.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use async_trait::async_trait;
use elisa::cancel::StopFlag;
use elisa::history::{ConversationLog, Speaker, HISTORY_CAP};
use elisa::intent::{normalize, strip_wake_words, Intent};
use elisa::services::{
    EncyclopediaProvider, MediaLauncher, PageSummary, SearchProvider, ServiceHub, UrlOpener,
    WeatherProvider, WeatherReport,
};
use elisa::tts::{Synthesizer, VoiceInfo};
use elisa::{Session, Settings, UiEvent};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// ── mock services ───────────────────────────────────────────────────────

struct MuteSynth;

impl Synthesizer for MuteSynth {
    fn speak(&self, _text: &str, _stop: &StopFlag) -> elisa::Result<()> {
        Ok(())
    }

    fn stop(&self) -> elisa::Result<()> {
        Ok(())
    }

    fn voices(&self) -> elisa::Result<Vec<VoiceInfo>> {
        Ok(Vec::new())
    }

    fn apply(&self, _settings: &Settings) -> elisa::Result<()> {
        Ok(())
    }
}

/// Search provider that records whether it was called.
struct CountingSearch {
    calls: Arc<Mutex<usize>>,
}

#[async_trait]
impl SearchProvider for CountingSearch {
    async fn search(
        &self,
        _query: &str,
        _max_results: usize,
    ) -> elisa::Result<Vec<elisa_search::SearchResult>> {
        *self.calls.lock().unwrap() += 1;
        Ok(vec![elisa_search::SearchResult {
            title: "Example".into(),
            url: "https://example.com".into(),
            snippet: String::new(),
        }])
    }
}

struct NoWeather;

#[async_trait]
impl WeatherProvider for NoWeather {
    async fn current(&self, city: &str) -> elisa::Result<WeatherReport> {
        Ok(WeatherReport {
            city: city.to_owned(),
            description: "Clear".into(),
            temp_c: "10".into(),
            temp_f: "50".into(),
            humidity: "50".into(),
        })
    }
}

struct NoWiki;

#[async_trait]
impl EncyclopediaProvider for NoWiki {
    async fn summary(&self, _title: &str) -> elisa::Result<Option<PageSummary>> {
        Ok(None)
    }
}

struct NoMedia;

#[async_trait]
impl MediaLauncher for NoMedia {
    async fn resolve(&self, query: &str) -> elisa::Result<String> {
        Ok(format!("https://media.example/{query}"))
    }
}

struct NoOpener;

impl UrlOpener for NoOpener {
    fn open(&self, _url: &str) -> elisa::Result<()> {
        Ok(())
    }
}

fn session_with_search(
    search: Arc<dyn SearchProvider>,
) -> (Session, mpsc::UnboundedReceiver<UiEvent>) {
    let hub = ServiceHub {
        search,
        weather: Arc::new(NoWeather),
        encyclopedia: Arc::new(NoWiki),
        media: Arc::new(NoMedia),
        opener: Arc::new(NoOpener),
    };
    let (tx, rx) = mpsc::unbounded_channel();
    let session = Session::new(
        Settings::default(),
        std::env::temp_dir().join("elisa-flow-test-settings.json"),
        Arc::new(MuteSynth),
        hub,
        None,
        tx,
    );
    (session, rx)
}

// ── settings persistence ────────────────────────────────────────────────

#[test]
fn settings_file_loads_field_for_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let mut written = Settings::default();
    written.voice_id = 3;
    written.speech_rate = 220;
    written.volume = 0.7;
    written.save_to_file(&path).unwrap();

    let loaded = Settings::from_file(&path).unwrap();
    assert_eq!(loaded, written);
}

#[test]
fn absent_settings_file_is_replaced_by_written_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let first = Settings::load_or_init(&path).unwrap();
    assert_eq!(first, Settings::default());

    let second = Settings::from_file(&path).unwrap();
    assert_eq!(second, first);
}

// ── history bounds ──────────────────────────────────────────────────────

#[test]
fn history_evicts_oldest_after_the_twenty_first_append() {
    let mut log = ConversationLog::new();
    for i in 0..=HISTORY_CAP {
        log.push(Speaker::User, &format!("turn {i}"));
    }
    assert_eq!(log.len(), HISTORY_CAP);
    let texts: Vec<_> = log.entries().map(|e| e.text.as_str()).collect();
    assert!(!texts.contains(&"turn 0"));
    assert_eq!(*texts.last().unwrap(), format!("turn {HISTORY_CAP}"));
}

// ── wake word and intent extraction ─────────────────────────────────────

#[test]
fn wake_word_is_stripped_and_time_branch_matches() {
    let settings = Settings::default();
    let stripped = strip_wake_words(&normalize("elisa what time is it"), &settings)
        .expect("wake word present");
    assert_eq!(Intent::parse(&stripped), Intent::Time);
}

#[test]
fn play_query_drops_wake_word_and_keyword() {
    let settings = Settings::default();
    let stripped =
        strip_wake_words(&normalize("elisa play lofi beats"), &settings).expect("wake word");
    assert_eq!(
        Intent::parse(&stripped),
        Intent::Play {
            query: "lofi beats".into()
        }
    );
}

// ── cooperative cancellation ────────────────────────────────────────────

#[tokio::test]
async fn cancellation_before_a_search_suppresses_every_step() {
    let calls = Arc::new(Mutex::new(0));
    let (mut session, mut events) = session_with_search(Arc::new(CountingSearch {
        calls: calls.clone(),
    }));

    session.stop_flag().request();
    session.handle_utterance("search rust", false).await;

    assert!(events.try_recv().is_err(), "no output after the flag is set");
    assert_eq!(*calls.lock().unwrap(), 0, "the search step must not start");
}

#[tokio::test]
async fn without_cancellation_the_search_runs() {
    let calls = Arc::new(Mutex::new(0));
    let (mut session, mut events) = session_with_search(Arc::new(CountingSearch {
        calls: calls.clone(),
    }));

    session.handle_utterance("search rust", false).await;

    assert_eq!(*calls.lock().unwrap(), 1);
    let mut saw_listing = false;
    while let Ok(event) = events.try_recv() {
        if let UiEvent::Reply(text) = event {
            saw_listing |= text.contains("https://example.com");
        }
    }
    assert!(saw_listing, "the result listing should be emitted");
}
