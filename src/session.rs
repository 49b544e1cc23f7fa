//! The assistant session: all mutable state and the command dispatch loop.
//!
//! A single `Session` owns the settings, conversation log, stop flag, speech
//! engine handle, and outbound services. Handlers never touch the interactive
//! surface; everything they produce travels over the [`UiEvent`] channel.
//!
//! Intent handlers run on the one active worker task. Each handler checks the
//! stop flag on entry and between steps; once the flag is observed, no
//! further output is produced for that command.

use crate::cancel::StopFlag;
use crate::error::Result;
use crate::event::UiEvent;
use crate::history::{ConversationLog, Speaker};
use crate::intent::{self, Intent, OpenTarget};
use crate::services::{
    EncyclopediaProvider, MediaLauncher, SearchProvider, ServiceHub, UrlOpener, WeatherProvider,
};
use crate::settings::Settings;
use crate::stt::{self, Transcriber};
use crate::tts::Synthesizer;
use rand::seq::SliceRandom;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// City used when a weather request names none.
const DEFAULT_CITY: &str = "London";

/// Result links fetched per search.
const SEARCH_RESULT_COUNT: usize = 5;

/// How long one listening round waits for a phrase.
const LISTEN_TIMEOUT: Duration = Duration::from_secs(5);

/// Sentence spoken by the `test voice` command.
const TEST_SENTENCE: &str =
    "This is a test of the voice system. If you can hear this, the voice is working correctly.";

const THANKS_REPLIES: &[&str] = &[
    "You're welcome!",
    "Happy to help!",
    "Anytime!",
    "No problem!",
];

const HELP_TEXT: &str = r#"I can help you with the following commands:
- "play [song name]" - Play a song on YouTube
- "what time is it" - Tell the current time
- "what's today's date" - Tell the current date
- "search for [query]" - Search the web
- "tell me about [topic]" - Get information from Wikipedia
- "what is [topic]" - Get information from Wikipedia
- "who is [person]" - Get information about a person
- "weather in [city]" - Get current weather
- "open [website]" - Open a website
- "thank you" - Express gratitude
- "help" - Show this help message
- "test voice" - Test the voice output
- "voice settings" - Change voice settings
- "stop" - Stop any ongoing process"#;

/// All assistant state, owned in one place and passed to every handler.
pub struct Session {
    settings: Settings,
    settings_path: PathBuf,
    history: ConversationLog,
    stop: StopFlag,
    voice: Arc<dyn Synthesizer>,
    services: ServiceHub,
    transcriber: Option<Arc<dyn Transcriber>>,
    events: UnboundedSender<UiEvent>,
}

impl Session {
    /// Assemble a session from its parts.
    pub fn new(
        settings: Settings,
        settings_path: PathBuf,
        voice: Arc<dyn Synthesizer>,
        services: ServiceHub,
        transcriber: Option<Arc<dyn Transcriber>>,
        events: UnboundedSender<UiEvent>,
    ) -> Self {
        Self {
            settings,
            settings_path,
            history: ConversationLog::new(),
            stop: StopFlag::new(),
            voice,
            services,
            transcriber,
            events,
        }
    }

    /// A clone of the session's stop flag, for the front end.
    #[must_use]
    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    /// The conversation log.
    #[must_use]
    pub fn history(&self) -> &ConversationLog {
        &self.history
    }

    /// Forget the conversation so far.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.show("History cleared.");
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Handle one typed utterance.
    ///
    /// When `require_wake` is set the utterance is rejected unless it
    /// contains a configured wake word; otherwise a present wake word is
    /// stripped but not required.
    pub async fn handle_utterance(&mut self, raw: &str, require_wake: bool) {
        let normalized = intent::normalize(raw);
        if normalized.is_empty() {
            return;
        }
        let command = match intent::strip_wake_words(&normalized, &self.settings) {
            Some(stripped) => stripped,
            None if require_wake => {
                self.show("Wake word not detected. Please say 'Elisa' followed by your command.");
                return;
            }
            None => normalized,
        };
        self.run_command(&command).await;
    }

    /// Capture one phrase from the microphone and handle it as a command.
    ///
    /// The voice path requires a wake word; an utterance without one is
    /// rejected.
    pub async fn listen_once(&mut self) {
        if !stt::microphone_available() {
            self.show("No microphone detected. Please connect a microphone and try again.");
            self.say("No microphone detected").await;
            return;
        }
        let Some(transcriber) = self.transcriber.clone() else {
            self.show("Speech input is not compiled into this build. Type your command instead.");
            return;
        };

        self.status("Listening...");
        let captured =
            tokio::task::spawn_blocking(move || transcriber.capture_phrase(LISTEN_TIMEOUT)).await;
        let transcript = match captured {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                self.show(&e.to_string());
                return;
            }
            Err(e) => {
                self.show(&format!("Error: {e}"));
                return;
            }
        };
        if self.stop.is_requested() {
            self.status("Command processing stopped.");
            return;
        }
        if transcript.trim().is_empty() {
            self.show("Could not understand audio");
            return;
        }

        self.status("Processing your request...");
        let normalized = intent::normalize(&transcript);
        match intent::strip_wake_words(&normalized, &self.settings) {
            None => {
                self.show("Wake word not detected. Please say 'Elisa' followed by your command.");
            }
            Some(command) => {
                self.emit(UiEvent::Heard(command.clone()));
                self.run_command(&command).await;
            }
        }
    }

    async fn run_command(&mut self, command: &str) {
        self.history.push(Speaker::User, command);

        // Direct commands, short-circuited before intent matching.
        if command == "stop" {
            self.stop_all();
            return;
        }
        if command == "voice settings" {
            self.handle_voice_settings();
            return;
        }

        match Intent::parse(command) {
            Intent::Play { query } => self.handle_play(&query).await,
            Intent::Time => self.handle_time().await,
            Intent::Date => self.handle_date().await,
            Intent::Search { query } => self.handle_search(&query).await,
            Intent::Weather { city } => self.handle_weather(city).await,
            Intent::Open { target } => self.handle_open(target).await,
            Intent::Lookup { topic } => self.handle_lookup(&topic).await,
            Intent::Thanks => self.handle_thanks().await,
            Intent::Help => self.handle_help().await,
            Intent::TestVoice => self.deliver(TEST_SENTENCE).await,
            Intent::Stop => self.stop_all(),
            Intent::VoiceSettings => self.handle_voice_settings(),
            Intent::Unknown => {
                if self.stop.is_requested() {
                    return;
                }
                self.deliver(
                    "I'm not sure how to help with that yet. \
                     Try asking for help to see what I can do.",
                )
                .await;
            }
        }
    }

    /// Request a stop: the flag is set and in-flight speech is halted. The
    /// front end resets the flag before the next command starts.
    pub fn stop_all(&mut self) {
        self.stop.request();
        if let Err(e) = self.voice.stop() {
            tracing::debug!(error = %e, "could not stop speech engine");
        }
        self.show("All processes stopped.");
    }

    // ── intent handlers ─────────────────────────────────────────────────

    async fn handle_play(&mut self, query: &str) {
        if self.stop.is_requested() {
            return;
        }
        let response = format!("Playing {query} on YouTube");
        self.deliver(&response).await;
        if self.stop.is_requested() {
            return;
        }
        match self.services.media.clone().resolve(query).await {
            Ok(url) => {
                if self.stop.is_requested() {
                    return;
                }
                if let Err(e) = self.services.opener.open(&url) {
                    self.show(&format!("Error opening URL: {e}"));
                }
            }
            Err(e) => self.show(&format!("Could not find that on YouTube: {e}")),
        }
    }

    async fn handle_time(&mut self) {
        if self.stop.is_requested() {
            return;
        }
        let now = chrono::Local::now().format("%I:%M %p");
        self.deliver(&format!("Current time is {now}")).await;
    }

    async fn handle_date(&mut self) {
        if self.stop.is_requested() {
            return;
        }
        let today = chrono::Local::now().format("%A, %B %d, %Y");
        self.deliver(&format!("Today is {today}")).await;
    }

    async fn handle_search(&mut self, query: &str) {
        if self.stop.is_requested() {
            return;
        }
        self.status(&format!("Searching for: {query}"));
        let outcome = self
            .services
            .search
            .clone()
            .search(query, SEARCH_RESULT_COUNT)
            .await;
        match outcome {
            Ok(results) => {
                if self.stop.is_requested() {
                    self.status("Search stopped.");
                    return;
                }
                self.say("Here are the search results. You can click any link to open it.")
                    .await;
                let mut listing = String::from("Here are your search results:\n\n");
                for (i, result) in results.iter().enumerate() {
                    if self.stop.is_requested() {
                        self.status("Search stopped.");
                        return;
                    }
                    listing.push_str(&format!("Result {}: {}\n\n", i + 1, result.url));
                }
                listing.push_str("Click any link above to open it in your browser.");
                self.show(&listing);
                self.history.push(Speaker::Assistant, &listing);
            }
            Err(e) => {
                let response = format!("Search error: {e}");
                self.show(&response);
                self.say("I encountered an error while searching").await;
                self.history.push(Speaker::Assistant, &response);
            }
        }
    }

    async fn handle_weather(&mut self, city: Option<String>) {
        if self.stop.is_requested() {
            return;
        }
        let city = city.unwrap_or_else(|| DEFAULT_CITY.to_owned());
        let report = self.services.weather.clone().current(&city).await;
        if self.stop.is_requested() {
            return;
        }
        match report {
            Ok(report) => self.deliver(&report.summary()).await,
            Err(e) => {
                self.deliver(&format!("Could not get weather information: {e}"))
                    .await;
            }
        }
    }

    async fn handle_open(&mut self, target: OpenTarget) {
        if self.stop.is_requested() {
            return;
        }
        match target {
            OpenTarget::Site(url) => {
                self.deliver(&format!("Opening {url}")).await;
                if self.stop.is_requested() {
                    return;
                }
                if let Err(e) = self.services.opener.open(&url) {
                    self.show(&format!("Error opening URL: {e}"));
                }
            }
            OpenTarget::App(name) => {
                self.deliver(&format!("I don't know how to open {name} yet"))
                    .await;
            }
        }
    }

    async fn handle_lookup(&mut self, topic: &str) {
        if self.stop.is_requested() {
            return;
        }
        self.status(&format!("Searching Wikipedia for: {topic}"));
        let results = self
            .services
            .search
            .clone()
            .search(topic, SEARCH_RESULT_COUNT)
            .await;
        let results = match results {
            Ok(results) => results,
            Err(e) => {
                self.show(&format!("Error: {e}"));
                self.say("Something went wrong.").await;
                self.history.push(Speaker::Assistant, &format!("Error: {e}"));
                return;
            }
        };
        if self.stop.is_requested() {
            self.status("Wikipedia search stopped.");
            return;
        }

        let wiki_url = results
            .iter()
            .map(|r| r.url.as_str())
            .find(|url| url.contains("wikipedia.org"))
            .map(str::to_owned);
        let Some(wiki_url) = wiki_url else {
            self.deliver("No Wikipedia page found.").await;
            return;
        };
        let Some(title) = crate::services::wiki::title_from_url(&wiki_url) else {
            self.deliver("No Wikipedia page found.").await;
            return;
        };

        match self.services.encyclopedia.clone().summary(&title).await {
            Ok(Some(page)) => {
                if self.stop.is_requested() {
                    self.status("Wikipedia search stopped.");
                    return;
                }
                let full = format!("{}\n\nRead more: {wiki_url}", page.extract);
                self.say(&page.extract).await;
                self.show(&full);
                self.history.push(Speaker::Assistant, &full);
            }
            Ok(None) => {
                self.show("Wikipedia page not found.");
                self.say("Couldn't find the page.").await;
                self.history.push(Speaker::Assistant, "Wikipedia page not found.");
            }
            Err(e) => {
                self.show(&format!("Error: {e}"));
                self.say("Something went wrong.").await;
                self.history.push(Speaker::Assistant, &format!("Error: {e}"));
            }
        }
    }

    async fn handle_thanks(&mut self) {
        if self.stop.is_requested() {
            return;
        }
        let response = THANKS_REPLIES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(THANKS_REPLIES[0]);
        self.deliver(response).await;
    }

    async fn handle_help(&mut self) {
        if self.stop.is_requested() {
            return;
        }
        self.say("Here are the things I can help you with").await;
        self.show(HELP_TEXT);
        self.history.push(Speaker::Assistant, HELP_TEXT);
    }

    fn handle_voice_settings(&mut self) {
        let mut text = format!(
            "Voice settings:\n  voice: #{}\n  rate: {} wpm\n  volume: {:.1}\n  theme: {}\n",
            self.settings.voice_id, self.settings.speech_rate, self.settings.volume,
            self.settings.theme,
        );
        match self.voice.voices() {
            Ok(voices) if !voices.is_empty() => {
                text.push_str("Available voices:\n");
                for (i, voice) in voices.iter().enumerate() {
                    text.push_str(&format!("  {i}: {} ({})\n", voice.name, voice.language));
                }
            }
            Ok(_) => text.push_str("No voices detected! Speech output may not work.\n"),
            Err(e) => text.push_str(&format!("Could not list voices: {e}\n")),
        }
        text.push_str(
            "\nUse 'set voice <n>', 'set rate <wpm>' or 'set volume <0.1-1.0>', \
             then 'save settings' to keep the changes.",
        );
        self.show(&text);
        self.history.push(Speaker::Assistant, &text);
    }

    // ── settings mutation (the terminal stand-in for the settings panel) ─

    /// Select a voice by index into the platform voice list.
    pub fn set_voice(&mut self, index: usize) {
        match self.voice.voices() {
            Ok(voices) if index < voices.len() => {
                self.settings.voice_id = index;
                self.apply_voice_settings();
                self.show(&format!("Voice changed to #{index}: {}", voices[index].name));
            }
            Ok(voices) => {
                self.show(&format!(
                    "No voice #{index}; {} voices are available.",
                    voices.len()
                ));
            }
            Err(e) => self.show(&e.to_string()),
        }
    }

    /// Set the speech rate in words per minute (clamped to 50–300).
    pub fn set_rate(&mut self, rate: u32) {
        self.settings.set_speech_rate(rate);
        self.apply_voice_settings();
        self.show(&format!("Speech rate set to {} wpm.", self.settings.speech_rate));
    }

    /// Set the speech volume (clamped to 0.1–1.0).
    pub fn set_volume(&mut self, volume: f32) {
        self.settings.set_volume(volume);
        self.apply_voice_settings();
        self.show(&format!("Volume set to {:.1}.", self.settings.volume));
    }

    /// Write the settings file (the explicit save).
    pub fn save_settings(&mut self) {
        match self.settings.save_to_file(&self.settings_path) {
            Ok(()) => {
                self.show("Settings saved! Voice settings updated. Try speaking a command to test.");
            }
            Err(e) => self.show(&format!("Could not save settings: {e}")),
        }
    }

    fn apply_voice_settings(&self) {
        if let Err(e) = self.voice.apply(&self.settings) {
            self.status(&format!("Voice output error: {e}. Try 'voice settings' to fix."));
        }
    }

    // ── output helpers ──────────────────────────────────────────────────

    fn emit(&self, event: UiEvent) {
        // The receiver only disappears at shutdown.
        let _ = self.events.send(event);
    }

    fn show(&self, text: &str) {
        self.emit(UiEvent::Reply(text.to_owned()));
    }

    fn status(&self, text: &str) {
        self.emit(UiEvent::Status(text.to_owned()));
    }

    /// Speak `text`, surfacing synthesis failures as a status line instead of
    /// an error. Does nothing once a stop has been requested.
    async fn say(&self, text: &str) {
        if self.stop.is_requested() {
            return;
        }
        let voice = Arc::clone(&self.voice);
        let stop = self.stop.clone();
        let owned = text.to_owned();
        let spoken = tokio::task::spawn_blocking(move || voice.speak(&owned, &stop)).await;
        let result: Result<()> = match spoken {
            Ok(result) => result,
            Err(join) => {
                tracing::error!(error = %join, "speech task panicked");
                return;
            }
        };
        if let Err(e) = result {
            self.status(&format!("Voice output error: {e}. Try 'voice settings' to fix."));
        }
    }

    /// Speak and display `text`, then log it as an assistant turn.
    async fn deliver(&mut self, text: &str) {
        self.say(text).await;
        self.show(text);
        self.history.push(Speaker::Assistant, text);
    }
}
