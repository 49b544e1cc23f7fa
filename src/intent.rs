//! Keyword-triggered intent matching.
//!
//! Utterances are lowercased, stripped of a recognized wake word, and tested
//! against a fixed ordered list of substring predicates. The branch order is
//! the tie-break rule for overlapping keywords ("what is the weather" is a
//! weather request, not an encyclopedia lookup) and must not be reordered.

use crate::settings::Settings;

/// A matched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Play media found by searching for `query`.
    Play {
        /// What to play.
        query: String,
    },
    /// Tell the current time.
    Time,
    /// Tell today's date.
    Date,
    /// Web search for `query`.
    Search {
        /// What to search for.
        query: String,
    },
    /// Current weather, optionally for a named city.
    Weather {
        /// City name; `None` means the default city.
        city: Option<String>,
    },
    /// Open a website or application.
    Open {
        /// What to open.
        target: OpenTarget,
    },
    /// Encyclopedia lookup for a topic.
    Lookup {
        /// The topic to look up.
        topic: String,
    },
    /// Canned gratitude reply.
    Thanks,
    /// Show the command list.
    Help,
    /// Speak a fixed test sentence.
    TestVoice,
    /// Stop the active command.
    Stop,
    /// Show voice settings.
    VoiceSettings,
    /// Nothing matched.
    Unknown,
}

/// Target of an `open` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenTarget {
    /// A website, already normalised to a full URL.
    Site(String),
    /// An application name (unsupported; answered with a canned reply).
    App(String),
}

/// Lowercase and trim an utterance before wake-word and intent matching.
#[must_use]
pub fn normalize(utterance: &str) -> String {
    utterance.trim().to_lowercase()
}

/// Strip a recognized wake word from a normalized utterance.
///
/// Returns `Some(remainder)` when any configured wake word occurs as a
/// substring: every occurrence of every wake word is removed and whitespace
/// is collapsed. Returns `None` when no wake word is present.
#[must_use]
pub fn strip_wake_words(utterance: &str, settings: &Settings) -> Option<String> {
    let matched = settings
        .wake_words
        .iter()
        .any(|word| utterance.contains(&word.to_lowercase()));
    if !matched {
        return None;
    }
    let mut command = utterance.to_owned();
    for word in &settings.wake_words {
        command = command.replace(&word.to_lowercase(), "");
    }
    Some(collapse_whitespace(&command))
}

impl Intent {
    /// Match a normalized, wake-stripped command against the fixed branch
    /// order.
    #[must_use]
    pub fn parse(command: &str) -> Self {
        if command.contains("play") {
            return Self::Play {
                query: strip_keyword(command, "play"),
            };
        }
        if ["time", "what time", "current time"]
            .iter()
            .any(|w| command.contains(w))
        {
            return Self::Time;
        }
        if command.contains("date") || command.contains("today") {
            return Self::Date;
        }
        if command.contains("search") {
            return Self::Search {
                query: strip_keyword(command, "search"),
            };
        }
        if command.contains("weather") || command.contains("temperature") {
            return Self::Weather {
                city: extract_city(command),
            };
        }
        if command.contains("open") {
            return Self::Open {
                target: extract_open_target(command),
            };
        }
        for phrase in ["tell me about", "who is", "what is"] {
            if let Some(idx) = command.find(phrase) {
                let topic = collapse_whitespace(&command[idx + phrase.len()..]);
                return Self::Lookup { topic };
            }
        }
        if command.contains("thank you") || command.contains("thanks") {
            return Self::Thanks;
        }
        if command.contains("help") {
            return Self::Help;
        }
        if command.contains("test voice") {
            return Self::TestVoice;
        }
        if command.contains("stop") {
            return Self::Stop;
        }
        if command.contains("voice settings") || command.contains("change voice") {
            return Self::VoiceSettings;
        }
        Self::Unknown
    }
}

/// City extraction for weather requests.
///
/// When the substring `in` occurs the city is everything after its first
/// occurrence; otherwise the command minus the trigger keywords. An empty
/// remainder means "use the default city".
fn extract_city(command: &str) -> Option<String> {
    let city = if let Some(idx) = command.find("in") {
        collapse_whitespace(&command[idx + 2..])
    } else {
        collapse_whitespace(&command.replace("weather", "").replace("temperature", ""))
    };
    if city.is_empty() {
        None
    } else {
        Some(city)
    }
}

fn extract_open_target(command: &str) -> OpenTarget {
    if command.contains("website") || command.contains(".com") || command.contains(".org") {
        let site = collapse_whitespace(&command.replace("open", "").replace("website", ""));
        OpenTarget::Site(normalize_site(&site))
    } else {
        OpenTarget::App(collapse_whitespace(&command.replace("open", "")))
    }
}

/// Turn a bare site name into a full URL.
fn normalize_site(site: &str) -> String {
    if site.starts_with("http://") || site.starts_with("https://") {
        site.to_owned()
    } else if !site.contains('.') {
        format!("https://www.{site}.com")
    } else {
        format!("https://{site}")
    }
}

fn strip_keyword(command: &str, keyword: &str) -> String {
    collapse_whitespace(&command.replace(keyword, ""))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn settings() -> Settings {
        Settings::default()
    }

    #[test]
    fn wake_word_is_stripped_before_matching() {
        let stripped = strip_wake_words(&normalize("elisa what time is it"), &settings())
            .expect("wake word should match");
        assert_eq!(stripped, "what time is it");
        assert_eq!(Intent::parse(&stripped), Intent::Time);
    }

    #[test]
    fn all_configured_wake_words_match() {
        for word in ["elisa", "elesa", "aleesa"] {
            let utterance = format!("{word} help");
            assert!(strip_wake_words(&normalize(&utterance), &settings()).is_some());
        }
    }

    #[test]
    fn missing_wake_word_is_rejected() {
        assert!(strip_wake_words(&normalize("what time is it"), &settings()).is_none());
    }

    #[test]
    fn play_extracts_query() {
        let intent = Intent::parse("play lofi beats");
        assert_eq!(
            intent,
            Intent::Play {
                query: "lofi beats".into()
            }
        );
    }

    #[test]
    fn play_query_survives_wake_word_strip() {
        let stripped =
            strip_wake_words(&normalize("elisa play lofi beats"), &settings()).unwrap();
        assert_eq!(
            Intent::parse(&stripped),
            Intent::Play {
                query: "lofi beats".into()
            }
        );
    }

    #[test]
    fn time_matches_variants() {
        assert_eq!(Intent::parse("what time is it"), Intent::Time);
        assert_eq!(Intent::parse("current time"), Intent::Time);
        assert_eq!(Intent::parse("time"), Intent::Time);
    }

    #[test]
    fn date_matches_date_and_today() {
        assert_eq!(Intent::parse("what's the date"), Intent::Date);
        assert_eq!(Intent::parse("today"), Intent::Date);
    }

    #[test]
    fn search_extracts_query() {
        assert_eq!(
            Intent::parse("search rust async"),
            Intent::Search {
                query: "rust async".into()
            }
        );
    }

    #[test]
    fn weather_extracts_city_after_in() {
        assert_eq!(
            Intent::parse("weather in madrid"),
            Intent::Weather {
                city: Some("madrid".into())
            }
        );
    }

    #[test]
    fn weather_without_city_uses_default() {
        assert_eq!(Intent::parse("weather"), Intent::Weather { city: None });
        assert_eq!(Intent::parse("temperature"), Intent::Weather { city: None });
    }

    #[test]
    fn weather_wins_over_lookup_by_branch_order() {
        // "what is the weather" also matches the lookup phrase; the earlier
        // weather branch takes it.
        assert!(matches!(
            Intent::parse("what is the weather"),
            Intent::Weather { .. }
        ));
    }

    #[test]
    fn play_wins_over_search_by_branch_order() {
        assert!(matches!(
            Intent::parse("search for plays by shakespeare"),
            Intent::Play { .. }
        ));
    }

    #[test]
    fn open_bare_name_becomes_www_com() {
        assert_eq!(
            Intent::parse("open github website"),
            Intent::Open {
                target: OpenTarget::Site("https://www.github.com".into())
            }
        );
    }

    #[test]
    fn open_dotted_name_gets_https_prefix() {
        assert_eq!(
            Intent::parse("open wikipedia.org"),
            Intent::Open {
                target: OpenTarget::Site("https://wikipedia.org".into())
            }
        );
    }

    #[test]
    fn open_app_is_reported_as_app() {
        assert_eq!(
            Intent::parse("open spotify"),
            Intent::Open {
                target: OpenTarget::App("spotify".into())
            }
        );
    }

    #[test]
    fn lookup_extracts_topic_per_phrase() {
        assert_eq!(
            Intent::parse("tell me about black holes"),
            Intent::Lookup {
                topic: "black holes".into()
            }
        );
        assert_eq!(
            Intent::parse("who is marie curie"),
            Intent::Lookup {
                topic: "marie curie".into()
            }
        );
        assert_eq!(
            Intent::parse("what is a monad"),
            Intent::Lookup {
                topic: "a monad".into()
            }
        );
    }

    #[test]
    fn thanks_help_test_voice_stop_settings() {
        assert_eq!(Intent::parse("thank you"), Intent::Thanks);
        assert_eq!(Intent::parse("thanks a lot"), Intent::Thanks);
        assert_eq!(Intent::parse("help"), Intent::Help);
        assert_eq!(Intent::parse("test voice"), Intent::TestVoice);
        assert_eq!(Intent::parse("stop"), Intent::Stop);
        assert_eq!(Intent::parse("voice settings"), Intent::VoiceSettings);
        assert_eq!(Intent::parse("change voice"), Intent::VoiceSettings);
    }

    #[test]
    fn unmatched_commands_are_unknown() {
        assert_eq!(Intent::parse("sing me a song"), Intent::Unknown);
        assert_eq!(Intent::parse(""), Intent::Unknown);
    }
}
