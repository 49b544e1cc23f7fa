//! Bounded in-memory conversation log.
//!
//! Held only for the process lifetime; the newest 20 entries are kept and
//! the oldest is evicted first.

use std::collections::VecDeque;
use std::fmt;

/// Maximum number of entries retained in the log.
pub const HISTORY_CAP: usize = 20;

/// Who produced a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    /// The person talking to the assistant.
    User,
    /// The assistant.
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "You"),
            Self::Assistant => write!(f, "Elisa"),
        }
    }
}

/// One conversation turn.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Wall-clock timestamp, `%H:%M:%S`.
    pub time: String,
    /// Who spoke.
    pub speaker: Speaker,
    /// What was said.
    pub text: String,
}

/// Bounded conversation log, oldest entries evicted first.
#[derive(Debug, Default)]
pub struct ConversationLog {
    entries: VecDeque<HistoryEntry>,
}

impl ConversationLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn, evicting the oldest entry when the log is full.
    pub fn push(&mut self, speaker: Speaker, text: &str) {
        let time = chrono::Local::now().format("%H:%M:%S").to_string();
        self.entries.push_back(HistoryEntry {
            time,
            speaker,
            text: text.to_owned(),
        });
        while self.entries.len() > HISTORY_CAP {
            self.entries.pop_front();
        }
    }

    /// The retained entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing has been logged yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
