//! Error types for the assistant.

/// Top-level error type for the assistant.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Settings load/save error.
    #[error("settings error: {0}")]
    Settings(String),

    /// Audio device or capture error.
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech recognition error.
    #[error("speech recognition error: {0}")]
    Stt(String),

    /// Speech synthesis error.
    #[error("speech synthesis error: {0}")]
    Tts(String),

    /// Web search error.
    #[error("search error: {0}")]
    Search(String),

    /// Weather lookup error.
    #[error("weather error: {0}")]
    Weather(String),

    /// Encyclopedia lookup error.
    #[error("encyclopedia error: {0}")]
    Encyclopedia(String),

    /// Failed to launch a URL or media item via the OS.
    #[error("launch error: {0}")]
    Launch(String),

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<elisa_search::SearchError> for AssistantError {
    fn from(err: elisa_search::SearchError) -> Self {
        Self::Search(err.to_string())
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AssistantError>;
