//! UI events emitted by the session for the front end.
//!
//! The worker never touches the interactive surface directly; everything it
//! wants shown travels over a channel as one of these events.

/// What the front end should display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Transient progress line ("Listening...", "Searching for: ...").
    Status(String),
    /// Transcribed user speech, echoed back.
    Heard(String),
    /// Assistant reply.
    Reply(String),
}
