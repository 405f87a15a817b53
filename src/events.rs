//! Typed events the surrounding presentation layer consumes.
//!
//! Cross-component signaling goes over an explicit mpsc channel with typed
//! payloads; subscription lifetime is simply the receiver's lifetime. The
//! event vocabulary mirrors the hunt lifecycle: challenge opened, scan
//! requested, scan resolved, quest completed.

use tokio::sync::mpsc;

/// Integration events emitted while a hunt runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuntEvent {
    /// A quest's challenge view was opened.
    ChallengeOpened { index: usize },
    /// A scan session started for a quest.
    ScanRequested { index: usize },
    /// A scan session resolved. `decoded` is `None` when the session was
    /// cancelled or the stream died before a decode.
    ScanResolved {
        index: usize,
        decoded: Option<String>,
    },
    /// A quest was newly marked complete.
    QuestCompleted { index: usize },
}

pub type EventSender = mpsc::UnboundedSender<HuntEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<HuntEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
