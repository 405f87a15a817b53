//! Hunt coordinator: ties scan sessions to the progress store and emits the
//! integration events the presentation layer consumes.
//!
//! The scan session knows nothing about quests; this module owns the
//! completion handoff, comparing the decoded value against the target
//! quest's flag and recording completion on an exact match.

use log::{debug, info};
use thiserror::Error;

use crate::events::{self, EventReceiver, EventSender, HuntEvent};
use crate::logutil::escape_log;
use crate::progress::ProgressStore;
use crate::quests::Quest;
use crate::scanner::{
    run_scan, CameraDevice, CancelToken, CodeDetector, ScanError, ScanOptions, VideoSink,
};
use crate::storage::StorageError;

/// Result of one quest attempt, after the decoded value has been compared
/// against the quest's flag. All variants are expected outcomes, not faults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Code matched and the quest is now recorded complete.
    Completed,
    /// Code matched but the quest was already complete; nothing changed.
    AlreadyComplete,
    /// A code was decoded but did not match the quest's flag.
    Mismatch { decoded: String },
    /// The session was cancelled or the stream died before a decode.
    Cancelled,
}

#[derive(Debug, Error)]
pub enum AttemptError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("failed to persist progress: {0}")]
    Storage(#[from] StorageError),

    /// The quest index does not exist in the loaded list.
    #[error("unknown quest index {0}")]
    UnknownQuest(usize),
}

/// Drives quest attempts against an owned [`ProgressStore`].
pub struct HuntService {
    store: ProgressStore,
    options: ScanOptions,
    events: Option<EventSender>,
}

impl HuntService {
    pub fn new(store: ProgressStore, options: ScanOptions) -> Self {
        Self {
            store,
            options,
            events: None,
        }
    }

    /// Subscribe to hunt events. A later subscription replaces the earlier
    /// one; dropping the receiver silently ends delivery.
    pub fn subscribe(&mut self) -> EventReceiver {
        let (tx, rx) = events::channel();
        self.events = Some(tx);
        rx
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ProgressStore {
        &mut self.store
    }

    fn emit(&self, event: HuntEvent) {
        if let Some(tx) = &self.events {
            // Best-effort; a dropped receiver never fails an operation.
            let _ = tx.send(event);
        }
    }

    /// Open a quest's challenge view. `None` for an unknown index.
    pub fn open_challenge(&self, index: usize) -> Option<&Quest> {
        let quest = self.store.quest(index)?;
        self.emit(HuntEvent::ChallengeOpened { index });
        Some(quest)
    }

    /// Run one scan session for quest `index` and perform the completion
    /// handoff. Terminal scan failures propagate after the session has
    /// already released its camera resources.
    pub async fn attempt<C, S, D>(
        &mut self,
        index: usize,
        camera: &mut C,
        sink: &mut S,
        detector: &mut D,
        token: &CancelToken,
    ) -> Result<AttemptOutcome, AttemptError>
    where
        C: CameraDevice,
        S: VideoSink,
        D: CodeDetector<S>,
    {
        let flag = self
            .store
            .quest(index)
            .ok_or(AttemptError::UnknownQuest(index))?
            .flag
            .clone();

        self.emit(HuntEvent::ScanRequested { index });
        let decoded = run_scan(camera, sink, detector, token, &self.options).await?;
        self.emit(HuntEvent::ScanResolved {
            index,
            decoded: decoded.clone(),
        });

        let Some(decoded) = decoded else {
            debug!("scan for quest {} ended without a code", index + 1);
            return Ok(AttemptOutcome::Cancelled);
        };

        if decoded != flag {
            info!(
                "scanned code {} does not match quest {}",
                escape_log(&decoded),
                index + 1
            );
            return Ok(AttemptOutcome::Mismatch { decoded });
        }

        if self.store.mark_complete(index)? {
            info!("quest {} completed", index + 1);
            self.emit(HuntEvent::QuestCompleted { index });
            Ok(AttemptOutcome::Completed)
        } else {
            debug!("quest {} was already completed", index + 1);
            Ok(AttemptOutcome::AlreadyComplete)
        }
    }
}
