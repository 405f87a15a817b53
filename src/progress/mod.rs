//! Progress store: which quests are completed, persisted as one integer.
//!
//! The bitfield is the sole source of truth for completion state. It is read
//! once when the store opens, mutated only through [`ProgressStore::mark_complete`],
//! and rewritten to the slot synchronously on every successful mutation.

pub mod flags;

use log::{debug, info, warn};

use crate::quests::{LoadError, Quest, QuestSource};
use crate::storage::{ProgressSlot, StorageError};

/// Tracks which quests are completed and persists that fact.
///
/// Storage and the quest source are injected so tests can run against
/// in-memory fakes.
pub struct ProgressStore {
    slot: Box<dyn ProgressSlot>,
    flags: u64,
    quests: Vec<Quest>,
    ready: bool,
}

impl ProgressStore {
    /// Open the store over `slot`, reading the persisted bitfield once.
    ///
    /// An absent, empty, or unparsable slot degrades to "nothing completed"
    /// rather than blocking startup.
    pub fn new(slot: Box<dyn ProgressSlot>) -> Result<Self, StorageError> {
        let raw = slot.read()?;
        let flags = parse_flags(raw.as_deref());
        Ok(Self {
            slot,
            flags,
            quests: Vec::new(),
            ready: false,
        })
    }

    /// Load the quest list. Must succeed before any completion mutation is
    /// accepted. A failure leaves the store not ready.
    pub fn load(&mut self, source: &dyn QuestSource) -> Result<(), LoadError> {
        let quests = source.fetch()?;
        info!("Loaded {} quests", quests.len());
        if quests.len() > u64::BITS as usize {
            warn!(
                "{} quests loaded but the bitfield tracks only the first {}; \
                 completions beyond that are rejected",
                quests.len(),
                u64::BITS
            );
        }
        self.quests = quests;
        self.ready = true;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn quest_count(&self) -> usize {
        self.quests.len()
    }

    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn quest(&self, index: usize) -> Option<&Quest> {
        self.quests.get(index)
    }

    /// Whether quest `index` is completed. An out-of-range index is simply
    /// not completed, never an error.
    pub fn is_complete(&self, index: usize) -> bool {
        u32::try_from(index).is_ok_and(|bit| flags::get(self.flags, bit))
    }

    /// Mark quest `index` complete and persist the new bitfield.
    ///
    /// Expected no-op conditions return `Ok(false)` without touching storage:
    /// the quest list is not loaded, the index is out of range or beyond the
    /// bitfield capacity, or the quest is already complete. `Err` is reserved
    /// for storage faults, which leave the in-memory state unchanged.
    pub fn mark_complete(&mut self, index: usize) -> Result<bool, StorageError> {
        if !self.ready {
            warn!("quest list not loaded yet; cannot record completion");
            return Ok(false);
        }
        if index >= self.quests.len() {
            warn!("invalid quest index {index}; cannot record completion");
            return Ok(false);
        }
        if index >= u64::BITS as usize {
            // Never report success for a completion the bitfield cannot hold.
            warn!(
                "quest index {index} exceeds the bitfield capacity of {}; \
                 cannot record completion",
                u64::BITS
            );
            return Ok(false);
        }
        let bit = index as u32;
        if flags::get(self.flags, bit) {
            debug!("quest {} is already completed", index + 1);
            return Ok(false);
        }

        // Persist first so a storage fault cannot leave memory ahead of disk.
        let updated = flags::set(self.flags, bit, true);
        self.slot.write(&updated.to_string())?;
        self.flags = updated;
        debug!("quest {} completed, flags now {}", index + 1, self.flags);
        Ok(true)
    }

    /// Clear all progress and persist the zero bitfield. Works whether or
    /// not the quest list has loaded.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        self.slot.write("0")?;
        self.flags = 0;
        info!("All quest progress has been reset");
        Ok(())
    }

    /// Number of completed quests among valid quest indices. Bits beyond the
    /// quest count are ignored (they are never set by normal operation, but
    /// are not actively cleared either).
    pub fn completed_count(&self) -> usize {
        (0..self.quests.len())
            .filter(|&index| self.is_complete(index))
            .count()
    }
}

fn parse_flags(raw: Option<&str>) -> u64 {
    match raw.map(str::trim) {
        None => 0,
        Some("") => 0,
        Some(text) => text.parse().unwrap_or_else(|_| {
            warn!("unparsable progress value {text:?}; starting from zero");
            0
        }),
    }
}
