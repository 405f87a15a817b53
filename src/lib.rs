//! # Stamprally - QR Scavenger Hunt Progress Tracker
//!
//! Stamprally tracks a "stamp rally" style scavenger hunt: an ordered list of
//! quests, each unlocked by scanning a QR code whose content matches the
//! quest's secret flag. Progress is a single bitfield persisted in an
//! embedded key-value store.
//!
//! ## Features
//!
//! - **Progress Bitfield**: One integer records every completed quest by
//!   index; corrupt stored values degrade to "nothing completed" instead of
//!   blocking startup.
//! - **Injected Collaborators**: Storage, quest source, camera, and detector
//!   are traits, so tests and the CLI substitute their own implementations.
//! - **Cancellable Scan Sessions**: A cooperative async loop polls the
//!   detector once per frame interval and releases the camera on every exit
//!   path, exactly once.
//! - **Typed Events**: Challenge, scan, and completion events flow over an
//!   explicit mpsc channel instead of a global event bus.
//! - **Async Design**: Built with Tokio; the only suspension points are
//!   camera acquisition, sink readiness, and the per-frame yield.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stamprally::hunt::HuntService;
//! use stamprally::progress::ProgressStore;
//! use stamprally::quests::JsonQuestFile;
//! use stamprally::scanner::ScanOptions;
//! use stamprally::storage::SledSlot;
//!
//! fn main() -> anyhow::Result<()> {
//!     let slot = SledSlot::open("./data/progress")?;
//!     let mut store = ProgressStore::new(Box::new(slot))?;
//!     store.load(&JsonQuestFile::new("./data/quests.json"))?;
//!
//!     let hunt = HuntService::new(store, ScanOptions::default());
//!     println!("{} quests loaded", hunt.store().quest_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`progress`] - The completion bitfield and its store
//! - [`quests`] - Quest definitions and the JSON quest source
//! - [`scanner`] - Scan sessions, cancellation, and capability traits
//! - [`hunt`] - Coordinator tying scans to the progress store
//! - [`storage`] - The persisted progress slot
//! - [`events`] - Typed integration events
//! - [`config`] - Configuration management

pub mod config;
pub mod events;
pub mod hunt;
pub mod logutil;
pub mod progress;
pub mod quests;
pub mod scanner;
pub mod storage;
