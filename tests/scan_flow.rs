//! End-to-end scan flow: scan session, flag comparison, progress store, and
//! the event vocabulary surrounding components consume.

mod common;

use common::{quest, FakeCamera, FakeSink, FixedQuests, ScriptedDetector};
use stamprally::events::HuntEvent;
use stamprally::hunt::{AttemptOutcome, HuntService};
use stamprally::progress::ProgressStore;
use stamprally::scanner::{CancelToken, ScanOptions};
use stamprally::storage::MemorySlot;

fn two_quest_service() -> (MemorySlot, HuntService) {
    let slot = MemorySlot::new();
    let mut store = ProgressStore::new(Box::new(slot.clone())).expect("open store");
    store
        .load(&FixedQuests(vec![
            quest("First", "Q1"),
            quest("Second", "Q2"),
        ]))
        .expect("load quests");
    let options = ScanOptions {
        frame_interval: std::time::Duration::from_millis(1),
        ..ScanOptions::default()
    };
    (slot, HuntService::new(store, options))
}

#[tokio::test]
async fn matching_code_completes_the_quest_and_persists() {
    let (slot, mut hunt) = two_quest_service();
    let mut events = hunt.subscribe();

    let (mut camera, stops) = FakeCamera::new();
    let mut sink = FakeSink::default();
    // One empty frame before the decode, as a real camera would produce.
    let mut detector = ScriptedDetector::new(vec![vec![], vec!["Q1"]]);
    let token = CancelToken::new();

    let outcome = hunt
        .attempt(0, &mut camera, &mut sink, &mut detector, &token)
        .await
        .expect("attempt");

    assert_eq!(outcome, AttemptOutcome::Completed);
    assert_eq!(hunt.store().completed_count(), 1);
    assert!(hunt.store().is_complete(0));
    assert_eq!(slot.stored().as_deref(), Some("1"));
    assert_eq!(stops.load(std::sync::atomic::Ordering::SeqCst), 1);

    assert_eq!(
        events.try_recv().expect("event"),
        HuntEvent::ScanRequested { index: 0 }
    );
    assert_eq!(
        events.try_recv().expect("event"),
        HuntEvent::ScanResolved {
            index: 0,
            decoded: Some("Q1".to_string())
        }
    );
    assert_eq!(
        events.try_recv().expect("event"),
        HuntEvent::QuestCompleted { index: 0 }
    );
    assert!(events.try_recv().is_err(), "no further events expected");
}

#[tokio::test]
async fn mismatched_code_changes_nothing() {
    let (slot, mut hunt) = two_quest_service();
    let mut events = hunt.subscribe();

    let (mut camera, _stops) = FakeCamera::new();
    let mut sink = FakeSink::default();
    let mut detector = ScriptedDetector::new(vec![vec!["WRONG"]]);
    let token = CancelToken::new();

    let outcome = hunt
        .attempt(0, &mut camera, &mut sink, &mut detector, &token)
        .await
        .expect("attempt");

    assert_eq!(
        outcome,
        AttemptOutcome::Mismatch {
            decoded: "WRONG".to_string()
        }
    );
    assert_eq!(hunt.store().completed_count(), 0);
    assert!(slot.stored().is_none(), "nothing persisted");

    assert_eq!(
        events.try_recv().expect("event"),
        HuntEvent::ScanRequested { index: 0 }
    );
    assert_eq!(
        events.try_recv().expect("event"),
        HuntEvent::ScanResolved {
            index: 0,
            decoded: Some("WRONG".to_string())
        }
    );
    assert!(
        events.try_recv().is_err(),
        "no completion event for a mismatch"
    );
}

#[tokio::test]
async fn cancellation_before_any_frame_releases_the_camera_once() {
    let (_slot, mut hunt) = two_quest_service();
    let mut events = hunt.subscribe();

    let (mut camera, stops) = FakeCamera::new();
    let mut sink = FakeSink::default();
    let mut detector = ScriptedDetector::new(vec![vec!["Q1"]]);
    let token = CancelToken::new();
    token.cancel();

    let outcome = hunt
        .attempt(0, &mut camera, &mut sink, &mut detector, &token)
        .await
        .expect("attempt");

    assert_eq!(outcome, AttemptOutcome::Cancelled);
    assert_eq!(hunt.store().completed_count(), 0);
    assert_eq!(stops.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert!(sink.source.is_none(), "sink source must be cleared");

    assert_eq!(
        events.try_recv().expect("event"),
        HuntEvent::ScanRequested { index: 0 }
    );
    assert_eq!(
        events.try_recv().expect("event"),
        HuntEvent::ScanResolved {
            index: 0,
            decoded: None
        }
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn each_quest_tracks_its_own_stamp() {
    let (slot, mut hunt) = two_quest_service();

    for (index, code) in [(1usize, "Q2"), (0usize, "Q1")] {
        let (mut camera, _stops) = FakeCamera::new();
        let mut sink = FakeSink::default();
        let mut detector = ScriptedDetector::new(vec![vec![code]]);
        let token = CancelToken::new();
        let outcome = hunt
            .attempt(index, &mut camera, &mut sink, &mut detector, &token)
            .await
            .expect("attempt");
        assert_eq!(outcome, AttemptOutcome::Completed);
    }

    assert_eq!(hunt.store().completed_count(), 2);
    assert_eq!(slot.stored().as_deref(), Some("3"));
}
