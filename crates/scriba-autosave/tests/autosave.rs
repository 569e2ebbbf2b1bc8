//! Debounce behavior under paused Tokio time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use scriba_autosave::{
    AutosaveConfig, AutosaveError, AutosaveHandle, DraftContent, DraftSink, FlushOutcome,
};
use scriba_drafts::DraftError;
use scriba_protocol::{Draft, DraftId, DraftOrigin};
use scriba_storage::StorageError;

// =========================================================================
// Recording sink
// =========================================================================

#[derive(Default)]
struct RecordingSink {
    saves: Mutex<Vec<DraftContent>>,
    failing: AtomicBool,
}

impl RecordingSink {
    fn saves(&self) -> Vec<DraftContent> {
        self.saves.lock().unwrap().clone()
    }
}

impl DraftSink for RecordingSink {
    fn save_content(&self, _id: DraftId, content: &DraftContent) -> Result<(), DraftError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DraftError::StoragePersistFailed(StorageError::QuotaExceeded {
                key: "drafts/v2::7".into(),
                needed: 10,
                limit: 1,
            }));
        }
        self.saves.lock().unwrap().push(content.clone());
        Ok(())
    }
}

fn draft() -> Draft {
    Draft {
        id: DraftId(1),
        title: "T".into(),
        body: "B".into(),
        author_id: None,
        created_at: 0,
        updated_at: 0,
        origin: DraftOrigin::New,
        linked_published_id: None,
    }
}

fn start() -> (Arc<RecordingSink>, AutosaveHandle) {
    let sink = Arc::new(RecordingSink::default());
    let handle = AutosaveHandle::spawn(sink.clone(), &draft(), AutosaveConfig::default());
    (sink, handle)
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_rapid_edits_coalesce_into_one_save() {
    let (sink, handle) = start();

    for i in 0..10 {
        handle.edit("T", format!("B{i}")).unwrap();
        sleep_ms(200).await;
    }
    assert!(sink.saves().is_empty(), "still typing, nothing saved yet");

    sleep_ms(1000).await;

    assert_eq!(sink.saves(), vec![DraftContent::new("T", "B9")]);
}

#[tokio::test(start_paused = true)]
async fn test_save_waits_for_full_quiet_period() {
    let (sink, handle) = start();

    handle.edit("T", "B1").unwrap();
    sleep_ms(999).await;
    assert!(sink.saves().is_empty());

    sleep_ms(2).await;
    assert_eq!(sink.saves().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_spaced_edits_save_in_order() {
    let (sink, handle) = start();

    handle.edit("T", "first").unwrap();
    sleep_ms(1500).await;
    handle.edit("T", "second").unwrap();
    sleep_ms(1500).await;

    assert_eq!(
        sink.saves(),
        vec![DraftContent::new("T", "first"), DraftContent::new("T", "second")]
    );
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_content_is_not_saved() {
    let (sink, handle) = start();

    // Typed and then undone: back to the content the draft started with.
    handle.edit("T", "Bx").unwrap();
    handle.edit("T", "B").unwrap();
    sleep_ms(1500).await;

    assert!(sink.saves().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_flush_saves_immediately_once() {
    let (sink, handle) = start();

    handle.edit("T", "last keystroke").unwrap();
    assert_eq!(handle.flush().await.unwrap(), FlushOutcome::Saved);
    assert_eq!(sink.saves().len(), 1);

    // The countdown was consumed by the flush.
    sleep_ms(2000).await;
    assert_eq!(sink.saves().len(), 1);
    assert_eq!(handle.flush().await.unwrap(), FlushOutcome::Unchanged);
}

#[tokio::test(start_paused = true)]
async fn test_drop_discards_pending_edit() {
    let (sink, handle) = start();

    handle.edit("T", "never saved").unwrap();
    drop(handle);
    sleep_ms(2000).await;

    assert!(sink.saves().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_the_task() {
    let (sink, handle) = start();
    handle.edit("T", "never saved").unwrap();

    handle.cancel();
    sleep_ms(2000).await;

    assert!(sink.saves().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_save_is_retried_by_flush() {
    let (sink, handle) = start();
    sink.failing.store(true, Ordering::SeqCst);

    handle.edit("T", "precious").unwrap();
    sleep_ms(1500).await;
    assert!(sink.saves().is_empty());

    assert!(matches!(
        handle.flush().await,
        Err(AutosaveError::Save(DraftError::StoragePersistFailed(_)))
    ));

    sink.failing.store(false, Ordering::SeqCst);
    assert_eq!(handle.flush().await.unwrap(), FlushOutcome::Saved);
    assert_eq!(sink.saves(), vec![DraftContent::new("T", "precious")]);
}

#[tokio::test(start_paused = true)]
async fn test_handle_reports_draft_id_and_liveness() {
    let (_, handle) = start();
    sleep_ms(10).await;

    assert_eq!(handle.draft_id(), DraftId(1));
    assert!(!handle.is_finished());
}
