// SPDX-FileCopyrightText: 2026 InkCaliber contributors
// SPDX-License-Identifier: MIT

//! End-to-end autosave flows against a real filesystem store, with the
//! debounce window driven by real time. The window is kept short so the
//! suite stays fast; the unit tests cover exact timing on a paused clock.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::json;
use tokio::time::Duration;

use inkcaliber::doc::{ChatDocument, ChatRole, Document, NoteDocument, SceneDocument, SceneElement};
use inkcaliber::model::{BranchId, SlotId};
use inkcaliber::save::{
    FlushOutcome, SaveController, SessionDirNaming, SessionEvent, SlotNaming, SyncState,
    TitledNaming,
};
use inkcaliber::store::{FsSlotStore, SlotStore};

const DELAY: Duration = Duration::from_millis(50);

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: std::path::PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = env::temp_dir();
        path.push(format!("inkcaliber-{prefix}-{}-{nanos}-{counter}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

fn slot(name: &str) -> SlotId {
    SlotId::new(name).unwrap()
}

/// Waits out the debounce window and flushes, the way a host event loop
/// would after its timer arm fires.
async fn settle<D, S, N>(controller: &mut SaveController<D, S, N>) -> FlushOutcome
where
    D: Document,
    S: SlotStore,
    N: SlotNaming,
{
    controller.debounce_elapsed().await;
    controller.flush_due().await.expect("flush")
}

#[tokio::test]
async fn note_lifecycle_create_edit_rename() {
    let tmp = TempDir::new("note-flow");
    let store = FsSlotStore::flat(tmp.path().join("notes"), "json");
    let mut controller: SaveController<NoteDocument, _, _> =
        SaveController::new(store.clone(), TitledNaming::new(), DELAY);
    let mut events = controller.take_session_events().unwrap();

    let loaded = controller.load(None).await;
    assert!(loaded.error.is_none());

    let mut doc = loaded.document.with_title("Groceries");
    doc.content = json!({ "type": "doc", "text": "milk" });
    controller.record_edit(&doc);
    assert_eq!(controller.sync_state(), SyncState::Unsaved);

    assert_eq!(settle(&mut controller).await, FlushOutcome::Saved);
    assert_eq!(events.try_recv().unwrap(), SessionEvent::SlotBound(slot("Groceries")));
    assert!(store.document_path(&slot("Groceries")).is_file());

    // Retitle plus a content edit in the same window: one rename, one write.
    let mut doc = doc.with_title("Groceries Weekly");
    doc.content = json!({ "type": "doc", "text": "milk, eggs" });
    controller.record_edit(&doc);
    assert_eq!(settle(&mut controller).await, FlushOutcome::Saved);

    assert_eq!(
        events.try_recv().unwrap(),
        SessionEvent::SlotRenamed {
            from: slot("Groceries"),
            to: slot("Groceries Weekly"),
        }
    );
    assert!(!store.document_path(&slot("Groceries")).exists());
    let on_disk = tokio::fs::read_to_string(store.document_path(&slot("Groceries Weekly")))
        .await
        .unwrap();
    assert!(on_disk.contains("milk, eggs"));
    assert_eq!(controller.sync_state(), SyncState::Saved);
}

#[tokio::test]
async fn note_reopens_with_its_saved_state() {
    let tmp = TempDir::new("note-reopen");
    let store = FsSlotStore::flat(tmp.path().join("notes"), "json");

    {
        let mut controller = SaveController::new(store.clone(), TitledNaming::new(), DELAY);
        let mut doc = NoteDocument::new("Journal", json!({ "type": "doc", "text": "day one" }));
        controller.record_edit(&doc);
        settle(&mut controller).await;
        doc.content = json!({ "type": "doc", "text": "day one, evening" });
        controller.record_edit(&doc);
        settle(&mut controller).await;
    }

    let mut controller: SaveController<NoteDocument, _, _> =
        SaveController::new(store, TitledNaming::new(), DELAY);
    let loaded = controller.load(Some(slot("Journal"))).await;
    assert!(loaded.error.is_none());
    assert_eq!(loaded.document.title, "Journal");
    assert_eq!(loaded.document.content["text"], "day one, evening");

    // Reloading then re-reporting the same state schedules nothing.
    controller.record_edit(&loaded.document);
    assert_eq!(controller.flush_now().await.unwrap(), FlushOutcome::NotDue);
}

#[tokio::test]
async fn canvas_session_saves_main_and_forks_a_branch() {
    let tmp = TempDir::new("canvas-flow");
    let main = BranchId::new("data").unwrap();
    let store = FsSlotStore::branched(tmp.path().join("canvas"), main.clone(), "excalidraw");
    let mut controller = SaveController::new(store.clone(), SessionDirNaming::new(), DELAY);

    let mut scene = SceneDocument::empty();
    scene.elements.push(SceneElement::new("rect-1", 1, 7));
    controller.record_edit(&scene);
    assert_eq!(settle(&mut controller).await, FlushOutcome::Saved);

    let session = controller.slot().cloned().expect("bound");
    assert!(session.as_str().starts_with("session-"));

    // Forking copies the current payload under a new branch file in the
    // same session folder; the controller keeps writing the main branch.
    let fork = BranchId::new("experiment").unwrap();
    let payload = store.read_document(&session).await.unwrap().unwrap();
    let fork_store = store.clone().with_branch(fork.clone());
    fork_store.write_document(&session, &payload).await.unwrap();

    let branches = store.list_branches(&session).await.unwrap();
    assert_eq!(branches, vec![main, fork]);

    scene.elements[0].version = 2;
    controller.record_edit(&scene);
    assert_eq!(settle(&mut controller).await, FlushOutcome::Saved);

    let main_payload = store.read_document(&session).await.unwrap().unwrap();
    let fork_payload = fork_store.read_document(&session).await.unwrap().unwrap();
    assert_ne!(main_payload, fork_payload);
}

#[tokio::test]
async fn chat_thread_persists_and_reports_status() {
    let tmp = TempDir::new("chat-flow");
    let store = FsSlotStore::flat(tmp.path().join("chat").join("anthropic"), "json");
    let mut controller = SaveController::new(store.clone(), TitledNaming::new(), DELAY);
    let mut status = controller.status();

    let mut chat = ChatDocument::new("Trip Planning");
    chat.push_message(ChatRole::User, "where to in october?");
    controller.record_edit(&chat);
    assert_eq!(*status.borrow_and_update(), SyncState::Unsaved);

    assert_eq!(settle(&mut controller).await, FlushOutcome::Saved);
    assert_eq!(*status.borrow_and_update(), SyncState::Saved);

    chat.push_message(ChatRole::Assistant, "how about lisbon?");
    controller.record_edit(&chat);
    assert_eq!(settle(&mut controller).await, FlushOutcome::Saved);

    let reopened = ChatDocument::from_payload(
        &store.read_document(&slot("Trip Planning")).await.unwrap().unwrap(),
    )
    .unwrap();
    assert_eq!(reopened.messages.len(), 2);
    assert_eq!(reopened.title, "Trip Planning");
}
