use std::cell::RefCell;
use std::rc::Rc;

use talent_hub::buffer::{ItemPatch, LinkedItem, QuestionId};
use talent_hub::error::SubmissionError;
use talent_hub::snapshot::BufferSnapshot;
use talent_hub::{
    commit, BufferEvent, BufferObserver, BufferOptions, CommitOutcome, EditBufferStore,
    InMemoryCollection, Result, SubmissionInstruction, SubmissionSink, TalentHubError,
};
use tempfile::tempdir;

fn remote(id: &str, order: u32) -> LinkedItem {
    LinkedItem::new(format!("q-{}", id), order).with_id(id)
}

struct FailingSink {
    attempts: usize,
}

impl SubmissionSink for FailingSink {
    fn submit(&mut self, _instructions: &[SubmissionInstruction]) -> Result<Vec<LinkedItem>> {
        self.attempts += 1;
        Err(SubmissionError::Rejected {
            reason: "503 Service Unavailable".to_string(),
        }
        .into())
    }
}

#[derive(Clone, Default)]
struct Recorder {
    events: Rc<RefCell<Vec<BufferEvent>>>,
}

impl BufferObserver for Recorder {
    fn on_event(&mut self, event: &BufferEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[test]
fn test_failed_submission_keeps_edits_for_retry() {
    let mut store = EditBufferStore::new();
    store.enter_edit_mode(vec![remote("a", 1), remote("b", 2)]);
    let a = store.local_items()[0].local_id.clone();
    store.remove_local_item(&a);
    store.add_local_item(LinkedItem::new("q-c", 3));

    let before = store.local_items().to_vec();
    let mut failing = FailingSink { attempts: 0 };
    let err = commit(&mut store, &mut failing).unwrap_err();

    assert!(matches!(
        err,
        TalentHubError::Submission(SubmissionError::Rejected { .. })
    ));
    assert_eq!(failing.attempts, 1);
    assert_eq!(store.local_items(), before.as_slice());
    assert!(store.has_pending_changes());

    // 再試行は同じ命令列で成功する
    let mut sink = InMemoryCollection::new(vec![remote("a", 1), remote("b", 2)]);
    let outcome = commit(&mut store, &mut sink).unwrap();
    assert!(matches!(outcome, CommitOutcome::Committed(summary) if summary.total() == 2));

    let questions: Vec<QuestionId> = sink.items().into_iter().map(|i| i.question_id).collect();
    assert_eq!(questions, vec![QuestionId::from("q-b"), QuestionId::from("q-c")]);
}

#[test]
fn test_nothing_to_commit_skips_sink() {
    let mut store = EditBufferStore::new();
    store.enter_edit_mode(vec![remote("a", 1)]);

    let mut failing = FailingSink { attempts: 0 };
    assert_eq!(
        commit(&mut store, &mut failing).unwrap(),
        CommitOutcome::NothingToCommit
    );
    assert_eq!(failing.attempts, 0);
}

#[test]
fn test_each_mutation_emits_one_event() {
    let recorder = Recorder::default();
    let mut store = EditBufferStore::new();
    store.subscribe(Box::new(recorder.clone()));

    store.enter_edit_mode(vec![remote("a", 1), remote("b", 2)]);
    let a = store.local_items()[0].local_id.clone();
    let b = store.local_items()[1].local_id.clone();
    store.update_local_item(&a, ItemPatch::new().active(false));
    store.remove_local_item(&a);
    let new_id = store.add_local_item(LinkedItem::new("q-c", 3)).unwrap();
    store.reorder_local_items(&[new_id.clone(), b, a]).unwrap();
    store.exit_edit_mode();

    let events = recorder.events.borrow();
    let tags: Vec<&str> = events.iter().map(|event| event.tag()).collect();
    assert_eq!(
        tags,
        vec![
            "session_started",
            "item_updated",
            "item_removed",
            "item_added",
            "items_reordered",
            "session_ended",
        ]
    );
    assert_eq!(
        events[4],
        BufferEvent::ItemsReordered { item_count: 3, promoted: 0, dropped: 0 }
    );
    assert_eq!(events[5], BufferEvent::SessionEnded { discarded_changes: 2 });
    assert_eq!(store.notifier_stats().events_dispatched, 6);
}

#[test]
fn test_event_log_is_written_when_configured() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("edit-buffer.jsonl");
    let options = BufferOptions::default().with_event_log(&path);

    let mut store = EditBufferStore::with_options(options).unwrap();
    store.enter_edit_mode(vec![remote("a", 1)]);
    store.select_question(QuestionId::from("q-z"));
    store.reset_form();

    let text = std::fs::read_to_string(&path).unwrap();
    let tags: Vec<String> = text
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            value["tag"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(tags, vec!["session_started", "selection_changed", "form_reset"]);
}

#[test]
fn test_snapshot_round_trip_for_presentation() {
    let mut store = EditBufferStore::new();
    store.enter_edit_mode(vec![remote("a", 1), remote("b", 2)]);
    store.add_local_item(LinkedItem::new("q-c", 3));

    let snapshot = BufferSnapshot::capture(&store);
    let json = snapshot.to_json().unwrap();
    let parsed = BufferSnapshot::from_json(&json).unwrap();

    assert_eq!(parsed, snapshot);
    assert_eq!(parsed.summary.creates, 1);
    assert!(parsed.has_active_item());
}
