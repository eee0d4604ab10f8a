use notekeep_core::{
    encode_notes, KvRepository, MemoryKvRepository, NoteSelection, NoteStore, RepoError,
    RepoResult, StoreError, NOTES_STORAGE_KEY,
};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use uuid::Uuid;

#[test]
fn add_note_appends_one_incomplete_note() {
    let mut store = NoteStore::open(MemoryKvRepository::new());
    store.add_note("first", "body");
    let before = store.len();

    let id = store.add_note("A", "B");

    assert_eq!(store.len(), before + 1);
    let last = store.notes().last().unwrap();
    assert_eq!(last.id, id);
    assert_eq!(last.title, "A");
    assert_eq!(last.content, "B");
    assert!(!last.is_completed);
}

#[test]
fn add_note_accepts_empty_strings() {
    let mut store = NoteStore::open(MemoryKvRepository::new());
    let id = store.add_note("", "");
    let note = store.get_note(id).unwrap();
    assert!(note.title.is_empty());
    assert!(note.content.is_empty());
}

#[test]
fn update_note_preserves_id_position_and_flag() {
    let mut store = NoteStore::open(MemoryKvRepository::new());
    store.add_note("a", "1");
    let target = store.add_note("b", "2");
    store.add_note("c", "3");
    store.toggle_completion(target);

    assert!(store.update_note(target, "b2", "22"));

    assert_eq!(store.position_of(target), Some(1));
    let note = store.get_note(target).unwrap();
    assert_eq!(note.title, "b2");
    assert_eq!(note.content, "22");
    assert!(note.is_completed);
}

#[test]
fn update_with_unknown_id_leaves_collection_byte_identical() {
    let repo = MemoryKvRepository::new();
    let mut store = NoteStore::open(repo.clone());
    store.add_note("a", "1");
    store.add_note("b", "2");
    let encoded_before = encode_notes(store.notes()).unwrap();
    let stored_before = repo.get(NOTES_STORAGE_KEY).unwrap();

    assert!(!store.update_note(Uuid::new_v4(), "x", "y"));

    assert_eq!(encode_notes(store.notes()).unwrap(), encoded_before);
    assert_eq!(repo.get(NOTES_STORAGE_KEY).unwrap(), stored_before);
}

#[test]
fn toggle_twice_restores_original_flag() {
    let mut store = NoteStore::open(MemoryKvRepository::new());
    let id = store.add_note("a", "");

    assert!(store.toggle_completion(id));
    assert!(store.get_note(id).unwrap().is_completed);
    assert!(store.toggle_completion(id));
    assert!(!store.get_note(id).unwrap().is_completed);
}

#[test]
fn toggle_with_unknown_id_is_noop() {
    let mut store = NoteStore::open(MemoryKvRepository::new());
    store.add_note("a", "");
    let before = store.snapshot();

    assert!(!store.toggle_completion(Uuid::new_v4()));
    assert_eq!(store.snapshot(), before);
}

#[test]
fn delete_by_position_keeps_relative_order() {
    let mut store = NoteStore::open(MemoryKvRepository::new());
    let a = store.add_note("A", "");
    store.add_note("B", "");
    let c = store.add_note("C", "");

    assert_eq!(store.delete_notes(NoteSelection::position(1)), 1);

    let ids = store.notes().iter().map(|note| note.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![a, c]);
}

#[test]
fn delete_multiple_positions_and_ids() {
    let mut store = NoteStore::open(MemoryKvRepository::new());
    let ids = (0..5)
        .map(|idx| store.add_note(format!("n{idx}"), ""))
        .collect::<Vec<_>>();

    assert_eq!(store.delete_notes(NoteSelection::Positions(vec![4, 0])), 2);
    assert_eq!(
        store.delete_notes(NoteSelection::Ids(vec![ids[2], Uuid::new_v4()])),
        1
    );

    let remaining = store.notes().iter().map(|note| note.id).collect::<Vec<_>>();
    assert_eq!(remaining, vec![ids[1], ids[3]]);
}

#[test]
fn ids_stay_unique_across_mixed_operations() {
    let mut store = NoteStore::open(MemoryKvRepository::new());
    let mut seed: u64 = 0x5eed;
    let mut next = move || {
        seed = seed
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (seed >> 33) as usize
    };

    for step in 0..300 {
        match next() % 4 {
            0 | 1 => {
                store.add_note(format!("t{step}"), "c");
            }
            2 if !store.is_empty() => {
                let id = store.notes()[next() % store.len()].id;
                if next() % 2 == 0 {
                    store.toggle_completion(id);
                } else {
                    store.update_note(id, "u", format!("{step}"));
                }
            }
            3 if !store.is_empty() => {
                store.delete_notes(NoteSelection::position(next() % store.len()));
            }
            _ => {}
        }

        let unique = store
            .notes()
            .iter()
            .map(|note| note.id)
            .collect::<HashSet<_>>();
        assert_eq!(unique.len(), store.len(), "duplicate id after step {step}");
    }
}

#[test]
fn every_mutation_is_persisted_and_restored_on_reopen() {
    let repo = MemoryKvRepository::new();
    let (kept, toggled) = {
        let mut store = NoteStore::open(repo.clone());
        let kept = store.add_note("keep", "me");
        let toggled = store.add_note("toggle", "me");
        let dropped = store.add_note("drop", "me");
        store.update_note(kept, "kept", "edited");
        store.toggle_completion(toggled);
        store.delete_notes(NoteSelection::id(dropped));
        (kept, toggled)
    };

    let reopened = NoteStore::open(repo);
    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened.notes()[0].id, kept);
    assert_eq!(reopened.notes()[0].content, "edited");
    assert_eq!(reopened.notes()[1].id, toggled);
    assert!(reopened.notes()[1].is_completed);
}

#[test]
fn absent_blob_loads_as_empty() {
    let store = NoteStore::open(MemoryKvRepository::new());
    assert!(store.is_empty());
    assert!(store.last_save_error().is_none());
}

#[test]
fn corrupt_blob_loads_as_empty_and_is_replaced_on_next_save() {
    let repo = MemoryKvRepository::new();
    repo.set(NOTES_STORAGE_KEY, b"{not json").unwrap();

    let mut store = NoteStore::open(repo.clone());
    assert!(store.is_empty());
    assert_eq!(
        repo.get(NOTES_STORAGE_KEY).unwrap().as_deref(),
        Some(&b"{not json"[..])
    );

    store.add_note("fresh", "");
    assert_eq!(NoteStore::open(repo).len(), 1);
}

#[test]
fn subscribers_receive_one_snapshot_per_successful_mutation() {
    let mut store = NoteStore::open(MemoryKvRepository::new());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    store.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.len()));
    let rx = store.subscribe_channel();
    assert_eq!(store.subscriber_count(), 2);

    let id = store.add_note("a", "");
    store.add_note("b", "");
    store.update_note(Uuid::new_v4(), "miss", "");
    store.toggle_completion(id);
    store.delete_notes(NoteSelection::position(9));
    store.delete_notes(NoteSelection::id(id));

    assert_eq!(*seen.borrow(), vec![1, 2, 2, 1]);
    let received = rx.try_iter().collect::<Vec<_>>();
    assert_eq!(received.len(), 4);
    assert!(received[2][0].is_completed);
    assert_eq!(received[3].to_vec(), store.notes().to_vec());

    drop(rx);
    store.add_note("c", "");
    assert_eq!(store.subscriber_count(), 1);
}

#[test]
fn unsubscribed_callback_is_not_called() {
    let mut store = NoteStore::open(MemoryKvRepository::new());
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let subscription = store.subscribe(move |_| counter.set(counter.get() + 1));

    store.add_note("a", "");
    assert!(store.unsubscribe(subscription));
    store.add_note("b", "");

    assert_eq!(calls.get(), 1);
}

#[test]
fn snapshot_is_not_affected_by_later_mutations() {
    let mut store = NoteStore::open(MemoryKvRepository::new());
    let id = store.add_note("a", "");
    let snapshot = store.snapshot();

    store.update_note(id, "changed", "");

    assert_eq!(snapshot[0].title, "a");
}

struct FailingRepo {
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
    inner: MemoryKvRepository,
}

impl FailingRepo {
    fn new(fail_reads: bool, fail_writes: bool) -> Self {
        Self {
            fail_reads: Cell::new(fail_reads),
            fail_writes: Cell::new(fail_writes),
            inner: MemoryKvRepository::new(),
        }
    }
}

impl KvRepository for FailingRepo {
    fn get(&self, key: &str) -> RepoResult<Option<Vec<u8>>> {
        if self.fail_reads.get() {
            return Err(RepoError::MissingRequiredTable("kv_entries"));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> RepoResult<()> {
        if self.fail_writes.get() {
            return Err(RepoError::MissingRequiredTable("kv_entries"));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> RepoResult<()> {
        self.inner.remove(key)
    }
}

#[test]
fn save_failure_keeps_mutation_and_is_reported_until_next_success() {
    let mut store = NoteStore::open(FailingRepo::new(false, true));
    let rx = store.subscribe_channel();

    let id = store.add_note("unsaved", "");

    assert_eq!(store.len(), 1);
    assert!(matches!(
        store.last_save_error(),
        Some(StoreError::Repo(RepoError::MissingRequiredTable(_)))
    ));
    assert_eq!(rx.try_iter().count(), 1);
    assert!(store.repository().inner.is_empty());

    store.repository().fail_writes.set(false);
    store.toggle_completion(id);

    assert!(store.last_save_error().is_none());
    let reopened = NoteStore::open(store.into_repository().inner);
    assert!(reopened.notes()[0].is_completed);
}

#[test]
fn read_failure_on_open_loads_as_empty() {
    let repo = FailingRepo::new(true, false);
    repo.inner.set(NOTES_STORAGE_KEY, b"[]").unwrap();

    let mut store = NoteStore::open(repo);
    assert!(store.is_empty());
    assert!(store.last_save_error().is_none());

    store.add_note("after", "failed read");
    assert_eq!(store.len(), 1);
    assert!(store.last_save_error().is_none());

    store.repository().fail_reads.set(false);
    let reopened = NoteStore::open(store.into_repository().inner);
    assert_eq!(reopened.notes()[0].title, "after");
}

#[test]
fn blob_with_duplicate_ids_loads_empty_and_is_overwritten_by_next_save() {
    let repo = MemoryKvRepository::new();
    let duplicated = {
        let mut store = NoteStore::open(repo.clone());
        store.add_note("only", "");
        let mut notes = store.notes().to_vec();
        notes.push(notes[0].clone());
        encode_notes(&notes).unwrap()
    };
    repo.set(NOTES_STORAGE_KEY, &duplicated).unwrap();

    let mut store = NoteStore::open(repo.clone());
    assert!(store.is_empty());

    store.add_note("replacement", "");
    let reopened = NoteStore::open(repo);
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.notes()[0].title, "replacement");
}
