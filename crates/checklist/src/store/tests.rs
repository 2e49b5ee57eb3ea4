use super::Store;
use crate::{Error, Limits, ListId, TodoId};
use ferroid::id::ULID;
use ferroid::rand::RandSource;
use ferroid::time::TimeSource;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::scope;

#[derive(Clone)]
struct FixedTime;

impl TimeSource<u128> for FixedTime {
    fn current_millis(&self) -> u128 {
        1_000
    }
}

/// Replays `ticks` in order, then stays on the last one.
#[derive(Clone)]
struct SteppedTime {
    ticks: Arc<[u128]>,
    next: Arc<AtomicUsize>,
}

impl SteppedTime {
    fn new(ticks: &[u128]) -> Self {
        Self {
            ticks: ticks.into(),
            next: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl TimeSource<u128> for SteppedTime {
    fn current_millis(&self) -> u128 {
        let i = self.next.fetch_add(1, Ordering::Relaxed);
        self.ticks[i.min(self.ticks.len() - 1)]
    }
}

#[derive(Clone)]
struct ZeroRand;

impl RandSource<u128> for ZeroRand {
    fn rand(&self) -> u128 {
        0
    }
}

#[derive(Clone)]
struct MaxRand;

impl RandSource<u128> for MaxRand {
    fn rand(&self) -> u128 {
        ULID::max_random()
    }
}

fn unknown_list() -> ListId {
    "00000000000000000000000000".parse().unwrap()
}

fn unknown_todo() -> TodoId {
    "00000000000000000000000000".parse().unwrap()
}

fn assert_not_found<T: core::fmt::Debug>(result: Result<T, Error>, kind: &str) {
    match result {
        Err(Error::NotFound { kind: k, .. }) => assert_eq!(k, kind),
        other => panic!("expected NotFound({kind}), got {other:?}"),
    }
}

fn assert_invalid<T: core::fmt::Debug>(result: Result<T, Error>, field: &str) {
    match result {
        Err(Error::InvalidArgument { field: f, .. }) => assert_eq!(f, field),
        other => panic!("expected InvalidArgument({field}), got {other:?}"),
    }
}

#[test]
fn add_list_returns_fresh_empty_list() {
    let store = Store::new();
    let mut seen = HashSet::new();

    for name in ["TODOs", "Groceries", "TODOs"] {
        let list = store.add_list(name).unwrap();
        assert_eq!(list.name, name);
        assert!(list.todos.is_empty());
        assert!(seen.insert(list.id), "id {} reused", list.id);
    }
    assert_eq!(store.len_lists(), 3);
}

#[test]
fn add_list_rejects_empty_name() {
    let store = Store::new();
    assert_invalid(store.add_list(""), "name");
    assert_eq!(store.len_lists(), 0);
}

#[test]
fn text_longer_than_limit_is_rejected() {
    let store = Store::with_limits(Limits { max_text_len: 5 });
    assert!(store.add_list("12345").is_ok());
    assert_invalid(store.add_list("123456"), "name");

    // Limit counts characters, not bytes.
    assert!(store.add_list("ééééé").is_ok());
}

#[test]
fn get_list_after_add() {
    let store = Store::new();
    let list = store.add_list("TODOs").unwrap();
    assert_eq!(store.get_list(&list.id).unwrap(), list);
}

#[test]
fn get_unknown_list_is_not_found() {
    let store = Store::new();
    assert_not_found(store.get_list(&unknown_list()), "list");
}

#[test]
fn update_list_renames_in_place() {
    let store = Store::new();
    let list = store.add_list("TODOs").unwrap();
    let todo = store.add_todo(&list.id, "x").unwrap();

    let updated = store.update_list(&list.id, "Chores").unwrap();
    assert_eq!(updated.id, list.id);
    assert_eq!(updated.name, "Chores");
    assert_eq!(updated.todos, vec![todo.id]);
    assert_eq!(store.get_list(&list.id).unwrap(), updated);
}

#[test]
fn update_list_twice_with_same_name_is_idempotent() {
    let store = Store::new();
    let list = store.add_list("TODOs").unwrap();

    let first = store.update_list(&list.id, "Same").unwrap();
    let second = store.update_list(&list.id, "Same").unwrap();
    assert_eq!(first, second);
    assert_eq!(store.get_list(&list.id).unwrap(), second);
}

#[test]
fn update_list_errors() {
    let store = Store::new();
    let list = store.add_list("TODOs").unwrap();

    assert_not_found(store.update_list(&unknown_list(), "name"), "list");
    assert_invalid(store.update_list(&list.id, ""), "name");
    // Argument validation wins over the existence check.
    assert_invalid(store.update_list(&unknown_list(), ""), "name");
    assert_eq!(store.get_list(&list.id).unwrap().name, "TODOs");
}

#[test]
fn remove_list_then_get_is_not_found() {
    let store = Store::new();
    let list = store.add_list("TODOs").unwrap();

    store.remove_list(&list.id).unwrap();
    assert_not_found(store.get_list(&list.id), "list");
    assert_not_found(store.remove_list(&list.id), "list");
}

#[test]
fn remove_list_cascades_to_todos() {
    let store = Store::new();
    let list = store.add_list("TODOs").unwrap();
    let other = store.add_list("Other").unwrap();

    let todos: Vec<_> = (0..5)
        .map(|i| store.add_todo(&list.id, &format!("todo {i}")).unwrap())
        .collect();
    let survivor = store.add_todo(&other.id, "keep me").unwrap();

    store.remove_list(&list.id).unwrap();

    for todo in &todos {
        assert_not_found(store.get_todo(&todo.id), "todo");
    }
    assert_eq!(store.get_todo(&survivor.id).unwrap(), survivor);
    assert_eq!(store.len_todos(), 1);
}

#[test]
fn add_todo_on_removed_list_is_not_found() {
    let store = Store::new();
    let list = store.add_list("TODOs").unwrap();
    store.remove_list(&list.id).unwrap();

    assert_not_found(store.add_todo(&list.id, "x"), "list");
    assert_eq!(store.len_todos(), 0);
}

#[test]
fn add_todo_appends_id_exactly_once() {
    let store = Store::new();
    let list = store.add_list("TODOs").unwrap();

    let todo = store.add_todo(&list.id, "x").unwrap();
    assert_eq!(todo.list_id, list.id);
    assert_eq!(todo.description, "x");
    assert!(!todo.done);

    let todos = store.get_list(&list.id).unwrap().todos;
    assert_eq!(todos.iter().filter(|id| **id == todo.id).count(), 1);
}

#[test]
fn add_todo_keeps_insertion_order() {
    let store = Store::new();
    let list = store.add_list("TODOs").unwrap();

    let ids: Vec<_> = ["a", "b", "c"]
        .iter()
        .map(|d| store.add_todo(&list.id, d).unwrap().id)
        .collect();
    assert_eq!(store.get_list(&list.id).unwrap().todos, ids);
}

#[test]
fn add_todo_rejects_empty_description() {
    let store = Store::new();
    let list = store.add_list("TODOs").unwrap();

    assert_invalid(store.add_todo(&list.id, ""), "description");
    assert!(store.get_list(&list.id).unwrap().todos.is_empty());
}

#[test]
fn update_todo_applies_only_present_fields() {
    let store = Store::new();
    let list = store.add_list("TODOs").unwrap();
    let todo = store.add_todo(&list.id, "Get groceries").unwrap();

    let done = store.update_todo(&todo.id, None, Some(true)).unwrap();
    assert!(done.done);
    assert_eq!(done.description, "Get groceries");

    let renamed = store.update_todo(&todo.id, Some("Get milk"), None).unwrap();
    assert!(renamed.done);
    assert_eq!(renamed.description, "Get milk");

    let untouched = store.update_todo(&todo.id, None, None).unwrap();
    assert_eq!(untouched, renamed);
    assert_eq!(untouched.list_id, list.id);
}

#[test]
fn update_todo_errors() {
    let store = Store::new();
    let list = store.add_list("TODOs").unwrap();
    let todo = store.add_todo(&list.id, "x").unwrap();

    assert_not_found(store.update_todo(&unknown_todo(), None, Some(true)), "todo");
    assert_invalid(store.update_todo(&todo.id, Some(""), Some(true)), "description");
    // Nothing was applied by the rejected update.
    assert!(!store.get_todo(&todo.id).unwrap().done);
}

#[test]
fn remove_todo_detaches_from_list() {
    let store = Store::new();
    let list = store.add_list("TODOs").unwrap();
    let a = store.add_todo(&list.id, "a").unwrap();
    let b = store.add_todo(&list.id, "b").unwrap();

    store.remove_todo(&a.id).unwrap();

    assert_not_found(store.get_todo(&a.id), "todo");
    assert_eq!(store.get_list(&list.id).unwrap().todos, vec![b.id]);
    assert_not_found(store.remove_todo(&a.id), "todo");
}

#[test]
fn scenario_groceries() {
    let store = Store::new();

    let l1 = store.add_list("TODOs").unwrap();
    let t1 = store.add_todo(&l1.id, "Get groceries").unwrap();
    assert!(!t1.done);

    let t1 = store.update_todo(&t1.id, None, Some(true)).unwrap();
    assert!(t1.done);
    assert_eq!(t1.description, "Get groceries");

    store.remove_list(&l1.id).unwrap();
    assert_not_found(store.get_todo(&t1.id), "todo");
}

#[test]
fn ids_stay_unique_with_frozen_clock() {
    // A frozen clock and constant RNG leave only the monotonic increment to
    // keep ids apart.
    let store = Store::with_sources(Limits::default(), FixedTime, ZeroRand);
    let list = store.add_list("TODOs").unwrap();

    let mut seen = HashSet::new();
    for i in 0..100 {
        let todo = store.add_todo(&list.id, &format!("{i}")).unwrap();
        assert!(seen.insert(todo.id));
    }
}

#[test]
fn ids_increase_with_frozen_clock() {
    let store = Store::with_sources(Limits::default(), FixedTime, ZeroRand);
    let list = store.add_list("TODOs").unwrap();

    let ids: Vec<_> = (0..100)
        .map(|i| store.add_todo(&list.id, &format!("{i}")).unwrap().id)
        .collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    assert!(ids.iter().all(|id| id.as_ulid().timestamp() == 1_000));
}

#[test]
fn clock_behind_waits_for_previous_timestamp() {
    let store = Store::with_sources(Limits::default(), SteppedTime::new(&[5, 3, 6]), ZeroRand);

    let first = store.add_list("a").unwrap().id;
    let second = store.add_list("b").unwrap().id;

    assert_eq!(first.as_ulid().timestamp(), 5);
    assert_eq!(second.as_ulid().timestamp(), 6);
    assert!(first < second);
}

#[test]
fn exhausted_random_part_waits_for_next_millisecond() {
    let store = Store::with_sources(Limits::default(), SteppedTime::new(&[1, 1, 2]), MaxRand);

    let first = store.add_list("a").unwrap().id;
    let second = store.add_list("b").unwrap().id;

    assert_eq!(first.as_ulid().timestamp(), 1);
    assert_eq!(first.as_ulid().random(), ULID::max_random());
    assert_eq!(second.as_ulid().timestamp(), 2);
    assert!(first < second);
}

#[test]
fn ids_render_as_26_char_base32() {
    let store = Store::new();
    let list = store.add_list("TODOs").unwrap();

    let text = list.id.to_string();
    assert_eq!(text.len(), 26);
    assert_eq!(text.parse::<ListId>().unwrap(), list.id);
    assert!("not-an-id".parse::<ListId>().is_err());
}

#[test]
fn concurrent_add_todo() {
    const THREADS: usize = 8;
    const TODOS_PER_THREAD: usize = 250;
    const TOTAL: usize = THREADS * TODOS_PER_THREAD;

    let store = Arc::new(Store::new());
    let list_id = store.add_list("TODOs").unwrap().id;

    let ids: Vec<TodoId> = scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let store = Arc::clone(&store);
                s.spawn(move || {
                    (0..TODOS_PER_THREAD)
                        .map(|i| {
                            store
                                .add_todo(&list_id, &format!("thread {t} item {i}"))
                                .unwrap()
                                .id
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(unique.len(), TOTAL);

    let stored = store.get_list(&list_id).unwrap().todos;
    assert_eq!(stored.len(), TOTAL);
    assert_eq!(stored.iter().copied().collect::<HashSet<_>>(), unique);
}

#[test]
fn concurrent_remove_list_and_add_todo_never_leaves_orphans() {
    let store = Arc::new(Store::new());

    for _ in 0..50 {
        let list_id = store.add_list("racy").unwrap().id;

        scope(|s| {
            let adder = Arc::clone(&store);
            s.spawn(move || {
                for _ in 0..20 {
                    let _ = adder.add_todo(&list_id, "x");
                }
            });
            let remover = Arc::clone(&store);
            s.spawn(move || {
                remover.remove_list(&list_id).unwrap();
            });
        });

        assert_not_found(store.get_list(&list_id), "list");
    }

    assert_eq!(store.len_lists(), 0);
    assert_eq!(store.len_todos(), 0);
}
