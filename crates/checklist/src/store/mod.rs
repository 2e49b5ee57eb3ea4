use crate::{Error, Limits, List, ListId, Result, Todo, TodoId};
use core::time::Duration;
use ferroid::generator::{IdGenStatus, LockMonoUlidGenerator};
use ferroid::id::ULID;
use ferroid::rand::{RandSource, ThreadRandom};
use ferroid::time::{MonotonicClock, TimeSource};
use parking_lot::Mutex;
use std::collections::HashMap;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[cfg(test)]
mod tests;

#[derive(Debug, Default)]
struct State {
    lists: HashMap<ListId, List>,
    todos: HashMap<TodoId, Todo>,
}

/// The authoritative in-memory holder of all lists and todos.
///
/// ## Concurrency
///
/// One [`Mutex`] guards the entire state and every operation runs inside a
/// single critical section, so no caller can observe a list missing a
/// just-added todo id, or a todo whose list is already gone. Nothing inside
/// the critical section blocks on I/O.
///
/// ## Identifiers
///
/// Each id kind has its own [`LockMonoUlidGenerator`]. Ids are drawn before
/// the state lock is taken, so a generator that has to wait never stalls
/// readers.
/// When the generator reports `Pending` (the clock moved backwards, or the
/// random part is exhausted within one millisecond) the caller sleeps for the
/// reported number of milliseconds and retries. The wait is bounded by how
/// far the clock regressed; a time source that never advances past an
/// exhausted millisecond never yields an id.
///
/// ## Validation
///
/// Arguments are checked against [`Limits`] before the state is consulted,
/// so a request with both a bad argument and a missing id fails with
/// [`Error::InvalidArgument`]. Front ends that pre-validate with the same
/// [`Limits`] (see [`Store::limits`]) classify errors identically.
pub struct Store<T = MonotonicClock, R = ThreadRandom>
where
    T: TimeSource<u128>,
    R: RandSource<u128>,
{
    state: Mutex<State>,
    list_ids: LockMonoUlidGenerator<ULID, T, R>,
    todo_ids: LockMonoUlidGenerator<ULID, T, R>,
    limits: Limits,
}

impl Store {
    /// Creates an empty store with default [`Limits`].
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    /// Creates an empty store with the given [`Limits`]. Id timestamps count
    /// milliseconds since the Unix epoch.
    pub fn with_limits(limits: Limits) -> Self {
        Self::with_sources(
            limits,
            MonotonicClock::with_epoch(Duration::ZERO),
            ThreadRandom,
        )
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, R> Store<T, R>
where
    T: TimeSource<u128> + Clone,
    R: RandSource<u128> + Clone,
{
    /// Creates an empty store whose identifier generators draw from the given
    /// time and random sources.
    pub fn with_sources(limits: Limits, time: T, rng: R) -> Self {
        Self {
            state: Mutex::new(State::default()),
            list_ids: LockMonoUlidGenerator::new(time.clone(), rng.clone()),
            todo_ids: LockMonoUlidGenerator::new(time, rng),
            limits,
        }
    }
}

impl<T, R> Store<T, R>
where
    T: TimeSource<u128>,
    R: RandSource<u128>,
{
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Creates a list with an empty todo collection.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn add_list(&self, name: &str) -> Result<List> {
        self.limits.check_text("name", name)?;

        let id = ListId::from_ulid(next_ulid(&self.list_ids)?);
        let mut state = self.state.lock();
        if state.lists.contains_key(&id) {
            return Err(Error::Internal {
                context: format!("list id {id} issued twice"),
            });
        }

        let list = List {
            id,
            name: name.to_owned(),
            todos: Vec::new(),
        };
        state.lists.insert(id, list.clone());

        #[cfg(feature = "tracing")]
        tracing::debug!(%id, "list added");
        Ok(list)
    }

    /// Returns a snapshot of the list, including its todo ids.
    pub fn get_list(&self, id: &ListId) -> Result<List> {
        self.state
            .lock()
            .lists
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(ListId::KIND, id))
    }

    /// Renames a list in place and returns the updated snapshot.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn update_list(&self, id: &ListId, name: &str) -> Result<List> {
        self.limits.check_text("name", name)?;

        let mut state = self.state.lock();
        let list = state
            .lists
            .get_mut(id)
            .ok_or_else(|| Error::not_found(ListId::KIND, id))?;
        list.name = name.to_owned();

        Ok(list.clone())
    }

    /// Removes a list together with every todo it owns.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn remove_list(&self, id: &ListId) -> Result<()> {
        let mut state = self.state.lock();
        let list = state
            .lists
            .remove(id)
            .ok_or_else(|| Error::not_found(ListId::KIND, id))?;

        for todo_id in &list.todos {
            state.todos.remove(todo_id);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(%id, todos = list.todos.len(), "list removed");
        Ok(())
    }

    /// Creates a todo with `done = false` and appends its id to the owning
    /// list.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn add_todo(&self, list_id: &ListId, description: &str) -> Result<Todo> {
        self.limits.check_text("description", description)?;

        // Drawn up front; an id lost to a missing list is never reissued.
        let id = TodoId::from_ulid(next_ulid(&self.todo_ids)?);
        let mut state = self.state.lock();
        let State { lists, todos } = &mut *state;

        let list = lists
            .get_mut(list_id)
            .ok_or_else(|| Error::not_found(ListId::KIND, list_id))?;

        if todos.contains_key(&id) {
            return Err(Error::Internal {
                context: format!("todo id {id} issued twice"),
            });
        }

        let todo = Todo {
            id,
            list_id: *list_id,
            description: description.to_owned(),
            done: false,
        };
        todos.insert(id, todo.clone());
        list.todos.push(id);

        #[cfg(feature = "tracing")]
        tracing::debug!(%id, %list_id, "todo added");
        Ok(todo)
    }

    /// Returns a snapshot of the todo.
    pub fn get_todo(&self, id: &TodoId) -> Result<Todo> {
        self.state
            .lock()
            .todos
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(TodoId::KIND, id))
    }

    /// Updates the fields that are present and leaves the others unchanged.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn update_todo(
        &self,
        id: &TodoId,
        description: Option<&str>,
        done: Option<bool>,
    ) -> Result<Todo> {
        self.limits
            .check_optional_text("description", description)?;

        let mut state = self.state.lock();
        let todo = state
            .todos
            .get_mut(id)
            .ok_or_else(|| Error::not_found(TodoId::KIND, id))?;

        if let Some(description) = description {
            todo.description = description.to_owned();
        }
        if let Some(done) = done {
            todo.done = done;
        }

        Ok(todo.clone())
    }

    /// Removes a todo and detaches it from its owning list.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn remove_todo(&self, id: &TodoId) -> Result<()> {
        let mut state = self.state.lock();
        let State { lists, todos } = &mut *state;

        let todo = todos
            .remove(id)
            .ok_or_else(|| Error::not_found(TodoId::KIND, id))?;

        match lists.get_mut(&todo.list_id) {
            Some(list) => list.todos.retain(|todo_id| todo_id != id),
            None => {
                // Unreachable while list removal cascades; the todo is gone
                // either way.
                #[cfg(feature = "tracing")]
                tracing::error!(%id, list_id = %todo.list_id, "todo had no owning list");
            }
        }

        Ok(())
    }

    /// Number of lists currently stored.
    pub fn len_lists(&self) -> usize {
        self.state.lock().lists.len()
    }

    /// Number of todos currently stored, across all lists.
    pub fn len_todos(&self) -> usize {
        self.state.lock().todos.len()
    }
}

/// Blocks until the generator hands out an id, sleeping whenever it reports
/// `Pending`.
fn next_ulid<T, R>(generator: &LockMonoUlidGenerator<ULID, T, R>) -> Result<ULID>
where
    T: TimeSource<u128>,
    R: RandSource<u128>,
{
    loop {
        match generator.try_next_id() {
            Ok(IdGenStatus::Ready { id }) => return Ok(id),
            Ok(IdGenStatus::Pending { yield_for }) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(%yield_for, "identifier generator pending");
                let millis = u64::try_from(yield_for).unwrap_or(u64::MAX);
                std::thread::sleep(Duration::from_millis(millis));
            }
            Err(err) => {
                return Err(Error::Internal {
                    context: format!("identifier generator failed: {err:?}"),
                });
            }
        }
    }
}

impl<T, R> core::fmt::Debug for Store<T, R>
where
    T: TimeSource<u128>,
    R: RandSource<u128>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Store")
            .field("lists", &state.lists.len())
            .field("todos", &state.todos.len())
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}
