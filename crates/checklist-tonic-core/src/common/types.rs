//! # Wire conversions
//!
//! Maps checklist snapshots onto the generated reply messages and decodes
//! wire identifiers back into typed ids.
//!
//! A string that is not a well-formed id is rejected with
//! [`checklist::Error::InvalidArgument`] naming the request field it came
//! from. A well-formed id that names nothing is left for the store to report
//! as [`checklist::Error::NotFound`].

use crate::proto::checklist::{ListReply, TodoReply};
use checklist::{List, ListId, Todo, TodoId};

impl From<List> for ListReply {
    fn from(list: List) -> Self {
        Self {
            id: list.id.to_string(),
            name: list.name,
            todos: list.todos.iter().map(ToString::to_string).collect(),
        }
    }
}

impl From<Todo> for TodoReply {
    fn from(todo: Todo) -> Self {
        Self {
            list_id: todo.list_id.to_string(),
            id: todo.id.to_string(),
            description: todo.description,
            done: todo.done,
        }
    }
}

/// Decodes the list id carried in request field `field`.
pub fn parse_list_id(field: &'static str, raw: &str) -> checklist::Result<ListId> {
    raw.parse::<ListId>()
        .map_err(|err| checklist::Error::invalid_argument(field, err.to_string()))
}

/// Decodes the todo id carried in request field `field`.
pub fn parse_todo_id(field: &'static str, raw: &str) -> checklist::Result<TodoId> {
    raw.parse::<TodoId>()
        .map_err(|err| checklist::Error::invalid_argument(field, err.to_string()))
}
