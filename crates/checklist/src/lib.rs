//! # `checklist`: in-memory lists of todos
//!
//! The authoritative store behind the checklist gRPC service. A [`Store`]
//! owns every [`List`] and [`Todo`], hands out immutable snapshots, and
//! guards its whole state with a single mutex so each operation is atomic.
//!
//! ```
//! use checklist::{Error, Store};
//!
//! let store = Store::new();
//! let list = store.add_list("TODOs")?;
//! let todo = store.add_todo(&list.id, "Get groceries")?;
//! assert!(!todo.done);
//!
//! let todo = store.update_todo(&todo.id, None, Some(true))?;
//! assert_eq!(todo.description, "Get groceries");
//!
//! store.remove_list(&list.id)?;
//! assert!(matches!(store.get_todo(&todo.id), Err(Error::NotFound { .. })));
//! # Ok::<(), Error>(())
//! ```

mod error;
mod model;
mod store;
mod validate;

pub use crate::error::*;
pub use crate::model::*;
pub use crate::store::*;
pub use crate::validate::*;
pub use ferroid::id::ULID;
pub use ferroid::rand::{RandSource, ThreadRandom};
pub use ferroid::time::{MonotonicClock, TimeSource};
