use core::fmt;
use core::str::FromStr;
use ferroid::id::ULID;

/// Returned when a string is not a 26-character Crockford base32 ULID.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("malformed {kind} id '{input}'")]
pub struct ParseIdError {
    pub kind: &'static str,
    pub input: String,
}

/// Defines a strongly typed identifier wrapping a [`ULID`].
///
/// Each kind gets its own type so list and todo ids cannot be mixed up, and
/// its own `KIND` label used in error messages.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(ULID);

        impl $name {
            pub const KIND: &'static str = $kind;

            pub const fn from_ulid(id: ULID) -> Self {
                Self(id)
            }

            pub const fn as_ulid(self) -> ULID {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<ULID>().map(Self).map_err(|_| ParseIdError {
                    kind: Self::KIND,
                    input: s.to_owned(),
                })
            }
        }
    };
}

define_id!(
    /// Identifier of a [`List`].
    ListId,
    "list"
);

define_id!(
    /// Identifier of a [`Todo`].
    TodoId,
    "todo"
);

/// Snapshot of a named list and the ids of its todos, in insertion order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct List {
    pub id: ListId,
    pub name: String,
    pub todos: Vec<TodoId>,
}

/// Snapshot of a single todo item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub list_id: ListId,
    pub description: String,
    pub done: bool,
}
