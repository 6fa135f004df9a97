//! Typed values held by the store.
//!
//! A key maps to exactly one [`Value`]. Its shape is fixed by the operation
//! that created it; operations for another shape are rejected, never coerced.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// A stored value, one variant per supported shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A plain string (`SET` / `GET`)
    String(String),
    /// A field → value map (`HSET` / `HGET` / `HGETALL`)
    Hash(HashMap<String, String>),
    /// An ordered sequence, head at index 0 (`LPUSH` / `RPOP`)
    List(VecDeque<String>),
    /// An unordered collection of unique members (`SADD` / `SMEMBERS`)
    Set(HashSet<String>),
}

impl Value {
    /// Returns the shape tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Hash(_) => ValueKind::Hash,
            Value::List(_) => ValueKind::List,
            Value::Set(_) => ValueKind::Set,
        }
    }
}

/// The shape of a stored value, without its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Hash,
    List,
    Set,
}

impl ValueKind {
    /// Lower-case name, as reported by the `TYPE` command.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Hash => "hash",
            ValueKind::List => "list",
            ValueKind::Set => "set",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
