//! Key → value map with typed operations.
//!
//! `ValueStore` knows nothing about expiry or locking; the engine consults the
//! expiration index first and only calls in here for keys that are live.
//! Every typed operation checks the stored shape and returns
//! [`StoreError::WrongType`] without touching the value on a mismatch.

use crate::error::{Result, StoreError};
use crate::storage::value::{Value, ValueKind};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::warn;

/// Owns every stored value.
#[derive(Debug, Default)]
pub struct ValueStore {
    entries: HashMap<String, Value>,
}

impl ValueStore {
    /// Creates an empty value store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Shape of the value at `key`, if any.
    pub fn kind(&self, key: &str) -> Option<ValueKind> {
        self.entries.get(key).map(Value::kind)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Removes a key of any shape, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // ========================================================================
    // STRING OPERATIONS
    // ========================================================================

    /// Creates or replaces a string value, whatever shape was there before.
    pub fn set(&mut self, key: String, value: String) {
        self.entries.insert(key, Value::String(value));
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match self.entries.get(key) {
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(wrong_type(key, ValueKind::String, other.kind())),
            None => Ok(None),
        }
    }

    // ========================================================================
    // HASH OPERATIONS
    // ========================================================================

    /// Sets a field, creating the hash if needed.
    ///
    /// # Returns
    /// `true` if the field is new, `false` if an existing field was overwritten.
    pub fn hset(&mut self, key: &str, field: String, value: String) -> Result<bool> {
        match self.entries.get_mut(key) {
            Some(Value::Hash(map)) => Ok(map.insert(field, value).is_none()),
            Some(other) => Err(wrong_type(key, ValueKind::Hash, other.kind())),
            None => {
                let mut map = HashMap::new();
                map.insert(field, value);
                self.entries.insert(key.to_string(), Value::Hash(map));
                Ok(true)
            }
        }
    }

    pub fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        match self.entries.get(key) {
            Some(Value::Hash(map)) => Ok(map.get(field).cloned()),
            Some(other) => Err(wrong_type(key, ValueKind::Hash, other.kind())),
            None => Ok(None),
        }
    }

    /// Returns a copy of the whole hash.
    pub fn hgetall(&self, key: &str) -> Result<Option<HashMap<String, String>>> {
        match self.entries.get(key) {
            Some(Value::Hash(map)) => Ok(Some(map.clone())),
            Some(other) => Err(wrong_type(key, ValueKind::Hash, other.kind())),
            None => Ok(None),
        }
    }

    // ========================================================================
    // LIST OPERATIONS
    // ========================================================================

    /// Pushes values to the head of a list, creating it if needed.
    ///
    /// The values end up at the head in the order they were given:
    /// pushing `[x, y, z]` onto `[a]` yields `[x, y, z, a]`.
    /// Pushing nothing onto an absent key stores an empty list.
    ///
    /// # Returns
    /// The length of the list after the push.
    pub fn lpush(&mut self, key: &str, values: Vec<String>) -> Result<usize> {
        match self.entries.get_mut(key) {
            Some(Value::List(list)) => {
                prepend(list, values);
                Ok(list.len())
            }
            Some(other) => Err(wrong_type(key, ValueKind::List, other.kind())),
            None => {
                let mut list = VecDeque::with_capacity(values.len());
                prepend(&mut list, values);
                let len = list.len();
                self.entries.insert(key.to_string(), Value::List(list));
                Ok(len)
            }
        }
    }

    /// Removes and returns the tail of a list.
    ///
    /// A list left empty stays in place; only `remove` or expiry drops it.
    pub fn rpop(&mut self, key: &str) -> Result<Option<String>> {
        match self.entries.get_mut(key) {
            Some(Value::List(list)) => Ok(list.pop_back()),
            Some(other) => Err(wrong_type(key, ValueKind::List, other.kind())),
            None => Ok(None),
        }
    }

    /// Length of a list, 0 if absent.
    pub fn llen(&self, key: &str) -> Result<usize> {
        match self.entries.get(key) {
            Some(Value::List(list)) => Ok(list.len()),
            Some(other) => Err(wrong_type(key, ValueKind::List, other.kind())),
            None => Ok(0),
        }
    }

    // ========================================================================
    // SET OPERATIONS
    // ========================================================================

    /// Adds members to a set, creating it if needed.
    ///
    /// # Returns
    /// The number of members that were not already present.
    pub fn sadd(&mut self, key: &str, members: Vec<String>) -> Result<usize> {
        match self.entries.get_mut(key) {
            Some(Value::Set(set)) => Ok(insert_members(set, members)),
            Some(other) => Err(wrong_type(key, ValueKind::Set, other.kind())),
            None => {
                let mut set = HashSet::with_capacity(members.len());
                let added = insert_members(&mut set, members);
                self.entries.insert(key.to_string(), Value::Set(set));
                Ok(added)
            }
        }
    }

    /// Returns a copy of all members.
    pub fn smembers(&self, key: &str) -> Result<Option<HashSet<String>>> {
        match self.entries.get(key) {
            Some(Value::Set(set)) => Ok(Some(set.clone())),
            Some(other) => Err(wrong_type(key, ValueKind::Set, other.kind())),
            None => Ok(None),
        }
    }
}

fn prepend(list: &mut VecDeque<String>, values: Vec<String>) {
    // Last value first, so the first value ends up at the head
    for value in values.into_iter().rev() {
        list.push_front(value);
    }
}

fn insert_members(set: &mut HashSet<String>, members: Vec<String>) -> usize {
    let mut added = 0;
    for member in members {
        if set.insert(member) {
            added += 1;
        }
    }
    added
}

fn wrong_type(key: &str, expected: ValueKind, actual: ValueKind) -> StoreError {
    warn!(key, %expected, %actual, "Operation against a key holding the wrong kind of value");
    StoreError::WrongType {
        key: key.to_string(),
        expected,
        actual,
    }
}
