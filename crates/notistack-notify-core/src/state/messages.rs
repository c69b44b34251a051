//! Queue message lists.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::StoreError;

/// An ordered list store keyed by string, with inclusive index ranges.
///
/// Negative indexes count from the tail, `-1` being the last element.
/// `append` and `pop_front` are each atomic per key.
#[async_trait]
pub trait MessageStore: Send + Sync + std::fmt::Debug {
    /// Append `value` to the tail of `key`.
    async fn append(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Elements `from..=to` of `key`. A missing key is an empty list.
    async fn range(&self, key: &str, from: i64, to: i64) -> Result<Vec<String>, StoreError>;

    /// Remove and return up to `count` elements from the head of `key`.
    async fn pop_front(&self, key: &str, count: usize) -> Result<Vec<String>, StoreError>;

    /// Drop the whole list.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Resolve an inclusive `[from, to]` range against a list of `len` elements.
fn resolve_range(len: usize, from: i64, to: i64) -> Option<(usize, usize)> {
    let len = i64::try_from(len).ok()?;
    let from = if from < 0 { (len + from).max(0) } else { from };
    let to = if to < 0 { len + to } else { to.min(len - 1) };
    if len == 0 || from > to || from >= len {
        return None;
    }
    Some((usize::try_from(from).ok()?, usize::try_from(to).ok()?))
}

/// In-process [`MessageStore`].
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    lists: Mutex<HashMap<String, VecDeque<String>>>,
}

impl InMemoryMessageStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current length of `key`.
    #[must_use]
    pub fn len(&self, key: &str) -> usize {
        self.lists.lock().get(key).map_or(0, VecDeque::len)
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.lists
            .lock()
            .entry(key.to_owned())
            .or_default()
            .push_back(value);
        Ok(())
    }

    async fn range(&self, key: &str, from: i64, to: i64) -> Result<Vec<String>, StoreError> {
        let lists = self.lists.lock();
        let Some(list) = lists.get(key) else {
            return Ok(Vec::new());
        };
        Ok(match resolve_range(list.len(), from, to) {
            Some((start, end)) => list.range(start..=end).cloned().collect(),
            None => Vec::new(),
        })
    }

    async fn pop_front(&self, key: &str, count: usize) -> Result<Vec<String>, StoreError> {
        let mut lists = self.lists.lock();
        let Some(list) = lists.get_mut(key) else {
            return Ok(Vec::new());
        };
        let popped: Vec<String> = list.drain(..count.min(list.len())).collect();
        if list.is_empty() {
            lists.remove(key);
        }
        Ok(popped)
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lists.lock().remove(key);
        Ok(())
    }
}
