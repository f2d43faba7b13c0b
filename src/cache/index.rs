//! Entry Index Module
//!
//! Maps keys to their handle in the recency list. Holds no eviction logic.

use std::collections::HashMap;

use crate::cache::entry::EntryId;

// == Entry Index ==
/// Key -> [`EntryId`] lookup.
#[derive(Debug, Default)]
pub struct EntryIndex {
    slots: HashMap<String, EntryId>,
}

impl EntryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: HashMap::with_capacity(capacity),
        }
    }

    pub fn get(&self, key: &str) -> Option<EntryId> {
        self.slots.get(key).copied()
    }

    /// Records `key` at `id`, returning the handle it replaced, if any.
    pub fn insert(&mut self, key: String, id: EntryId) -> Option<EntryId> {
        self.slots.insert(key, id)
    }

    pub fn remove(&mut self, key: &str) -> Option<EntryId> {
        self.slots.remove(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_insert_get_remove() {
        let mut index = EntryIndex::new();
        assert!(index.is_empty());

        assert!(index.insert("a".to_string(), EntryId(3)).is_none());
        assert_eq!(index.get("a"), Some(EntryId(3)));
        assert_eq!(index.len(), 1);

        assert_eq!(index.remove("a"), Some(EntryId(3)));
        assert!(index.get("a").is_none());
        assert!(index.is_empty());
    }

    #[test]
    fn test_index_insert_replaces() {
        let mut index = EntryIndex::with_capacity(4);
        index.insert("a".to_string(), EntryId(0));

        assert_eq!(index.insert("a".to_string(), EntryId(1)), Some(EntryId(0)));
        assert_eq!(index.len(), 1);
    }
}
