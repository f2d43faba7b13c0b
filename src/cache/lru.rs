//! Recency List Module
//!
//! Doubly-linked ordering of cache entries from most recently used (front)
//! to least recently used (back).
//!
//! Entries live in an arena of slots addressed by [`EntryId`]; links are
//! handles into the same arena, so there is no cyclic ownership. Freed slots
//! are recycled through a free list.
//!
//! - `push_front`, `remove`, `pop_back`, `move_to_front`: O(1)
//! - `iter`: O(n), front to back

use std::time::Instant;

use crate::cache::entry::{CacheEntry, EntryId};

// == Recency List ==
/// Arena-backed MRU -> LRU list of cache entries.
#[derive(Debug, Default)]
pub struct RecencyList {
    slots: Vec<Option<CacheEntry>>,
    free: Vec<usize>,
    front: Option<EntryId>,
    back: Option<EntryId>,
    len: usize,
}

impl RecencyList {
    // == Constructor ==
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty list with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Number of linked entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most recently used entry.
    #[cfg(test)]
    pub(crate) fn front(&self) -> Option<EntryId> {
        self.front
    }

    // == Back ==
    /// Least recently used entry, or `None` when the list is empty.
    pub fn back(&self) -> Option<EntryId> {
        self.back
    }

    pub fn get(&self, id: EntryId) -> Option<&CacheEntry> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut CacheEntry> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    // == Push Front ==
    /// Inserts `entry` as the new front and returns its handle.
    ///
    /// If the list was empty the entry is also the back.
    pub fn push_front(&mut self, mut entry: CacheEntry) -> EntryId {
        entry.prev = None;
        entry.next = None;

        let id = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(entry);
                EntryId(slot)
            }
            None => {
                self.slots.push(Some(entry));
                EntryId(self.slots.len() - 1)
            }
        };

        self.link_front(id);
        self.len += 1;
        id
    }

    // == Remove ==
    /// Detaches `id` from wherever it sits and frees its slot.
    ///
    /// Returns `None` if `id` is not a live entry of this list. Callers only
    /// pass handles taken from the entry index.
    pub fn remove(&mut self, id: EntryId) -> Option<CacheEntry> {
        if !self.unlink(id) {
            return None;
        }
        let entry = self.slots[id.0].take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(entry)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_back(&mut self) -> Option<CacheEntry> {
        let back = self.back?;
        self.remove(back)
    }

    // == Move To Front ==
    /// Promotes `id` to most recently used and refreshes its timestamp.
    ///
    /// Returns `false` if `id` is not a live entry.
    pub fn move_to_front(&mut self, id: EntryId, now: Instant) -> bool {
        match self.get_mut(id) {
            Some(entry) => entry.last_touched = now,
            None => return false,
        }
        if self.front == Some(id) {
            return true;
        }
        self.unlink(id);
        self.link_front(id);
        true
    }

    /// Iterates entries from front (MRU) to back (LRU).
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            current: self.front,
        }
    }

    // == Linking ==
    /// Attaches an already allocated, unlinked slot at the front.
    fn link_front(&mut self, id: EntryId) {
        let old_front = self.front;
        if let Some(entry) = self.get_mut(id) {
            entry.prev = None;
            entry.next = old_front;
        }
        match old_front {
            Some(front) => {
                if let Some(entry) = self.get_mut(front) {
                    entry.prev = Some(id);
                }
            }
            None => self.back = Some(id),
        }
        self.front = Some(id);
    }

    /// Repairs neighbour links around `id` and clears its own links.
    ///
    /// Covers sole element, front, back and middle positions.
    fn unlink(&mut self, id: EntryId) -> bool {
        let (prev, next) = match self.get(id) {
            Some(entry) => (entry.prev, entry.next),
            None => return false,
        };

        match prev {
            Some(prev_id) => {
                if let Some(entry) = self.get_mut(prev_id) {
                    entry.next = next;
                }
            }
            None => {
                debug_assert_eq!(self.front, Some(id), "unlinked node without prev must be front");
                self.front = next;
            }
        }

        match next {
            Some(next_id) => {
                if let Some(entry) = self.get_mut(next_id) {
                    entry.prev = prev;
                }
            }
            None => {
                debug_assert_eq!(self.back, Some(id), "unlinked node without next must be back");
                self.back = prev;
            }
        }

        if let Some(entry) = self.get_mut(id) {
            entry.prev = None;
            entry.next = None;
        }
        true
    }

    /// Walks the list in both directions and checks every link.
    #[cfg(test)]
    pub(crate) fn debug_validate_invariants(&self) {
        let mut count = 0;
        let mut prev = None;
        let mut current = self.front;
        while let Some(id) = current {
            let entry = self.get(id).expect("linked id must be live");
            assert_eq!(entry.prev, prev, "broken prev link");
            prev = Some(id);
            current = entry.next;
            count += 1;
            assert!(count <= self.len, "cycle detected");
        }
        assert_eq!(prev, self.back, "back does not match last node");
        assert_eq!(count, self.len, "len does not match linked nodes");
        assert_eq!(self.front.is_none(), self.back.is_none());
    }
}

// == Iterator ==
/// Front-to-back iterator over a [`RecencyList`].
pub struct Iter<'a> {
    list: &'a RecencyList,
    current: Option<EntryId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a CacheEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.list.get(self.current?)?;
        self.current = entry.next;
        Some(entry)
    }
}
