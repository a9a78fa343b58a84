//! LRU Tracker Module
//!
//! Implements the recency index used for LRU eviction.
//!
//! Nodes live in an arena (`Vec` of slots) and link to each other by slot
//! index, so the doubly linked list has no owning cycles. A key map points
//! at each key's slot, and vacated slots are recycled through a free list.

use std::collections::HashMap;
use std::hash::Hash;

use crate::cache::policy::EvictionPolicy;

// == List Node ==
#[derive(Debug)]
struct Node<K> {
    key: K,
    prev: Option<usize>,
    next: Option<usize>,
}

// == Recency List ==
/// Ordered sequence of keys from most recently used (head) to least
/// recently used (tail).
///
/// Every operation is O(1). Not synchronized: the owning shard's lock
/// guards it.
#[derive(Debug)]
pub struct RecencyList<K> {
    /// Node storage, `None` marks a vacant slot
    slots: Vec<Option<Node<K>>>,
    /// Vacant slot indices available for reuse
    free: Vec<usize>,
    /// Key to slot index
    index: HashMap<K, usize>,
    /// Most recently used
    head: Option<usize>,
    /// Least recently used
    tail: Option<usize>,
}

impl<K> Default for RecencyList<K> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
        }
    }
}

impl<K: Hash + Eq + Clone> RecencyList<K> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty list with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            index: HashMap::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    // == Touch ==
    /// Moves a tracked key to the head. Untracked keys are ignored.
    pub fn touch(&mut self, key: &K) {
        let Some(&idx) = self.index.get(key) else {
            return;
        };
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    // == Insert ==
    /// Links a new key at the head.
    ///
    /// A key that is already tracked is promoted instead, so the list
    /// never holds duplicates.
    pub fn insert(&mut self, key: K) {
        if self.index.contains_key(&key) {
            self.touch(&key);
            return;
        }

        let node = Node {
            key: key.clone(),
            prev: None,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        self.index.insert(key, idx);
        self.push_front(idx);
    }

    // == Remove ==
    /// Unlinks and drops a key. Returns whether it was tracked.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(idx) => {
                self.unlink(idx);
                self.release(idx);
                true
            }
            None => false,
        }
    }

    // == Evict ==
    /// Removes and returns the least recently used key.
    ///
    /// Returns None if the list is empty.
    pub fn evict(&mut self) -> Option<K> {
        let idx = self.tail?;
        self.unlink(idx);
        let node = self.release(idx)?;
        self.index.remove(&node.key);
        Some(node.key)
    }

    // == Peek ==
    /// Returns the least recently used key without removing it.
    #[cfg(test)]
    pub fn peek_lru(&self) -> Option<&K> {
        self.key_at(self.tail?)
    }

    /// Returns the most recently used key.
    #[cfg(test)]
    pub fn peek_mru(&self) -> Option<&K> {
        self.key_at(self.head?)
    }

    /// Checks if a key is being tracked.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Drops every key and releases the arena.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }

    /// Iterates keys from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = self.slots.get(cursor?)?.as_ref()?;
            cursor = node.next;
            Some(&node.key)
        })
    }

    // == Link Helpers ==
    fn key_at(&self, idx: usize) -> Option<&K> {
        self.slots.get(idx)?.as_ref().map(|node| &node.key)
    }

    fn release(&mut self, idx: usize) -> Option<Node<K>> {
        let node = self.slots.get_mut(idx)?.take()?;
        self.free.push(idx);
        Some(node)
    }

    fn set_prev(&mut self, idx: usize, prev: Option<usize>) {
        if let Some(node) = self.slots[idx].as_mut() {
            node.prev = prev;
        }
    }

    fn set_next(&mut self, idx: usize, next: Option<usize>) {
        if let Some(node) = self.slots[idx].as_mut() {
            node.next = next;
        }
    }

    /// Detaches a node, patching its neighbours or the list ends.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match self.slots[idx].as_mut() {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return,
        };

        match prev {
            Some(p) => self.set_next(p, next),
            None => self.head = next,
        }
        match next {
            Some(n) => self.set_prev(n, prev),
            None => self.tail = prev,
        }
    }

    /// Links a detached node at the head.
    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.slots[idx].as_mut() {
            node.prev = None;
            node.next = old_head;
        }

        match old_head {
            Some(h) => self.set_prev(h, Some(idx)),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    /// Walks the list both ways and panics on any broken link.
    #[cfg(test)]
    pub(crate) fn assert_well_formed(&self) {
        assert_eq!(self.head.is_none(), self.tail.is_none(), "head/tail nullness differs");

        let mut forward = Vec::new();
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let node = self.slots[idx].as_ref().expect("linked slot is vacant");
            assert_eq!(node.prev, prev, "back link mismatch");
            forward.push(idx);
            prev = Some(idx);
            cursor = node.next;
        }
        assert_eq!(prev, self.tail, "forward walk does not end at tail");
        assert_eq!(forward.len(), self.index.len(), "list length differs from index");

        let mut backward = Vec::new();
        let mut cursor = self.tail;
        while let Some(idx) = cursor {
            backward.push(idx);
            cursor = self.slots[idx].as_ref().and_then(|node| node.prev);
        }
        backward.reverse();
        assert_eq!(forward, backward, "reverse walk disagrees");

        for (key, &idx) in &self.index {
            let node = self.slots[idx].as_ref().expect("indexed slot is vacant");
            assert!(node.key == *key, "index points at wrong node");
        }
    }
}

// == LRU Policy ==
/// Least-recently-used eviction over a [`RecencyList`].
#[derive(Debug)]
pub struct LruPolicy<K> {
    order: RecencyList<K>,
}

impl<K> Default for LruPolicy<K> {
    fn default() -> Self {
        Self {
            order: RecencyList::default(),
        }
    }
}

impl<K: Hash + Eq + Clone> LruPolicy<K> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: RecencyList::with_capacity(capacity),
        }
    }

    /// Read access to the underlying ordering.
    pub fn order(&self) -> &RecencyList<K> {
        &self.order
    }
}

impl<K: Hash + Eq + Clone> EvictionPolicy<K> for LruPolicy<K> {
    fn on_access(&mut self, key: &K) {
        self.order.touch(key);
    }

    fn on_put(&mut self, key: K) {
        // insert() promotes keys that are already tracked
        self.order.insert(key);
    }

    fn on_remove(&mut self, key: &K) {
        self.order.remove(key);
    }

    fn evict(&mut self) -> Option<K> {
        self.order.evict()
    }

    fn contains(&self, key: &K) -> bool {
        self.order.contains(key)
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn clear(&mut self) {
        self.order.clear();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(keys: &[&str]) -> RecencyList<String> {
        let mut list = RecencyList::new();
        for key in keys {
            list.insert(key.to_string());
        }
        list
    }

    fn order(list: &RecencyList<String>) -> Vec<&str> {
        list.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_list_new() {
        let list: RecencyList<String> = RecencyList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert_eq!(list.peek_lru(), None);
        list.assert_well_formed();
    }

    #[test]
    fn test_insert_links_at_head() {
        let list = list_of(&["key1", "key2", "key3"]);

        assert_eq!(list.len(), 3);
        assert_eq!(order(&list), vec!["key3", "key2", "key1"]);
        assert_eq!(list.peek_lru(), Some(&"key1".to_string()));
        assert_eq!(list.peek_mru(), Some(&"key3".to_string()));
        list.assert_well_formed();
    }

    #[test]
    fn test_touch_moves_to_head() {
        let mut list = list_of(&["a", "b", "c"]);

        list.touch(&"a".to_string());

        assert_eq!(order(&list), vec!["a", "c", "b"]);
        assert_eq!(list.peek_lru(), Some(&"b".to_string()));
        list.assert_well_formed();
    }

    #[test]
    fn test_touch_head_is_noop() {
        let mut list = list_of(&["a", "b", "c"]);

        list.touch(&"c".to_string());
        list.touch(&"c".to_string());

        assert_eq!(order(&list), vec!["c", "b", "a"]);
        list.assert_well_formed();
    }

    #[test]
    fn test_touch_middle_node() {
        let mut list = list_of(&["a", "b", "c"]);

        list.touch(&"b".to_string());

        assert_eq!(order(&list), vec!["b", "c", "a"]);
        list.assert_well_formed();
    }

    #[test]
    fn test_touch_untracked_is_noop() {
        let mut list = list_of(&["a", "b"]);

        list.touch(&"zzz".to_string());

        assert_eq!(order(&list), vec!["b", "a"]);
        assert!(!list.contains(&"zzz".to_string()));
    }

    #[test]
    fn test_insert_existing_key_promotes_without_duplicate() {
        let mut list = list_of(&["a", "b"]);

        list.insert("a".to_string());

        assert_eq!(list.len(), 2);
        assert_eq!(order(&list), vec!["a", "b"]);
        list.assert_well_formed();
    }

    #[test]
    fn test_evict_returns_tail() {
        let mut list = list_of(&["key1", "key2", "key3"]);

        assert_eq!(list.evict(), Some("key1".to_string()));
        assert_eq!(list.len(), 2);
        assert_eq!(list.evict(), Some("key2".to_string()));
        assert_eq!(list.len(), 1);
        list.assert_well_formed();
    }

    #[test]
    fn test_evict_empty() {
        let mut list: RecencyList<String> = RecencyList::new();
        assert_eq!(list.evict(), None);
    }

    #[test]
    fn test_single_node_removal_clears_both_ends() {
        let mut list = list_of(&["only"]);

        assert!(list.remove(&"only".to_string()));

        assert!(list.is_empty());
        assert_eq!(list.peek_lru(), None);
        assert_eq!(list.peek_mru(), None);
        list.assert_well_formed();
    }

    #[test]
    fn test_single_node_evict_clears_both_ends() {
        let mut list = list_of(&["only"]);

        assert_eq!(list.evict(), Some("only".to_string()));
        assert_eq!(list.evict(), None);
        list.assert_well_formed();
    }

    #[test]
    fn test_remove_head_tail_and_middle() {
        let mut list = list_of(&["a", "b", "c", "d", "e"]);

        list.remove(&"e".to_string());
        list.assert_well_formed();
        list.remove(&"a".to_string());
        list.assert_well_formed();
        list.remove(&"c".to_string());
        list.assert_well_formed();

        assert_eq!(order(&list), vec!["d", "b"]);
    }

    #[test]
    fn test_remove_nonexistent_key() {
        let mut list = list_of(&["key1", "key2"]);

        assert!(!list.remove(&"nonexistent".to_string()));

        assert_eq!(list.len(), 2);
        assert!(list.contains(&"key1".to_string()));
        assert!(list.contains(&"key2".to_string()));
    }

    #[test]
    fn test_slots_are_reused() {
        let mut list = list_of(&["a", "b", "c"]);

        list.remove(&"b".to_string());
        list.evict();
        list.insert("d".to_string());
        list.insert("e".to_string());

        assert_eq!(list.slots.len(), 3);
        assert_eq!(order(&list), vec!["e", "d", "c"]);
        list.assert_well_formed();
    }

    #[test]
    fn test_clear() {
        let mut list = list_of(&["a", "b"]);

        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.evict(), None);
        list.insert("c".to_string());
        assert_eq!(order(&list), vec!["c"]);
        list.assert_well_formed();
    }

    #[test]
    fn test_order_after_multiple_touches() {
        let mut list = list_of(&["a", "b", "c"]);

        list.touch(&"a".to_string());
        list.touch(&"c".to_string());
        list.touch(&"b".to_string());

        // b, c, a from head to tail
        assert_eq!(list.evict(), Some("a".to_string()));
        assert_eq!(list.evict(), Some("c".to_string()));
        assert_eq!(list.evict(), Some("b".to_string()));
        assert!(list.is_empty());
    }

    #[test]
    fn test_lru_policy_callbacks() {
        let mut policy = LruPolicy::default();
        policy.on_put("a".to_string());
        policy.on_put("b".to_string());
        policy.on_put("c".to_string());

        policy.on_access(&"a".to_string());
        policy.on_remove(&"c".to_string());

        assert_eq!(policy.len(), 2);
        assert!(!policy.contains(&"c".to_string()));
        assert_eq!(policy.evict(), Some("b".to_string()));
        assert_eq!(policy.evict(), Some("a".to_string()));
        assert_eq!(policy.evict(), None);
    }
}
