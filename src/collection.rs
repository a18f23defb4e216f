//! Ordered Collections
//!
//! The siblings sharing one parent, sorted by order key. Collections are
//! immutable values: every change produces a new collection so a cached
//! copy can be swapped in whole.

use order_key::{is_strictly_ordered, key_beside, mid_key, spread_keys, Placement};
use thiserror::Error;

use crate::models::Positioned;

/// Key computation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    /// The drop target is not in this collection
    #[error("Anchor {0} not found in collection")]
    UnknownAnchor(u32),

    /// The keys around the drop point are not strictly ordered
    #[error("Unordered neighbor keys under parent {0}")]
    UnorderedNeighbors(u32),

    #[error("Index {index} out of bounds for {len} items")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Siblings under one parent, ascending by `(order_key, id)`
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedCollection<T> {
    parent_id: u32,
    items: Vec<T>,
}

fn sort_items<T: Positioned>(items: &mut [T]) {
    items.sort_by(|a, b| a.order_key().cmp(b.order_key()).then(a.id().cmp(&b.id())));
}

impl<T: Positioned> OrderedCollection<T> {
    pub fn new(parent_id: u32, mut items: Vec<T>) -> Self {
        sort_items(&mut items);
        Self { parent_id, items }
    }

    pub fn empty(parent_id: u32) -> Self {
        Self { parent_id, items: Vec::new() }
    }

    pub fn parent_id(&self) -> u32 {
        self.parent_id
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self, id: u32) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn ids(&self) -> Vec<u32> {
        self.items.iter().map(|item| item.id()).collect()
    }

    /// Key strictly between two neighbors; `None` is an open end
    pub fn key_between(before: Option<&T>, after: Option<&T>) -> String {
        mid_key(
            before.map(|item| item.order_key()).unwrap_or(""),
            after.map(|item| item.order_key()).unwrap_or(""),
        )
    }

    /// Key for a new item inserted at `index` (`len()` appends)
    pub fn key_for_index(&self, index: usize) -> Result<String, CollectionError> {
        if index > self.items.len() {
            return Err(CollectionError::IndexOutOfBounds { index, len: self.items.len() });
        }
        let before = index.checked_sub(1).and_then(|i| self.items.get(i));
        let after = self.items.get(index);
        let prev = before.map(|item| item.order_key()).unwrap_or("");
        let next = after.map(|item| item.order_key()).unwrap_or("");
        if !is_strictly_ordered(prev, next) {
            return Err(CollectionError::UnorderedNeighbors(self.parent_id));
        }
        Ok(Self::key_between(before, after))
    }

    /// Key for a new item at the end
    pub fn append_key(&self) -> String {
        Self::key_between(self.items.last(), None)
    }

    /// Key for `item` dropped onto `anchor` in this collection.
    ///
    /// Moving down within this collection lands after the anchor; moving up
    /// or arriving from elsewhere lands before it. No anchor drops at the
    /// tail. Only the moved item gets a new key.
    pub fn move_item(&self, item: &T, anchor: Option<u32>) -> Result<String, CollectionError> {
        let others: Vec<&str> = self
            .items
            .iter()
            .filter(|other| other.id() != item.id())
            .map(|other| other.order_key())
            .collect();

        let Some(anchor_id) = anchor else {
            return Ok(mid_key(others.last().copied().unwrap_or(""), ""));
        };
        if anchor_id == item.id() {
            return Ok(item.order_key().to_string());
        }

        let anchor_full = self
            .position(anchor_id)
            .ok_or(CollectionError::UnknownAnchor(anchor_id))?;
        let source = self.position(item.id());
        let placement = Placement::from_drag(source, anchor_full);
        let anchor_index = match source {
            Some(source) if source < anchor_full => anchor_full - 1,
            _ => anchor_full,
        };

        key_beside(&others, anchor_index, placement)
            .ok_or(CollectionError::UnorderedNeighbors(self.parent_id))
    }

    /// Whether any key has grown past `max_key_len`
    pub fn needs_rebalance(&self, max_key_len: usize) -> bool {
        self.items.iter().any(|item| item.order_key().len() > max_key_len)
    }

    /// Same order, keys rewritten to an even spread
    pub fn rebalanced(&self) -> Self {
        let items = self
            .items
            .iter()
            .zip(spread_keys(self.items.len()))
            .map(|(item, key)| {
                let mut item = item.clone();
                item.set_placement(self.parent_id, key);
                item
            })
            .collect();
        Self { parent_id: self.parent_id, items }
    }

    /// Copy with `item` inserted (replacing any entry with the same id)
    pub fn with_item(&self, item: T) -> Self {
        let mut items: Vec<T> = self
            .items
            .iter()
            .filter(|other| other.id() != item.id())
            .cloned()
            .collect();
        items.push(item);
        sort_items(&mut items);
        Self { parent_id: self.parent_id, items }
    }

    /// Copy with the item `id` removed
    pub fn without(&self, id: u32) -> Self {
        let items = self.items.iter().filter(|item| item.id() != id).cloned().collect();
        Self { parent_id: self.parent_id, items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Note;
    use proptest::prelude::*;

    fn note(id: u32, key: &str) -> Note {
        Note { id, list_id: 1, content: format!("note {}", id), order_key: key.to_string() }
    }

    fn collection(keys: &[&str]) -> OrderedCollection<Note> {
        let items = keys.iter().enumerate().map(|(i, key)| note(i as u32 + 1, key)).collect();
        OrderedCollection::new(1, items)
    }

    #[test]
    fn test_new_sorts_by_key_then_id() {
        let items = vec![note(3, "t"), note(2, "g"), note(1, "t")];
        let coll = OrderedCollection::new(1, items);
        assert_eq!(coll.ids(), vec![2, 1, 3]);
    }

    #[test]
    fn test_insert_between() {
        let coll = collection(&["g", "t"]);
        let key = OrderedCollection::key_between(coll.items().first(), coll.items().get(1));
        assert!("g" < key.as_str() && key.as_str() < "t");

        let inserted = coll.with_item(note(9, &key));
        assert_eq!(inserted.ids(), vec![1, 9, 2]);
    }

    #[test]
    fn test_key_for_index() {
        let coll = collection(&["g", "n", "t"]);
        assert_eq!(coll.key_for_index(0).unwrap(), "d");
        assert_eq!(coll.key_for_index(3).unwrap(), "x");
        assert_eq!(coll.append_key(), "x");
        assert_eq!(
            coll.key_for_index(4),
            Err(CollectionError::IndexOutOfBounds { index: 4, len: 3 })
        );
        assert_eq!(OrderedCollection::<Note>::empty(1).append_key(), "n");
    }

    #[test]
    fn test_move_down_lands_after_anchor() {
        let coll = collection(&["g", "n", "t"]);
        let first = coll.items()[0].clone();
        // g dropped on n: between n and t
        assert_eq!(coll.move_item(&first, Some(2)).unwrap(), "q");
    }

    #[test]
    fn test_move_up_lands_before_anchor() {
        let coll = collection(&["g", "n", "t"]);
        let last = coll.items()[2].clone();
        // t dropped on n: between g and n
        assert_eq!(coll.move_item(&last, Some(2)).unwrap(), "k");
    }

    #[test]
    fn test_arrival_lands_before_anchor() {
        let coll = collection(&["g", "n", "t"]);
        let stranger = Note { id: 42, list_id: 7, content: String::new(), order_key: "a".into() };
        assert_eq!(coll.move_item(&stranger, Some(1)).unwrap(), "d");
        assert_eq!(coll.move_item(&stranger, None).unwrap(), "x");
    }

    #[test]
    fn test_move_to_tail_excludes_self() {
        let coll = collection(&["g", "n", "t"]);
        let last = coll.items()[2].clone();
        // Only g and n remain as neighbors
        assert_eq!(coll.move_item(&last, None).unwrap(), "u");
    }

    #[test]
    fn test_move_onto_self_keeps_key() {
        let coll = collection(&["g", "n"]);
        let item = coll.items()[1].clone();
        assert_eq!(coll.move_item(&item, Some(item.id)).unwrap(), "n");
    }

    #[test]
    fn test_move_errors() {
        let coll = collection(&["g", "n"]);
        let item = coll.items()[0].clone();
        assert_eq!(coll.move_item(&item, Some(77)), Err(CollectionError::UnknownAnchor(77)));

        let dupes = collection(&["g", "g", "n"]);
        let stranger = note(42, "z");
        assert_eq!(
            dupes.move_item(&stranger, Some(2)),
            Err(CollectionError::UnorderedNeighbors(1))
        );
    }

    #[test]
    fn test_other_keys_untouched() {
        let coll = collection(&["g", "n", "t"]);
        let mut moved = coll.items()[0].clone();
        let key = coll.move_item(&moved, Some(3)).unwrap();
        moved.order_key = key;
        let next = coll.with_item(moved);
        assert_eq!(next.ids(), vec![2, 3, 1]);
        assert_eq!(next.get(2).unwrap().order_key, "n");
        assert_eq!(next.get(3).unwrap().order_key, "t");
    }

    #[test]
    fn test_rebalance() {
        let coll = collection(&["b", "bn", "bnn", "bnnn", "c"]);
        assert!(coll.needs_rebalance(3));
        assert!(!coll.needs_rebalance(4));

        let balanced = coll.rebalanced();
        assert_eq!(balanced.ids(), coll.ids());
        let keys: Vec<&str> = balanced.items().iter().map(|n| n.order_key.as_str()).collect();
        assert_eq!(keys, vec!["e", "j", "n", "r", "w"]);
    }

    #[test]
    fn test_without() {
        let coll = collection(&["g", "n", "t"]);
        assert_eq!(coll.without(2).ids(), vec![1, 3]);
        assert_eq!(coll.without(99), coll);
    }

    proptest! {
        #[test]
        fn prop_move_lands_beside_anchor(count in 1usize..60, from in 0usize..60, to in 0usize..60) {
            let items = spread_keys(count)
                .iter()
                .enumerate()
                .map(|(i, key)| note(i as u32 + 1, key))
                .collect();
            let coll = OrderedCollection::new(1, items);
            let (from, to) = (from % count, to % count);
            prop_assume!(from != to);

            let item = coll.items()[from].clone();
            let anchor = coll.items()[to].id;
            let mut moved = item.clone();
            moved.order_key = coll.move_item(&item, Some(anchor)).unwrap();
            let next = coll.with_item(moved);

            prop_assert!(next.items().windows(2).all(|w| w[0].order_key < w[1].order_key));
            let pos = next.position(item.id).unwrap();
            let anchor_pos = next.position(anchor).unwrap();
            if from < to {
                prop_assert_eq!(pos, anchor_pos + 1);
            } else {
                prop_assert_eq!(pos + 1, anchor_pos);
            }
        }
    }
}
