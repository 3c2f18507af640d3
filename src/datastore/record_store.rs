//! Ordered record store.
//!
//! A singly linked list of [`Item`]s whose nodes live in an arena owned by the
//! store. Links are slot handles rather than pointers, so a removed node can
//! never be reached again: its slot is emptied and recycled on the next insert.

use super::item::{Item, ItemId};
use std::fmt;
use tracing::{debug, trace};

type Handle = usize;

struct Node {
    data: Item,
    next: Option<Handle>,
}

#[derive(Default)]
pub struct RecordStore {
    slots: Vec<Option<Node>>,
    free: Vec<Handle>,
    head: Option<Handle>,
    tail: Option<Handle>,
    size: usize,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Adds `item` after the current tail in O(1).
    pub fn append(&mut self, item: Item) {
        let id = item.id;
        let handle = self.alloc(Node {
            data: item,
            next: None,
        });
        match self.tail {
            Some(tail) => {
                if let Some(node) = self.node_mut(tail) {
                    node.next = Some(handle);
                }
            }
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
        self.size += 1;
        debug!(id, size = self.size, "appended record");
    }

    /// Adds `item` before the current head in O(1).
    pub fn prepend(&mut self, item: Item) {
        let id = item.id;
        let handle = self.alloc(Node {
            data: item,
            next: self.head,
        });
        if self.tail.is_none() {
            self.tail = Some(handle);
        }
        self.head = Some(handle);
        self.size += 1;
        debug!(id, size = self.size, "prepended record");
    }

    /// Returns the first item in traversal order whose id matches.
    pub fn find_by_id(&self, id: ItemId) -> Option<&Item> {
        trace!(id, "record lookup");
        self.iter().find(|item| item.id == id)
    }

    pub fn find_by_id_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        let handle = self.handle_of(id)?;
        self.node_mut(handle).map(|node| &mut node.data)
    }

    /// Unlinks the first node whose item id matches and returns its item.
    ///
    /// `None` means no record carried `id`; the store is left untouched.
    pub fn delete_by_id(&mut self, id: ItemId) -> Option<Item> {
        let mut prev: Option<Handle> = None;
        let mut cursor = self.head;

        while let Some(handle) = cursor {
            let node = self.node(handle)?;
            if node.data.id == id {
                let next = node.next;
                match prev {
                    Some(p) => self.node_mut(p)?.next = next,
                    None => self.head = next,
                }
                if self.tail == Some(handle) {
                    self.tail = prev;
                }
                let removed = self.release(handle)?;
                self.size -= 1;
                debug!(id, size = self.size, "deleted record");
                return Some(removed.data);
            }
            prev = cursor;
            cursor = node.next;
        }

        trace!(id, "delete found no record");
        None
    }

    pub fn head(&self) -> Option<&Item> {
        self.head.and_then(|h| self.node(h)).map(|node| &node.data)
    }

    pub fn tail(&self) -> Option<&Item> {
        self.tail.and_then(|h| self.node(h)).map(|node| &node.data)
    }

    /// Iterates items from head to tail.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            store: self,
            cursor: self.head,
            remaining: self.size,
        }
    }

    pub fn to_vec(&self) -> Vec<Item> {
        self.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.size = 0;
    }

    fn alloc(&mut self, node: Node) -> Handle {
        match self.free.pop() {
            Some(handle) => {
                self.slots[handle] = Some(node);
                handle
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, handle: Handle) -> Option<Node> {
        let node = self.slots.get_mut(handle)?.take()?;
        self.free.push(handle);
        Some(node)
    }

    fn node(&self, handle: Handle) -> Option<&Node> {
        self.slots.get(handle)?.as_ref()
    }

    fn node_mut(&mut self, handle: Handle) -> Option<&mut Node> {
        self.slots.get_mut(handle)?.as_mut()
    }

    fn handle_of(&self, id: ItemId) -> Option<Handle> {
        let mut cursor = self.head;
        while let Some(handle) = cursor {
            let node = self.node(handle)?;
            if node.data.id == id {
                return Some(handle);
            }
            cursor = node.next;
        }
        None
    }
}

pub struct Iter<'a> {
    store: &'a RecordStore,
    cursor: Option<Handle>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.store.node(self.cursor?)?;
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&node.data)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Item;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl fmt::Display for RecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Record Store (Size: {}) ===", self.size)?;
        for (index, item) in self.iter().enumerate() {
            writeln!(f, "[{index}] {item}")?;
        }
        write!(f, "===========================")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::item::ItemType;

    fn item(id: ItemId) -> Item {
        Item::builder(id, format!("item-{id}"), ItemType::Lost)
            .build()
            .unwrap()
    }

    fn ids(store: &RecordStore) -> Vec<ItemId> {
        store.iter().map(|item| item.id).collect()
    }

    /// Walks the raw links and checks them against the bookkeeping fields.
    fn assert_linked(store: &RecordStore) {
        let mut seen = 0;
        let mut last = None;
        let mut cursor = store.head;
        while let Some(handle) = cursor {
            seen += 1;
            assert!(seen <= store.slots.len(), "cycle in record links");
            last = Some(handle);
            cursor = store.node(handle).unwrap().next;
        }
        assert_eq!(seen, store.size);
        assert_eq!(last, store.tail);
        assert_eq!(store.head.is_none(), store.size == 0);
        assert_eq!(store.tail.is_none(), store.size == 0);
        if let Some(tail) = store.tail {
            assert!(store.node(tail).unwrap().next.is_none());
        }
    }

    #[test]
    fn delete_head_of_two_leaves_single_node() {
        let mut store = RecordStore::new();
        store.append(item(1));
        store.append(item(2));

        assert_eq!(store.delete_by_id(1).map(|i| i.id), Some(1));
        assert_eq!(store.len(), 1);
        assert_eq!(store.head().map(|i| i.id), Some(2));
        assert_eq!(store.head, store.tail);
        assert_linked(&store);
    }

    #[test]
    fn append_and_prepend_order() {
        let mut store = RecordStore::new();
        store.prepend(item(2));
        store.append(item(3));
        store.prepend(item(1));
        store.append(item(4));

        assert_eq!(ids(&store), vec![1, 2, 3, 4]);
        assert_eq!(store.tail().map(|i| i.id), Some(4));
        assert_linked(&store);
    }

    #[test]
    fn delete_tail_and_middle_relinks() {
        let mut store = RecordStore::new();
        for id in 1..=4 {
            store.append(item(id));
        }

        assert!(store.delete_by_id(4).is_some());
        assert_eq!(store.tail().map(|i| i.id), Some(3));
        assert_linked(&store);

        assert!(store.delete_by_id(2).is_some());
        assert_eq!(ids(&store), vec![1, 3]);
        assert_linked(&store);

        store.append(item(5));
        assert_eq!(ids(&store), vec![1, 3, 5]);
        assert_linked(&store);
    }

    #[test]
    fn delete_missing_is_noop() {
        let mut store = RecordStore::new();
        assert!(store.delete_by_id(9).is_none());

        store.append(item(1));
        assert!(store.delete_by_id(9).is_none());
        assert_eq!(store.len(), 1);
        assert_linked(&store);
    }

    #[test]
    fn duplicate_ids_resolve_to_first() {
        let mut store = RecordStore::new();
        store.append(item(7));
        let mut second = item(7);
        second.name = "second".to_string();
        store.append(second);

        assert_eq!(store.find_by_id(7).unwrap().name, "item-7");
        store.delete_by_id(7);
        assert_eq!(store.find_by_id(7).unwrap().name, "second");
        assert_linked(&store);
    }

    #[test]
    fn emptied_store_accepts_new_records() {
        let mut store = RecordStore::new();
        store.append(item(1));
        store.delete_by_id(1);
        assert!(store.is_empty());
        assert!(store.head().is_none());
        assert_linked(&store);

        store.prepend(item(2));
        assert_eq!(store.head().map(|i| i.id), Some(2));
        assert_eq!(store.tail().map(|i| i.id), Some(2));
        // slot of the deleted record is reused
        assert_eq!(store.slots.len(), 1);
        assert_linked(&store);
    }

    #[test]
    fn find_by_id_mut_edits_in_place() {
        let mut store = RecordStore::new();
        store.append(item(1));
        store.find_by_id_mut(1).unwrap().location = "Gym".to_string();
        assert_eq!(store.find_by_id(1).unwrap().location, "Gym");
        assert!(store.find_by_id_mut(2).is_none());
    }

    #[test]
    fn iter_reports_exact_length() {
        let mut store = RecordStore::new();
        for id in 1..=3 {
            store.append(item(id));
        }
        let mut iter = store.iter();
        assert_eq!(iter.len(), 3);
        iter.next();
        assert_eq!(iter.size_hint(), (2, Some(2)));

        let dump = format!("{store:?}");
        assert!(dump.starts_with("[Item { id: 1"));
        assert_eq!(dump.matches("Item {").count(), 3);
    }

    #[test]
    fn display_and_clear() {
        let mut store = RecordStore::new();
        store.append(item(1));
        let dump = store.to_string();
        assert!(dump.contains("(Size: 1)"));
        assert!(dump.contains("[0] item-1 (ID:1, Type:lost)"));

        store.clear();
        assert!(store.is_empty());
        assert!(store.to_vec().is_empty());
        assert_linked(&store);
    }
}
