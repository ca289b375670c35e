//! Slot allocation and the id <-> slot index.
//!
//! Slots are handed out from a monotonic counter starting at 0 and are
//! never reused: unbinding an id tombstones its slot.

use std::collections::{BTreeMap, HashMap};

use vectorlite_index::Slot;

/// Bidirectional mapping between document ids and index slots.
#[derive(Debug, Default)]
pub struct SlotIndex {
    next: Slot,
    id_to_slot: HashMap<String, Slot>,
    /// Ordered by slot so iteration follows insertion order
    slot_to_id: BTreeMap<Slot, String>,
}

impl SlotIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next slot and advance the counter.
    pub fn next_slot(&mut self) -> Slot {
        let slot = self.next;
        self.next += 1;
        slot
    }

    /// The slot the next call to `next_slot` will return.
    pub fn peek_next(&self) -> Slot {
        self.next
    }

    /// Bind a live id to a freshly allocated slot.
    pub fn bind(&mut self, id: &str, slot: Slot) {
        debug_assert!(!self.id_to_slot.contains_key(id), "id already bound");
        debug_assert!(!self.slot_to_id.contains_key(&slot), "slot already bound");
        self.id_to_slot.insert(id.to_string(), slot);
        self.slot_to_id.insert(slot, id.to_string());
    }

    /// Remove both directions for `id`, returning its slot.
    pub fn unbind(&mut self, id: &str) -> Option<Slot> {
        let slot = self.id_to_slot.remove(id)?;
        self.slot_to_id.remove(&slot);
        Some(slot)
    }

    pub fn slot_of(&self, id: &str) -> Option<Slot> {
        self.id_to_slot.get(id).copied()
    }

    pub fn id_of(&self, slot: Slot) -> Option<&str> {
        self.slot_to_id.get(&slot).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_to_slot.contains_key(id)
    }

    /// Number of live bindings
    pub fn len(&self) -> usize {
        self.id_to_slot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_slot.is_empty()
    }

    /// Live ids in slot order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.slot_to_id.values().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_slot_is_monotonic() {
        let mut slots = SlotIndex::new();
        assert_eq!(slots.next_slot(), 0);
        assert_eq!(slots.next_slot(), 1);
        assert_eq!(slots.peek_next(), 2);
    }

    #[test]
    fn test_bind_is_bidirectional() {
        let mut slots = SlotIndex::new();
        let slot = slots.next_slot();
        slots.bind("a", slot);

        assert_eq!(slots.slot_of("a"), Some(0));
        assert_eq!(slots.id_of(0), Some("a"));
        assert!(slots.contains("a"));
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn test_unbind_does_not_reclaim_slot() {
        let mut slots = SlotIndex::new();
        let a = slots.next_slot();
        slots.bind("a", a);

        assert_eq!(slots.unbind("a"), Some(a));
        assert_eq!(slots.id_of(a), None);
        assert_eq!(slots.slot_of("a"), None);
        assert!(slots.is_empty());

        let b = slots.next_slot();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unbind_unknown() {
        let mut slots = SlotIndex::new();
        assert_eq!(slots.unbind("missing"), None);
    }

    #[test]
    fn test_ids_follow_slot_order() {
        let mut slots = SlotIndex::new();
        for id in ["c", "a", "b"] {
            let slot = slots.next_slot();
            slots.bind(id, slot);
        }
        slots.unbind("a");
        let ids: Vec<&str> = slots.ids().collect();
        assert_eq!(ids, vec!["c", "b"]);
    }
}
