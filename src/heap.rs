//! Bounded max-heap with at most one entry per group.
//!
//! The root holds the worst retained candidate (the largest distance),
//! so that it can be evicted in O(log K) when a better candidate shows
//! up. Each group with a live entry is mapped to the heap slot holding
//! it, and the mapping is updated on every move within the heap.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

use crate::base::{DocId, Distance, Len};

/// An entry of the heap
#[derive(Clone, Debug, PartialEq)]
pub struct HeapEntry<G> {
    pub score: Distance,
    pub id: DocId,
    pub group: Option<G>,
}

pub struct GroupedMaxHeap<G = DocId> {
    capacity: usize,
    entries: Vec<HeapEntry<G>>,
    /// Slot of the entry representing each group
    group_slots: HashMap<G, usize>,
}

impl<G: Hash + Eq + Clone> GroupedMaxHeap<G> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
            group_slots: HashMap::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// The root entry (largest score)
    #[inline]
    pub fn top(&self) -> Option<&HeapEntry<G>> {
        self.entries.first()
    }

    /// Entries in heap order
    pub fn entries(&self) -> &[HeapEntry<G>] {
        &self.entries
    }

    pub fn contains_group(&self, group: &G) -> bool {
        self.group_slots.contains_key(group)
    }

    /// Slot of the entry representing the group
    pub fn group_slot(&self, group: &G) -> Option<usize> {
        self.group_slots.get(group).copied()
    }

    /// Document currently representing the group
    pub fn group_id(&self, group: &G) -> Option<DocId> {
        self.group_slots.get(group).map(|&slot| self.entries[slot].id)
    }

    /// Score of the document currently representing the group
    pub fn group_score(&self, group: &G) -> Option<Distance> {
        self.group_slots
            .get(group)
            .map(|&slot| self.entries[slot].score)
    }

    /// Adds an entry; the heap must not be full
    pub fn push(&mut self, score: Distance, id: DocId, group: Option<G>) {
        assert!(
            !self.is_full(),
            "push on a full heap (capacity {})",
            self.capacity
        );

        if let Some(group) = &group {
            self.check_unclaimed(group, None);
        }

        let slot = self.entries.len();
        if let Some(group) = &group {
            self.group_slots.insert(group.clone(), slot);
        }
        self.entries.push(HeapEntry { score, id, group });
        self.sift_up(slot);
    }

    /// Replaces the root by a new entry; the heap must be full
    ///
    /// The group of the evicted entry (if any) loses its representative.
    pub fn replace_top(&mut self, score: Distance, id: DocId, group: Option<G>) {
        assert!(
            !self.entries.is_empty() && self.is_full(),
            "replace_top on a heap that is not full ({}/{})",
            self.entries.len(),
            self.capacity
        );

        if let Some(group) = &group {
            self.check_unclaimed(group, self.entries[0].group.as_ref());
        }

        if let Some(evicted) = &self.entries[0].group {
            self.group_slots.remove(evicted);
        }
        if let Some(group) = &group {
            self.group_slots.insert(group.clone(), 0);
        }
        self.entries[0] = HeapEntry { score, id, group };
        self.sift_down(0);
    }

    /// Replaces the entry of a group which has a live representative
    pub fn update(&mut self, score: Distance, id: DocId, group: G) {
        let slot = match self.group_slots.get(&group) {
            Some(&slot) => slot,
            None => panic!("update for a group without representative in the heap"),
        };

        let entry = &mut self.entries[slot];
        entry.score = score;
        entry.id = id;

        // The heap was valid before, so only one direction can apply
        if slot > 0 && self.entries[(slot - 1) / 2].score.total_cmp(&score) == Ordering::Less {
            self.sift_up(slot);
        } else {
            self.sift_down(slot);
        }
    }

    /// Removes and returns the root entry; the heap must not be empty
    pub fn pop(&mut self) -> HeapEntry<G> {
        assert!(!self.entries.is_empty(), "pop on an empty heap");

        let top = self.entries.swap_remove(0);
        if let Some(group) = &top.group {
            self.group_slots.remove(group);
        }
        if !self.entries.is_empty() {
            self.track(0);
            self.sift_down(0);
        }
        top
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.group_slots.clear();
    }

    /// Drains the heap, returning the entries by increasing score
    pub fn into_sorted_vec(mut self) -> Vec<HeapEntry<G>> {
        let mut sorted = Vec::with_capacity(self.entries.len());
        while !self.entries.is_empty() {
            sorted.push(self.pop());
        }
        sorted.reverse();
        sorted
    }

    /// Fails if the group has a live entry (other than `evicted`)
    fn check_unclaimed(&self, group: &G, evicted: Option<&G>) {
        assert!(
            evicted == Some(group) || !self.group_slots.contains_key(group),
            "group already has a representative in the heap (use update)"
        );
    }

    /// Orders scores with `total_cmp` (NaN above every other score)
    #[inline]
    fn compare(&self, a: usize, b: usize) -> Ordering {
        self.entries[a].score.total_cmp(&self.entries[b].score)
    }

    /// Records the slot of the group of the entry at `slot`
    #[inline]
    fn track(&mut self, slot: usize) {
        if let Some(group) = &self.entries[slot].group {
            if let Some(group_slot) = self.group_slots.get_mut(group) {
                *group_slot = slot;
            }
        }
    }

    #[inline]
    fn swap(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        self.track(a);
        self.track(b);
    }

    /// Moves the entry at `slot` toward the root, returning its final slot
    fn sift_up(&mut self, mut slot: usize) -> usize {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.compare(parent, slot) != Ordering::Less {
                break;
            }
            self.swap(parent, slot);
            slot = parent;
        }
        slot
    }

    /// Moves the entry at `slot` toward the leaves, returning its final slot
    fn sift_down(&mut self, mut slot: usize) -> usize {
        let len = self.entries.len();
        loop {
            let left = 2 * slot + 1;
            if left >= len {
                break;
            }

            let right = left + 1;
            let child = if right < len && self.compare(right, left) == Ordering::Greater {
                right
            } else {
                left
            };

            if self.compare(child, slot) != Ordering::Greater {
                break;
            }
            self.swap(slot, child);
            slot = child;
        }
        slot
    }
}

impl<G> Len for GroupedMaxHeap<G> {
    fn len(&self) -> usize {
        self.entries.len()
    }
}
