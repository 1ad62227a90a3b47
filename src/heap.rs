//! Binary heap over ring slots where every slot knows its own position.
//!
//! The heap never owns values. Its backing array holds slot indices into a
//! [`SlotRing`](crate::ring::SlotRing) and every operation that moves an
//! entry writes the new position back into `Slot::heap_pos`, so
//! `slots[backing[i]].heap_pos == i` holds whenever a method returns.
//! That back-reference is what makes removal of a known slot O(log n).

use std::cmp::Ordering;
use std::marker::PhantomData;

use crate::ring::Slot;

/// Orientation of a heap.
pub trait Order {
    /// `true` when `a` has to sit closer to the root than `b`.
    fn precedes(a: f64, b: f64) -> bool;
}

/// Root is the largest value. Used for the lower half of the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxFirst;

/// Root is the smallest value. Used for the upper half of the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinFirst;

impl Order for MaxFirst {
    #[inline]
    fn precedes(a: f64, b: f64) -> bool {
        a.total_cmp(&b) == Ordering::Greater
    }
}

impl Order for MinFirst {
    #[inline]
    fn precedes(a: f64, b: f64) -> bool {
        a.total_cmp(&b) == Ordering::Less
    }
}

pub type LowHeap = IndexedHeap<MaxFirst>;
pub type HighHeap = IndexedHeap<MinFirst>;

#[derive(Debug, Clone)]
pub struct IndexedHeap<O: Order> {
    backing: Vec<usize>,
    _order: PhantomData<O>,
}

impl<O: Order> Default for IndexedHeap<O> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<O: Order> IndexedHeap<O> {
    pub fn with_capacity(capacity: usize) -> Self {
        IndexedHeap {
            backing: Vec::with_capacity(capacity),
            _order: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.backing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backing.is_empty()
    }

    /// Slot index stored at `pos` in the backing array.
    pub fn slot_at(&self, pos: usize) -> Option<usize> {
        self.backing.get(pos).copied()
    }

    pub fn root(&self) -> Option<usize> {
        self.slot_at(0)
    }

    pub fn root_value(&self, slots: &[Slot]) -> Option<f64> {
        self.root().map(|slot| slots[slot].value)
    }

    /// Adds `slot` to the heap. O(log n).
    pub fn push(&mut self, slots: &mut [Slot], slot: usize) {
        let pos = self.backing.len();
        self.backing.push(slot);
        slots[slot].heap_pos = pos;
        self.sift_up(slots, pos);
    }

    /// Removes the root and returns its slot index, `None` when empty.
    pub fn pop_root(&mut self, slots: &mut [Slot]) -> Option<usize> {
        if self.backing.is_empty() {
            return None;
        }
        self.remove_at(slots, 0)
    }

    /// Removes whatever slot sits at `pos` in the backing array.
    ///
    /// The last entry fills the hole and is sifted in whichever direction
    /// restores heap order.
    pub fn remove_at(&mut self, slots: &mut [Slot], pos: usize) -> Option<usize> {
        let last = self.backing.len().checked_sub(1)?;
        if pos > last {
            return None;
        }
        if pos != last {
            self.swap(slots, pos, last);
        }
        let removed = self.backing.pop()?;
        if pos < self.backing.len() {
            self.fix_at(slots, pos);
        }
        Some(removed)
    }

    /// Restores heap order after the value of the slot at `pos` changed in place.
    pub fn fix_at(&mut self, slots: &mut [Slot], pos: usize) {
        if self.sift_up(slots, pos) == pos {
            self.sift_down(slots, pos);
        }
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.backing.capacity()
    }

    fn value_at(&self, slots: &[Slot], pos: usize) -> f64 {
        slots[self.backing[pos]].value
    }

    fn swap(&mut self, slots: &mut [Slot], a: usize, b: usize) {
        self.backing.swap(a, b);
        slots[self.backing[a]].heap_pos = a;
        slots[self.backing[b]].heap_pos = b;
    }

    /// Returns the final position of the entry that started at `pos`.
    fn sift_up(&mut self, slots: &mut [Slot], mut pos: usize) -> usize {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !O::precedes(self.value_at(slots, pos), self.value_at(slots, parent)) {
                break;
            }
            self.swap(slots, pos, parent);
            pos = parent;
        }
        pos
    }

    fn sift_down(&mut self, slots: &mut [Slot], mut pos: usize) -> usize {
        let len = self.backing.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len
                && O::precedes(self.value_at(slots, right), self.value_at(slots, left))
            {
                right
            } else {
                left
            };
            if !O::precedes(self.value_at(slots, child), self.value_at(slots, pos)) {
                break;
            }
            self.swap(slots, pos, child);
            pos = child;
        }
        pos
    }

    /// Checks heap order and back-references, returning a description of
    /// the first violation found.
    #[cfg(test)]
    pub(crate) fn validate(&self, slots: &[Slot]) -> Result<(), String> {
        for (pos, &slot) in self.backing.iter().enumerate() {
            if slots[slot].heap_pos != pos {
                return Err(format!(
                    "slot {} sits at {} but records {}",
                    slot, pos, slots[slot].heap_pos
                ));
            }
            if pos > 0 {
                let parent = (pos - 1) / 2;
                if O::precedes(self.value_at(slots, pos), self.value_at(slots, parent)) {
                    return Err(format!("heap order broken between {} and {}", parent, pos));
                }
            }
        }
        Ok(())
    }
}
