/// One observation in the window together with its position inside
/// whichever heap currently holds it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub(crate) value: f64,
    pub(crate) heap_pos: usize,
}

impl Slot {
    pub(crate) fn new(value: f64) -> Self {
        Slot { value, heap_pos: 0 }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Index of this slot in the backing array of the heap that owns it.
    pub fn heap_position(&self) -> usize {
        self.heap_pos
    }
}

impl Default for Slot {
    fn default() -> Self {
        Slot::new(f64::NAN)
    }
}

/// Fixed length circular array of slots. Writing the next observation
/// reuses the slot that is exactly `capacity` observations old.
#[derive(Debug, Clone)]
pub struct SlotRing {
    slots: Vec<Slot>,
    write_cursor: usize,
}

impl SlotRing {
    /// Creates a ring with `capacity` logically empty slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "slot ring capacity must be at least 1");
        SlotRing {
            slots: vec![Slot::default(); capacity],
            write_cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slot index the next observation will be written to.
    pub fn next_write_target(&self) -> usize {
        self.write_cursor
    }

    pub fn advance(&mut self) {
        self.write_cursor = (self.write_cursor + 1) % self.slots.len();
    }

    pub fn slot(&self, index: usize) -> &Slot {
        &self.slots[index]
    }

    pub fn slot_mut(&mut self, index: usize) -> &mut Slot {
        &mut self.slots[index]
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [Slot] {
        &mut self.slots
    }
}
