use std::cmp::Ordering;

use log::{debug, error, trace};

use crate::error::Error;
use crate::heap::{HighHeap, LowHeap};
use crate::ring::SlotRing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Low,
    High,
}

/// A median filter over the last `window_size` observations.
///
/// The window lives in a ring of slots. Its lower half is kept in a max
/// heap and its upper half in a min heap, both holding slot indices, so a
/// push costs O(log W) and the median is read from the two roots in O(1).
/// When the halves differ in size the lower half holds the extra element.
#[derive(Debug, Clone)]
pub struct MedianFilter {
    ring: SlotRing,
    filled: usize,
    low: LowHeap,
    high: HighHeap,
}

impl MedianFilter {
    /// Creates a new MedianFilter with the given window capacity.
    ///
    /// A window of zero observations is rejected.
    pub fn new(window_size: usize) -> Result<Self, Error> {
        if window_size == 0 {
            return Err(Error::ZeroWindowSize);
        }
        debug!("median filter created with window size {}", window_size);
        Ok(Self {
            ring: SlotRing::new(window_size),
            filled: 0,
            low: LowHeap::with_capacity(window_size),
            high: HighHeap::with_capacity(window_size),
        })
    }

    pub fn window_size(&self) -> usize {
        self.ring.capacity()
    }

    /// Number of observations currently inside the window.
    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    pub fn is_full(&self) -> bool {
        self.filled == self.ring.capacity()
    }

    /// Adds an observation, evicting the oldest one once the window is full.
    pub fn push(&mut self, value: f64) {
        let slot = self.ring.next_write_target();
        if self.is_full() {
            self.replace(slot, value);
        } else {
            self.admit(slot, value);
            self.filled += 1;
        }
        self.ring.advance();
    }

    /// Consumes a new value and returns the median of the updated window.
    pub fn consume(&mut self, value: f64) -> f64 {
        self.push(value);
        self.median()
    }

    /// Median of the current window, NaN while no value has been pushed.
    pub fn median(&self) -> f64 {
        let slots = self.ring.slots();
        match (self.low.root_value(slots), self.high.root_value(slots)) {
            (None, _) => f64::NAN,
            (Some(low), _) if self.low.len() > self.high.len() => low,
            (Some(low), Some(high)) => (low + high) / 2.0,
            (Some(low), None) => low,
        }
    }

    fn admit(&mut self, slot: usize, value: f64) {
        self.ring.slot_mut(slot).value = value;
        let slots = self.ring.slots_mut();

        let to_low = self.low.root_value(slots).map_or(true, |root| at_most(value, root));
        if to_low {
            self.low.push(slots, slot);
        } else {
            self.high.push(slots, slot);
        }

        if self.low.len() > self.high.len() + 1 {
            let moved = self
                .low
                .pop_root(slots)
                .unwrap_or_else(|| invariant_violated("low heap is empty"));
            self.high.push(slots, moved);
        } else if self.high.len() > self.low.len() {
            let moved = self
                .high
                .pop_root(slots)
                .unwrap_or_else(|| invariant_violated("high heap is empty"));
            self.low.push(slots, moved);
        }
    }

    fn replace(&mut self, slot: usize, value: f64) {
        let side = self.owner(slot);
        let slots = self.ring.slots_mut();
        let pos = slots[slot].heap_pos;

        // A value equal to the opposite root stays where it is.
        let stays = match side {
            Side::Low => self.high.root_value(slots).map_or(true, |root| at_most(value, root)),
            Side::High => self.low.root_value(slots).map_or(true, |root| at_most(root, value)),
        };

        if stays {
            slots[slot].value = value;
            match side {
                Side::Low => self.low.fix_at(slots, pos),
                Side::High => self.high.fix_at(slots, pos),
            }
            return;
        }

        trace!("value {} crosses the median boundary", value);
        // The evicted slot leaves one heap and the new value enters the
        // other, then the receiving heap hands its root back so both keep
        // their sizes.
        match side {
            Side::Low => {
                if self.low.remove_at(slots, pos) != Some(slot) {
                    invariant_violated(&format!("slot {} not at low position {}", slot, pos));
                }
                slots[slot].value = value;
                self.high.push(slots, slot);
                let moved = self
                    .high
                    .pop_root(slots)
                    .unwrap_or_else(|| invariant_violated("high heap is empty"));
                self.low.push(slots, moved);
            }
            Side::High => {
                if self.high.remove_at(slots, pos) != Some(slot) {
                    invariant_violated(&format!("slot {} not at high position {}", slot, pos));
                }
                slots[slot].value = value;
                self.low.push(slots, slot);
                let moved = self
                    .low
                    .pop_root(slots)
                    .unwrap_or_else(|| invariant_violated("low heap is empty"));
                self.high.push(slots, moved);
            }
        }
    }

    /// Finds the heap holding `slot` by identity, not by value.
    fn owner(&self, slot: usize) -> Side {
        let pos = self.ring.slot(slot).heap_pos;
        if self.low.slot_at(pos) == Some(slot) {
            Side::Low
        } else if self.high.slot_at(pos) == Some(slot) {
            Side::High
        } else {
            invariant_violated(&format!("slot {} is in neither heap (position {})", slot, pos))
        }
    }

    #[cfg(test)]
    fn check_invariants(&self) {
        let slots = self.ring.slots();
        self.low.validate(slots).unwrap();
        self.high.validate(slots).unwrap();
        assert_eq!(self.low.len() + self.high.len(), self.filled);
        assert!(self.low.len() == self.high.len() || self.low.len() == self.high.len() + 1);
        for slot in 0..self.filled {
            let pos = slots[slot].heap_pos;
            let in_low = self.low.slot_at(pos) == Some(slot);
            let in_high = self.high.slot_at(pos) == Some(slot);
            assert!(
                in_low != in_high,
                "slot {} owned by {} heaps",
                slot,
                in_low as u8 + in_high as u8
            );
        }
        let roots = (self.low.root_value(slots), self.high.root_value(slots));
        if let (Some(low), Some(high)) = roots {
            assert!(at_most(low, high), "low root {} above high root {}", low, high);
        }
    }
}

impl Extend<f64> for MedianFilter {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

/// `a <= b` under the same total order the heaps use.
fn at_most(a: f64, b: f64) -> bool {
    a.total_cmp(&b) != Ordering::Greater
}

#[cold]
fn invariant_violated(what: &str) -> ! {
    error!("median filter invariant violated: {}", what);
    panic!("median filter invariant violated: {}", what);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn sorted_median(window: &[f64]) -> f64 {
        let mut sorted = window.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let n = sorted.len();
        if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        }
    }

    #[test]
    fn test_median_increasing_sequence() {
        let mut mf = MedianFilter::new(5).unwrap();

        assert_eq!(mf.consume(1.0), 1.0); // Window: [1]
        assert_eq!(mf.consume(2.0), 1.5); // Window: [1,2]
        assert_eq!(mf.consume(3.0), 2.0); // Window: [1,2,3]
        assert_eq!(mf.consume(4.0), 2.5); // Window: [1,2,3,4]
        assert_eq!(mf.consume(5.0), 3.0); // Window: [1,2,3,4,5]

        // 1.0 drops out, window becomes [2,3,4,5,6].
        assert_eq!(mf.consume(6.0), 4.0);
    }

    #[test]
    fn test_median_random_sequence() {
        let mut mf = MedianFilter::new(3).unwrap();

        assert_eq!(mf.consume(10.0), 10.0); // Window: [10]
        assert_eq!(mf.consume(1.0), 5.5); // Window: [10,1]
        assert_eq!(mf.consume(5.0), 5.0); // Window: [10,1,5]

        // 10.0 drops out, window becomes [1,5,3].
        assert_eq!(mf.consume(3.0), 3.0);
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(matches!(MedianFilter::new(0), Err(Error::ZeroWindowSize)));
    }

    #[test]
    fn test_empty_median_is_nan() {
        let mf = MedianFilter::new(4).unwrap();
        assert!(mf.median().is_nan());
        assert!(mf.is_empty());
        assert!(!mf.is_full());
    }

    #[test]
    fn test_len_and_full() {
        let mut mf = MedianFilter::new(3).unwrap();
        for (i, v) in [4.0, 2.0, 8.0, 6.0, 1.0].into_iter().enumerate() {
            mf.push(v);
            assert_eq!(mf.len(), (i + 1).min(3));
            assert_eq!(mf.is_full(), i >= 2);
        }
        assert_eq!(mf.window_size(), 3);
    }

    #[test]
    fn test_median_read_is_idempotent() {
        let mut mf = MedianFilter::new(4).unwrap();
        mf.extend([3.0, 9.0, 1.0, 7.0, 5.0]);
        let first = mf.median();
        assert_eq!(mf.median(), first);
        assert_eq!(first, 6.0);
    }

    #[test]
    fn test_window_of_one_tracks_last_value() {
        let mut mf = MedianFilter::new(1).unwrap();
        for v in [3.0, -2.0, 7.5, 7.5, 0.0] {
            assert_eq!(mf.consume(v), v);
            mf.check_invariants();
        }
    }

    #[test]
    fn test_invariants_hold_on_random_input() {
        let mut rng = StdRng::seed_from_u64(7);
        for window_size in [1, 2, 3, 4, 5, 8, 13, 32] {
            let mut mf = MedianFilter::new(window_size).unwrap();
            let mut history = Vec::new();
            for _ in 0..500 {
                let v = rng.gen_range(0..6) as f64;
                history.push(v);
                mf.push(v);
                mf.check_invariants();

                let start = history.len().saturating_sub(window_size);
                assert_eq!(mf.median(), sorted_median(&history[start..]));
            }
        }
    }

    #[test]
    fn test_boundary_ties_do_not_move_slots() {
        // Every value equals both roots once the window is full.
        let mut mf = MedianFilter::new(4).unwrap();
        mf.extend([5.0, 5.0, 5.0, 5.0]);
        let low_before: Vec<_> = (0..mf.low.len()).map(|p| mf.low.slot_at(p)).collect();
        let high_before: Vec<_> = (0..mf.high.len()).map(|p| mf.high.slot_at(p)).collect();

        for _ in 0..8 {
            mf.push(5.0);
            mf.check_invariants();
        }
        let low_after: Vec<_> = (0..mf.low.len()).map(|p| mf.low.slot_at(p)).collect();
        let high_after: Vec<_> = (0..mf.high.len()).map(|p| mf.high.slot_at(p)).collect();
        assert_eq!(low_before, low_after);
        assert_eq!(high_before, high_after);
        assert_eq!(mf.median(), 5.0);
    }

    #[test]
    #[should_panic(expected = "invariant violated")]
    fn test_lost_back_reference_is_fatal() {
        let mut mf = MedianFilter::new(3).unwrap();
        mf.extend([1.0, 2.0, 3.0]);
        // The next push evicts slot 0, which now points nowhere.
        mf.ring.slot_mut(0).heap_pos = 99;
        mf.push(4.0);
    }

    #[test]
    fn test_storage_never_grows() {
        let mut rng = StdRng::seed_from_u64(11);
        for window_size in 1..=40 {
            let mut mf = MedianFilter::new(window_size).unwrap();
            let low_capacity = mf.low.capacity();
            let high_capacity = mf.high.capacity();
            assert!(low_capacity >= window_size && high_capacity >= window_size);

            let mut history = Vec::new();
            for i in 0..3000 {
                let v = match i % 3 {
                    0 => rng.gen_range(0..4) as f64,
                    1 => rng.gen_range(-1.0e6..1.0e6),
                    _ => history.last().copied().unwrap_or(0.0),
                };
                history.push(v);
                mf.push(v);

                let start = history.len().saturating_sub(window_size);
                assert_eq!(mf.median(), sorted_median(&history[start..]));
            }
            mf.check_invariants();
            assert_eq!(mf.low.capacity(), low_capacity);
            assert_eq!(mf.high.capacity(), high_capacity);
            assert_eq!(mf.ring.capacity(), window_size);
        }
    }
}
