//! Brute force reference for the moving median tests.
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ringbuf::traits::{Consumer, RingBuffer};
use ringbuf::HeapRb;

pub const SEED: u64 = 99;

/// Exact percentile of `data` by partial selection. Reorders `data`.
///
/// Returns NaN for an empty slice or a percentage outside `0..=100`.
/// With `interpolate` the result is blended between the two order
/// statistics around the requested rank.
pub fn exact_percentile(data: &mut [f64], percent: f64, interpolate: bool) -> f64 {
    if data.is_empty() || !(0.0..=100.0).contains(&percent) {
        return f64::NAN;
    }
    if data.len() == 1 {
        return data[0];
    }

    let k = (data.len() - 1) as f64 * percent / 100.0;
    let length = k.ceil() as usize + 1;
    let (below, top, _) = data.select_nth_unstable_by(length - 1, |a, b| a.total_cmp(b));
    let top = *top;
    let remainder = k - k.floor();
    if remainder == 0.0 || !interpolate {
        return top;
    }
    let second = below
        .iter()
        .copied()
        .max_by(|a, b| a.total_cmp(b))
        .unwrap_or(f64::NEG_INFINITY);
    top * remainder + second * (1.0 - remainder)
}

/// Keeps the last `window_size` values and recomputes the median from scratch.
pub struct WindowOracle {
    window: HeapRb<f64>,
}

impl WindowOracle {
    pub fn new(window_size: usize) -> Self {
        WindowOracle {
            window: HeapRb::new(window_size),
        }
    }

    pub fn push(&mut self, value: f64) {
        self.window.push_overwrite(value);
    }

    pub fn median(&self) -> f64 {
        let mut values: Vec<f64> = self.window.iter().copied().collect();
        exact_percentile(&mut values, 50.0, true)
    }

    pub fn values(&self) -> Vec<f64> {
        self.window.iter().copied().collect()
    }
}

/// Uniform values in `[0, 1)`.
pub fn random_data(len: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(SEED);
    (0..len).map(|_| rng.gen::<f64>()).collect()
}

/// Whole numbers `0..10`, so the window is full of duplicates.
pub fn random_digits(len: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(SEED);
    (0..len).map(|_| (10.0 * rng.gen::<f64>()).floor()).collect()
}

pub fn same(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}
