//! Fixed-size moving average over the last few consumption samples.
//!
//! Same ring-buffer layout as a running sensor average: a write index that
//! wraps modulo the capacity and a fill count that saturates at it.

/// Number of samples averaged by the meter.
pub const SMOOTHING_WINDOW: usize = 5;

#[derive(Debug, Clone)]
pub struct SmoothingFilter<const N: usize = SMOOTHING_WINDOW> {
    ring: [f64; N],
    head: usize,
    count: usize,
}

impl<const N: usize> SmoothingFilter<N> {
    pub const fn new() -> Self {
        Self {
            ring: [0.0; N],
            head: 0,
            count: 0,
        }
    }

    /// Insert a sample and return the mean of the filled entries.
    pub fn apply(&mut self, value: f64) -> f64 {
        self.ring[self.head] = value;
        self.head = (self.head + 1) % N;
        if self.count < N {
            self.count += 1;
        }
        self.average()
    }

    /// Forget all samples.  Required whenever the unit mode changes.
    pub fn reset(&mut self) {
        self.head = 0;
        self.count = 0;
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let sum: f64 = self.ring[..self.count].iter().sum();
        sum / self.count as f64
    }
}

impl<const N: usize> Default for SmoothingFilter<N> {
    fn default() -> Self {
        Self::new()
    }
}
