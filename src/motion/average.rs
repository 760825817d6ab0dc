//! Fixed-capacity moving average.

use heapless::Deque;

/// Largest averaging window any signal may use.
pub const MAX_WINDOW: usize = 256;

/// Numeric sample that can be accumulated in `f64`.
pub trait Sample: Copy {
    /// Widen to `f64`.
    fn to_f64(self) -> f64;
    /// Narrow from `f64`.
    fn from_f64(value: f64) -> Self;
}

impl Sample for f32 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Sample for f64 {
    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }
}

impl Sample for i32 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as i32
    }
}

impl Sample for i64 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as i64
    }
}

/// Moving average over the last `capacity` samples, `capacity <= N`.
///
/// Adding a sample is O(1) in every case: the running sum is compensated
/// (Neumaier) so evicting large samples does not leave rounding error behind,
/// and the buffer is never walked.
#[derive(Debug, Clone)]
pub struct MovingAverage<T: Sample, const N: usize> {
    samples: Deque<T, N>,
    capacity: usize,
    sum: f64,
    /// Low-order bits lost by `sum`.
    compensation: f64,
}

impl<T: Sample, const N: usize> MovingAverage<T, N> {
    /// Create an empty average using the full storage as window.
    pub const fn new() -> Self {
        Self {
            samples: Deque::new(),
            capacity: N,
            sum: 0.0,
            compensation: 0.0,
        }
    }

    /// Create an empty average with a window of `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut average = Self::new();
        average.configure(capacity);
        average
    }

    /// Set the window size (clamped into `1..=N`) and drop all samples.
    pub fn configure(&mut self, capacity: usize) {
        self.capacity = capacity.clamp(1, N);
        self.clear();
    }

    /// Add a sample, evicting the oldest one once the window is full.
    pub fn add(&mut self, sample: T) {
        if self.samples.len() >= self.capacity {
            if let Some(oldest) = self.samples.pop_front() {
                self.accumulate(-oldest.to_f64());
            }
        }

        // Cannot fail: the window never exceeds the storage
        let _ = self.samples.push_back(sample);
        self.accumulate(sample.to_f64());
    }

    fn accumulate(&mut self, value: f64) {
        let total = self.sum + value;
        if libm::fabs(self.sum) >= libm::fabs(value) {
            self.compensation += (self.sum - total) + value;
        } else {
            self.compensation += (value - total) + self.sum;
        }
        self.sum = total;
    }

    /// Mean of the stored samples; zero before the first sample.
    pub fn value(&self) -> T {
        T::from_f64(self.value_f64())
    }

    /// Mean of the stored samples at full precision.
    pub fn value_f64(&self) -> f64 {
        let count = self.samples.len().max(1);
        (self.sum + self.compensation) / count as f64
    }

    /// Most recent sample.
    pub fn last(&self) -> Option<T> {
        self.samples.back().copied()
    }

    /// Number of stored samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no sample has been added since the last clear.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Window size.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.sum = 0.0;
        self.compensation = 0.0;
    }
}

impl<T: Sample, const N: usize> Default for MovingAverage<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
