//! Monotonic time source.

/// Free-running microsecond clock.
pub trait Clock {
    /// Microseconds since an arbitrary epoch; never decreases.
    fn now_micros(&mut self) -> u64;

    /// Whole seconds since the same epoch.
    fn now_secs(&mut self) -> u64 {
        self.now_micros() / 1_000_000
    }
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now_micros(&mut self) -> u64 {
        (**self).now_micros()
    }
}

/// Convert a microsecond interval to seconds.
#[inline]
pub(crate) fn micros_to_secs(micros: u64) -> f32 {
    (micros as f64 / 1_000_000.0) as f32
}
