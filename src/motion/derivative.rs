//! Finite-difference derivatives of timestamped samples.

use crate::clock::micros_to_secs;

/// First derivative from consecutive samples.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FirstDifference {
    previous: Option<(f32, u64)>,
}

impl FirstDifference {
    /// Start from a known sample.
    pub(crate) fn seed(&mut self, value: f32, at_micros: u64) {
        self.previous = Some((value, at_micros));
    }

    /// Rate of change since the previous sample, per second.
    ///
    /// `None` for the first sample or when no time has elapsed; the sample is
    /// still retained when time has elapsed.
    pub(crate) fn update(&mut self, value: f32, at_micros: u64) -> Option<f32> {
        let previous = self.previous;
        match previous {
            Some((last, last_at)) if at_micros > last_at => {
                self.previous = Some((value, at_micros));
                Some((value - last) / micros_to_secs(at_micros - last_at))
            }
            Some(_) => None,
            None => {
                self.previous = Some((value, at_micros));
                None
            }
        }
    }
}

/// Second derivative from the last three samples.
///
/// Uses the non-uniform three-point formula, which reduces to
/// `(x2 - 2 x1 + x0) / dt²` for evenly spaced samples.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SecondDifference {
    older: Option<(f32, u64)>,
    previous: Option<(f32, u64)>,
}

impl SecondDifference {
    /// Start from a known sample.
    pub(crate) fn seed(&mut self, value: f32, at_micros: u64) {
        self.older = None;
        self.previous = Some((value, at_micros));
    }

    /// Second derivative at the middle sample, per second squared.
    pub(crate) fn update(&mut self, value: f32, at_micros: u64) -> Option<f32> {
        if let Some((_, last_at)) = self.previous {
            if at_micros <= last_at {
                return None;
            }
        }

        let older = self.older;
        self.older = self.previous;
        self.previous = Some((value, at_micros));

        let (x0, t0) = older?;
        let (x1, t1) = self.older?;
        let dt_a = micros_to_secs(t1 - t0);
        let dt_b = micros_to_secs(at_micros - t1);

        let slope_a = (x1 - x0) / dt_a;
        let slope_b = (value - x1) / dt_b;
        Some(2.0 * (slope_b - slope_a) / (dt_a + dt_b))
    }
}
