//! Property tests for the moving average.

use proptest::prelude::*;
use stepper_servo::MovingAverage;

proptest! {
    /// The average equals the mean of the last `capacity` samples.
    #[test]
    fn mean_of_window(
        capacity in 1usize..=32,
        samples in prop::collection::vec(-1000i32..1000, 1..200),
    ) {
        let mut average: MovingAverage<f64, 32> = MovingAverage::with_capacity(capacity);
        for &s in &samples {
            average.add(s as f64);
        }

        let window = &samples[samples.len().saturating_sub(capacity)..];
        let expected = window.iter().map(|&s| s as f64).sum::<f64>() / window.len() as f64;

        prop_assert_eq!(average.len(), window.len());
        prop_assert!((average.value_f64() - expected).abs() < 1e-9);
        prop_assert_eq!(average.last(), samples.last().map(|&s| s as f64));
    }

    /// The average stays between the smallest and largest sample in the window.
    #[test]
    fn bounded_by_window(samples in prop::collection::vec(-360.0f32..360.0, 1..64)) {
        let mut average: MovingAverage<f32, 16> = MovingAverage::new();
        for &s in &samples {
            average.add(s);
        }

        let window = &samples[samples.len().saturating_sub(16)..];
        let min = window.iter().copied().fold(f32::INFINITY, f32::min);
        let max = window.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        prop_assert!(average.value() >= min - 1e-3 && average.value() <= max + 1e-3);
    }
}

#[test]
fn test_oldest_sample_evicted() {
    let mut average: MovingAverage<i32, 8> = MovingAverage::with_capacity(3);
    for s in [10, 20, 30] {
        average.add(s);
    }
    assert_eq!(average.value(), 20);

    average.add(60);
    assert_eq!(average.value(), 36);
    assert_eq!(average.len(), 3);
}

#[test]
fn test_configure_clears() {
    let mut average: MovingAverage<f32, 8> = MovingAverage::with_capacity(4);
    average.add(5.0);

    average.configure(100);
    assert_eq!(average.capacity(), 8);
    assert!(average.is_empty());
    assert_eq!(average.value(), 0.0);
}
