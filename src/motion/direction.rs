//! Rotation direction.

/// Direction of rotor motion.
///
/// Counter-clockwise is the positive step and angle direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Clockwise (negative step count).
    Clockwise,
    /// Counter-clockwise (positive step count).
    CounterClockwise,
}

impl Direction {
    /// Get direction from a signed step count (zero counts as positive).
    #[inline]
    pub fn from_steps(steps: i64) -> Self {
        if steps >= 0 {
            Direction::CounterClockwise
        } else {
            Direction::Clockwise
        }
    }

    /// Direction requested by a DIR input level.
    ///
    /// A high level moves counter-clockwise unless the motor is reversed.
    #[inline]
    pub fn from_pin(high: bool, reversed: bool) -> Self {
        if high != reversed {
            Direction::CounterClockwise
        } else {
            Direction::Clockwise
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::CounterClockwise => 1,
            Direction::Clockwise => -1,
        }
    }

    /// The opposite direction.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::CounterClockwise => Direction::Clockwise,
            Direction::Clockwise => Direction::CounterClockwise,
        }
    }
}
