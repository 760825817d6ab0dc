//! Averaging window sizes.

use serde::Deserialize;

/// Moving average window per estimated signal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Single-turn angle.
    pub angle: usize,
    /// Absolute (multi-turn) angle.
    pub absolute_angle: usize,
    /// Speed.
    pub speed: usize,
    /// Acceleration.
    pub acceleration: usize,
    /// Die temperature.
    pub temperature: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            angle: 16,
            absolute_angle: 16,
            speed: 8,
            acceleration: 8,
            temperature: 256,
        }
    }
}

impl FilterConfig {
    /// Windows paired with their signal names.
    pub fn windows(&self) -> [(&'static str, usize); 5] {
        [
            ("angle", self.angle),
            ("absolute_angle", self.absolute_angle),
            ("speed", self.speed),
            ("acceleration", self.acceleration),
            ("temperature", self.temperature),
        ]
    }
}
