//! Haptic feedback requests

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Handedness;

/// A vibration request for one controller's first actuator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HapticPulse {
    pub hand: Handedness,
    /// Strength in `0.0..=1.0`
    pub intensity: f32,
    pub duration: Duration,
}

impl HapticPulse {
    /// Intensity is clamped to the actuator range
    pub fn new(hand: Handedness, intensity: f32, duration: Duration) -> Self {
        Self {
            hand,
            intensity: intensity.clamp(0.0, 1.0),
            duration,
        }
    }

    pub fn from_millis(hand: Handedness, intensity: f32, millis: u64) -> Self {
        Self::new(hand, intensity, Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_is_clamped() {
        let pulse = HapticPulse::from_millis(Handedness::Left, 1.7, 40);
        assert_eq!(pulse.intensity, 1.0);
        assert_eq!(pulse.duration, Duration::from_millis(40));
    }
}
