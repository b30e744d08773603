//! Pulse animation
//!
//! The circle radius follows `|cos(t)| * amplitude`, so it breathes between
//! zero and the amplitude with a period of π seconds.

/// Default largest radius in pixels
pub const DEFAULT_AMPLITUDE: f32 = 200.0;

/// Radius of the pulse at `elapsed_secs` for the given amplitude
pub fn pulse_radius(elapsed_secs: f64, amplitude: f32) -> f32 {
    (elapsed_secs.cos() * amplitude as f64).abs() as f32
}

/// Per-frame animation state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    amplitude: f32,
    radius: f32,
}

impl Default for Pulse {
    fn default() -> Self {
        Self::new(DEFAULT_AMPLITUDE)
    }
}

impl Pulse {
    pub fn new(amplitude: f32) -> Self {
        Self {
            amplitude,
            radius: amplitude,
        }
    }

    /// Advance to `elapsed_secs` since startup
    pub fn update(&mut self, elapsed_secs: f64) {
        self.radius = pulse_radius(elapsed_secs, self.amplitude);
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_radius_at_known_points() {
        assert!((pulse_radius(0.0, 200.0) - 200.0).abs() < 1e-4);
        assert!(pulse_radius(PI / 2.0, 200.0) < 1e-3);
        assert!((pulse_radius(PI, 200.0) - 200.0).abs() < 1e-4);
    }

    #[test]
    fn test_radius_stays_in_range() {
        for i in 0..2000 {
            let t = i as f64 * 0.0137 - 5.0;
            let r = pulse_radius(t, 200.0);
            assert!((0.0..=200.0).contains(&r), "radius {} out of range at t={}", r, t);
        }
    }

    #[test]
    fn test_period_is_pi() {
        for t in [0.1, 0.7, 1.3, 2.9, 10.0] {
            let a = pulse_radius(t, 200.0);
            let b = pulse_radius(t + PI, 200.0);
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn test_update_depends_only_on_time() {
        let mut pulse = Pulse::default();
        pulse.update(1.0);
        let first = pulse.radius();
        pulse.update(42.0);
        pulse.update(1.0);
        assert_eq!(pulse.radius(), first);
        assert!((first - (1.0f64.cos() * 200.0) as f32).abs() < 1e-4);
    }
}
