//! Heading Estimation Module.
//!
//! Heading is the azimuth of the horizontal projection of the most recent
//! magnetometer reading, `atan2(mag.y, mag.x)`, used directly as the travel
//! direction. Magnetic north is the reference; there is no calibration,
//! declination or tilt correction, and no smoothing between readings.
//!
//! Magnetometer samples arrive independently of the accelerometer stream, so
//! the estimator is a cache: every reading overwrites the previous one and a
//! step uses whatever is cached when it fires.

use log::{trace, warn};

use crate::types::Vector3;

/// Heading in radians (counterclockwise from +x) of a magnetometer reading.
///
/// The zero vector yields 0.0 (`atan2(0, 0)`), i.e. the positive x-axis.
pub fn heading_from_magnetometer(mag: &Vector3) -> f32 {
    mag.y.atan2(mag.x)
}

/// Cache of the latest magnetometer reading.
#[derive(Debug, Clone, Default)]
pub struct HeadingEstimator {
    latest: Vector3,
    readings: u64,
}

impl HeadingEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached reading. Non-finite readings are dropped.
    pub fn update(&mut self, mag: &Vector3) {
        if !mag.is_finite() {
            warn!("skipping non-finite magnetometer sample {:?}", mag);
            return;
        }
        self.latest = *mag;
        self.readings += 1;
        trace!("mag sample #{} heading={:.4}", self.readings, self.heading());
    }

    /// Get the current heading in radians.
    pub fn heading(&self) -> f32 {
        heading_from_magnetometer(&self.latest)
    }

    /// The cached reading (zero vector until the first update).
    pub fn latest(&self) -> Vector3 {
        self.latest
    }

    pub fn has_reading(&self) -> bool {
        self.readings > 0
    }

    /// Clear the cache back to the zero vector.
    pub fn reset(&mut self) {
        self.latest = Vector3::zero();
        self.readings = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    #[test]
    fn test_zero_vector_heads_along_x() {
        assert_eq!(heading_from_magnetometer(&Vector3::zero()), 0.0);
        assert_eq!(HeadingEstimator::new().heading(), 0.0);
    }

    #[test]
    fn test_cardinal_headings() {
        assert_eq!(heading_from_magnetometer(&Vector3::new(1.0, 0.0, 0.0)), 0.0);
        assert_abs_diff_eq!(heading_from_magnetometer(&Vector3::new(0.0, 1.0, 0.0)), FRAC_PI_2);
        assert_abs_diff_eq!(heading_from_magnetometer(&Vector3::new(-1.0, 0.0, 0.0)), PI);
        assert_abs_diff_eq!(heading_from_magnetometer(&Vector3::new(0.0, -1.0, 0.0)), -FRAC_PI_2);
    }

    #[test]
    fn test_z_axis_ignored() {
        let flat = heading_from_magnetometer(&Vector3::new(20.0, 20.0, 0.0));
        let tilted = heading_from_magnetometer(&Vector3::new(20.0, 20.0, -45.0));
        assert_eq!(flat, tilted);
        assert_abs_diff_eq!(flat, FRAC_PI_4);
    }

    #[test]
    fn test_latest_reading_wins() {
        let mut estimator = HeadingEstimator::new();
        estimator.update(&Vector3::new(0.0, 30.0, 5.0));
        estimator.update(&Vector3::new(30.0, 0.0, 5.0));
        assert_eq!(estimator.heading(), 0.0);
        assert_eq!(estimator.latest(), Vector3::new(30.0, 0.0, 5.0));
        assert!(estimator.has_reading());
    }

    #[test]
    fn test_non_finite_reading_keeps_cache() {
        let mut estimator = HeadingEstimator::new();
        estimator.update(&Vector3::new(0.0, 1.0, 0.0));
        estimator.update(&Vector3::new(f32::NAN, 1.0, 0.0));
        assert_eq!(estimator.latest(), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_reset() {
        let mut estimator = HeadingEstimator::new();
        estimator.update(&Vector3::new(0.0, 1.0, 0.0));
        estimator.reset();
        assert_eq!(estimator.latest(), Vector3::zero());
        assert!(!estimator.has_reading());
        assert_eq!(estimator.heading(), 0.0);
    }
}
