//! Pedestrian Dead Reckoning (PDR) Trajectory Module.
//!
//! Implements 2D path reconstruction from discrete steps:
//! - Fixed step length per detected step
//! - Heading taken from the cached magnetometer reading
//! - Append-only path starting at the session origin
//!
//! PDR provides a relative trajectory without GPS. The frame is local: the
//! origin is where tracking started and nothing is georeferenced.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{PdrError, Result};
use crate::heading::heading_from_magnetometer;
use crate::types::{Point2, PositionUpdate, StepEvent, Vector3};

/// Default distance advanced per step (meters, average adult stride).
pub const STEP_LENGTH: f32 = 0.7;

/// Configuration for position integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorConfig {
    /// Distance advanced per step. Defines the unit of the tracking frame.
    pub step_length_m: f32,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            step_length_m: STEP_LENGTH,
        }
    }
}

impl IntegratorConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.step_length_m.is_finite() || self.step_length_m <= 0.0 {
            return Err(PdrError::InvalidConfig {
                field: "step_length_m",
                value: self.step_length_m,
            });
        }
        Ok(())
    }
}

/// Integrates step events into a position and an ordered path.
///
/// `path` always starts at the origin and its last element is always the
/// current position.
#[derive(Debug, Clone)]
pub struct PositionIntegrator {
    config: IntegratorConfig,

    position: Point2,
    path: Vec<Point2>,

    // Step accumulation
    step_count: u64,
    total_distance_m: f32,
}

impl PositionIntegrator {
    /// Create a new integrator positioned at the origin.
    pub fn new(config: IntegratorConfig) -> Self {
        Self {
            config,
            position: Point2::origin(),
            path: vec![Point2::origin()],
            step_count: 0,
            total_distance_m: 0.0,
        }
    }

    /// Apply a detected step using the given magnetometer reading for heading.
    pub fn apply_step(&mut self, step: &StepEvent, mag: &Vector3) -> PositionUpdate {
        let update = self.advance(heading_from_magnetometer(mag));
        debug!(
            "step #{} (delta {:.3}) heading={:.3}rad -> ({:.3}, {:.3})",
            step.step_number, step.delta, update.heading_rad, update.position.x, update.position.y
        );
        update
    }

    /// Advance one step length along `heading_rad` and record the new point.
    pub fn advance(&mut self, heading_rad: f32) -> PositionUpdate {
        let step_length = self.config.step_length_m;
        let displacement = Point2::new(
            step_length * heading_rad.cos(),
            step_length * heading_rad.sin(),
        );

        self.position = Point2::new(
            self.position.x + displacement.x,
            self.position.y + displacement.y,
        );
        self.path.push(self.position);

        self.step_count += 1;
        self.total_distance_m += step_length;

        PositionUpdate {
            step_number: self.step_count,
            heading_rad,
            displacement,
            position: self.position,
        }
    }

    /// Get the current position estimate.
    pub fn position(&self) -> Point2 {
        self.position
    }

    /// Get the full path, origin first.
    pub fn path(&self) -> &[Point2] {
        &self.path
    }

    /// Get total step count.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Get total distance traveled along the path.
    pub fn total_distance_m(&self) -> f32 {
        self.total_distance_m
    }

    pub fn step_length(&self) -> f32 {
        self.config.step_length_m
    }

    /// Return to the origin with a single-point path.
    pub fn reset(&mut self) {
        self.position = Point2::origin();
        self.path.clear();
        self.path.push(Point2::origin());
        self.step_count = 0;
        self.total_distance_m = 0.0;
    }
}

impl Default for PositionIntegrator {
    fn default() -> Self {
        Self::new(IntegratorConfig::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
