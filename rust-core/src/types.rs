//! Core data types for the PDR engine.
//!
//! This module defines the sample and position types shared by the step
//! detector, the heading estimator, the position integrator and the tracking
//! session. Types carry intent: a raw sensor reading is a `Vector3`, a point in
//! the local tracking frame is a `Point2`, and they are never mixed.
//!
//! Design note: We use f32 for on-device execution to save memory and battery.
//! The step length is far coarser than single-precision error.

use std::fmt;
use std::ops::Sub;

use serde::{Deserialize, Serialize};

use crate::error::{PdrError, Result};

// ============================================================================
// SENSOR TYPES
// ============================================================================

/// A raw three-axis sensor reading.
///
/// Accelerometer readings are in g or m/s² (the step threshold is expressed
/// in the same unit), magnetometer readings in μT. The engine never rescales
/// or calibrates them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The zero vector, used as the magnetometer cache before any reading.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// True when every axis is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Reject readings containing NaN or infinity.
    pub fn ensure_finite(self, kind: SensorKind) -> Result<Self> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(PdrError::NonFiniteSample(kind))
        }
    }

    /// L1 norm of the difference between two readings:
    /// `|Δx| + |Δy| + |Δz|`.
    pub fn l1_distance(&self, other: &Vector3) -> f32 {
        let d = *self - *other;
        d.x.abs() + d.y.abs() + d.z.abs()
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Which physical sensor a reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    Accelerometer,
    Magnetometer,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Accelerometer => f.write_str("accelerometer"),
            SensorKind::Magnetometer => f.write_str("magnetometer"),
        }
    }
}

// ============================================================================
// POSITION TYPES
// ============================================================================

/// A position in the local tracking frame.
///
/// The frame's origin is where tracking started and its unit is whatever the
/// integrator's step length is expressed in (meters by default). Points are
/// never modified once recorded into a path.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Session origin `{0, 0}`.
    pub const fn origin() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Distance from origin.
    pub fn distance_from_origin(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// 2D distance to another point.
    pub fn distance_to(&self, other: &Point2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

// ============================================================================
// STEP AND UPDATE TYPES
// ============================================================================

/// A detected step from the accelerometer delta test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepEvent {
    /// 1-based index of the accelerometer sample that fired the step.
    pub sample_index: u64,
    /// 1-based step count within the detector's lifetime (since last reset).
    pub step_number: u64,
    /// L1 delta between the triggering sample and its predecessor.
    pub delta: f32,
}

impl StepEvent {
    pub fn new(sample_index: u64, step_number: u64, delta: f32) -> Self {
        Self {
            sample_index,
            step_number,
            delta,
        }
    }
}

/// A position advance produced by one step event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionUpdate {
    /// Number of steps integrated so far, this one included.
    pub step_number: u64,
    /// Heading used for this step, radians counterclockwise from +x.
    pub heading_rad: f32,
    /// Displacement applied by this step.
    pub displacement: Point2,
    /// Position after the step (also the new last path element).
    pub position: Point2,
}

/// Tracking state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackingState {
    /// Samples are not evaluated for steps.
    #[default]
    Idle,
    /// Accelerometer samples drive step detection and position updates.
    Tracking,
}

impl TrackingState {
    pub fn is_tracking(&self) -> bool {
        matches!(self, TrackingState::Tracking)
    }
}

// ============================================================================
// TESTS
// ============================================================================
