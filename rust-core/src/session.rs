//! Tracking session orchestrating step detection and position integration.
//!
//! A session is a two-state machine:
//! - **Idle**: accelerometer samples are ignored, magnetometer samples are
//!   still cached.
//! - **Tracking**: every accelerometer sample goes through the step
//!   detector; a step advances the position along the heading of the most
//!   recently cached magnetometer reading.
//!
//! Stopping keeps position, path and sensor caches so tracking can resume
//! where it left off. Only `reset()` returns the session to its creation
//! defaults.
//!
//! # Performance
//! - O(1) per sample; the path append is amortized O(1)
//! - No buffering beyond the previous accelerometer sample and the cached
//!   magnetometer reading

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::export::SessionSnapshot;
use crate::heading::HeadingEstimator;
use crate::step_detection::{StepDetector, StepDetectorConfig};
use crate::trajectory::{IntegratorConfig, PositionIntegrator};
use crate::types::*;

/// Configuration for a tracking session.
///
/// Bundles the sub-component configurations into a single package. Missing
/// fields in JSON input fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Step detection threshold.
    pub step_detector: StepDetectorConfig,

    /// Step length used for each position advance.
    pub integrator: IntegratorConfig,
}

impl SessionConfig {
    /// Check every sub-configuration.
    pub fn validate(&self) -> Result<()> {
        self.step_detector.validate()?;
        self.integrator.validate()
    }

    /// Parse a (possibly partial) JSON configuration and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

/// Receiver of raw sensor readings.
///
/// Implemented by [`TrackingSession`]; subscription callbacks forward into
/// it without knowing which handler a reading belongs to.
pub trait SensorSink {
    fn on_sample(&mut self, kind: SensorKind, sample: Vector3) -> Option<PositionUpdate>;
}

/// Single-stream PDR session.
#[derive(Debug, Clone)]
pub struct TrackingSession {
    config: SessionConfig,
    state: TrackingState,

    // Processing stages
    step_detector: StepDetector,
    heading_estimator: HeadingEstimator,
    integrator: PositionIntegrator,
}

impl TrackingSession {
    /// Creates an idle session at the origin.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            step_detector: StepDetector::new(config.step_detector.clone()),
            heading_estimator: HeadingEstimator::new(),
            integrator: PositionIntegrator::new(config.integrator.clone()),
            config,
            state: TrackingState::Idle,
        }
    }

    /// Creates a session after validating the configuration.
    pub fn try_new(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    // =========================================================================
    // STATE TRANSITIONS
    // =========================================================================

    /// Idle → Tracking. Keeps position, path and caches.
    pub fn start(&mut self) {
        if self.state != TrackingState::Tracking {
            info!("tracking started at ({:.3}, {:.3})", self.position().x, self.position().y);
            self.state = TrackingState::Tracking;
        }
    }

    /// Tracking → Idle. Keeps position, path and caches.
    pub fn stop(&mut self) {
        if self.state != TrackingState::Idle {
            info!("tracking stopped after {} steps", self.step_count());
            self.state = TrackingState::Idle;
        }
    }

    /// Flip between Idle and Tracking and return the new state.
    pub fn toggle(&mut self) -> TrackingState {
        match self.state {
            TrackingState::Idle => self.start(),
            TrackingState::Tracking => self.stop(),
        }
        self.state
    }

    /// Return to creation defaults: Idle, origin, `[origin]`, no previous
    /// accelerometer sample, zero magnetometer.
    pub fn reset(&mut self) {
        info!("session reset");
        self.state = TrackingState::Idle;
        self.step_detector.reset();
        self.heading_estimator.reset();
        self.integrator.reset();
    }

    // =========================================================================
    // SAMPLE INGESTION
    // =========================================================================

    /// Processes an accelerometer sample.
    ///
    /// Returns Some(PositionUpdate) when the sample completed a step, None
    /// otherwise. Ignored entirely while Idle.
    pub fn on_accelerometer_sample(&mut self, sample: Vector3) -> Option<PositionUpdate> {
        if !self.state.is_tracking() {
            return None;
        }
        let step = self.step_detector.process_sample(&sample)?;
        if !self.heading_estimator.has_reading() {
            debug!(
                "step #{} before any magnetometer reading, heading along +x",
                step.step_number
            );
        }
        Some(
            self.integrator
                .apply_step(&step, &self.heading_estimator.latest()),
        )
    }

    /// Caches a magnetometer sample. Accepted in both states.
    pub fn on_magnetometer_sample(&mut self, sample: Vector3) {
        self.heading_estimator.update(&sample);
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn position(&self) -> Point2 {
        self.integrator.position()
    }

    /// Path from the origin to the current position.
    pub fn path(&self) -> &[Point2] {
        self.integrator.path()
    }

    pub fn is_tracking(&self) -> bool {
        self.state.is_tracking()
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    pub fn step_count(&self) -> u64 {
        self.integrator.step_count()
    }

    pub fn total_distance_m(&self) -> f32 {
        self.integrator.total_distance_m()
    }

    /// Heading the next step would use.
    pub fn heading(&self) -> f32 {
        self.heading_estimator.heading()
    }

    pub fn latest_magnetometer(&self) -> Vector3 {
        self.heading_estimator.latest()
    }

    pub fn last_accelerometer(&self) -> Option<Vector3> {
        self.step_detector.previous_sample()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Owned copy of everything the display needs.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            tracking: self.is_tracking(),
            position: self.position(),
            path: self.path().to_vec(),
            step_count: self.step_count(),
            total_distance_m: self.total_distance_m(),
        }
    }
}

impl Default for TrackingSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl SensorSink for TrackingSession {
    fn on_sample(&mut self, kind: SensorKind, sample: Vector3) -> Option<PositionUpdate> {
        match kind {
            SensorKind::Accelerometer => self.on_accelerometer_sample(sample),
            SensorKind::Magnetometer => {
                self.on_magnetometer_sample(sample);
                None
            }
        }
    }
}
