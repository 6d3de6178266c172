//! Step Detection Module.
//!
//! Detects footfalls from the raw accelerometer stream with a single
//! consecutive-sample test:
//! - Keep exactly one previous sample
//! - Compute the L1 norm of the delta to the incoming sample
//! - Fire a step when the delta is strictly above a fixed threshold
//!
//! The threshold is an empirically tuned constant. It does not adapt to
//! cadence, device orientation or sampling rate.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::error::{PdrError, Result};
use crate::types::{StepEvent, Vector3};

/// Default L1 delta a sample must exceed to count as a step.
pub const STEP_THRESHOLD: f32 = 1.2;

/// Configuration for step detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepDetectorConfig {
    /// Minimum L1 delta (exclusive) between consecutive accelerometer
    /// samples, in the accelerometer's own unit.
    ///
    /// Deltas are computed in f32, so near the default of 1.2 a delta must
    /// exceed the threshold by at least one ulp (about 1.2e-7) to count.
    pub step_threshold: f32,
}

impl Default for StepDetectorConfig {
    fn default() -> Self {
        Self {
            step_threshold: STEP_THRESHOLD,
        }
    }
}

impl StepDetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.step_threshold.is_finite() || self.step_threshold < 0.0 {
            return Err(PdrError::InvalidConfig {
                field: "step_threshold",
                value: self.step_threshold,
            });
        }
        Ok(())
    }
}

/// Step detector comparing each accelerometer sample to its predecessor.
#[derive(Debug, Clone)]
pub struct StepDetector {
    config: StepDetectorConfig,

    // Seeded by the first sample, replaced on every evaluated sample
    prev: Option<Vector3>,

    // Statistics
    samples_seen: u64,
    total_steps: u64,
}

impl StepDetector {
    /// Create a new step detector with the given configuration.
    pub fn new(config: StepDetectorConfig) -> Self {
        Self {
            config,
            prev: None,
            samples_seen: 0,
            total_steps: 0,
        }
    }

    /// Process a single accelerometer sample.
    /// Returns a StepEvent if a step was detected, None otherwise.
    ///
    /// The previous sample is replaced whether or not a step fires, so the
    /// comparison is always against the immediately preceding reading.
    pub fn process_sample(&mut self, curr: &Vector3) -> Option<StepEvent> {
        if !curr.is_finite() {
            warn!("skipping non-finite accelerometer sample {:?}", curr);
            return None;
        }

        self.samples_seen += 1;
        let prev = self.prev.replace(*curr)?;

        let delta = curr.l1_distance(&prev);
        trace!("accel sample #{} delta={:.4}", self.samples_seen, delta);

        if delta > self.config.step_threshold {
            self.total_steps += 1;
            debug!(
                "step #{} at sample #{} (delta {:.3} > {:.3})",
                self.total_steps, self.samples_seen, delta, self.config.step_threshold
            );
            Some(StepEvent::new(self.samples_seen, self.total_steps, delta))
        } else {
            None
        }
    }

    /// Process a batch of samples and return all detected steps.
    pub fn process_batch(&mut self, samples: &[Vector3]) -> Vec<StepEvent> {
        samples
            .iter()
            .filter_map(|sample| self.process_sample(sample))
            .collect()
    }

    /// Get the total number of steps detected.
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Number of finite samples evaluated since creation or reset.
    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    /// The sample the next reading will be compared against.
    pub fn previous_sample(&self) -> Option<Vector3> {
        self.prev
    }

    pub fn threshold(&self) -> f32 {
        self.config.step_threshold
    }

    /// Forget the previous sample and counters. The next sample only seeds.
    pub fn reset(&mut self) {
        self.prev = None;
        self.samples_seen = 0;
        self.total_steps = 0;
    }
}

impl Default for StepDetector {
    fn default() -> Self {
        Self::new(StepDetectorConfig::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
