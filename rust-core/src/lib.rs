//! Trace PDR Library
//!
//! A pedestrian dead-reckoning core that turns raw phone accelerometer and
//! magnetometer streams into a 2D path, without GPS.
//!
//! # Design Philosophy
//!
//! - **Streaming**: one accelerometer sample in, zero or one position update
//!   out. O(1) per sample with nothing buffered beyond the previous reading.
//! - **Local frame**: the origin is where tracking started; nothing is
//!   georeferenced and nothing is persisted.
//! - **Simple by construction**: a fixed L1 delta threshold detects steps and
//!   the raw magnetometer azimuth gives heading. No filtering or fusion.
//! - **Host-agnostic**: sensor feeds and drawing live in the host app; the
//!   engine only owns the session state and the lifetime of its feeds.
//!
//! # Example
//!
//! ```
//! use trace_pdr::{Point2, TrackingSession, Vector3};
//!
//! let mut session = TrackingSession::default();
//! session.start();
//!
//! session.on_magnetometer_sample(Vector3::new(1.0, 0.0, 0.0));
//! session.on_accelerometer_sample(Vector3::new(0.0, 0.0, 0.0));
//! session.on_accelerometer_sample(Vector3::new(2.0, 0.0, 0.0));
//!
//! assert_eq!(session.path(), &[Point2::new(0.0, 0.0), Point2::new(0.7, 0.0)]);
//! ```

pub mod error;
pub mod export;
pub mod ffi;
pub mod heading;
pub mod session;
pub mod step_detection;
pub mod subscription;
pub mod trajectory;
pub mod types;

mod integration_tests;

// Re-export commonly used types
pub use error::{PdrError, Result};
pub use export::SessionSnapshot;
pub use heading::{heading_from_magnetometer, HeadingEstimator};
pub use session::{SensorSink, SessionConfig, TrackingSession};
pub use step_detection::{StepDetector, StepDetectorConfig, STEP_THRESHOLD};
pub use subscription::{
    ManualSource, SampleCallback, SensorSource, SensorTracker, SharedSession, Subscription,
};
pub use trajectory::{IntegratorConfig, PositionIntegrator, STEP_LENGTH};
pub use types::{Point2, PositionUpdate, SensorKind, StepEvent, TrackingState, Vector3};
