//! Snapshot Export Module
//!
//! The display collaborator never borrows a live session across sample
//! callbacks; it takes a `SessionSnapshot`, an owned copy of position, path
//! and counters, and renders that. Snapshots serialize to JSON for hosts that
//! sit on the other side of the C ABI.
//!
//! Snapshots are in-memory only. Nothing here is a storage format.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::Point2;

/// Read-only view of a tracking session at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Whether the session was tracking when the snapshot was taken.
    pub tracking: bool,
    /// Current position (equal to the last path point).
    pub position: Point2,
    /// Path from the origin, in step order.
    pub path: Vec<Point2>,
    pub step_count: u64,
    pub total_distance_m: f32,
}

impl SessionSnapshot {
    /// First path point, the session origin.
    pub fn start(&self) -> Option<Point2> {
        self.path.first().copied()
    }

    /// Last path point, the current position.
    pub fn current(&self) -> Option<Point2> {
        self.path.last().copied()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TrackingSession;
    use crate::types::Vector3;

    fn walked_session() -> TrackingSession {
        let mut session = TrackingSession::default();
        session.start();
        session.on_magnetometer_sample(Vector3::new(1.0, 0.0, 0.0));
        session.on_accelerometer_sample(Vector3::zero());
        session.on_accelerometer_sample(Vector3::new(2.0, 0.0, 0.0));
        session
    }

    #[test]
    fn test_snapshot_matches_session() {
        let session = walked_session();
        let snapshot = session.snapshot();

        assert!(snapshot.tracking);
        assert_eq!(snapshot.position, Point2::new(0.7, 0.0));
        assert_eq!(snapshot.path, session.path());
        assert_eq!(snapshot.start(), Some(Point2::origin()));
        assert_eq!(snapshot.current(), Some(snapshot.position));
        assert_eq!(snapshot.step_count, 1);
    }

    #[test]
    fn test_snapshot_is_detached_from_session() {
        let mut session = walked_session();
        let snapshot = session.snapshot();
        session.reset();

        assert_eq!(snapshot.path.len(), 2);
        assert_eq!(session.path().len(), 1);
    }

    #[test]
    fn test_json_shape() {
        let json = TrackingSession::default().snapshot().to_json().expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");

        assert_eq!(value["tracking"], false);
        assert_eq!(value["path"][0]["x"], 0.0);
        assert_eq!(value["path"][0]["y"], 0.0);
        assert_eq!(value["step_count"], 0);
    }

    #[test]
    fn test_json_decode() {
        let snapshot = walked_session().snapshot();
        let json = snapshot.to_json_pretty().expect("json");
        assert_eq!(SessionSnapshot::from_json(&json).expect("decode"), snapshot);
        assert!(SessionSnapshot::from_json("[]").is_err());
    }
}
