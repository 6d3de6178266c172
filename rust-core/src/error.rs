//! Error types for the fallible edges of the engine.
//!
//! Per-sample processing never fails: non-finite readings are skipped and
//! logged where they arrive. Errors only surface when building configuration,
//! acquiring sensor subscriptions, or encoding snapshots.

use thiserror::Error;

use crate::types::SensorKind;

/// Errors raised at the edges of the PDR engine.
#[derive(Debug, Error)]
pub enum PdrError {
    /// A configuration value is outside its accepted range.
    #[error("invalid configuration: `{field}` = {value}")]
    InvalidConfig { field: &'static str, value: f32 },

    /// A sensor reading contained NaN or infinity.
    #[error("non-finite {0} sample")]
    NonFiniteSample(SensorKind),

    /// The sensor source could not provide the requested feed.
    #[error("{0} sensor unavailable")]
    SensorUnavailable(SensorKind),

    /// Snapshot or configuration JSON could not be encoded/decoded.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PdrError>;
