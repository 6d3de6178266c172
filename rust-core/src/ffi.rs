//! C FFI Bindings for React Native Integration
//!
//! This module exposes a tracking session to mobile platforms via C ABI.
//! The app's sensor bridge forwards accelerometer and magnetometer callbacks
//! here and reads position/path back for drawing.
//!
//! Memory Safety:
//! - All returned strings must be freed with `trace_pdr_free_string()`
//! - The engine instance must be freed with `trace_pdr_engine_destroy()`
//! - NULL checks are performed on all inputs
//!
//! Thread Safety:
//! - The engine is NOT thread-safe. Deliver sensor callbacks on a single
//!   thread or guard the handle with a mutex.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use log::warn;

use crate::session::{SessionConfig, TrackingSession};
use crate::step_detection::StepDetectorConfig;
use crate::trajectory::IntegratorConfig;
use crate::types::{SensorKind, Vector3};

// ============================================================================
// OPAQUE HANDLE TYPES
// ============================================================================

/// Opaque handle to a PDR tracking session.
pub struct TracePdrEngine {
    session: TrackingSession,
}

/// Result status codes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracePdrStatus {
    /// Operation succeeded.
    Ok = 0,
    /// Null pointer provided.
    NullPointer = 1,
    /// Sample contained NaN or infinity; it was skipped.
    InvalidParameter = 2,
}

/// Engine configuration.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TracePdrConfig {
    /// Accelerometer L1 delta that must be exceeded for a step.
    pub step_threshold: f32,
    /// Distance advanced per step (meters).
    pub step_length_m: f32,
}

/// A point in the local tracking frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TracePdrPoint {
    pub x: f32,
    pub y: f32,
}

impl From<TracePdrConfig> for SessionConfig {
    fn from(config: TracePdrConfig) -> Self {
        SessionConfig {
            step_detector: StepDetectorConfig {
                step_threshold: config.step_threshold,
            },
            integrator: IntegratorConfig {
                step_length_m: config.step_length_m,
            },
        }
    }
}

// ============================================================================
// ENGINE LIFECYCLE
// ============================================================================

/// Create a new engine. A NULL `config` uses the defaults.
///
/// # Safety
/// - `config` must be NULL or a valid pointer to TracePdrConfig.
/// - The returned pointer must be freed with `trace_pdr_engine_destroy()`.
///
/// # Returns
/// - Pointer to TracePdrEngine on success.
/// - NULL if the configuration is invalid.
#[no_mangle]
pub unsafe extern "C" fn trace_pdr_engine_create(config: *const TracePdrConfig) -> *mut TracePdrEngine {
    let config = if config.is_null() {
        SessionConfig::default()
    } else {
        SessionConfig::from(*config)
    };

    match TrackingSession::try_new(config) {
        Ok(session) => Box::into_raw(Box::new(TracePdrEngine { session })),
        Err(err) => {
            warn!("trace_pdr_engine_create: {}", err);
            ptr::null_mut()
        }
    }
}

/// Create a new engine from a JSON configuration string. Missing fields use
/// their defaults.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - The returned pointer must be freed with `trace_pdr_engine_destroy()`.
///
/// # Returns
/// - NULL if `json` is NULL, not UTF-8, malformed or invalid.
#[no_mangle]
pub unsafe extern "C" fn trace_pdr_engine_create_from_json(json: *const c_char) -> *mut TracePdrEngine {
    if json.is_null() {
        return ptr::null_mut();
    }

    let json = match CStr::from_ptr(json).to_str() {
        Ok(s) => s,
        Err(_) => return ptr::null_mut(),
    };

    match SessionConfig::from_json_str(json) {
        Ok(config) => Box::into_raw(Box::new(TracePdrEngine {
            session: TrackingSession::new(config),
        })),
        Err(err) => {
            warn!("trace_pdr_engine_create_from_json: {}", err);
            ptr::null_mut()
        }
    }
}

/// Destroy an engine instance.
///
/// # Safety
/// - `engine` must be a valid pointer from a `trace_pdr_engine_create*()` call.
/// - Must not be called more than once for the same pointer.
#[no_mangle]
pub unsafe extern "C" fn trace_pdr_engine_destroy(engine: *mut TracePdrEngine) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

// ============================================================================
// STATE TRANSITIONS
// ============================================================================

/// Start tracking. Position and path are kept from any earlier run.
///
/// # Safety
/// - `engine` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn trace_pdr_start(engine: *mut TracePdrEngine) -> TracePdrStatus {
    match engine.as_mut() {
        Some(engine) => {
            engine.session.start();
            TracePdrStatus::Ok
        }
        None => TracePdrStatus::NullPointer,
    }
}

/// Stop tracking. Position and path are kept.
///
/// # Safety
/// - `engine` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn trace_pdr_stop(engine: *mut TracePdrEngine) -> TracePdrStatus {
    match engine.as_mut() {
        Some(engine) => {
            engine.session.stop();
            TracePdrStatus::Ok
        }
        None => TracePdrStatus::NullPointer,
    }
}

/// Stop tracking and return to the origin with a single-point path.
///
/// # Safety
/// - `engine` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn trace_pdr_reset(engine: *mut TracePdrEngine) -> TracePdrStatus {
    match engine.as_mut() {
        Some(engine) => {
            engine.session.reset();
            TracePdrStatus::Ok
        }
        None => TracePdrStatus::NullPointer,
    }
}

// ============================================================================
// SAMPLE PROCESSING
// ============================================================================

/// Feed one accelerometer reading.
///
/// # Safety
/// - `engine` must be a valid pointer.
/// - `step_detected` must be NULL or a valid pointer; it receives 1 when
///   this reading completed a step, 0 otherwise.
#[no_mangle]
pub unsafe extern "C" fn trace_pdr_on_accelerometer(
    engine: *mut TracePdrEngine,
    x: f32,
    y: f32,
    z: f32,
    step_detected: *mut i32,
) -> TracePdrStatus {
    let Some(engine) = engine.as_mut() else {
        return TracePdrStatus::NullPointer;
    };

    let sample = Vector3::new(x, y, z);
    let status = match sample.ensure_finite(SensorKind::Accelerometer) {
        Ok(_) => TracePdrStatus::Ok,
        Err(_) => TracePdrStatus::InvalidParameter,
    };
    let stepped = engine.session.on_accelerometer_sample(sample).is_some();

    if let Some(out) = step_detected.as_mut() {
        *out = stepped as i32;
    }
    status
}

/// Feed one magnetometer reading.
///
/// # Safety
/// - `engine` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn trace_pdr_on_magnetometer(
    engine: *mut TracePdrEngine,
    x: f32,
    y: f32,
    z: f32,
) -> TracePdrStatus {
    let Some(engine) = engine.as_mut() else {
        return TracePdrStatus::NullPointer;
    };

    let sample = Vector3::new(x, y, z);
    engine.session.on_magnetometer_sample(sample);
    match sample.ensure_finite(SensorKind::Magnetometer) {
        Ok(_) => TracePdrStatus::Ok,
        Err(_) => TracePdrStatus::InvalidParameter,
    }
}

// ============================================================================
// STATUS QUERIES
// ============================================================================

/// Write the current position to `out`.
///
/// # Safety
/// - `engine` and `out` must be valid pointers.
#[no_mangle]
pub unsafe extern "C" fn trace_pdr_get_position(
    engine: *const TracePdrEngine,
    out: *mut TracePdrPoint,
) -> TracePdrStatus {
    let (Some(engine), Some(out)) = (engine.as_ref(), out.as_mut()) else {
        return TracePdrStatus::NullPointer;
    };

    let position = engine.session.position();
    *out = TracePdrPoint {
        x: position.x,
        y: position.y,
    };
    TracePdrStatus::Ok
}

/// Number of points in the path (at least 1), or -1 for a NULL engine.
///
/// # Safety
/// - `engine` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn trace_pdr_path_len(engine: *const TracePdrEngine) -> i64 {
    match engine.as_ref() {
        Some(engine) => engine.session.path().len() as i64,
        None => -1,
    }
}

/// Copy up to `capacity` path points, origin first, into `out`.
///
/// # Safety
/// - `engine` must be a valid pointer.
/// - `out` must point to at least `capacity` writable TracePdrPoint values.
///
/// # Returns
/// - Number of points written, or -1 on NULL input.
#[no_mangle]
pub unsafe extern "C" fn trace_pdr_copy_path(
    engine: *const TracePdrEngine,
    out: *mut TracePdrPoint,
    capacity: usize,
) -> i64 {
    let Some(engine) = engine.as_ref() else {
        return -1;
    };
    if out.is_null() {
        return -1;
    }

    let path = engine.session.path();
    let count = path.len().min(capacity);
    let dest = std::slice::from_raw_parts_mut(out, count);
    for (slot, point) in dest.iter_mut().zip(path) {
        *slot = TracePdrPoint {
            x: point.x,
            y: point.y,
        };
    }
    count as i64
}

/// 1 when tracking, 0 when idle, -1 for a NULL engine.
///
/// # Safety
/// - `engine` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn trace_pdr_is_tracking(engine: *const TracePdrEngine) -> i32 {
    match engine.as_ref() {
        Some(engine) => engine.session.is_tracking() as i32,
        None => -1,
    }
}

/// Total steps integrated, or -1 for a NULL engine.
///
/// # Safety
/// - `engine` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn trace_pdr_get_step_count(engine: *const TracePdrEngine) -> i64 {
    match engine.as_ref() {
        Some(engine) => engine.session.step_count() as i64,
        None => -1,
    }
}

// ============================================================================
// JSON OUTPUT
// ============================================================================

/// Get the session snapshot as JSON.
///
/// # Safety
/// - `engine` must be a valid pointer.
///
/// # Returns
/// - JSON string (MUST be freed with `trace_pdr_free_string()`).
/// - NULL on error.
#[no_mangle]
pub unsafe extern "C" fn trace_pdr_snapshot_json(engine: *const TracePdrEngine) -> *mut c_char {
    let Some(engine) = engine.as_ref() else {
        return ptr::null_mut();
    };

    let json = match engine.session.snapshot().to_json() {
        Ok(json) => json,
        Err(err) => {
            warn!("trace_pdr_snapshot_json: {}", err);
            return ptr::null_mut();
        }
    };

    match CString::new(json) {
        Ok(cstring) => cstring.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Free a string returned by `trace_pdr_snapshot_json()`.
///
/// # Safety
/// - `ptr` must be a string returned by this library.
/// - Must not be called more than once for the same pointer.
#[no_mangle]
pub unsafe extern "C" fn trace_pdr_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// VERSION INFO
// ============================================================================

/// Get the library version string.
///
/// # Returns
/// - Static string, do NOT free.
#[no_mangle]
pub extern "C" fn trace_pdr_version() -> *const c_char {
    static VERSION: &[u8] = concat!("trace-pdr/", env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

// ============================================================================
// TESTS
// ============================================================================
