//! Sensor Subscription Module.
//!
//! Ties the lifetime of external sensor feeds to the Tracking state:
//! - Feeds are acquired once when tracking starts
//! - Feeds are released when tracking stops, on reset, and when the tracker
//!   is dropped, including early returns and unwinding
//! - A released feed delivers no further samples
//!
//! Callbacks may run on whatever thread the platform sensor layer uses, so
//! the tracker shares its session behind a single mutex. Every accelerometer
//! and magnetometer mutation goes through that lock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::{debug, warn};

use crate::error::{PdrError, Result};
use crate::export::SessionSnapshot;
use crate::session::{SensorSink, SessionConfig, TrackingSession};
use crate::types::{SensorKind, TrackingState, Vector3};

/// Callback invoked with every reading of a subscribed sensor.
pub type SampleCallback = Box<dyn FnMut(Vector3) + Send + 'static>;

/// Session shared between the tracker and its sensor callbacks.
pub type SharedSession = Arc<Mutex<TrackingSession>>;

/// Lock a shared session. A panic in another callback does not leave the
/// session half-updated, so a poisoned lock is recovered.
pub fn lock_session(session: &Mutex<TrackingSession>) -> MutexGuard<'_, TrackingSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A provider of sensor readings (platform sensor API, replay, host bridge).
pub trait SensorSource {
    /// Start delivering `kind` readings to `callback` until the returned
    /// subscription is released.
    fn subscribe(&mut self, kind: SensorKind, callback: SampleCallback) -> Result<Subscription>;
}

/// Handle to a live sensor feed. Releases the feed exactly once, on
/// `remove()` or drop.
pub struct Subscription {
    kind: SensorKind,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(kind: SensorKind, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            kind,
            release: Some(Box::new(release)),
        }
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Release the feed now.
    pub fn remove(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            debug!("releasing {} subscription", self.kind);
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("live", &self.release.is_some())
            .finish()
    }
}

// ============================================================================
// TRACKER
// ============================================================================

/// Drives a shared [`TrackingSession`] from a [`SensorSource`].
///
/// Holds subscriptions only while tracking. Sample processing itself stays in
/// the session; the tracker only manages feed lifetimes.
pub struct SensorTracker<S: SensorSource> {
    source: S,
    session: SharedSession,
    subscriptions: Vec<Subscription>,
}

impl<S: SensorSource> SensorTracker<S> {
    /// Create a tracker around a fresh idle session.
    pub fn new(source: S, config: SessionConfig) -> Self {
        Self::with_session(source, Arc::new(Mutex::new(TrackingSession::new(config))))
    }

    /// Create a tracker around an existing shared session.
    pub fn with_session(source: S, session: SharedSession) -> Self {
        Self {
            source,
            session,
            subscriptions: Vec::with_capacity(2),
        }
    }

    /// Subscribe both feeds and start tracking.
    ///
    /// Feeds already held are kept, but the session is started either way. If
    /// either feed cannot be acquired, any feed acquired so far is released
    /// and the session stays idle.
    pub fn start(&mut self) -> Result<()> {
        if self.subscriptions.is_empty() {
            let accel = self.subscribe_feed(SensorKind::Accelerometer)?;
            let mag = self.subscribe_feed(SensorKind::Magnetometer)?;
            self.subscriptions.push(accel);
            self.subscriptions.push(mag);
        }

        lock_session(&self.session).start();
        Ok(())
    }

    /// Release both feeds and stop tracking. Position and path are kept.
    pub fn stop(&mut self) {
        self.subscriptions.clear();
        lock_session(&self.session).stop();
    }

    /// Start when idle, stop when tracking. Returns the new state.
    pub fn toggle(&mut self) -> Result<TrackingState> {
        if self.is_tracking() {
            self.stop();
        } else {
            self.start()?;
        }
        Ok(self.state())
    }

    /// Release both feeds and reset the session to its creation defaults.
    pub fn reset(&mut self) {
        self.subscriptions.clear();
        lock_session(&self.session).reset();
    }

    pub fn is_tracking(&self) -> bool {
        lock_session(&self.session).is_tracking()
    }

    pub fn state(&self) -> TrackingState {
        lock_session(&self.session).state()
    }

    /// Number of feeds currently held.
    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        lock_session(&self.session).snapshot()
    }

    /// The shared session, for hosts that read it directly.
    pub fn session(&self) -> SharedSession {
        Arc::clone(&self.session)
    }

    fn subscribe_feed(&mut self, kind: SensorKind) -> Result<Subscription> {
        let session = Arc::clone(&self.session);
        let callback: SampleCallback = Box::new(move |sample| {
            lock_session(&session).on_sample(kind, sample);
        });

        self.source.subscribe(kind, callback).map_err(|err| {
            warn!("failed to subscribe {}: {}", kind, err);
            err
        })
    }
}

// ============================================================================
// MANUAL SOURCE
// ============================================================================

struct Listener {
    id: u64,
    kind: SensorKind,
    callback: SampleCallback,
}

#[derive(Default)]
struct ManualSourceInner {
    next_id: u64,
    closed: bool,
    listeners: Vec<Listener>,
}

/// Push-based sensor source.
///
/// Hosts that receive readings from elsewhere (a platform bridge, a
/// recording) push them here and every live subscriber of that kind gets
/// them. Clones share the same listener set.
#[derive(Clone, Default)]
pub struct ManualSource {
    inner: Arc<Mutex<ManualSourceInner>>,
}

impl ManualSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a reading to every live subscriber of `kind`.
    /// Returns the number of subscribers reached.
    pub fn push(&self, kind: SensorKind, sample: Vector3) -> usize {
        let mut inner = self.lock();
        let mut delivered = 0;
        for listener in inner.listeners.iter_mut().filter(|l| l.kind == kind) {
            (listener.callback)(sample);
            delivered += 1;
        }
        delivered
    }

    pub fn push_accelerometer(&self, sample: Vector3) -> usize {
        self.push(SensorKind::Accelerometer, sample)
    }

    pub fn push_magnetometer(&self, sample: Vector3) -> usize {
        self.push(SensorKind::Magnetometer, sample)
    }

    /// Live subscribers of `kind`.
    pub fn listener_count(&self, kind: SensorKind) -> usize {
        self.lock().listeners.iter().filter(|l| l.kind == kind).count()
    }

    /// Mark the source unavailable. Existing subscribers are dropped and new
    /// subscriptions fail.
    pub fn close(&self) {
        let mut inner = self.lock();
        inner.closed = true;
        inner.listeners.clear();
    }

    fn lock(&self) -> MutexGuard<'_, ManualSourceInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SensorSource for ManualSource {
    fn subscribe(&mut self, kind: SensorKind, callback: SampleCallback) -> Result<Subscription> {
        let id = {
            let mut inner = self.lock();
            if inner.closed {
                return Err(PdrError::SensorUnavailable(kind));
            }
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push(Listener { id, kind, callback });
            id
        };

        let weak: Weak<Mutex<ManualSourceInner>> = Arc::downgrade(&self.inner);
        Ok(Subscription::new(kind, move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
                inner.listeners.retain(|l| l.id != id);
            }
        }))
    }
}

// ============================================================================
// TESTS
// ============================================================================
