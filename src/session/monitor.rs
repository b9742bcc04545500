//! Session expiry detection with at-most-once delivery.
//!
//! SYSTEM CONTEXT
//! ==============
//! Expiry is tracked separately from the token's own lifetime. Two sources
//! feed it: an inactivity deadline polled by one timer task per `init`, and
//! server signals (an authorized request answered with 401) routed through
//! `signal_expired`.
//!
//! DESIGN
//! ======
//! `idle -> armed -> expired`. The first detection while `armed` moves to
//! `expired` and takes the callback out of the monitor, so duplicate timer
//! ticks or repeated 401s cannot deliver it twice. Each `init` bumps a
//! generation counter; timer tasks and handles from older generations become
//! inert instead of touching the new session.
//!
//! ERROR HANDLING
//! ==============
//! Without a timer source (server render, native build, no `window`) the
//! monitor stays armed but never expires on its own; expiry is then purely
//! server driven.

#[cfg(test)]
#[path = "monitor_test.rs"]
mod monitor_test;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

type ExpiryCallback = Box<dyn FnOnce() + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonitorPhase {
    Idle,
    Armed,
    Expired,
}

struct MonitorInner {
    phase: MonitorPhase,
    generation: u64,
    on_expire: Option<ExpiryCallback>,
    last_activity_ms: u64,
}

impl MonitorInner {
    fn disarm(&mut self) {
        self.generation += 1;
        self.phase = MonitorPhase::Idle;
        self.on_expire = None;
    }
}

#[derive(Clone)]
pub struct SessionMonitor {
    inner: Arc<Mutex<MonitorInner>>,
    inactivity_timeout: Duration,
    check_interval: Duration,
}

impl SessionMonitor {
    pub fn new(inactivity_timeout: Duration, check_interval: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MonitorInner {
                phase: MonitorPhase::Idle,
                generation: 0,
                on_expire: None,
                last_activity_ms: 0,
            })),
            inactivity_timeout,
            check_interval,
        }
    }

    fn lock(&self) -> MutexGuard<'_, MonitorInner> {
        // Callbacks never run under this lock.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn phase(&self) -> MonitorPhase {
        self.lock().phase
    }

    /// Arm the monitor for a new session, replacing any previous arming.
    pub fn init(&self, on_expire: impl FnOnce() + Send + Sync + 'static) -> MonitorHandle {
        self.init_at(on_expire, now_ms())
    }

    pub(crate) fn init_at(&self, on_expire: impl FnOnce() + Send + Sync + 'static, now_ms: u64) -> MonitorHandle {
        let generation = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.phase = MonitorPhase::Armed;
            inner.on_expire = Some(Box::new(on_expire));
            inner.last_activity_ms = now_ms;
            inner.generation
        };
        log::debug!("session monitor armed (generation {generation})");
        self.spawn_inactivity_timer(generation);
        MonitorHandle { monitor: self.clone(), generation }
    }

    /// Cancel detection and return to `idle`. The callback is dropped unfired.
    pub fn teardown(&self) {
        self.lock().disarm();
    }

    /// Push the inactivity deadline forward.
    pub fn record_activity(&self) {
        self.record_activity_at(now_ms());
    }

    pub(crate) fn record_activity_at(&self, now_ms: u64) {
        let mut inner = self.lock();
        if inner.phase == MonitorPhase::Armed {
            inner.last_activity_ms = inner.last_activity_ms.max(now_ms);
        }
    }

    /// Check the inactivity deadline. Returns `true` if this call fired expiry.
    pub fn poll(&self, now_ms: u64) -> bool {
        let timeout_ms = u64::try_from(self.inactivity_timeout.as_millis()).unwrap_or(u64::MAX);
        let due = {
            let inner = self.lock();
            inner.phase == MonitorPhase::Armed && now_ms.saturating_sub(inner.last_activity_ms) >= timeout_ms
        };
        due && self.signal_expired()
    }

    /// Report an expired session. Fires the callback only on the first signal
    /// after `init`; returns whether this call was the one that fired.
    pub fn signal_expired(&self) -> bool {
        let callback = {
            let mut inner = self.lock();
            if inner.phase != MonitorPhase::Armed {
                return false;
            }
            inner.phase = MonitorPhase::Expired;
            inner.on_expire.take()
        };
        log::debug!("session expired");
        if let Some(callback) = callback {
            callback();
        }
        true
    }

    fn is_current(&self, generation: u64) -> bool {
        let inner = self.lock();
        inner.generation == generation && inner.phase == MonitorPhase::Armed
    }

    #[cfg(feature = "hydrate")]
    fn spawn_inactivity_timer(&self, generation: u64) {
        if web_sys::window().is_none() {
            log::warn!("no window timer source; session expiry is server driven");
            return;
        }
        let monitor = self.clone();
        let tick = self.check_interval;
        leptos::task::spawn_local(async move {
            loop {
                gloo_timers::future::sleep(tick).await;
                if !monitor.is_current(generation) {
                    break;
                }
                monitor.poll(now_ms());
            }
        });
    }

    #[cfg(not(feature = "hydrate"))]
    fn spawn_inactivity_timer(&self, generation: u64) {
        log::debug!(
            "no timer source for generation {generation} (check interval {:?}); session expiry is server driven",
            self.check_interval
        );
    }
}

/// Teardown handle returned by `SessionMonitor::init`.
///
/// Only tears down the arming it came from; a handle outlived by a newer
/// `init` does nothing.
#[must_use = "keep the handle to tear the monitor down when the session UI goes away"]
pub struct MonitorHandle {
    monitor: SessionMonitor,
    generation: u64,
}

impl MonitorHandle {
    pub fn is_active(&self) -> bool {
        self.monitor.is_current(self.generation)
    }

    pub fn teardown(self) {
        let mut inner = self.monitor.lock();
        if inner.generation == self.generation {
            inner.disarm();
        }
    }
}

#[cfg(feature = "hydrate")]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(feature = "hydrate"))]
fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
