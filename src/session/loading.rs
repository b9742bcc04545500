//! Reference-counted global busy indicator.
//!
//! DESIGN
//! ======
//! Any number of overlapping operations raise and lower one counter; the
//! visible flag is `count > 0`, so it clears only when the last operation
//! finishes. `begin` hands out an RAII guard and `with_loading` is built on
//! it, which releases on success, error, panic unwind, and future drop alike.
//!
//! ERROR HANDLING
//! ==============
//! A `stop` without a matching `start` is clamped at zero and counted in
//! `imbalance_count` rather than surfaced to the user.

#[cfg(test)]
#[path = "loading_test.rs"]
mod loading_test;

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type LoadingListener = Arc<dyn Fn(bool) + Send + Sync>;

#[derive(Default)]
struct LoadingInner {
    count: AtomicUsize,
    imbalances: AtomicUsize,
    next_listener: AtomicU64,
    listeners: Mutex<Vec<(u64, LoadingListener)>>,
}

#[derive(Clone, Default)]
pub struct LoadingCoordinator {
    inner: Arc<LoadingInner>,
}

impl LoadingCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) {
        let prev = self.inner.count.fetch_add(1, Ordering::SeqCst);
        if prev == 0 {
            self.notify(true);
        }
    }

    pub fn stop(&self) {
        match self
            .inner
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| c.checked_sub(1))
        {
            Ok(1) => self.notify(false),
            Ok(_) => {}
            Err(_) => {
                self.inner.imbalances.fetch_add(1, Ordering::SeqCst);
                log::warn!("loading stop without matching start; clamped at zero");
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.count() > 0
    }

    pub fn count(&self) -> usize {
        self.inner.count.load(Ordering::SeqCst)
    }

    /// Number of `stop` calls that found the counter already at zero.
    pub fn imbalance_count(&self) -> usize {
        self.inner.imbalances.load(Ordering::SeqCst)
    }

    /// Start tracking one operation; the returned guard stops it on drop.
    pub fn begin(&self) -> LoadingGuard {
        self.start();
        LoadingGuard { coordinator: self.clone() }
    }

    /// Run `operation` with the indicator raised for its whole lifetime.
    pub async fn with_loading<F>(&self, operation: F) -> F::Output
    where
        F: Future,
    {
        let _guard = self.begin();
        operation.await
    }

    /// Observe visible-state edges (`false -> true` and `true -> false`).
    pub fn subscribe(&self, listener: impl Fn(bool) + Send + Sync + 'static) -> u64 {
        let id = self.inner.next_listener.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut listeners) = self.inner.listeners.lock() {
            listeners.push((id, Arc::new(listener)));
        }
        id
    }

    pub fn unsubscribe(&self, id: u64) {
        if let Ok(mut listeners) = self.inner.listeners.lock() {
            listeners.retain(|(lid, _)| *lid != id);
        }
    }

    fn notify(&self, loading: bool) {
        // Snapshot so listeners may subscribe/unsubscribe re-entrantly.
        let listeners: Vec<LoadingListener> = match self.inner.listeners.lock() {
            Ok(listeners) => listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(_) => return,
        };
        for listener in listeners {
            listener(loading);
        }
    }
}

/// Scoped acquisition of one loading slot.
#[must_use = "dropping the guard immediately ends the loading span"]
pub struct LoadingGuard {
    coordinator: LoadingCoordinator,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.coordinator.stop();
    }
}
