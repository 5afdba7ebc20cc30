// SPDX-License-Identifier: MIT
//! Analytics event bus — an in-process list of listener callbacks notified
//! after a submission finishes, so stats screens refresh without polling.
//!
//! Listeners run synchronously in registration order. A panicking listener
//! is caught and logged; the remaining listeners still run.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::warn;

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`AnalyticsBus::register`]; pass to `unregister`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct AnalyticsBus {
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

impl AnalyticsBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it stays registered for the process lifetime or
    /// until `unregister` is called with the returned id.
    pub fn register(&self, listener: impl Fn() + Send + Sync + 'static) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut listeners = self.listeners.lock().expect("bus lock poisoned");
        listeners.push((id, Arc::new(listener)));
        ListenerId(id)
    }

    /// Remove a listener. Returns `false` when the id is unknown (already
    /// removed, or never registered).
    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().expect("bus lock poisoned");
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id.0);
        listeners.len() != before
    }

    /// Invoke every listener in registration order. The listener list is
    /// snapshotted first, so a listener may register/unregister without
    /// deadlocking the bus.
    pub fn notify(&self) {
        let snapshot: Vec<Listener> = {
            let listeners = self.listeners.lock().expect("bus lock poisoned");
            listeners.iter().map(|(_, l)| l.clone()).collect()
        };
        for listener in snapshot {
            if catch_unwind(AssertUnwindSafe(|| (*listener)())).is_err() {
                warn!("analytics listener panicked; continuing with remaining listeners");
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().expect("bus lock poisoned").len()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
