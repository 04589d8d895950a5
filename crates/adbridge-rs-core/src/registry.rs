//! Keyed listener registry used for per-ad-unit dispatch.

use adbridge_rs_protocol::{ListenerError, LogicalEventKey, NativeEvent};
use log::{debug, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Application callback registered under a logical event key.
pub type Listener = Arc<dyn Fn(&NativeEvent) -> Result<(), ListenerError> + Send + Sync>;

/// Wrap a closure as a [`Listener`].
pub fn listener<F>(f: F) -> Listener
where
    F: Fn(&NativeEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Identity of a single registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    listener: Listener,
}

#[derive(Default)]
struct RegistryState {
    next_id: u64,
    listeners: HashMap<LogicalEventKey, Vec<Registration>>,
}

impl RegistryState {
    /// Detach a registration. The caller drops it after releasing the lock,
    /// since a listener may own facades whose drop disposes other listeners.
    fn remove(&mut self, key: &LogicalEventKey, id: ListenerId) -> Option<Registration> {
        let entries = self.listeners.get_mut(key)?;
        let idx = entries.iter().position(|entry| entry.id == id)?;
        let removed = entries.remove(idx);
        if entries.is_empty() {
            self.listeners.remove(key);
        }
        Some(removed)
    }
}

/// Outcome of a single `emit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Listeners invoked.
    pub invoked: usize,
    /// Listeners that returned an error or panicked.
    pub failed: usize,
}

/// Ordered listener lists keyed by [`LogicalEventKey`].
///
/// Cloning yields another handle to the same registry. The lock is never held
/// while listeners run, so listeners may register or dispose listeners
/// (including themselves) during dispatch; such changes apply from the next
/// `emit` on.
#[derive(Default, Clone)]
pub struct EventRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl EventRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener under `key`; the returned disposer removes exactly
    /// this registration.
    pub fn on(&self, key: LogicalEventKey, listener: Listener) -> Disposer {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = ListenerId(state.next_id);
        debug!("registering listener (key={}, id={})", key, id.0);
        state
            .listeners
            .entry(key.clone())
            .or_default()
            .push(Registration { id, listener });
        Disposer {
            inner: Arc::new(DisposerInner {
                registry: Arc::downgrade(&self.state),
                key,
                id,
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Remove the first registration of `listener` under `key`, by pointer
    /// identity. Returns whether anything was removed.
    pub fn off(&self, key: &LogicalEventKey, listener: &Listener) -> bool {
        let removed = {
            let mut state = self.state.lock();
            let id = state.listeners.get(key).and_then(|entries| {
                entries
                    .iter()
                    .find(|entry| Arc::ptr_eq(&entry.listener, listener))
                    .map(|entry| entry.id)
            });
            id.and_then(|id| state.remove(key, id))
        };
        removed.is_some()
    }

    /// Invoke every listener under `key`, in registration order, with `event`.
    ///
    /// Failures are logged and counted; they never stop the remaining
    /// listeners and never propagate to the caller.
    pub fn emit(&self, key: &LogicalEventKey, event: &NativeEvent) -> DispatchReport {
        let snapshot: Vec<Listener> = {
            let state = self.state.lock();
            state
                .listeners
                .get(key)
                .map(|entries| entries.iter().map(|entry| entry.listener.clone()).collect())
                .unwrap_or_default()
        };

        let mut report = DispatchReport::default();
        for listener in snapshot {
            report.invoked += 1;
            match catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    report.failed += 1;
                    warn!("listener failed (key={}, type={}): {}", key, event.kind(), err);
                }
                Err(_) => {
                    report.failed += 1;
                    warn!("listener panicked (key={}, type={})", key, event.kind());
                }
            }
        }
        report
    }

    /// Whether at least one registration is live under `key`.
    pub fn has_listeners(&self, key: &LogicalEventKey) -> bool {
        self.state.lock().listeners.contains_key(key)
    }

    /// Number of live registrations under `key`.
    pub fn listener_count(&self, key: &LogicalEventKey) -> usize {
        self.state
            .lock()
            .listeners
            .get(key)
            .map_or(0, |entries| entries.len())
    }

    /// Keys with at least one registration, sorted.
    pub fn keys(&self) -> Vec<LogicalEventKey> {
        let mut keys: Vec<_> = self.state.lock().listeners.keys().cloned().collect();
        keys.sort();
        keys
    }
}

struct DisposerInner {
    registry: Weak<Mutex<RegistryState>>,
    key: LogicalEventKey,
    id: ListenerId,
    disposed: AtomicBool,
}

/// Removes one registration from an [`EventRegistry`].
///
/// Clones share the same disposed flag. Disposing is idempotent and a no-op
/// once the registry is gone or the registration was removed via `off`.
#[derive(Clone)]
#[must_use = "the listener stays registered until the disposer is called"]
pub struct Disposer {
    inner: Arc<DisposerInner>,
}

impl Disposer {
    /// Remove the registration. Later calls do nothing.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(state) = self.inner.registry.upgrade() else {
            return;
        };
        let removed = state.lock().remove(&self.inner.key, self.inner.id);
        if let Some(registration) = removed {
            debug!(
                "disposed listener (key={}, id={})",
                self.inner.key, registration.id.0
            );
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Key the registration was made under.
    pub fn key(&self) -> &LogicalEventKey {
        &self.inner.key
    }

    /// Id of the registration this disposer removes.
    pub fn id(&self) -> ListenerId {
        self.inner.id
    }
}

impl std::fmt::Debug for Disposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposer")
            .field("key", &self.inner.key)
            .field("id", &self.inner.id)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
