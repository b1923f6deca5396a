//! Session Store: the tab-scoped session record and the inactivity timer that ends it.
//!
//! `SessionService` is created once at startup and shared (it is cheap to clone).
//! The record is only ever changed through `begin`, `end`, `clear` and timer expiry.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::bus::{EventBus, ShellEvent};
use crate::error::ShellError;
use crate::models::SessionRecord;
use crate::storage::TabStorageState;

/// Fixed tab-storage key holding the JSON session record.
pub const SESSION_KEY: &str = "user";

/// Inactivity window before the session is ended (15 minutes).
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// InactivityTimer
///
/// A single reusable countdown. `reset` replaces the pending countdown rather than adding
/// a second one, so at most one expiry task exists at any time.
pub struct InactivityTimer {
    duration: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl InactivityTimer {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            pending: Mutex::new(None),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Cancels any pending countdown and starts a new one that runs `on_expire`.
    ///
    /// Outside a tokio runtime there is nothing to schedule on; the timer stays disarmed.
    pub fn reset<F>(&self, on_expire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let Ok(handle) = Handle::try_current() else {
            warn!("no async runtime available, inactivity timer not armed");
            return;
        };

        let duration = self.duration;
        let task = handle.spawn(async move {
            tokio::time::sleep(duration).await;
            on_expire();
        });

        if let Some(previous) = self.slot().replace(task) {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        if let Some(previous) = self.slot().take() {
            previous.abort();
        }
    }

    /// True while a countdown is pending.
    pub fn is_armed(&self) -> bool {
        self.slot()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for InactivityTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct SessionInner {
    storage: TabStorageState,
    bus: EventBus,
    timer: InactivityTimer,
}

/// SessionService
///
/// Owns the session record in tab storage and the one inactivity timer. Injected into
/// the guard, the header view and the page controllers; nothing else touches the key.
#[derive(Clone)]
pub struct SessionService {
    inner: Arc<SessionInner>,
}

impl SessionService {
    pub fn new(storage: TabStorageState, bus: EventBus, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                storage,
                bus,
                timer: InactivityTimer::new(timeout),
            }),
        }
    }

    /// current
    ///
    /// Reads and parses the stored record. `Ok(None)` means logged out; a record that
    /// fails to parse is reported as `SessionCorrupt` and left for the caller to clear.
    pub fn current(&self) -> Result<Option<SessionRecord>, ShellError> {
        match self.inner.storage.get_item(SESSION_KEY) {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| ShellError::SessionCorrupt(e.to_string())),
        }
    }

    /// True only for a present, parseable record.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.current(), Ok(Some(_)))
    }

    /// Writes the record (login) and starts the inactivity countdown.
    pub fn begin(&self, record: &SessionRecord) -> Result<(), ShellError> {
        let raw = serde_json::to_string(record)
            .map_err(|e| ShellError::SessionCorrupt(e.to_string()))?;
        self.inner.storage.set_item(SESSION_KEY, raw);
        info!(user = %record.user_name, "session started");
        self.reset_timer();
        Ok(())
    }

    /// Ends the session at the user's request (logout). No expiry signal is published.
    pub fn end(&self) {
        self.inner.timer.cancel();
        self.inner.storage.remove_item(SESSION_KEY);
        info!("user logged out");
    }

    /// Drops whatever is stored, parseable or not.
    pub fn clear(&self) {
        self.inner.timer.cancel();
        self.inner.storage.remove_item(SESSION_KEY);
    }

    /// User input activity. Restarts the countdown while a session exists.
    pub fn touch(&self) {
        if self.is_authenticated() {
            self.reset_timer();
        }
    }

    /// Restarts the single inactivity countdown. On expiry the record is removed and
    /// `SessionExpired` is published.
    pub fn reset_timer(&self) {
        let storage = Arc::clone(&self.inner.storage);
        let bus = self.inner.bus.clone();
        debug!(timeout = ?self.inner.timer.duration(), "inactivity timer reset");
        self.inner.timer.reset(move || {
            warn!("session expired due to inactivity");
            storage.remove_item(SESSION_KEY);
            bus.publish(ShellEvent::SessionExpired);
        });
    }

    pub fn timer_armed(&self) -> bool {
        self.inner.timer.is_armed()
    }

    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }
}
