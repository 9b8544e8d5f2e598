//! Daily cap on outbound messages.
//!
//! The gate keeps a [`RateWindow`] in a [`StateStore`]. Before a send it
//! loads the window (missing, unreadable or expired state counts as a fresh
//! window) and refuses when the count has reached the limit. After a
//! successful dispatch it writes the incremented count back.
//!
//! The read and the write are separate steps. Two submissions racing from
//! separate processes can both pass the check, so the limit may be
//! overshot by the number of concurrent senders.

use std::sync::atomic::{AtomicI64, Ordering};

use serde::Serialize;

use crate::config::Settings;
use crate::error::{ContactError, ContactResult, StoreError};
use crate::logs::{log_info_indent, log_warning};
use crate::models::RateWindow;
use crate::store::StateStore;

/// Source of the current time, in epoch milliseconds.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self { now: AtomicI64::new(now_ms) }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Read-only view of the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    pub count: u32,
    pub limit: u32,
    pub remaining: u32,
    /// Epoch milliseconds.
    pub window_start: i64,
    /// Epoch milliseconds after which the window counts as fresh.
    pub resets_at: i64,
}

/// Persisted daily message counter guarding the relay.
#[derive(Debug)]
pub struct OutboundMessageGate<S, C = SystemClock> {
    store: S,
    clock: C,
    key: String,
    limit: u32,
    window_ms: i64,
}

impl<S: StateStore> OutboundMessageGate<S, SystemClock> {
    /// Gate with the configured limit, window and key, on the wall clock.
    pub fn new(store: S, settings: &Settings) -> Self {
        Self::with_clock(store, SystemClock, settings)
    }
}

impl<S: StateStore, C: Clock> OutboundMessageGate<S, C> {
    pub fn with_clock(store: S, clock: C, settings: &Settings) -> Self {
        Self {
            store,
            clock,
            key: settings.storage_key.clone(),
            limit: settings.daily_limit,
            window_ms: settings.rate_window_ms(),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Current window, normalized: unreadable or expired state is a fresh window.
    pub fn current_window(&self) -> RateWindow {
        let now = self.clock.now_millis();

        let stored = match self.store.get(&self.key) {
            Ok(value) => value,
            Err(e) => {
                log_warning(format!("Could not read message counter, starting fresh: {}", e));
                None
            }
        };

        let window = stored
            .and_then(|raw| serde_json::from_str::<RateWindow>(&raw).ok())
            .unwrap_or_else(|| RateWindow::fresh(now));

        if window.is_expired(now, self.window_ms) {
            RateWindow::fresh(now)
        } else {
            window
        }
    }

    /// Authorize one send. Returns the window to pass to [`Self::record_dispatch`].
    pub fn check(&self) -> ContactResult<RateWindow> {
        let window = self.current_window();
        if window.count >= self.limit {
            log_warning(format!("Daily message limit reached ({}/{})", window.count, self.limit));
            return Err(ContactError::QuotaExceeded { limit: self.limit });
        }
        Ok(window)
    }

    /// Count a dispatched message against the window returned by [`Self::check`].
    ///
    /// The first message of a window re-anchors its start to now. A failed
    /// write is logged and otherwise ignored.
    pub fn record_dispatch(&self, window: RateWindow) -> RateWindow {
        let mut next = RateWindow {
            count: window.count + 1,
            start_time: window.start_time,
        };
        if next.count == 1 {
            next.start_time = self.clock.now_millis();
        }

        let written = serde_json::to_string(&next)
            .map_err(StoreError::from)
            .and_then(|json| self.store.set(&self.key, &json));
        match written {
            Ok(()) => log_info_indent(format!("Messages sent in window: {}/{}", next.count, self.limit), 1),
            Err(e) => log_warning(format!("Could not save message counter: {}", e)),
        }

        next
    }

    /// Count, remaining sends and reset time, without writing anything.
    pub fn status(&self) -> QuotaStatus {
        let window = self.current_window();
        QuotaStatus {
            count: window.count,
            limit: self.limit,
            remaining: self.limit.saturating_sub(window.count),
            window_start: window.start_time,
            resets_at: window.start_time.saturating_add(self.window_ms),
        }
    }
}
