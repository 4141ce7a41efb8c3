//! Clock abstraction.
//!
//! The autosave scheduler and snapshot timestamps are driven by an injected
//! [`Clock`] so the whole timing model is testable without real timers.

use std::sync::Arc;

/// Source of the current time in unix milliseconds.
pub trait Clock: Send + Sync {
    /// Current unix timestamp (milliseconds).
    fn now_ms(&self) -> i64;
}

/// Wall-clock implementation backed by chrono.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

impl Clock for Arc<dyn Clock> {
    fn now_ms(&self) -> i64 {
        self.as_ref().now_ms()
    }
}
