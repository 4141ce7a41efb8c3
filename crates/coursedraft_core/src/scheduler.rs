//! Autosave scheduling: debounce and backoff retry.
//!
//! [`AutosaveScheduler`] is an explicit state machine driven by an injected
//! clock; it never owns a real timer. The host asks for the next deadline
//! ([`next_deadline`](AutosaveScheduler::next_deadline)), sleeps however it
//! likes, then calls [`poll`](AutosaveScheduler::poll) with the current time
//! and acts on the returned action. This keeps the whole timing model
//! deterministic under test.
//!
//! Debounce uses two cooperating deadlines: a quiet-period deadline re-armed
//! on every change, and a burst deadline fixed when the burst started.
//! Whichever expires first triggers the save, so a steady stream of edits
//! cannot starve autosave forever.
//!
//! Debounce and backoff are mutually exclusive by construction: both live in
//! the single `state` field. A fresh edit arriving during `RetryWaiting`
//! cancels the backoff and re-enters debounce; fresh edits should not wait
//! out a stale backoff.

use crate::config::EngineConfig;

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Nothing pending
    Idle,
    /// A quiet-period timer is running
    PendingDebounce,
    /// A save is in flight
    Saving,
    /// A backoff timer is running after a failed save
    RetryWaiting,
}

/// What the host should do after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerAction {
    /// Invoke the save orchestrator now
    BeginSave,
}

/// Debounce/backoff state machine for autosave.
#[derive(Debug)]
pub struct AutosaveScheduler {
    state: SchedulerState,
    enabled: bool,

    quiet_deadline: i64,
    burst_deadline: i64,
    retry_deadline: i64,

    retry_count: u32,
    last_saved_at: Option<i64>,
    /// A change arrived while a save was in flight; fold it into the next
    /// debounce cycle once the save completes.
    pending_while_saving: bool,

    quiet_ms: u64,
    burst_ms: u64,
    base_delay_ms: u64,
    max_delay_ms: u64,
    exponent_cap: u32,
}

impl AutosaveScheduler {
    /// Create a scheduler from the engine configuration.
    pub fn new(config: &EngineConfig, enabled: bool) -> Self {
        Self {
            state: SchedulerState::Idle,
            enabled,
            quiet_deadline: 0,
            burst_deadline: 0,
            retry_deadline: 0,
            retry_count: 0,
            last_saved_at: None,
            pending_while_saving: false,
            quiet_ms: config.debounce_quiet_ms,
            burst_ms: config.debounce_burst_ms,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
            exponent_cap: config.retry_exponent_cap,
        }
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Whether autosave is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of consecutive failed saves.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Timestamp of the last successful save (milliseconds).
    pub fn last_saved_at(&self) -> Option<i64> {
        self.last_saved_at
    }

    /// Enable or disable autosave. Disabling cancels any pending debounce or
    /// backoff timer; it does not touch history or the retry counter.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled && self.state != SchedulerState::Saving {
            self.state = SchedulerState::Idle;
        }
    }

    /// Note a meaningful change to the draft.
    pub fn note_change(&mut self, now: i64) {
        if !self.enabled {
            return;
        }
        match self.state {
            SchedulerState::Saving => {
                // Do not spawn a second save; fold into the next cycle
                self.pending_while_saving = true;
            }
            SchedulerState::Idle => {
                self.arm_debounce(now);
            }
            SchedulerState::PendingDebounce => {
                // Re-arm the quiet period; the burst deadline stands
                self.quiet_deadline = now + self.quiet_ms as i64;
            }
            SchedulerState::RetryWaiting => {
                self.arm_debounce(now);
            }
        }
    }

    fn arm_debounce(&mut self, now: i64) {
        self.quiet_deadline = now + self.quiet_ms as i64;
        self.burst_deadline = now + self.burst_ms as i64;
        self.state = SchedulerState::PendingDebounce;
    }

    /// The next instant at which [`poll`](Self::poll) may produce an action,
    /// or `None` when no timer is running.
    pub fn next_deadline(&self) -> Option<i64> {
        match self.state {
            SchedulerState::PendingDebounce => {
                Some(self.quiet_deadline.min(self.burst_deadline))
            }
            SchedulerState::RetryWaiting => Some(self.retry_deadline),
            SchedulerState::Idle | SchedulerState::Saving => None,
        }
    }

    /// Advance the state machine to `now`.
    ///
    /// Returns [`SchedulerAction::BeginSave`] when a save should start; the
    /// scheduler transitions to `Saving` and expects exactly one matching
    /// call to [`on_save_success`](Self::on_save_success),
    /// [`on_save_failure`](Self::on_save_failure) or
    /// [`mark_clean`](Self::mark_clean).
    pub fn poll(&mut self, now: i64) -> Option<SchedulerAction> {
        if !self.enabled {
            return None;
        }
        match self.state {
            SchedulerState::PendingDebounce
                if now >= self.quiet_deadline.min(self.burst_deadline) =>
            {
                self.state = SchedulerState::Saving;
                Some(SchedulerAction::BeginSave)
            }
            SchedulerState::RetryWaiting if now >= self.retry_deadline => {
                self.state = SchedulerState::Saving;
                Some(SchedulerAction::BeginSave)
            }
            _ => None,
        }
    }

    /// Record the start of a manual save (`save_now`), cancelling any pending
    /// debounce or backoff timer.
    pub fn begin_save(&mut self) {
        self.state = SchedulerState::Saving;
    }

    /// The save completed: reset the retry counter, remember the timestamp,
    /// and either go idle or re-enter debounce for changes that arrived while
    /// saving.
    pub fn on_save_success(&mut self, now: i64) {
        self.retry_count = 0;
        self.last_saved_at = Some(now);
        if self.pending_while_saving && self.enabled {
            self.pending_while_saving = false;
            self.arm_debounce(now);
        } else {
            self.pending_while_saving = false;
            self.state = SchedulerState::Idle;
        }
    }

    /// The save failed: arm the backoff timer and bump the retry counter.
    pub fn on_save_failure(&mut self, now: i64) {
        let delay = retry_delay_ms(
            self.retry_count,
            self.base_delay_ms,
            self.max_delay_ms,
            self.exponent_cap,
        );
        self.retry_count += 1;
        self.retry_deadline = now + delay as i64;
        self.pending_while_saving = false;
        self.state = SchedulerState::RetryWaiting;
        log::info!(
            "[Scheduler] Save failed; retry {} in {}ms",
            self.retry_count,
            delay
        );
    }

    /// There was nothing to save after all (the delta vanished, e.g. via
    /// undo): drop back to idle without touching the retry counter.
    pub fn mark_clean(&mut self) {
        self.pending_while_saving = false;
        self.state = SchedulerState::Idle;
    }

    /// Whole seconds remaining until the retry fires, for UI countdowns.
    /// `None` unless in `RetryWaiting`.
    pub fn retry_seconds_remaining(&self, now: i64) -> Option<i64> {
        if self.state != SchedulerState::RetryWaiting {
            return None;
        }
        Some(((self.retry_deadline - now).max(0) + 999) / 1000)
    }
}

/// Backoff delay for the given retry count:
/// `min(base * 1.5^min(retry_count, exponent_cap), max)`.
pub fn retry_delay_ms(retry_count: u32, base_ms: u64, max_ms: u64, exponent_cap: u32) -> u64 {
    let exponent = retry_count.min(exponent_cap);
    let delay = base_ms as f64 * 1.5f64.powi(exponent as i32);
    (delay as u64).min(max_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> AutosaveScheduler {
        AutosaveScheduler::new(&EngineConfig::default(), true)
    }

    #[test]
    fn test_retry_delay_growth_and_cap() {
        let base = 15_000;
        let max = 120_000;
        assert_eq!(retry_delay_ms(0, base, max, 5), 15_000);
        assert_eq!(retry_delay_ms(1, base, max, 5), 22_500);
        assert_eq!(retry_delay_ms(2, base, max, 5), 33_750);
        // 15000 * 1.5^5 = 113906.25, still under the cap
        assert_eq!(retry_delay_ms(5, base, max, 5), 113_906);
        // Exponent is capped, so further retries stay at the same delay
        assert_eq!(retry_delay_ms(6, base, max, 5), 113_906);
        assert_eq!(retry_delay_ms(60, base, max, 5), 113_906);
        // And the absolute cap bounds everything
        assert_eq!(retry_delay_ms(9, 100_000, max, 5), 120_000);
    }

    #[test]
    fn test_quiet_period_rearms_on_each_change() {
        let mut s = scheduler();
        s.note_change(0);
        assert_eq!(s.state(), SchedulerState::PendingDebounce);
        assert_eq!(s.next_deadline(), Some(2_000));

        s.note_change(1_500);
        assert_eq!(s.next_deadline(), Some(3_500));

        // Not due yet at the old deadline
        assert_eq!(s.poll(2_000), None);
        assert_eq!(s.poll(3_500), Some(SchedulerAction::BeginSave));
        assert_eq!(s.state(), SchedulerState::Saving);
    }

    #[test]
    fn test_burst_deadline_bounds_a_steady_stream() {
        let mut s = scheduler();
        // An edit every second forever: the quiet period never elapses,
        // but the 5s burst cap fires.
        s.note_change(0);
        for t in (1_000..=4_000).step_by(1_000) {
            assert_eq!(s.poll(t), None);
            s.note_change(t);
        }
        assert_eq!(s.next_deadline(), Some(5_000));
        assert_eq!(s.poll(5_000), Some(SchedulerAction::BeginSave));
    }

    #[test]
    fn test_changes_while_saving_fold_into_next_cycle() {
        let mut s = scheduler();
        s.note_change(0);
        assert_eq!(s.poll(2_000), Some(SchedulerAction::BeginSave));

        // New edits during the in-flight save must not spawn a second save
        s.note_change(2_100);
        assert_eq!(s.poll(5_000), None);
        assert_eq!(s.state(), SchedulerState::Saving);

        s.on_save_success(5_500);
        assert_eq!(s.state(), SchedulerState::PendingDebounce);
        assert_eq!(s.poll(7_500), Some(SchedulerAction::BeginSave));
    }

    #[test]
    fn test_success_without_pending_changes_goes_idle() {
        let mut s = scheduler();
        s.note_change(0);
        s.poll(2_000);
        s.on_save_success(2_200);
        assert_eq!(s.state(), SchedulerState::Idle);
        assert_eq!(s.last_saved_at(), Some(2_200));
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn test_backoff_growth_and_reset_on_success() {
        let mut s = scheduler();
        s.note_change(0);
        s.poll(2_000);

        s.on_save_failure(2_000);
        let first = s.next_deadline().unwrap() - 2_000;
        assert_eq!(s.poll(s.next_deadline().unwrap()), Some(SchedulerAction::BeginSave));

        let t = 2_000 + first;
        s.on_save_failure(t);
        let second = s.next_deadline().unwrap() - t;
        assert!(second > first);
        s.poll(s.next_deadline().unwrap());

        let t = t + second;
        s.on_save_failure(t);
        let third = s.next_deadline().unwrap() - t;
        assert!(third > second);
        s.poll(s.next_deadline().unwrap());

        // Success resets the counter: a forced 4th failure waits as long as
        // the 1st did.
        s.on_save_success(1_000_000);
        assert_eq!(s.retry_count(), 0);
        s.begin_save();
        s.on_save_failure(1_000_000);
        assert_eq!(s.next_deadline().unwrap() - 1_000_000, first);
    }

    #[test]
    fn test_edit_during_retry_waiting_cancels_backoff() {
        let mut s = scheduler();
        s.note_change(0);
        s.poll(2_000);
        s.on_save_failure(2_000);
        assert_eq!(s.state(), SchedulerState::RetryWaiting);

        s.note_change(3_000);
        assert_eq!(s.state(), SchedulerState::PendingDebounce);
        // Fresh debounce deadlines, not the stale backoff
        assert_eq!(s.next_deadline(), Some(5_000));
        // Retry count survives; only success resets it
        assert_eq!(s.retry_count(), 1);
    }

    #[test]
    fn test_retry_fire_requires_pending_delta_check_via_mark_clean() {
        let mut s = scheduler();
        s.note_change(0);
        s.poll(2_000);
        s.on_save_failure(2_000);

        assert_eq!(s.poll(s.next_deadline().unwrap()), Some(SchedulerAction::BeginSave));
        // Host found no remaining delta and cancels the save
        s.mark_clean();
        assert_eq!(s.state(), SchedulerState::Idle);
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn test_disable_cancels_timers() {
        let mut s = scheduler();
        s.note_change(0);
        assert_eq!(s.state(), SchedulerState::PendingDebounce);

        s.set_enabled(false);
        assert_eq!(s.state(), SchedulerState::Idle);
        assert_eq!(s.next_deadline(), None);
        assert_eq!(s.poll(10_000), None);

        // Changes while disabled do not arm anything
        s.note_change(11_000);
        assert_eq!(s.state(), SchedulerState::Idle);

        s.set_enabled(true);
        s.note_change(12_000);
        assert_eq!(s.state(), SchedulerState::PendingDebounce);
    }

    #[test]
    fn test_retry_countdown_seconds() {
        let mut s = scheduler();
        s.note_change(0);
        s.poll(2_000);
        s.on_save_failure(2_000);

        // Base delay is 15s
        assert_eq!(s.retry_seconds_remaining(2_000), Some(15));
        assert_eq!(s.retry_seconds_remaining(9_500), Some(8));
        assert_eq!(s.retry_seconds_remaining(17_000), Some(0));
        s.note_change(3_000);
        assert_eq!(s.retry_seconds_remaining(3_000), None);
    }
}
