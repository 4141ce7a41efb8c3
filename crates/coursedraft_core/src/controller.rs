//! Draft controller façade.
//!
//! [`DraftController`] owns the live draft tree for the lifetime of an
//! editing session and wires the engine together: every edit flows through
//! change detection into the history manager and the autosave scheduler;
//! every confirmed save refreshes the reference snapshot and the local
//! crash-recovery copy.
//!
//! Transient persistence failures never escape this type: they become
//! scheduler state transitions (backoff retry). Only [`save_now`]
//! (explicit user save) propagates its error so the calling UI can react
//! immediately.
//!
//! [`save_now`]: DraftController::save_now

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::diff::draft_changed;
use crate::error::{DraftError, Result};
use crate::history::DraftHistory;
use crate::kv::KeyValueStore;
use crate::model::{Course, CourseModule};
use crate::recovery::{AutosaveSettings, RecoveryStore};
use crate::remote::CourseStore;
use crate::save::{SaveOrchestrator, SaveReport};
use crate::scheduler::{AutosaveScheduler, SchedulerAction, SchedulerState};
use crate::snapshot::DraftSnapshot;
use crate::ui::{ConfirmPrompt, Notifier, NotifyKind};

const NOTIFY_SAVE_ID: &str = "draft-save";

/// The engine façade: owns the live draft and exposes the editing
/// operations to the surrounding editor UI.
pub struct DraftController<R, S, U>
where
    R: CourseStore,
    S: KeyValueStore,
    U: Notifier + ConfirmPrompt,
{
    course: Course,
    modules: Vec<CourseModule>,
    history: DraftHistory,
    scheduler: AutosaveScheduler,
    saver: SaveOrchestrator<R>,
    recovery: RecoveryStore<S>,
    ui: U,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl<R, S, U> std::fmt::Debug for DraftController<R, S, U>
where
    R: CourseStore,
    S: KeyValueStore,
    U: Notifier + ConfirmPrompt,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftController")
            .field("course", &self.course)
            .field("modules", &self.modules)
            .finish_non_exhaustive()
    }
}

impl<R, S, U> DraftController<R, S, U>
where
    R: CourseStore,
    S: KeyValueStore,
    U: Notifier + ConfirmPrompt,
{
    /// Start a session for a brand-new, never-persisted course.
    ///
    /// The recovery store stays inert until the first successful save
    /// assigns an identity.
    pub fn new_draft(
        remote: R,
        store: S,
        ui: U,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
        course: Course,
        modules: Vec<CourseModule>,
    ) -> Self {
        let settings =
            AutosaveSettings::load(&store, &config.namespace, config.autosave_default_enabled);
        let recovery = RecoveryStore::new(store, &config, course.id.clone());
        let scheduler = AutosaveScheduler::new(&config, settings.enabled);
        let mut history = DraftHistory::new(config.history_limit);
        history.initialize(&course, &modules, clock.now_ms());

        Self {
            course,
            modules,
            history,
            scheduler,
            saver: SaveOrchestrator::new(remote),
            recovery,
            ui,
            clock,
            config,
        }
    }

    /// Start a session for an existing course.
    ///
    /// Fetches the remote copy, then reconciles against any local
    /// crash-recovery snapshot: recovery is offered (once, via the
    /// confirmation prompt) if and only if the local snapshot is newer than
    /// the remote copy; a local snapshot at or behind the remote copy is
    /// stale and is cleared.
    ///
    /// If the remote fetch fails, the recovery snapshot is the fallback;
    /// without one the error propagates and no usable state exists.
    pub async fn load(
        remote: R,
        store: S,
        ui: U,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
        course_id: &str,
    ) -> Result<Self> {
        let settings =
            AutosaveSettings::load(&store, &config.namespace, config.autosave_default_enabled);
        let recovery = RecoveryStore::new(store, &config, Some(course_id.to_string()));
        let scheduler = AutosaveScheduler::new(&config, settings.enabled);
        let now = clock.now_ms();

        let mut saver = SaveOrchestrator::new(remote);
        let mut restored_from_local = false;

        let loaded = saver.remote().load_course(course_id).await;
        let (course, modules) = match loaded {
            Ok(remote_course) => {
                // Baseline for change detection is the confirmed remote copy
                saver.set_reference(DraftSnapshot::capture(
                    &remote_course.course,
                    &remote_course.modules,
                    now,
                ));

                match recovery.snapshot_timestamp() {
                    Some(local_ts) if local_ts > remote_course.last_modified_at => {
                        let recovered = recovery.restore();
                        match recovered {
                            Some(recovered)
                                if ui.confirm(
                                    "A locally saved draft from an interrupted session is \
                                     newer than the server copy. Restore it?",
                                ) =>
                            {
                                log::info!(
                                    "[Controller] Restoring local recovery snapshot for '{}'",
                                    course_id
                                );
                                restored_from_local = true;
                                (recovered.course, recovered.modules)
                            }
                            _ => {
                                recovery.clear();
                                (remote_course.course, remote_course.modules)
                            }
                        }
                    }
                    Some(_) => {
                        // Local snapshot is stale
                        recovery.clear();
                        (remote_course.course, remote_course.modules)
                    }
                    None => (remote_course.course, remote_course.modules),
                }
            }
            Err(e) => match recovery.restore() {
                Some(recovered) => {
                    log::warn!(
                        "[Controller] Remote load of '{}' failed ({}); falling back to \
                         recovery snapshot",
                        course_id,
                        e
                    );
                    ui.notify(
                        NotifyKind::Info,
                        "Could not reach the server; recovered your local draft",
                    );
                    // No confirmed remote baseline: the whole draft is unsaved
                    restored_from_local = true;
                    (recovered.course, recovered.modules)
                }
                None => return Err(e),
            },
        };

        let mut history = DraftHistory::new(config.history_limit);
        history.initialize(&course, &modules, now);

        let mut controller = Self {
            course,
            modules,
            history,
            scheduler,
            saver,
            recovery,
            ui,
            clock,
            config,
        };

        // A restored local draft is an unsaved delta; arm autosave for it
        if restored_from_local {
            controller.scheduler.note_change(now);
        }

        Ok(controller)
    }

    /// Sync wrapper for [`load`](Self::load).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_sync(
        remote: R,
        store: S,
        ui: U,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
        course_id: &str,
    ) -> Result<Self> {
        futures_lite::future::block_on(Self::load(remote, store, ui, clock, config, course_id))
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Apply a mutation to the live draft.
    ///
    /// Returns `true` if the mutation produced a meaningful change (recorded
    /// in history, autosave armed). A mutator that leaves the draft
    /// structurally identical records nothing and arms nothing.
    pub fn edit<F>(&mut self, mutator: F) -> bool
    where
        F: FnOnce(&mut Course, &mut Vec<CourseModule>),
    {
        mutator(&mut self.course, &mut self.modules);
        if self.history.is_applying() {
            return false;
        }
        let now = self.clock.now_ms();
        let recorded = self.history.record(&self.course, &self.modules, now);
        if recorded {
            self.scheduler.note_change(now);
        }
        recorded
    }

    /// Undo the most recent edit. Returns `false` at the oldest entry.
    ///
    /// Applying the restored snapshot is deliberately invisible to change
    /// recording and autosave; the delta it creates relative to the last
    /// confirmed save is picked up by the next save pass.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.apply_snapshot(snapshot);
                true
            }
            None => false,
        }
    }

    /// Redo a previously undone edit. Returns `false` at the newest entry.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.apply_snapshot(snapshot);
                true
            }
            None => false,
        }
    }

    fn apply_snapshot(&mut self, snapshot: DraftSnapshot) {
        self.history.begin_applying();
        self.course = snapshot.course;
        self.modules = snapshot.modules;
        // Cleared synchronously once the restore has been applied
        self.history.finish_applying();
    }

    // ========================================================================
    // Saving
    // ========================================================================

    /// Whether the live draft differs from the last confirmed save.
    pub fn is_dirty(&self) -> bool {
        match self.saver.reference() {
            Some(reference) => draft_changed(reference, &self.course, &self.modules),
            // Nothing has ever been confirmed remote
            None => true,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.course.title.trim().is_empty() {
            return Err(DraftError::Validation(
                "course title is required before saving".to_string(),
            ));
        }
        Ok(())
    }

    /// Explicit user save: bypasses the debounce and propagates errors.
    ///
    /// Validation failures refuse the save without scheduling a retry;
    /// transient persistence failures additionally arm the backoff retry so
    /// autosave recovers even if the user walks away.
    pub async fn save_now(&mut self) -> Result<SaveReport> {
        self.validate()?;
        if self.saver.is_in_flight() {
            return Err(DraftError::SaveInFlight);
        }

        self.scheduler.begin_save();
        self.ui.notify(
            NotifyKind::Loading(NOTIFY_SAVE_ID.to_string()),
            "Saving draft...",
        );

        let now = self.clock.now_ms();
        match self
            .saver
            .persist(&mut self.course, &self.modules, &mut self.recovery, now)
            .await
        {
            Ok(report) => {
                if report.created {
                    self.history.adopt_course_id(&report.course_id);
                }
                self.scheduler.on_save_success(self.clock.now_ms());
                self.ui.notify(NotifyKind::Success, "Draft saved");
                Ok(report)
            }
            Err(e) => {
                let now = self.clock.now_ms();
                self.scheduler.on_save_failure(now);
                self.notify_retry(now);
                Err(e)
            }
        }
    }

    /// Sync wrapper for [`save_now`](Self::save_now).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_now_sync(&mut self) -> Result<SaveReport> {
        futures_lite::future::block_on(self.save_now())
    }

    /// Advance the autosave state machine and run a save if one is due.
    ///
    /// The host calls this when the scheduler's deadline (see
    /// [`next_wakeup`](Self::next_wakeup)) has passed; on native targets
    /// [`run_autosave`](crate::driver::run_autosave) does it on a timer.
    /// Transient failures are converted into retry scheduling, never
    /// returned.
    pub async fn pump(&mut self) {
        let now = self.clock.now_ms();
        let Some(SchedulerAction::BeginSave) = self.scheduler.poll(now) else {
            return;
        };

        // The delta may have vanished since the timer was armed (e.g. undo)
        if !self.is_dirty() {
            self.scheduler.mark_clean();
            return;
        }
        if let Err(e) = self.validate() {
            log::warn!("[Controller] Autosave refused: {}", e);
            self.ui.notify(NotifyKind::Error, &e.to_string());
            self.scheduler.mark_clean();
            return;
        }

        self.ui.notify(
            NotifyKind::Loading(NOTIFY_SAVE_ID.to_string()),
            "Autosaving draft...",
        );

        match self
            .saver
            .persist(&mut self.course, &self.modules, &mut self.recovery, now)
            .await
        {
            Ok(report) => {
                if report.created {
                    self.history.adopt_course_id(&report.course_id);
                }
                self.scheduler.on_save_success(self.clock.now_ms());
                if let Some(secondary) = report.secondary_error {
                    log::warn!("[Controller] Autosave secondary failure: {}", secondary);
                }
                self.ui.notify(NotifyKind::Success, "Draft saved");
            }
            Err(e) => {
                let now = self.clock.now_ms();
                log::warn!("[Controller] Autosave failed: {}", e);
                self.scheduler.on_save_failure(now);
                self.notify_retry(now);
            }
        }
    }

    fn notify_retry(&self, now: i64) {
        if let Some(seconds) = self.scheduler.retry_seconds_remaining(now) {
            self.ui.notify(
                NotifyKind::Error,
                &format!("Save failed; retrying in {}s", seconds),
            );
        }
    }

    /// Emit the current retry countdown as an informational notification.
    /// No-op unless a backoff timer is running. Drivers call this once per
    /// second for UI feedback.
    pub fn emit_retry_countdown(&self) {
        let now = self.clock.now_ms();
        if let Some(seconds) = self.scheduler.retry_seconds_remaining(now)
            && seconds > 0
        {
            self.ui
                .notify(NotifyKind::Info, &format!("Retrying save in {}s", seconds));
        }
    }

    // ========================================================================
    // Autosave control
    // ========================================================================

    /// Toggle autosave and persist the preference through the local store.
    /// Disabling cancels any pending debounce or backoff timer; history is
    /// untouched.
    pub fn set_autosave_enabled(&mut self, enabled: bool) {
        self.scheduler.set_enabled(enabled);
        AutosaveSettings { enabled }.save(self.recovery.store(), &self.config.namespace);
        self.ui.notify(
            NotifyKind::Info,
            if enabled {
                "Autosave enabled"
            } else {
                "Autosave disabled"
            },
        );
        if enabled && self.is_dirty() {
            self.scheduler.note_change(self.clock.now_ms());
        }
    }

    /// End the session: one best-effort save if an unsaved meaningful change
    /// remains, then cancel all timers. The save result is logged, not
    /// returned; nothing may fire against the discarded draft afterwards.
    pub async fn teardown(&mut self) {
        if self.is_dirty() && !self.saver.is_in_flight() && self.validate().is_ok() {
            let now = self.clock.now_ms();
            match self
                .saver
                .persist(&mut self.course, &self.modules, &mut self.recovery, now)
                .await
            {
                Ok(report) => {
                    if report.created {
                        self.history.adopt_course_id(&report.course_id);
                    }
                    self.scheduler.on_save_success(self.clock.now_ms());
                }
                Err(e) => log::warn!("[Controller] Best-effort final save failed: {}", e),
            }
        }
        self.scheduler.set_enabled(false);
    }

    /// Sync wrapper for [`teardown`](Self::teardown).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn teardown_sync(&mut self) {
        futures_lite::future::block_on(self.teardown())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The live course metadata.
    pub fn course(&self) -> &Course {
        &self.course
    }

    /// The live module tree.
    pub fn modules(&self) -> &[CourseModule] {
        &self.modules
    }

    /// Whether an undo step is available.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether a redo step is available.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Number of retained history entries.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Current autosave scheduler state.
    pub fn autosave_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Whether autosave is enabled.
    pub fn is_autosave_enabled(&self) -> bool {
        self.scheduler.is_enabled()
    }

    /// Timestamp of the last successful save (milliseconds).
    pub fn last_saved_at(&self) -> Option<i64> {
        self.scheduler.last_saved_at()
    }

    /// The next instant the host should call [`pump`](Self::pump), or `None`
    /// when no timer is running.
    pub fn next_wakeup(&self) -> Option<i64> {
        self.scheduler.next_deadline()
    }

    /// Current engine time (milliseconds), from the injected clock.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }
}
