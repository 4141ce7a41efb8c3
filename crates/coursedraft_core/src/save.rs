//! Save orchestration.
//!
//! [`SaveOrchestrator`] wraps the remote persistence collaborator. It
//! guarantees at most one in-flight persist, adopts the identity assigned to
//! a new course, refreshes the crash-recovery snapshot after success, and
//! maintains the "last known good" reference snapshot the change detector
//! compares against.
//!
//! The course-level write is primary. If it succeeds but the nested
//! module/lesson write fails, the save is still reported successful and the
//! secondary failure is logged; a draft with many independent nested writes
//! would otherwise never autosave cleanly.

use crate::error::{DraftError, Result};
use crate::kv::KeyValueStore;
use crate::model::{Course, CourseModule};
use crate::recovery::RecoveryStore;
use crate::remote::CourseStore;
use crate::snapshot::DraftSnapshot;

/// Outcome of a successful persist.
#[derive(Debug, Clone)]
pub struct SaveReport {
    /// Identity of the persisted course
    pub course_id: String,
    /// Whether this save assigned the identity for the first time
    pub created: bool,
    /// Message of a downgraded nested-write failure, if one occurred
    pub secondary_error: Option<String>,
    /// Timestamp of the save (milliseconds)
    pub saved_at: i64,
}

/// Single-flight wrapper around the remote persistence collaborator.
pub struct SaveOrchestrator<R: CourseStore> {
    remote: R,
    in_flight: bool,
    reference: Option<DraftSnapshot>,
}

impl<R: CourseStore> SaveOrchestrator<R> {
    /// Create an orchestrator with no reference snapshot yet.
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            in_flight: false,
            reference: None,
        }
    }

    /// The last confirmed-saved state, used as the change-detection baseline.
    pub fn reference(&self) -> Option<&DraftSnapshot> {
        self.reference.as_ref()
    }

    /// Set the baseline (after a load, before any save has happened).
    pub fn set_reference(&mut self, snapshot: DraftSnapshot) {
        self.reference = Some(snapshot);
    }

    /// Whether a persist is currently in flight.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Access the remote collaborator.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Persist the draft.
    ///
    /// On success the course carries its (possibly newly assigned) identity,
    /// the reference snapshot is refreshed, and the crash-recovery snapshot
    /// is rewritten so the local copy reflects a known-good state. On failure
    /// the reference snapshot is left untouched, so the next change-detection
    /// pass still sees the unsaved delta.
    pub async fn persist<S: KeyValueStore>(
        &mut self,
        course: &mut Course,
        modules: &[CourseModule],
        recovery: &mut RecoveryStore<S>,
        now: i64,
    ) -> Result<SaveReport> {
        if self.in_flight {
            return Err(DraftError::SaveInFlight);
        }
        self.in_flight = true;
        let result = self.persist_inner(course, modules, recovery, now).await;
        self.in_flight = false;
        result
    }

    async fn persist_inner<S: KeyValueStore>(
        &mut self,
        course: &mut Course,
        modules: &[CourseModule],
        recovery: &mut RecoveryStore<S>,
        now: i64,
    ) -> Result<SaveReport> {
        let created = course.id.is_none();
        let course_id = self.remote.persist_course(course).await?;

        if created {
            log::info!("[Save] Course assigned identity '{}'", course_id);
            course.id = Some(course_id.clone());
            recovery.set_identity(&course_id);
        }

        // Nested write: failure here is downgraded, the primary write stuck
        let secondary_error = match self.remote.persist_modules(&course_id, modules).await {
            Ok(()) => None,
            Err(e) => {
                log::warn!(
                    "[Save] Module write for '{}' failed after course write succeeded: {}",
                    course_id,
                    e
                );
                Some(e.to_string())
            }
        };

        self.reference = Some(DraftSnapshot::capture(course, modules, now));
        recovery.save(course, modules, now);

        Ok(SaveReport {
            course_id,
            created,
            secondary_error,
            saved_at: now,
        })
    }
}
