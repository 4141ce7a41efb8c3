//! Immutable point-in-time captures of the draft.
//!
//! A [`DraftSnapshot`] is a deep copy of `{Course, Vec<CourseModule>}` plus a
//! capture timestamp. Snapshots serve two purposes: entries in the undo/redo
//! history and the payload written by the crash-recovery store.
//!
//! All snapshot cloning goes through [`clone_draft`] so the cloning strategy
//! can change without touching history or recovery logic.

use serde::{Deserialize, Serialize};

use crate::model::{Course, CourseModule};

/// An immutable deep copy of the draft at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    /// Course metadata at capture time
    pub course: Course,

    /// Module tree at capture time
    pub modules: Vec<CourseModule>,

    /// Unix timestamp of the capture (milliseconds)
    pub captured_at: i64,
}

impl DraftSnapshot {
    /// Capture the current draft state.
    pub fn capture(course: &Course, modules: &[CourseModule], now: i64) -> Self {
        let (course, modules) = clone_draft(course, modules);
        Self {
            course,
            modules,
            captured_at: now,
        }
    }
}

/// Deep-copy the draft tree.
///
/// The domain types are plain owned data, so a structural clone already is a
/// full deep copy (opaque lesson payloads included). Callers must not clone
/// the tree any other way; keeping the strategy behind this function is what
/// allows swapping it (e.g. for copy-on-write sharing) later.
pub fn clone_draft(course: &Course, modules: &[CourseModule]) -> (Course, Vec<CourseModule>) {
    (course.clone(), modules.to_vec())
}
