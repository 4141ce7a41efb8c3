//! Bounded linear undo/redo history.
//!
//! [`DraftHistory`] keeps an ordered list of immutable [`DraftSnapshot`]s with
//! a cursor pointing at the "current" entry. Undo/redo move the cursor and
//! hand the snapshot at the new position back to the caller, who applies it
//! to live state. Recording while the cursor sits mid-list discards the redo
//! branch, standard linear-history semantics.
//!
//! Applying an undo/redo result back into live state must not itself be
//! recorded, otherwise the restore would immediately be overwritten by a new
//! entry equal to the restored state. The `applying_history` mode suppresses
//! `record` for exactly that window; the controller clears it synchronously
//! once the restore has been applied.

use crate::diff::draft_changed;
use crate::model::{Course, CourseModule};
use crate::snapshot::DraftSnapshot;

/// Bounded snapshot stack with a cursor.
#[derive(Debug, Default)]
pub struct DraftHistory {
    entries: Vec<DraftSnapshot>,
    cursor: usize,
    limit: usize,
    applying_history: bool,
}

impl DraftHistory {
    /// Create an empty history with the given entry cap.
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            limit: limit.max(1),
            applying_history: false,
        }
    }

    /// Whether the first snapshot has been recorded.
    pub fn is_initialized(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Record the first snapshot. Only valid while empty; on an already
    /// populated history this is a no-op.
    pub fn initialize(&mut self, course: &Course, modules: &[CourseModule], now: i64) {
        if self.is_initialized() {
            return;
        }
        self.entries.push(DraftSnapshot::capture(course, modules, now));
        self.cursor = 0;
    }

    /// Record the current draft state as a new history entry.
    ///
    /// Returns `true` if an entry was appended. No entry is appended when the
    /// state is unchanged relative to the entry at the cursor, or while an
    /// undo/redo result is being applied.
    pub fn record(&mut self, course: &Course, modules: &[CourseModule], now: i64) -> bool {
        if self.applying_history {
            return false;
        }
        if !self.is_initialized() {
            self.initialize(course, modules, now);
            return true;
        }

        let current = &self.entries[self.cursor];
        if !draft_changed(current, course, modules) {
            return false;
        }

        // A fresh edit after undo discards the redo branch
        if self.cursor + 1 < self.entries.len() {
            self.entries.truncate(self.cursor + 1);
        }

        self.entries.push(DraftSnapshot::capture(course, modules, now));
        self.cursor = self.entries.len() - 1;

        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(0..excess);
            self.cursor -= excess;
        }

        true
    }

    /// Move the cursor one step back and return the snapshot to restore.
    /// No-op (returns `None`) when already at the oldest entry.
    pub fn undo(&mut self) -> Option<DraftSnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].clone())
    }

    /// Move the cursor one step forward and return the snapshot to restore.
    /// No-op (returns `None`) when already at the newest entry.
    pub fn redo(&mut self) -> Option<DraftSnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor].clone())
    }

    /// Whether `undo` would move the cursor.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether `redo` would move the cursor.
    pub fn can_redo(&self) -> bool {
        self.is_initialized() && self.cursor + 1 < self.entries.len()
    }

    /// The snapshot at the cursor, if any.
    pub fn current(&self) -> Option<&DraftSnapshot> {
        self.entries.get(self.cursor)
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no snapshot has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position within the retained entries.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Stamp a newly assigned course identity into every retained snapshot
    /// that predates it.
    ///
    /// The first successful save assigns the identity; without this, undoing
    /// past that save would restore a draft with no identity and the next
    /// save would create a duplicate course.
    pub fn adopt_course_id(&mut self, course_id: &str) {
        for entry in &mut self.entries {
            if entry.course.id.is_none() {
                entry.course.id = Some(course_id.to_string());
            }
        }
    }

    /// Enter the restore window: `record` is suppressed until
    /// [`finish_applying`](Self::finish_applying) is called.
    pub fn begin_applying(&mut self) {
        self.applying_history = true;
    }

    /// Leave the restore window; subsequent genuine edits record normally.
    pub fn finish_applying(&mut self) {
        self.applying_history = false;
    }

    /// Whether an undo/redo result is currently being applied.
    pub fn is_applying(&self) -> bool {
        self.applying_history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Lesson, LessonKind};

    fn history_with_edits(titles: &[&str]) -> (DraftHistory, Course) {
        let mut history = DraftHistory::new(50);
        let mut course = Course::new(titles[0]);
        history.initialize(&course, &[], 0);
        for (i, title) in titles.iter().enumerate().skip(1) {
            course.title = title.to_string();
            assert!(history.record(&course, &[], i as i64));
        }
        (history, course)
    }

    #[test]
    fn test_initialize_only_once() {
        let mut history = DraftHistory::new(50);
        let course = Course::new("A");
        history.initialize(&course, &[], 0);
        history.initialize(&course, &[], 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.current().unwrap().captured_at, 0);
    }

    #[test]
    fn test_unchanged_state_is_not_recorded() {
        let course = Course::new("A");
        let mut history = DraftHistory::new(50);
        history.initialize(&course, &[], 0);

        assert!(!history.record(&course, &[], 1));
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_undo_redo_inverse_law() {
        let (mut history, _) = history_with_edits(&["A", "B", "C", "D"]);
        assert_eq!(history.len(), 4);

        let mut restored = Vec::new();
        while let Some(snapshot) = history.undo() {
            restored.push(snapshot.course.title.clone());
        }
        assert_eq!(restored, vec!["C", "B", "A"]);
        assert!(!history.can_undo());

        let mut replayed = Vec::new();
        while let Some(snapshot) = history.redo() {
            replayed.push(snapshot.course.title.clone());
        }
        assert_eq!(replayed, vec!["B", "C", "D"]);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_redo_branch_discard() {
        // History [A, B, C], undo twice to A, edit to D => history [A, D]
        let (mut history, mut course) = history_with_edits(&["A", "B", "C"]);
        history.undo().unwrap();
        let snapshot = history.undo().unwrap();
        course = snapshot.course;

        course.title = "D".to_string();
        assert!(history.record(&course, &[], 10));

        assert_eq!(history.len(), 2);
        assert!(history.redo().is_none());
        assert_eq!(history.current().unwrap().course.title, "D");
        assert_eq!(history.undo().unwrap().course.title, "A");
    }

    #[test]
    fn test_bounded_history_evicts_oldest() {
        let mut history = DraftHistory::new(5);
        let mut course = Course::new("t0");
        history.initialize(&course, &[], 0);
        for i in 1..20 {
            course.title = format!("t{}", i);
            history.record(&course, &[], i);
        }

        assert_eq!(history.len(), 5);
        assert_eq!(history.cursor(), 4);
        assert_eq!(history.current().unwrap().course.title, "t19");

        // Undo still works down to the oldest retained entry
        let mut steps = 0;
        while history.undo().is_some() {
            steps += 1;
        }
        assert_eq!(steps, 4);
        assert_eq!(history.current().unwrap().course.title, "t15");
    }

    #[test]
    fn test_record_suppressed_while_applying() {
        let (mut history, _) = history_with_edits(&["A", "B"]);
        let snapshot = history.undo().unwrap();

        history.begin_applying();
        assert!(!history.record(&snapshot.course, &snapshot.modules, 99));
        history.finish_applying();

        assert_eq!(history.len(), 2);
        assert!(history.can_redo());

        // Genuine edits record normally after the restore window
        let mut course = snapshot.course.clone();
        course.title = "C".to_string();
        assert!(history.record(&course, &[], 100));
    }

    #[test]
    fn test_adopt_course_id_reaches_every_entry() {
        let (mut history, _) = history_with_edits(&["A", "B", "C"]);
        history.adopt_course_id("c-7");

        let undone = history.undo().unwrap();
        assert_eq!(undone.course.id.as_deref(), Some("c-7"));
        let undone = history.undo().unwrap();
        assert_eq!(undone.course.id.as_deref(), Some("c-7"));
    }

    #[test]
    fn test_concrete_scenario_three_entries() {
        // init, add module, add lesson, undo x2, redo x2
        let course = Course::new("Intro");
        let mut modules: Vec<CourseModule> = Vec::new();
        let mut history = DraftHistory::new(50);
        history.initialize(&course, &modules, 0);

        modules.push(CourseModule::new("M1", 0));
        assert!(history.record(&course, &modules, 1));

        modules[0].lessons.push(Lesson::new("L1", LessonKind::Text, 0));
        assert!(history.record(&course, &modules, 2));

        let undone = history.undo().unwrap();
        assert_eq!(undone.modules.len(), 1);
        assert!(undone.modules[0].lessons.is_empty());

        let undone = history.undo().unwrap();
        assert!(undone.modules.is_empty());

        history.redo().unwrap();
        let redone = history.redo().unwrap();
        assert_eq!(redone.modules[0].lessons.len(), 1);
        assert_eq!(redone.modules[0].lessons[0].title, "L1");

        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 2);
    }
}
