//! Change detection between two draft states.
//!
//! Pure field-by-field comparison: shallow for scalar course metadata,
//! structural for the module/lesson tree. The detector answers one question,
//! "did a meaningful change occur?", and is used both by the history manager
//! (skip no-op records) and by the autosave path (is there an unsaved delta?).
//!
//! False positives (flagging a no-op as a change) are tolerated; false
//! negatives (missing a real change) are not.

use crate::model::{Course, CourseModule, Lesson, LessonKind};
use crate::snapshot::DraftSnapshot;

/// Compare a previous snapshot against the live draft.
pub fn draft_changed(previous: &DraftSnapshot, course: &Course, modules: &[CourseModule]) -> bool {
    course_changed(&previous.course, course) || modules_changed(&previous.modules, modules)
}

/// Compare course-level scalar metadata.
///
/// The tag set is compared as an ordered list: reordering tags registers as
/// a change. That is a documented simplification, not a bug.
pub fn course_changed(previous: &Course, current: &Course) -> bool {
    previous.title != current.title
        || previous.description != current.description
        || previous.short_description != current.short_description
        || previous.status != current.status
        || previous.cover_image != current.cover_image
        || previous.category != current.category
        || previous.price != current.price
        || previous.tags != current.tags
}

/// Compare two module trees structurally.
pub fn modules_changed(previous: &[CourseModule], current: &[CourseModule]) -> bool {
    if previous.len() != current.len() {
        return true;
    }
    previous
        .iter()
        .zip(current)
        .any(|(prev, cur)| module_changed(prev, cur))
}

fn module_changed(previous: &CourseModule, current: &CourseModule) -> bool {
    if previous.title != current.title
        || previous.order_index != current.order_index
        || previous.lessons.len() != current.lessons.len()
    {
        return true;
    }
    previous
        .lessons
        .iter()
        .zip(&current.lessons)
        .any(|(prev, cur)| lesson_changed(prev, cur))
}

fn lesson_changed(previous: &Lesson, current: &Lesson) -> bool {
    previous.title != current.title
        || previous.kind != current.kind
        || previous.order_index != current.order_index
        || content_changed(current.kind, &previous.content, &current.content)
}

/// Compare two content payloads for a lesson of the given kind.
///
/// Text lessons carry a plain string payload and get a cheap length-then-value
/// comparison. Every other kind falls back to full structural equality: the
/// shortcut is only applied where it provably cannot miss a real change.
fn content_changed(kind: LessonKind, previous: &serde_json::Value, current: &serde_json::Value) -> bool {
    if kind == LessonKind::Text
        && let (serde_json::Value::String(prev), serde_json::Value::String(cur)) =
            (previous, current)
    {
        return prev.len() != cur.len() || prev != cur;
    }
    previous != current
}
