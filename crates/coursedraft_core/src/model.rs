//! Domain types for the editable course draft.
//!
//! A [`Course`] carries the scalar metadata of the document being edited.
//! Its module tree is kept alongside it as an ordered `Vec<CourseModule>`,
//! matching the shape the persistence collaborator expects (course metadata
//! and the module tree are persisted by separate calls).

use serde::{Deserialize, Serialize};

/// Publication status of a course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    /// Not yet published; only visible to its author
    #[default]
    Draft,
    /// Live and visible to learners
    Published,
    /// Retired from the catalog but kept for enrolled learners
    Archived,
}

/// The closed set of lesson kinds the authoring tool supports.
///
/// The engine never interprets a lesson's content payload; the kind tag is
/// only used for change detection (see `diff`) and by the type-specific
/// editors outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonKind {
    /// Rich-text lesson; payload is a string
    Text,
    /// Video lesson; payload carries the upload reference and playback options
    Video,
    /// Quiz lesson; payload carries questions and answers
    Quiz,
    /// Drag-and-sort exercise
    DragSort,
    /// Image hotspot exercise
    Hotspot,
    /// Flash-card deck
    Card,
}

/// The root editable entity: course-level metadata.
///
/// A new, never-persisted course has `id: None`. The persistence collaborator
/// assigns the identity on first save, and the engine keeps it for the rest
/// of the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Persisted identity, `None` until the first successful save
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Course title (required before the first save)
    pub title: String,

    /// Long-form description
    #[serde(default)]
    pub description: String,

    /// Short description shown in catalog listings
    #[serde(default)]
    pub short_description: String,

    /// Publication status
    #[serde(default)]
    pub status: CourseStatus,

    /// Reference to an uploaded cover image (upload mechanics are external)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,

    /// Catalog category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Price, if the course is paid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    /// Tag set. Compared as an ordered list, a documented simplification:
    /// reordering tags registers as a change.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Course {
    /// Create a new unsaved course with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Whether this course has been persisted at least once.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// An ordered module within a course.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseModule {
    /// Module title
    pub title: String,

    /// Zero-based position within the course
    pub order_index: u32,

    /// Ordered lessons contained in this module
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl CourseModule {
    /// Create an empty module at the given position.
    pub fn new(title: impl Into<String>, order_index: u32) -> Self {
        Self {
            title: title.into(),
            order_index,
            lessons: Vec::new(),
        }
    }
}

/// A lesson within a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    /// Lesson title
    pub title: String,

    /// Which type-specific editor owns the content payload
    pub kind: LessonKind,

    /// Type-specific content, opaque to the engine
    #[serde(default)]
    pub content: serde_json::Value,

    /// Zero-based position within the module
    pub order_index: u32,
}

impl Lesson {
    /// Create a lesson with an empty content payload.
    pub fn new(title: impl Into<String>, kind: LessonKind, order_index: u32) -> Self {
        Self {
            title: title.into(),
            kind,
            content: serde_json::Value::Null,
            order_index,
        }
    }

    /// Create a text lesson from a string payload.
    pub fn text(title: impl Into<String>, body: impl Into<String>, order_index: u32) -> Self {
        Self {
            title: title.into(),
            kind: LessonKind::Text,
            content: serde_json::Value::String(body.into()),
            order_index,
        }
    }
}
