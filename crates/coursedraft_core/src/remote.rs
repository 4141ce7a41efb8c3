//! Remote persistence seam.
//!
//! The engine never talks to a backend directly; it drives an implementation
//! of [`CourseStore`] supplied by the host. The trait is object-safe so it
//! can live behind `dyn CourseStore`; all methods return boxed futures, the
//! same pattern the rest of the codebase uses for async seams.

use std::future::Future;
use std::pin::Pin;

use crate::error::Result;
use crate::model::{Course, CourseModule};

/// A boxed future for object-safe async methods.
///
/// On native targets, futures are `Send` for compatibility with
/// multi-threaded runtimes.
#[cfg(not(target_arch = "wasm32"))]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A boxed future for object-safe async methods.
///
/// WASM version without `Send` requirement - JavaScript is single-threaded.
#[cfg(target_arch = "wasm32")]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A course as loaded from the remote store.
#[derive(Debug, Clone)]
pub struct RemoteCourse {
    /// Course metadata
    pub course: Course,
    /// Module tree
    pub modules: Vec<CourseModule>,
    /// Remote last-modified timestamp (unix milliseconds), compared against
    /// the local recovery snapshot at load time
    pub last_modified_at: i64,
}

/// Asynchronous persistence collaborator for course drafts.
///
/// Both persist calls may fail with a transport or validation error; the
/// engine converts those failures into retry scheduling, it never retries
/// inside this trait.
pub trait CourseStore: Send + Sync {
    /// Persist course-level metadata. Returns the course identity, newly
    /// assigned when the course had none.
    fn persist_course<'a>(&'a self, course: &'a Course) -> BoxFuture<'a, Result<String>>;

    /// Persist the module/lesson tree for an already-persisted course.
    fn persist_modules<'a>(
        &'a self,
        course_id: &'a str,
        modules: &'a [CourseModule],
    ) -> BoxFuture<'a, Result<()>>;

    /// Fetch a course and its modules.
    fn load_course<'a>(&'a self, course_id: &'a str) -> BoxFuture<'a, Result<RemoteCourse>>;
}
