//! Test utilities for coursedraft_core
//!
//! Shared mock collaborators: a manually advanced clock, a scripted remote
//! store and a recording UI. All of them clone cheaply and share state via
//! `Arc<Mutex<_>>` so tests can keep a handle after moving one into the
//! engine.

use std::sync::{Arc, Mutex};

use crate::clock::Clock;
use crate::error::{DraftError, Result};
use crate::model::{Course, CourseModule};
use crate::remote::{BoxFuture, CourseStore, RemoteCourse};
use crate::ui::{ConfirmPrompt, Notifier, NotifyKind};

/// A clock that only moves when told to.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<i64>>,
}

impl ManualClock {
    /// Create a clock starting at `start` milliseconds.
    pub fn new(start: i64) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Advance the clock by `ms` milliseconds.
    pub fn advance(&self, ms: i64) {
        *self.now.lock().unwrap() += ms;
    }

    /// Jump the clock to an absolute time.
    pub fn set(&self, now: i64) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        *self.now.lock().unwrap()
    }
}

#[derive(Debug, Default)]
struct MockCourseStoreState {
    next_id: u32,
    course_failures: u32,
    module_failures: u32,
    load_response: Option<RemoteCourse>,
    fail_load: bool,
    persist_course_calls: u32,
    persist_modules_calls: u32,
    last_course: Option<Course>,
    last_modules: Option<Vec<CourseModule>>,
}

/// A scripted in-memory [`CourseStore`].
///
/// Failures are scripted as "fail the next N calls"; identities are assigned
/// as `course-1`, `course-2`, ...
#[derive(Debug, Clone, Default)]
pub struct MockCourseStore {
    state: Arc<Mutex<MockCourseStoreState>>,
}

impl MockCourseStore {
    /// Create an empty store with no load response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the response served by `load_course`.
    pub fn set_load_response(&self, remote: RemoteCourse) {
        self.state.lock().unwrap().load_response = Some(remote);
    }

    /// Fail the next `n` `persist_course` calls.
    pub fn fail_next_course_persists(&self, n: u32) {
        self.state.lock().unwrap().course_failures = n;
    }

    /// Fail the next `n` `persist_modules` calls.
    pub fn fail_next_module_persists(&self, n: u32) {
        self.state.lock().unwrap().module_failures = n;
    }

    /// Make `load_course` fail.
    pub fn set_fail_load(&self, fail: bool) {
        self.state.lock().unwrap().fail_load = fail;
    }

    /// Number of `persist_course` calls observed (including failed ones).
    pub fn persist_course_calls(&self) -> u32 {
        self.state.lock().unwrap().persist_course_calls
    }

    /// Number of `persist_modules` calls observed (including failed ones).
    pub fn persist_modules_calls(&self) -> u32 {
        self.state.lock().unwrap().persist_modules_calls
    }

    /// The course from the most recent successful `persist_course` call.
    pub fn last_course(&self) -> Option<Course> {
        self.state.lock().unwrap().last_course.clone()
    }

    /// The modules from the most recent successful `persist_modules` call.
    pub fn last_modules(&self) -> Option<Vec<CourseModule>> {
        self.state.lock().unwrap().last_modules.clone()
    }
}

impl CourseStore for MockCourseStore {
    fn persist_course<'a>(&'a self, course: &'a Course) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.persist_course_calls += 1;
            if state.course_failures > 0 {
                state.course_failures -= 1;
                return Err(DraftError::Persist("simulated network failure".to_string()));
            }
            let id = match &course.id {
                Some(id) => id.clone(),
                None => {
                    state.next_id += 1;
                    format!("course-{}", state.next_id)
                }
            };
            state.last_course = Some(course.clone());
            Ok(id)
        })
    }

    fn persist_modules<'a>(
        &'a self,
        course_id: &'a str,
        modules: &'a [CourseModule],
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.persist_modules_calls += 1;
            if state.module_failures > 0 {
                state.module_failures -= 1;
                return Err(DraftError::PersistModules {
                    course_id: course_id.to_string(),
                    message: "simulated nested write failure".to_string(),
                });
            }
            state.last_modules = Some(modules.to_vec());
            Ok(())
        })
    }

    fn load_course<'a>(&'a self, course_id: &'a str) -> BoxFuture<'a, Result<RemoteCourse>> {
        Box::pin(async move {
            let state = self.state.lock().unwrap();
            if state.fail_load {
                return Err(DraftError::Load {
                    course_id: course_id.to_string(),
                    message: "simulated fetch failure".to_string(),
                });
            }
            state.load_response.clone().ok_or_else(|| DraftError::Load {
                course_id: course_id.to_string(),
                message: "course not found".to_string(),
            })
        })
    }
}

/// A UI that records every notification and prompt.
#[derive(Debug, Clone)]
pub struct RecordingUi {
    notifications: Arc<Mutex<Vec<(NotifyKind, String)>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    confirm_answer: Arc<Mutex<bool>>,
}

impl Default for RecordingUi {
    fn default() -> Self {
        Self {
            notifications: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            confirm_answer: Arc::new(Mutex::new(false)),
        }
    }
}

impl RecordingUi {
    /// Create a UI that declines every prompt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the answer returned by `confirm`.
    pub fn set_confirm_answer(&self, answer: bool) {
        *self.confirm_answer.lock().unwrap() = answer;
    }

    /// All notifications received so far.
    pub fn notifications(&self) -> Vec<(NotifyKind, String)> {
        self.notifications.lock().unwrap().clone()
    }

    /// All confirmation prompts shown so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Notifier for RecordingUi {
    fn notify(&self, kind: NotifyKind, message: &str) {
        self.notifications
            .lock()
            .unwrap()
            .push((kind, message.to_string()));
    }
}

impl ConfirmPrompt for RecordingUi {
    fn confirm(&self, message: &str) -> bool {
        self.prompts.lock().unwrap().push(message.to_string());
        *self.confirm_answer.lock().unwrap()
    }
}
