//! Local crash-recovery snapshots.
//!
//! [`RecoveryStore`] persists a full copy of the draft to the keyed local
//! store so unsaved work can be recovered after an unexpected session end.
//! Snapshots are keyed by course identity (`<namespace>_<course_id>`); a
//! draft without a persisted identity has nothing to key on, so the store is
//! inert until the first successful save assigns one.
//!
//! Crash recovery is best-effort: every local-store failure is logged and
//! swallowed, and a corrupt snapshot is treated as absent, never as an error.
//!
//! The engine never snapshots on a background timer. `save` is invoked right
//! after a successful remote persist, so the local copy always reflects a
//! known-good state instead of drifting ahead of an unconfirmed remote one.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::kv::KeyValueStore;
use crate::model::{Course, CourseModule};

/// Serialized payload written to the local store.
#[derive(Debug, Serialize, Deserialize)]
struct RecoveryPayload {
    course: Course,
    modules: Vec<CourseModule>,
    /// Unix timestamp of the capture (milliseconds)
    saved_at: i64,
    /// True when lesson content was dropped to fit the size limit
    #[serde(default)]
    reduced: bool,
}

/// A restored crash-recovery snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveredDraft {
    /// Course metadata at capture time
    pub course: Course,
    /// Module tree at capture time (lesson content may be dropped if the
    /// snapshot was written in reduced form)
    pub modules: Vec<CourseModule>,
    /// Capture timestamp (milliseconds)
    pub saved_at: i64,
    /// Whether the snapshot was written in reduced form
    pub reduced: bool,
}

/// Crash-recovery snapshot store scoped to one course identity.
pub struct RecoveryStore<S: KeyValueStore> {
    store: S,
    namespace: String,
    course_id: Option<String>,
    size_limit: usize,
}

impl<S: KeyValueStore> RecoveryStore<S> {
    /// Create a store for a course that may not have an identity yet.
    pub fn new(store: S, config: &EngineConfig, course_id: Option<String>) -> Self {
        Self {
            store,
            namespace: config.namespace.clone(),
            course_id,
            size_limit: config.snapshot_size_limit,
        }
    }

    /// Adopt the identity assigned by the first successful remote persist.
    pub fn set_identity(&mut self, course_id: &str) {
        self.course_id = Some(course_id.to_string());
    }

    /// Access the underlying key/value store (shared with the settings key).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The key under which the settings for this namespace live.
    pub fn settings_key(&self) -> String {
        settings_key(&self.namespace)
    }

    fn key(&self) -> Option<String> {
        self.course_id
            .as_ref()
            .map(|id| format!("{}_{}", self.namespace, id))
    }

    /// Write a snapshot of the draft. Returns `true` if a snapshot was
    /// written; `false` when the store is inert (no identity) or the write
    /// failed (logged, not surfaced).
    ///
    /// Payloads over the configured size limit are rewritten in reduced form,
    /// keeping metadata, titles and order indices but dropping lesson
    /// content. Recoverable structure beats failing outright.
    pub fn save(&self, course: &Course, modules: &[CourseModule], now: i64) -> bool {
        let Some(key) = self.key() else {
            log::debug!("[Recovery] No course identity yet; skipping snapshot");
            return false;
        };

        let payload = RecoveryPayload {
            course: course.clone(),
            modules: modules.to_vec(),
            saved_at: now,
            reduced: false,
        };

        let serialized = match serde_json::to_string(&payload) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("[Recovery] Failed to serialize snapshot: {}", e);
                return false;
            }
        };

        let serialized = if serialized.len() > self.size_limit {
            log::warn!(
                "[Recovery] Snapshot is {} bytes (limit {}); writing reduced form",
                serialized.len(),
                self.size_limit
            );
            let reduced = RecoveryPayload {
                modules: payload
                    .modules
                    .iter()
                    .map(|m| CourseModule {
                        title: m.title.clone(),
                        order_index: m.order_index,
                        lessons: m
                            .lessons
                            .iter()
                            .map(|l| crate::model::Lesson {
                                title: l.title.clone(),
                                kind: l.kind,
                                content: serde_json::Value::Null,
                                order_index: l.order_index,
                            })
                            .collect(),
                    })
                    .collect(),
                reduced: true,
                ..payload
            };
            match serde_json::to_string(&reduced) {
                Ok(s) => s,
                Err(e) => {
                    log::warn!("[Recovery] Failed to serialize reduced snapshot: {}", e);
                    return false;
                }
            }
        } else {
            serialized
        };

        match self.store.set(&key, &serialized) {
            Ok(()) => {
                log::debug!("[Recovery] Wrote snapshot under '{}'", key);
                true
            }
            Err(e) => {
                log::warn!("[Recovery] Failed to write snapshot '{}': {}", key, e);
                false
            }
        }
    }

    /// Whether a snapshot currently exists for this course identity.
    pub fn has_snapshot(&self) -> bool {
        match self.key() {
            Some(key) => matches!(self.store.get(&key), Ok(Some(_))),
            None => false,
        }
    }

    /// Capture timestamp of the stored snapshot, or `None`.
    pub fn snapshot_timestamp(&self) -> Option<i64> {
        self.restore().map(|r| r.saved_at)
    }

    /// Read and deserialize the stored snapshot.
    ///
    /// Returns `None` when absent or corrupt; corrupt entries are logged and
    /// treated as absent.
    pub fn restore(&self) -> Option<RecoveredDraft> {
        let key = self.key()?;
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("[Recovery] Failed to read snapshot '{}': {}", key, e);
                return None;
            }
        };

        match serde_json::from_str::<RecoveryPayload>(&raw) {
            Ok(payload) => Some(RecoveredDraft {
                course: payload.course,
                modules: payload.modules,
                saved_at: payload.saved_at,
                reduced: payload.reduced,
            }),
            Err(e) => {
                log::warn!("[Recovery] Corrupt snapshot '{}', treating as absent: {}", key, e);
                None
            }
        }
    }

    /// Remove the snapshot for this course identity.
    ///
    /// Deletion is scoped to this identity's key; snapshots of other drafts
    /// sharing the namespace (e.g. open in another tab) are left alone. Use
    /// [`clear_namespace`](Self::clear_namespace) for housekeeping.
    pub fn clear(&self) {
        let Some(key) = self.key() else { return };
        if let Err(e) = self.store.remove(&key) {
            log::warn!("[Recovery] Failed to remove snapshot '{}': {}", key, e);
        }
    }

    /// Remove every snapshot under this namespace, sparing the settings key.
    ///
    /// Guards against orphaned entries from previous sessions. Callers must
    /// be sure no other session with a draft in this namespace is active.
    pub fn clear_namespace(&self) {
        let prefix = format!("{}_", self.namespace);
        let keys = match self.store.keys_with_prefix(&prefix) {
            Ok(keys) => keys,
            Err(e) => {
                log::warn!("[Recovery] Failed to list namespace '{}': {}", prefix, e);
                return;
            }
        };

        let settings = self.settings_key();
        for key in keys {
            if key == settings {
                continue;
            }
            if let Err(e) = self.store.remove(&key) {
                log::warn!("[Recovery] Failed to remove '{}': {}", key, e);
            }
        }
    }
}

/// The settings key for a namespace.
fn settings_key(namespace: &str) -> String {
    format!("{}_settings", namespace)
}

/// Persisted per-instance autosave preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutosaveSettings {
    /// Whether autosave is enabled
    pub enabled: bool,
}

impl AutosaveSettings {
    /// Load the persisted setting, falling back to `default_enabled` when
    /// absent or unreadable.
    pub fn load<S: KeyValueStore>(store: &S, namespace: &str, default_enabled: bool) -> Self {
        let fallback = Self {
            enabled: default_enabled,
        };
        match store.get(&settings_key(namespace)) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("[Recovery] Corrupt autosave settings, using default: {}", e);
                fallback
            }),
            Ok(None) => fallback,
            Err(e) => {
                log::warn!("[Recovery] Failed to read autosave settings: {}", e);
                fallback
            }
        }
    }

    /// Persist the setting. Failures are logged, not surfaced.
    pub fn save<S: KeyValueStore>(&self, store: &S, namespace: &str) {
        let raw = match serde_json::to_string(self) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("[Recovery] Failed to serialize autosave settings: {}", e);
                return;
            }
        };
        if let Err(e) = store.set(&settings_key(namespace), &raw) {
            log::warn!("[Recovery] Failed to write autosave settings: {}", e);
        }
    }
}
