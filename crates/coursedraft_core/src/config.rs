//! Engine configuration.
//!
//! All tunables are constructor-injected through [`EngineConfig`]; the engine
//! keeps no module-level state. Hosts that want to persist a custom
//! configuration can serialize the struct themselves.

use serde::{Deserialize, Serialize};

/// Tunables for a single [`DraftController`](crate::controller::DraftController) instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of undo/redo history entries; oldest evicted first
    pub history_limit: usize,

    /// Quiet period after the most recent change before autosave fires
    /// (milliseconds). Re-armed on every change.
    pub debounce_quiet_ms: u64,

    /// Upper bound from the first change in a burst (milliseconds). Not
    /// re-armed; whichever of the two debounce deadlines expires first
    /// triggers the save.
    pub debounce_burst_ms: u64,

    /// Base delay for the retry backoff (milliseconds)
    pub retry_base_delay_ms: u64,

    /// Cap on the retry backoff delay (milliseconds)
    pub retry_max_delay_ms: u64,

    /// Cap on the backoff exponent: delay = base * 1.5^min(retries, cap)
    pub retry_exponent_cap: u32,

    /// Recovery snapshots larger than this many serialized bytes are written
    /// in reduced form (structure only, lesson content dropped)
    pub snapshot_size_limit: usize,

    /// Key namespace for the local store: snapshots live under
    /// `<namespace>_<course_id>`, settings under `<namespace>_settings`
    pub namespace: String,

    /// Whether autosave starts enabled when no persisted setting exists
    pub autosave_default_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_limit: 50,
            debounce_quiet_ms: 2_000,
            debounce_burst_ms: 5_000,
            retry_base_delay_ms: 15_000,
            retry_max_delay_ms: 120_000,
            retry_exponent_cap: 5,
            snapshot_size_limit: 4_000_000,
            namespace: "coursedraft_recovery".to_string(),
            autosave_default_enabled: true,
        }
    }
}

impl EngineConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the local-store key namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Override the history cap.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }
}
