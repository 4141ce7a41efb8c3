#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Injectable time source
pub mod clock;

/// Engine configuration
pub mod config;

/// Draft controller (the engine façade)
pub mod controller;

/// Change detection between draft states
pub mod diff;

/// Error (common error types)
pub mod error;

/// Undo/redo history
pub mod history;

/// Keyed local storage abstraction
pub mod kv;

/// Domain types (course, module, lesson)
pub mod model;

/// Crash-recovery snapshots and autosave settings
pub mod recovery;

/// Remote persistence seam
pub mod remote;

/// Save orchestration
pub mod save;

/// Autosave scheduling (debounce and backoff)
pub mod scheduler;

/// Immutable draft snapshots
pub mod snapshot;

/// Host UI seams (notifications, confirmation prompts)
pub mod ui;

/// Timer loop for native targets
#[cfg(not(target_arch = "wasm32"))]
pub mod driver;

#[cfg(test)]
pub mod test_utils;
