//! Host UI seams: notifications and confirmation prompts.
//!
//! Purely observational; the engine's correctness never depends on a
//! notification being delivered. The single blocking interaction is the
//! recovery confirmation at load time.

/// Category of a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyKind {
    /// Neutral information (e.g. autosave toggled)
    Info,
    /// Operation succeeded
    Success,
    /// Operation failed or will be retried
    Error,
    /// Long-running operation in progress. Carries a stable id so the host
    /// can replace the notification when the operation resolves.
    Loading(String),
}

/// Receives user-facing notifications from the engine.
pub trait Notifier: Send + Sync {
    /// Surface a notification to the user.
    fn notify(&self, kind: NotifyKind, message: &str);
}

/// Asks the user a yes/no question.
///
/// Used exactly once per load, when a local recovery snapshot is newer than
/// the remote copy.
pub trait ConfirmPrompt: Send + Sync {
    /// Present `message` and return the user's answer.
    fn confirm(&self, message: &str) -> bool;
}

/// A UI that drops notifications and declines every prompt.
///
/// Declining is the conservative default for recovery prompts: the remote
/// copy wins and the local snapshot is discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentUi;

impl Notifier for SilentUi {
    fn notify(&self, _kind: NotifyKind, _message: &str) {}
}

impl ConfirmPrompt for SilentUi {
    fn confirm(&self, _message: &str) -> bool {
        false
    }
}
