//! Native autosave driver.
//!
//! The engine itself owns no timers; [`AutosaveScheduler`] only exposes
//! deadlines. This module supplies the timer loop for native targets: a
//! coarse tokio tick that pumps the controller, so armed debounce and
//! backoff deadlines fire without the host wiring its own loop. WASM hosts
//! drive [`DraftController::pump`] from their own event loop instead.
//!
//! [`AutosaveScheduler`]: crate::scheduler::AutosaveScheduler
//! [`DraftController::pump`]: crate::controller::DraftController::pump

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::sync::oneshot;
use tokio::time::sleep;

use crate::controller::DraftController;
use crate::kv::KeyValueStore;
use crate::remote::CourseStore;
use crate::ui::{ConfirmPrompt, Notifier};

/// Poll granularity. Deadlines are checked by the controller, so the tick
/// only bounds how late a save can start after its deadline.
const TICK_MS: u64 = 500;

/// Milliseconds between retry-countdown notifications.
const COUNTDOWN_MS: i64 = 1_000;

/// Drive autosave for `controller` until `shutdown` fires.
///
/// On shutdown the controller is torn down: one best-effort save if unsaved
/// changes remain, then all timers are cancelled. The task holds the lock
/// only while pumping, so the host can keep editing through the same
/// `Arc<Mutex<_>>` between ticks.
pub async fn run_autosave<R, S, U>(
    controller: Arc<Mutex<DraftController<R, S, U>>>,
    mut shutdown: oneshot::Receiver<()>,
) where
    R: CourseStore,
    S: KeyValueStore,
    U: Notifier + ConfirmPrompt,
{
    let mut last_countdown = 0i64;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                log::debug!("[Driver] Shutdown; tearing down controller");
                controller.lock().await.teardown().await;
                return;
            }
            _ = sleep(Duration::from_millis(TICK_MS)) => {
                let mut controller = controller.lock().await;
                controller.pump().await;
                let now = controller.now_ms();
                if now - last_countdown >= COUNTDOWN_MS {
                    controller.emit_retry_countdown();
                    last_countdown = now;
                }
            }
        }
    }
}
