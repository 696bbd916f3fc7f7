use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::state::SessionHub;

/// Cancellable countdown for the question currently on screen.
///
/// Holds the spawned task and aborts it on drop, so replacing the hub's
/// countdown slot (new question) or clearing it (answer submitted) is the
/// cancellation. A countdown that outlives its question fires into a stale
/// cursor generation and is ignored by the session.
pub(crate) struct Countdown {
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Arm a countdown that expires the question after `budget`.
    ///
    /// The hub is held weakly: dropping the hub kills the timer instead of
    /// the timer keeping the hub alive.
    pub(crate) fn start(budget: Duration, hub: Weak<SessionHub>, generation: u64) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(budget).await;
            if let Some(hub) = hub.upgrade() {
                hub.expire_question(generation).await;
            }
        });
        Self { handle }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
