use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::dao::result_store::ResultChange;

/// Per-session broadcast hub used to fan out result-store changes.
///
/// Senders are created lazily on first subscription or notification and
/// kept for the lifetime of the hub; delivery errors (no live receivers)
/// are ignored.
pub struct ChangeHub {
    capacity: usize,
    channels: DashMap<Uuid, broadcast::Sender<ResultChange>>,
}

impl ChangeHub {
    /// Construct a hub whose per-session channels buffer `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            channels: DashMap::new(),
        }
    }

    /// Register a new subscriber for the session's change feed.
    pub fn subscribe(&self, session_id: Uuid) -> broadcast::Receiver<ResultChange> {
        self.sender(session_id).subscribe()
    }

    /// Notify the session's subscribers, ignoring delivery errors.
    pub fn notify(&self, change: ResultChange) {
        let _ = self.sender(change.session_id).send(change);
    }

    fn sender(&self, session_id: Uuid) -> broadcast::Sender<ResultChange> {
        self.channels
            .entry(session_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(session_id: Uuid, round: u32) -> ResultChange {
        ResultChange {
            session_id,
            team_name: "Alpha".into(),
            round_number: round,
        }
    }

    #[tokio::test]
    async fn subscriber_receives_notification() {
        let hub = ChangeHub::new(8);
        let session = Uuid::new_v4();

        let mut rx = hub.subscribe(session);
        hub.notify(change(session, 1));

        assert_eq!(rx.recv().await.unwrap(), change(session, 1));
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let hub = ChangeHub::new(8);
        let session_a = Uuid::new_v4();
        let session_b = Uuid::new_v4();

        let mut rx_a = hub.subscribe(session_a);
        hub.notify(change(session_b, 1));
        hub.notify(change(session_a, 2));

        assert_eq!(rx_a.recv().await.unwrap(), change(session_a, 2));
    }

    #[test]
    fn notify_without_subscribers_is_silent() {
        let hub = ChangeHub::new(8);
        hub.notify(change(Uuid::new_v4(), 1));
    }
}
