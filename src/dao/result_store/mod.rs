mod hub;
/// In-memory result store backend.
pub mod memory;

use futures::future::BoxFuture;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::dao::models::RoundResultEntity;
use crate::dao::storage::StorageResult;

pub use self::hub::ChangeHub;
pub use self::memory::MemoryResultStore;

/// Notification emitted whenever a round result lands in the store.
///
/// Carries just enough to identify the new row; consumers are expected to
/// recompute from the store rather than patch incrementally, so a lost or
/// lagged notification only delays the next refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultChange {
    /// Session the new row belongs to.
    pub session_id: Uuid,
    /// Team the new row belongs to.
    pub team_name: String,
    /// Round the new row settles.
    pub round_number: u32,
}

/// Abstraction over the durable, append-only record of settled rounds.
///
/// Many sessions write independently; rows are disjoint by
/// `(session, team, round)` so no cross-writer coordination is required.
/// Reads observe a point-in-time snapshot and may race in-flight writes.
pub trait ResultStore: Send + Sync {
    /// Append a single settled-round row. Rows are never updated or deleted.
    fn append(&self, result: RoundResultEntity) -> BoxFuture<'static, StorageResult<()>>;

    /// Fetch every row recorded for the session, in insertion order.
    ///
    /// Callers must not rely on this ordering for correctness; it is a
    /// display convenience only.
    fn session_results(
        &self,
        session_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<RoundResultEntity>>>;

    /// Subscribe to change notifications for one session.
    ///
    /// Backends without push support may return a receiver that never
    /// fires; consumers are free to poll instead.
    fn subscribe(&self, session_id: Uuid) -> broadcast::Receiver<ResultChange>;
}
