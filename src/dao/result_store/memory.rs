use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::dao::models::RoundResultEntity;
use crate::dao::result_store::{ChangeHub, ResultChange, ResultStore};
use crate::dao::storage::StorageResult;

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// In-memory [`ResultStore`] backend.
///
/// The shipped backend: rows live in a concurrent map keyed by session and
/// every append fans out a [`ResultChange`] through the embedded hub. Real
/// database backends would implement the same trait at this seam.
#[derive(Clone)]
pub struct MemoryResultStore {
    rows: Arc<DashMap<Uuid, Vec<RoundResultEntity>>>,
    changes: Arc<ChangeHub>,
}

impl MemoryResultStore {
    /// Construct an empty store.
    pub fn new() -> Self {
        Self {
            rows: Arc::new(DashMap::new()),
            changes: Arc::new(ChangeHub::new(CHANGE_CHANNEL_CAPACITY)),
        }
    }
}

impl Default for MemoryResultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultStore for MemoryResultStore {
    fn append(&self, result: RoundResultEntity) -> BoxFuture<'static, StorageResult<()>> {
        let rows = self.rows.clone();
        let changes = self.changes.clone();
        Box::pin(async move {
            let change = ResultChange {
                session_id: result.session_id,
                team_name: result.team_name.clone(),
                round_number: result.round_number,
            };
            rows.entry(result.session_id).or_default().push(result);
            changes.notify(change);
            Ok(())
        })
    }

    fn session_results(
        &self,
        session_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<RoundResultEntity>>> {
        let rows = self.rows.clone();
        Box::pin(async move {
            Ok(rows
                .get(&session_id)
                .map(|entry| entry.clone())
                .unwrap_or_default())
        })
    }

    fn subscribe(&self, session_id: Uuid) -> broadcast::Receiver<ResultChange> {
        self.changes.subscribe(session_id)
    }
}
