//! Cross-team leaderboard aggregation over the result store.

use std::sync::Arc;

use async_stream::stream;
use futures::{Stream, StreamExt};
use indexmap::IndexMap;
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;
use uuid::Uuid;

use crate::dao::models::RoundResultEntity;
use crate::dao::result_store::ResultStore;
use crate::dto::scoreboard::{RoundBreakdown, ScoreboardEntry};
use crate::error::ServiceError;

/// Ranks every team of a session from the result store's rows.
///
/// Owns no state of its own: each invocation recomputes from scratch, so
/// correctness depends only on the store's current contents, never on call
/// history. Safe to invoke from any number of concurrent readers.
#[derive(Clone)]
pub struct ScoreboardAggregator {
    store: Arc<dyn ResultStore>,
}

impl ScoreboardAggregator {
    /// Build an aggregator reading from the given store.
    pub fn new(store: Arc<dyn ResultStore>) -> Self {
        Self { store }
    }

    /// Compute the ranked scoreboard for a session.
    ///
    /// Ordering: total score descending, then total time ascending (the
    /// faster team wins the tie). Rows still tied after both keys keep
    /// their first-seen order, which makes repeated invocations over the
    /// same store contents yield identical output.
    pub async fn summarize(&self, session_id: Uuid) -> Result<Vec<ScoreboardEntry>, ServiceError> {
        let rows = self.store.session_results(session_id).await?;
        Ok(rank(rows))
    }

    /// Live scoreboard: yields a fresh summary immediately, then again
    /// after every store change for the session.
    ///
    /// A lagged subscriber recomputes from the store instead of replaying
    /// missed events, so falling behind only delays a refresh.
    pub fn feed(&self, session_id: Uuid) -> impl Stream<Item = Vec<ScoreboardEntry>> + Send + use<> {
        let store = self.store.clone();
        stream! {
            let mut changes = BroadcastStream::new(store.subscribe(session_id));

            match store.session_results(session_id).await {
                Ok(rows) => yield rank(rows),
                Err(err) => warn!(%session_id, error = %err, "scoreboard feed failed initial read"),
            }

            // Lagged errors land here too; every wake-up is a full recompute.
            while changes.next().await.is_some() {
                match store.session_results(session_id).await {
                    Ok(rows) => yield rank(rows),
                    Err(err) => {
                        warn!(%session_id, error = %err, "scoreboard feed failed to refresh");
                    }
                }
            }
        }
    }
}

/// Group rows by team in first-seen order, then sort by the ranking keys.
fn rank(rows: Vec<RoundResultEntity>) -> Vec<ScoreboardEntry> {
    let mut teams: IndexMap<String, ScoreboardEntry> = IndexMap::new();

    for row in rows {
        let entry = teams
            .entry(row.team_name.clone())
            .or_insert_with(|| ScoreboardEntry {
                team_name: row.team_name.clone(),
                total_score: 0,
                total_time: 0.0,
                rounds: Vec::new(),
            });
        entry.total_score += row.score;
        entry.total_time += row.elapsed_seconds;
        entry.rounds.push(RoundBreakdown {
            round: row.round_number,
            score: row.score,
            time: row.elapsed_seconds,
        });
    }

    let mut entries: Vec<ScoreboardEntry> = teams.into_values().collect();
    // Stable sort: rows tied on both keys keep their first-seen order.
    entries.sort_by(|a, b| {
        b.total_score
            .cmp(&a.total_score)
            .then_with(|| a.total_time.total_cmp(&b.total_time))
    });
    entries
}
