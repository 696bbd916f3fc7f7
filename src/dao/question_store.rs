use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::QuestionEntity;
use crate::dao::storage::StorageResult;

/// Abstraction over the question bank backing a game session.
///
/// The bank itself (editing, import) is outside the core; sessions only
/// ever read the candidate pool for one round at a time.
pub trait QuestionStore: Send + Sync {
    /// Fetch the candidate questions for a session round, ordered by
    /// `sort_order`.
    ///
    /// The ordering is a display convenience; the session shuffles the
    /// pool before sampling and must not rely on it.
    fn round_questions(
        &self,
        session_id: Uuid,
        round_number: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>>;
}

/// In-memory [`QuestionStore`] seeded with a session's full question set.
///
/// The identity/session bootstrap (join code resolution) hands the core a
/// ready question set; this backend just serves per-round slices of it.
#[derive(Clone)]
pub struct MemoryQuestionStore {
    questions: Arc<DashMap<Uuid, Vec<QuestionEntity>>>,
}

impl MemoryQuestionStore {
    /// Construct an empty store.
    pub fn new() -> Self {
        Self {
            questions: Arc::new(DashMap::new()),
        }
    }

    /// Install the question set for a session, replacing any previous one.
    pub fn install(&self, session_id: Uuid, questions: Vec<QuestionEntity>) {
        self.questions.insert(session_id, questions);
    }
}

impl Default for MemoryQuestionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionStore for MemoryQuestionStore {
    fn round_questions(
        &self,
        session_id: Uuid,
        round_number: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<QuestionEntity>>> {
        let questions = self.questions.clone();
        Box::pin(async move {
            let mut pool: Vec<QuestionEntity> = questions
                .get(&session_id)
                .map(|entry| {
                    entry
                        .iter()
                        .filter(|question| question.round_number == round_number)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            pool.sort_by_key(|question| question.sort_order);
            Ok(pool)
        })
    }
}
