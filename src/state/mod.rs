/// Runtime domain types: teams, members, questions, suits.
pub mod game;
/// Phase machine guarding round progression.
pub mod machine;
/// Seedable randomness seam.
pub mod rng;
/// Single-writer session core.
pub mod session;
mod timer;

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::dao::models::RoundResultEntity;
use crate::dao::question_store::QuestionStore;
use crate::dao::result_store::ResultStore;
use crate::dto::session::SessionSnapshot;
use crate::error::ServiceError;
use crate::state::game::Suit;
use crate::state::session::{AnswerOutcome, GameSession, RoundOutcome, TeamConfig};
use crate::state::timer::Countdown;

pub use self::machine::{InvalidTransition, SessionEvent, SessionPhase};

/// Shared handle to a team's session hub.
pub type SharedHub = Arc<SessionHub>;

/// Async facade around one team's [`GameSession`].
///
/// Serializes all mutation behind a mutex (the session itself is strictly
/// single-writer), fetches question pools, persists settled rounds, and
/// owns the per-question countdown. One hub exists per team; hubs never
/// see each other, and the result store is their only common ground.
pub struct SessionHub {
    session: Mutex<GameSession>,
    question_store: Arc<dyn QuestionStore>,
    result_store: Arc<dyn ResultStore>,
    countdown: Mutex<Option<Countdown>>,
    question_time_budget: Duration,
    weak_self: Weak<SessionHub>,
}

impl SessionHub {
    /// Wrap a session together with its collaborating stores.
    pub fn new(
        session: GameSession,
        question_store: Arc<dyn QuestionStore>,
        result_store: Arc<dyn ResultStore>,
    ) -> SharedHub {
        let question_time_budget = session.rules().question_time_budget;
        Arc::new_cyclic(|weak| Self {
            session: Mutex::new(session),
            question_store,
            result_store,
            countdown: Mutex::new(None),
            question_time_budget,
            weak_self: weak.clone(),
        })
    }

    /// Validate team setup and open the first round's suit pick.
    pub async fn configure(&self, config: TeamConfig) -> Result<(), ServiceError> {
        self.session.lock().await.configure(config)
    }

    /// Record the suit pick, draw the round's stream, and arm the first
    /// question's countdown.
    pub async fn select_suit(&self, suit: Suit) -> Result<(), ServiceError> {
        let (session_id, round) = {
            let session = self.session.lock().await;
            (session.session_id(), session.current_round())
        };
        let pool = self
            .question_store
            .round_questions(session_id, round)
            .await?;

        let generation = {
            let mut session = self.session.lock().await;
            session.begin_round(suit, pool)?;
            session.cursor_generation()
        };
        self.arm_countdown(generation).await;
        Ok(())
    }

    /// Evaluate a submission, cancel the question's countdown, and either
    /// arm the next question or persist the settled round.
    pub async fn submit_answer(&self, submitted: &str) -> Result<AnswerOutcome, ServiceError> {
        self.disarm_countdown().await;

        let (outcome, generation, in_round) = {
            let mut session = self.session.lock().await;
            let outcome = session.submit_answer(submitted)?;
            let in_round = session.phase() == SessionPhase::RoundInProgress;
            (outcome, session.cursor_generation(), in_round)
        };

        if let Some(row) = &outcome.settled {
            self.persist_result(row.clone()).await;
        } else if in_round {
            self.arm_countdown(generation).await;
        }
        Ok(outcome)
    }

    /// Compare the settled round against its threshold.
    pub async fn resolve_outcome(&self) -> Result<RoundOutcome, ServiceError> {
        self.session.lock().await.resolve_outcome()
    }

    /// Dismiss the post-round display, ending the game or opening the next
    /// round.
    pub async fn acknowledge_elimination(&self) -> Result<SessionPhase, ServiceError> {
        self.session.lock().await.acknowledge_elimination()
    }

    /// Discard all live state and return to setup.
    pub async fn reset(&self) {
        self.disarm_countdown().await;
        self.session.lock().await.reset();
    }

    /// Current phase of the underlying session.
    pub async fn phase(&self) -> SessionPhase {
        self.session.lock().await.phase()
    }

    /// Presentation-facing snapshot of the whole session.
    pub async fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(&*self.session.lock().await)
    }

    /// Countdown callback: consume the question without credit if it is
    /// still the one the timer was armed for.
    ///
    /// The generation check makes a stale expiry inert, so the countdown
    /// fires meaningfully at most once per question.
    pub(crate) async fn expire_question(&self, generation: u64) {
        let (outcome, next_generation, in_round) = {
            let mut session = self.session.lock().await;
            if session.cursor_generation() != generation {
                return;
            }
            let Some(outcome) = session.time_expire() else {
                return;
            };
            let in_round = session.phase() == SessionPhase::RoundInProgress;
            (outcome, session.cursor_generation(), in_round)
        };

        if let Some(row) = outcome.settled {
            self.persist_result(row).await;
        } else if in_round {
            self.arm_countdown(next_generation).await;
        }
    }

    /// Write a settled round to the result store, downgrading failure to a
    /// warning: losing a leaderboard row must not stall the session.
    async fn persist_result(&self, row: RoundResultEntity) {
        if let Err(err) = self.result_store.append(row.clone()).await {
            warn!(
                team = %row.team_name,
                round = row.round_number,
                error = %err,
                "failed to persist round result; session continues on local score"
            );
        }
    }

    async fn arm_countdown(&self, generation: u64) {
        let countdown = Countdown::start(
            self.question_time_budget,
            self.weak_self.clone(),
            generation,
        );
        *self.countdown.lock().await = Some(countdown);
    }

    async fn disarm_countdown(&self) {
        self.countdown.lock().await.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use std::io;
    use tokio::sync::broadcast;

    use crate::config::GameRules;
    use crate::dao::models::{QuestionEntity, QuestionKind};
    use crate::dao::question_store::MemoryQuestionStore;
    use crate::dao::result_store::{MemoryResultStore, ResultChange};
    use crate::dao::storage::{StorageError, StorageResult};
    use crate::state::rng::GameRng;

    fn question(id: &str, round: u32) -> QuestionEntity {
        QuestionEntity {
            id: id.into(),
            round_number: round,
            text: format!("question {id}"),
            kind: QuestionKind::MultipleChoice,
            options: Some(vec!["yes".into(), "no".into()]),
            answer: "yes".into(),
            sort_order: 0,
        }
    }

    fn seed_questions(store: &MemoryQuestionStore, session_id: Uuid) {
        let mut all = Vec::new();
        for round in 1..=3 {
            for index in 0..5 {
                all.push(question(&format!("r{round}q{index}"), round));
            }
        }
        store.install(session_id, all);
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }

    async fn configured_hub(
        session_id: Uuid,
        result_store: Arc<dyn ResultStore>,
    ) -> SharedHub {
        init_tracing();
        let question_store = MemoryQuestionStore::new();
        seed_questions(&question_store, session_id);
        let session =
            GameSession::with_rng(session_id, GameRules::classic(), GameRng::seeded(42));
        let hub = SessionHub::new(session, Arc::new(question_store), result_store);
        hub.configure(TeamConfig {
            name: "Alpha".into(),
            members: vec!["Ann".into(), "Bo".into(), "Cy".into()],
        })
        .await
        .unwrap();
        hub
    }

    async fn wait_for_phase(hub: &SharedHub, phase: SessionPhase) {
        tokio::time::timeout(Duration::from_secs(600), async {
            loop {
                if hub.phase().await == phase {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("session never reached the expected phase");
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_expiry_settles_an_unanswered_round() {
        let result_store = Arc::new(MemoryResultStore::new());
        let session_id = Uuid::new_v4();
        let hub = configured_hub(session_id, result_store.clone()).await;

        hub.select_suit(Suit::Spades).await.unwrap();
        // Let the five countdowns burn down with no answers at all.
        wait_for_phase(&hub, SessionPhase::RoundSettled).await;

        let rows = result_store.session_results(session_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].score, 0);
        assert_eq!(rows[0].round_number, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn answering_cancels_the_pending_countdown() {
        let result_store = Arc::new(MemoryResultStore::new());
        let session_id = Uuid::new_v4();
        let hub = configured_hub(session_id, result_store.clone()).await;

        hub.select_suit(Suit::Spades).await.unwrap();
        for _ in 0..5 {
            hub.submit_answer("yes").await.unwrap();
        }
        assert_eq!(hub.phase().await, SessionPhase::RoundSettled);

        // A stale countdown firing now must not disturb the settled round.
        tokio::time::advance(Duration::from_secs(120)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(hub.phase().await, SessionPhase::RoundSettled);

        let rows = result_store.session_results(session_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].score, 125);
    }

    #[tokio::test(start_paused = true)]
    async fn full_round_trip_persists_and_advances() {
        let result_store = Arc::new(MemoryResultStore::new());
        let session_id = Uuid::new_v4();
        let hub = configured_hub(session_id, result_store.clone()).await;

        hub.select_suit(Suit::Hearts).await.unwrap();
        for _ in 0..4 {
            hub.submit_answer("yes").await.unwrap();
        }
        let outcome = hub.submit_answer("no").await.unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.round_score, 100);

        assert_eq!(hub.resolve_outcome().await.unwrap(), RoundOutcome::Advanced);
        assert_eq!(
            hub.acknowledge_elimination().await.unwrap(),
            SessionPhase::SuitSelect
        );

        let snapshot = hub.snapshot().await;
        assert_eq!(snapshot.round, 2);
        assert_eq!(snapshot.total_score, 100);
    }

    struct FailingResultStore {
        changes: broadcast::Sender<ResultChange>,
    }

    impl FailingResultStore {
        fn new() -> Self {
            Self {
                changes: broadcast::channel(1).0,
            }
        }
    }

    impl ResultStore for FailingResultStore {
        fn append(&self, _result: RoundResultEntity) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async {
                Err(StorageError::unavailable(
                    "result store offline".into(),
                    io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
                ))
            })
        }

        fn session_results(
            &self,
            _session_id: Uuid,
        ) -> BoxFuture<'static, StorageResult<Vec<RoundResultEntity>>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn subscribe(&self, _session_id: Uuid) -> broadcast::Receiver<ResultChange> {
            self.changes.subscribe()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn store_failure_does_not_block_the_session() {
        let session_id = Uuid::new_v4();
        let hub = configured_hub(session_id, Arc::new(FailingResultStore::new())).await;

        hub.select_suit(Suit::Clubs).await.unwrap();
        for _ in 0..5 {
            hub.submit_answer("no").await.unwrap();
        }

        // The write failed, but the outcome decision still runs on the
        // locally computed score.
        let outcome = hub.resolve_outcome().await.unwrap();
        assert!(matches!(outcome, RoundOutcome::Eliminated { .. }));
        assert_eq!(
            hub.acknowledge_elimination().await.unwrap(),
            SessionPhase::SuitSelect
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reset_disarms_the_countdown() {
        let result_store = Arc::new(MemoryResultStore::new());
        let session_id = Uuid::new_v4();
        let hub = configured_hub(session_id, result_store.clone()).await;

        hub.select_suit(Suit::Diamonds).await.unwrap();
        hub.reset().await;
        assert_eq!(hub.phase().await, SessionPhase::NotStarted);

        tokio::time::advance(Duration::from_secs(120)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(hub.phase().await, SessionPhase::NotStarted);
        assert!(
            result_store
                .session_results(session_id)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
