use serde::Serialize;

use crate::config::GameRules;
use crate::dao::models::{QuestionKind, RoundResultEntity};
use crate::state::game::{Member, Suit};
use crate::state::machine::SessionPhase;
use crate::state::session::{AnswerOutcome, GameSession};

/// Wire-friendly rendering of the session phase.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhaseView {
    /// Team setup pending.
    NotStarted,
    /// Waiting for the suit pick.
    SuitSelect,
    /// Question stream live.
    RoundInProgress,
    /// Round score settled.
    RoundSettled,
    /// Elimination on display.
    Elimination,
    /// Threshold cleared, no elimination.
    Advance,
    /// Contest over for this team.
    GameOver,
}

impl From<SessionPhase> for PhaseView {
    fn from(value: SessionPhase) -> Self {
        match value {
            SessionPhase::NotStarted => PhaseView::NotStarted,
            SessionPhase::SuitSelect => PhaseView::SuitSelect,
            SessionPhase::RoundInProgress => PhaseView::RoundInProgress,
            SessionPhase::RoundSettled => PhaseView::RoundSettled,
            SessionPhase::Elimination => PhaseView::Elimination,
            SessionPhase::Advance => PhaseView::Advance,
            SessionPhase::GameOver => PhaseView::GameOver,
        }
    }
}

/// Member row for the dashboard roster.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MemberView {
    /// Stable identifier within the team.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the member has fallen.
    pub eliminated: bool,
}

impl From<&Member> for MemberView {
    fn from(value: &Member) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
            eliminated: value.eliminated,
        }
    }
}

/// The question currently on screen. Never carries the correct answer;
/// correctness comes back through [`AnswerFeedback`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QuestionView {
    /// Zero-based position within the round's stream.
    pub index: usize,
    /// Number of questions drawn for the round.
    pub total: usize,
    /// Prompt text.
    pub text: String,
    /// Answer mode.
    pub kind: QuestionKind,
    /// Selectable options; empty for free text.
    pub options: Vec<String>,
}

/// Full presentation-facing snapshot of one team's session.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionSnapshot {
    /// Current phase.
    pub phase: PhaseView,
    /// Team name, once setup has completed.
    pub team_name: Option<String>,
    /// Current round number; 0 before setup.
    pub round: u32,
    /// Display label of the current round, if configured.
    pub round_label: Option<String>,
    /// Number of the last configured round.
    pub total_rounds: u32,
    /// In-round score accumulated so far.
    pub round_score: u32,
    /// Sum of settled round scores.
    pub total_score: u32,
    /// Suit picked for the current round.
    pub suit: Option<Suit>,
    /// Full roster with elimination flags.
    pub members: Vec<MemberView>,
    /// Number of members still in the game.
    pub active_members: usize,
    /// The question on screen, while a round is in progress.
    pub question: Option<QuestionView>,
    /// Members eliminated by the last resolved outcome.
    pub victims: Vec<String>,
}

impl From<&GameSession> for SessionSnapshot {
    fn from(session: &GameSession) -> Self {
        let team = session.team();
        let round_label = session
            .rules()
            .round(session.current_round())
            .and_then(|round| round.label.clone());
        let question = session.current_question().map(|question| QuestionView {
            index: session.question_index(),
            total: session.stream_len(),
            text: question.text.clone(),
            kind: question.kind,
            options: question.options.clone(),
        });

        Self {
            phase: session.phase().into(),
            team_name: team.map(|team| team.name.clone()),
            round: session.current_round(),
            round_label,
            total_rounds: session.rules().last_round_number(),
            round_score: session.round_score(),
            total_score: team.map(|team| team.total_score).unwrap_or(0),
            suit: session.selected_suit(),
            members: team
                .map(|team| team.members.iter().map(MemberView::from).collect())
                .unwrap_or_default(),
            active_members: team.map(|team| team.active_count()).unwrap_or(0),
            question,
            victims: session.last_victims().to_vec(),
        }
    }
}

/// Settled-round summary shown on the round results card.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoundReport {
    /// Round that settled.
    pub round_number: u32,
    /// Points scored.
    pub score: u32,
    /// Maximum reachable score for the round.
    pub max_score: u32,
    /// Threshold the score is judged against.
    pub threshold: u32,
    /// Seconds spent on the round.
    pub elapsed_seconds: f64,
}

impl From<(&RoundResultEntity, &GameRules)> for RoundReport {
    fn from((entity, rules): (&RoundResultEntity, &GameRules)) -> Self {
        let round = rules.round(entity.round_number);
        Self {
            round_number: entity.round_number,
            score: entity.score,
            max_score: round
                .map(|round| round.question_sample as u32 * rules.points_per_correct)
                .unwrap_or(0),
            threshold: round.map(|round| round.score_threshold).unwrap_or(0),
            elapsed_seconds: entity.elapsed_seconds,
        }
    }
}

/// Instant feedback for one consumed question.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnswerFeedback {
    /// Whether the submission matched.
    pub correct: bool,
    /// In-round score after this answer.
    pub round_score: u32,
    /// Present when this answer settled the round.
    pub settled: Option<RoundReport>,
}

impl From<(&AnswerOutcome, &GameRules)> for AnswerFeedback {
    fn from((outcome, rules): (&AnswerOutcome, &GameRules)) -> Self {
        Self {
            correct: outcome.correct,
            round_score: outcome.round_score,
            settled: outcome
                .settled
                .as_ref()
                .map(|entity| RoundReport::from((entity, rules))),
        }
    }
}

/// End-of-game summary for the results screen.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GameReport {
    /// Whether at least one member survived to the end.
    pub won: bool,
    /// Names of the surviving members.
    pub survivors: Vec<String>,
    /// Names of the fallen members.
    pub fallen: Vec<String>,
    /// Sum of settled round scores.
    pub total_score: u32,
    /// Per-round `(score, seconds)` in round order.
    pub rounds: Vec<(u32, f64)>,
}

impl From<&GameSession> for GameReport {
    fn from(session: &GameSession) -> Self {
        let Some(team) = session.team() else {
            return Self {
                won: false,
                survivors: Vec::new(),
                fallen: Vec::new(),
                total_score: 0,
                rounds: Vec::new(),
            };
        };

        let (survivors, fallen): (Vec<_>, Vec<_>) =
            team.members.iter().partition(|member| !member.eliminated);
        Self {
            won: !survivors.is_empty(),
            survivors: survivors.into_iter().map(|m| m.name.clone()).collect(),
            fallen: fallen.into_iter().map(|m| m.name.clone()).collect(),
            total_score: team.total_score,
            rounds: team
                .round_scores
                .iter()
                .copied()
                .zip(team.round_times.iter().copied())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use crate::dao::models::QuestionEntity;
    use crate::state::rng::GameRng;
    use crate::state::session::TeamConfig;

    fn pool() -> Vec<QuestionEntity> {
        (0..5)
            .map(|i| QuestionEntity {
                id: format!("r1q{i}"),
                round_number: 1,
                text: format!("question {i}"),
                kind: QuestionKind::MultipleChoice,
                options: Some(vec!["yes".into(), "no".into()]),
                answer: "yes".into(),
                sort_order: i,
            })
            .collect()
    }

    fn session() -> GameSession {
        let mut session = GameSession::with_rng(
            Uuid::new_v4(),
            GameRules::classic(),
            GameRng::seeded(42),
        );
        session
            .configure(TeamConfig {
                name: "Alpha".into(),
                members: vec!["Ann".into(), "Bo".into(), "Cy".into()],
            })
            .unwrap();
        session
    }

    #[tokio::test]
    async fn snapshot_reflects_a_round_in_progress() {
        let mut session = session();
        session.begin_round(Suit::Hearts, pool()).unwrap();
        session.submit_answer("yes").unwrap();

        let snapshot = SessionSnapshot::from(&session);
        assert_eq!(snapshot.phase, PhaseView::RoundInProgress);
        assert_eq!(snapshot.team_name.as_deref(), Some("Alpha"));
        assert_eq!(snapshot.round, 1);
        assert_eq!(snapshot.round_label.as_deref(), Some("Entry Game"));
        assert_eq!(snapshot.total_rounds, 3);
        assert_eq!(snapshot.round_score, 25);
        assert_eq!(snapshot.suit, Some(Suit::Hearts));
        assert_eq!(snapshot.active_members, 3);

        let question = snapshot.question.unwrap();
        assert_eq!(question.index, 1);
        assert_eq!(question.total, 5);
    }

    #[test]
    fn snapshot_before_setup_is_empty() {
        let session = GameSession::with_rng(
            Uuid::new_v4(),
            GameRules::classic(),
            GameRng::seeded(1),
        );
        let snapshot = SessionSnapshot::from(&session);
        assert_eq!(snapshot.phase, PhaseView::NotStarted);
        assert!(snapshot.team_name.is_none());
        assert!(snapshot.members.is_empty());
        assert!(snapshot.question.is_none());
    }

    #[test]
    fn round_report_computes_max_score() {
        let rules = GameRules::classic();
        let entity = RoundResultEntity {
            session_id: Uuid::new_v4(),
            team_name: "Alpha".into(),
            round_number: 1,
            score: 100,
            elapsed_seconds: 80.0,
        };
        let report = RoundReport::from((&entity, &rules));
        assert_eq!(report.max_score, 125);
        assert_eq!(report.threshold, 50);
    }

    #[tokio::test]
    async fn game_report_partitions_survivors_and_fallen() {
        let mut session = session();
        session.begin_round(Suit::Spades, pool()).unwrap();
        for _ in 0..5 {
            session.submit_answer("no").unwrap();
        }
        session.resolve_outcome().unwrap();

        let report = GameReport::from(&session);
        assert!(report.won);
        assert_eq!(report.survivors.len(), 2);
        assert_eq!(report.fallen.len(), 1);
        assert_eq!(report.rounds, vec![(0, report.rounds[0].1)]);
    }
}
