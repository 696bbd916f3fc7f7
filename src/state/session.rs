use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::config::{GameRules, RoundRules};
use crate::dao::models::{QuestionEntity, RoundResultEntity};
use crate::error::ServiceError;
use crate::services::{elimination, score};
use crate::state::game::{Question, Suit, Team};
use crate::state::machine::{SessionEvent, SessionMachine, SessionPhase};
use crate::state::rng::GameRng;

/// Team setup input, as captured by the presentation layer.
///
/// Normalized before validation: names are trimmed and blank member rows
/// dropped, matching what the setup form lets players type.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TeamConfig {
    /// Team display name.
    #[validate(length(min = 1, message = "team name must not be empty"))]
    pub name: String,
    /// Member display names, three to six of them.
    #[validate(length(min = 3, max = 6, message = "a team needs 3 to 6 members"))]
    pub members: Vec<String>,
}

impl TeamConfig {
    fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            members: self
                .members
                .into_iter()
                .map(|member| member.trim().to_string())
                .filter(|member| !member.is_empty())
                .collect(),
        }
    }
}

/// Result of consuming one question, returned for instant feedback.
///
/// This is a side-effecting query: each call consumes exactly one question
/// of the round stream, so the presentation layer must invoke it at most
/// once per question.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    /// Whether the submission matched the correct answer.
    pub correct: bool,
    /// In-round score after this answer.
    pub round_score: u32,
    /// The settled row when this answer exhausted the stream; the hub
    /// persists it to the result store.
    pub settled: Option<RoundResultEntity>,
}

/// Outcome of comparing a settled round against its threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Threshold cleared; nobody is eliminated.
    Advanced,
    /// Threshold missed; the named members were eliminated.
    Eliminated {
        /// Victims in pick order. Empty when only one member was left.
        victims: Vec<String>,
    },
}

/// Live state of one team's run through the contest.
///
/// Single-writer: all operations are invoked sequentially by one driver
/// (see [`crate::state::SessionHub`] for the shared async facade). The
/// session knows nothing about other teams; the result store is the only
/// bridge to the cross-team scoreboard.
#[derive(Debug)]
pub struct GameSession {
    session_id: Uuid,
    rules: GameRules,
    machine: SessionMachine,
    rng: GameRng,
    team: Option<Team>,
    current_round: u32,
    selected_suit: Option<Suit>,
    stream: Vec<Question>,
    cursor: usize,
    cursor_generation: u64,
    round_score: u32,
    round_started_at: Option<Instant>,
    last_victims: Vec<String>,
}

impl GameSession {
    /// Build a fresh session wired to OS entropy.
    pub fn new(session_id: Uuid, rules: GameRules) -> Self {
        Self::with_rng(session_id, rules, GameRng::from_entropy())
    }

    /// Build a fresh session with an explicit random source.
    pub fn with_rng(session_id: Uuid, rules: GameRules, rng: GameRng) -> Self {
        Self {
            session_id,
            rules,
            machine: SessionMachine::new(),
            rng,
            team: None,
            current_round: 0,
            selected_suit: None,
            stream: Vec::new(),
            cursor: 0,
            cursor_generation: 0,
            round_score: 0,
            round_started_at: None,
            last_victims: Vec::new(),
        }
    }

    /// Validate team setup and open the first round.
    ///
    /// Fails with [`ServiceError::InvalidInput`] on an empty name or fewer
    /// than three non-blank members; nothing is mutated on failure.
    pub fn configure(&mut self, config: TeamConfig) -> Result<(), ServiceError> {
        let config = config.normalized();
        config.validate()?;

        self.machine.apply(SessionEvent::TeamConfigured)?;
        info!(team = %config.name, members = config.members.len(), "team configured");
        self.team = Some(Team::new(config.name, config.members));
        self.current_round = 1;
        Ok(())
    }

    /// Record the suit pick and draw the round's question stream.
    ///
    /// The candidate pool is filtered to the current round, shuffled, and
    /// truncated to the round's sample size. An empty pool is a hard stop
    /// ([`ServiceError::NoQuestions`]) and leaves the phase unchanged.
    pub fn begin_round(
        &mut self,
        suit: Suit,
        pool: Vec<QuestionEntity>,
    ) -> Result<&Question, ServiceError> {
        self.ensure_phase(SessionPhase::SuitSelect, "start a round")?;
        let round = self.current_round;
        let sample = self.round_rules()?.question_sample;

        let mut candidates: Vec<Question> = pool
            .into_iter()
            .filter(|entity| entity.round_number == round)
            .map(Question::from)
            .collect();
        if candidates.is_empty() {
            return Err(ServiceError::NoQuestions { round });
        }

        self.rng.shuffle(&mut candidates);
        candidates.truncate(sample);

        self.machine.apply(SessionEvent::RoundStarted)?;
        debug!(round, questions = candidates.len(), suit = ?suit, "round started");
        self.selected_suit = Some(suit);
        self.stream = candidates;
        self.cursor = 0;
        self.cursor_generation += 1;
        self.round_score = 0;
        self.round_started_at = Some(Instant::now());

        Ok(&self.stream[0])
    }

    /// Evaluate a submission against the current question and advance.
    ///
    /// Consumes exactly one question per call; exhausting the stream
    /// settles the round and hands back the row to persist.
    pub fn submit_answer(&mut self, submitted: &str) -> Result<AnswerOutcome, ServiceError> {
        self.ensure_phase(SessionPhase::RoundInProgress, "submit an answer")?;

        let question = &self.stream[self.cursor];
        let correct = score::matches(question, submitted);
        self.round_score += score::delta(question, submitted, self.rules.points_per_correct);

        self.advance_cursor(correct)
    }

    /// Consume the current question without credit when its timer lapses.
    ///
    /// A no-op outside [`SessionPhase::RoundInProgress`]: an expiry racing
    /// a submitted answer (or a settled round) must not double-advance.
    pub fn time_expire(&mut self) -> Option<AnswerOutcome> {
        if self.machine.phase() != SessionPhase::RoundInProgress {
            return None;
        }
        debug!(round = self.current_round, question = self.cursor, "question timed out");
        self.advance_cursor(false).ok()
    }

    fn advance_cursor(&mut self, correct: bool) -> Result<AnswerOutcome, ServiceError> {
        self.cursor += 1;
        self.cursor_generation += 1;

        let settled = if self.cursor >= self.stream.len() {
            Some(self.settle_round()?)
        } else {
            None
        };

        Ok(AnswerOutcome {
            correct,
            round_score: self.round_score,
            settled,
        })
    }

    /// Append the in-round score to history and build the row to persist.
    fn settle_round(&mut self) -> Result<RoundResultEntity, ServiceError> {
        self.machine.apply(SessionEvent::StreamExhausted)?;

        let elapsed_seconds = self
            .round_started_at
            .take()
            .map(|started| started.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        let round_score = self.round_score;
        let session_id = self.session_id;
        let round_number = self.current_round;

        let team = self.team_mut()?;
        team.round_scores.push(round_score);
        team.round_times.push(elapsed_seconds);
        team.total_score += round_score;

        let entity = RoundResultEntity {
            session_id,
            team_name: team.name.clone(),
            round_number,
            score: round_score,
            elapsed_seconds,
        };
        info!(
            team = %entity.team_name,
            round = entity.round_number,
            score = entity.score,
            "round settled"
        );
        Ok(entity)
    }

    /// Compare the settled score against the round threshold and either
    /// eliminate members or let the team advance unscathed.
    pub fn resolve_outcome(&mut self) -> Result<RoundOutcome, ServiceError> {
        self.ensure_phase(SessionPhase::RoundSettled, "resolve the round outcome")?;
        let round = self.round_rules()?.clone();

        if self.round_score >= round.score_threshold {
            self.machine
                .apply(SessionEvent::OutcomeResolved { eliminated: false })?;
            return Ok(RoundOutcome::Advanced);
        }

        let team = self
            .team
            .as_mut()
            .ok_or_else(|| ServiceError::InvalidState("no team is configured".into()))?;
        let victims = elimination::eliminate(team, round.elimination_count, &mut self.rng);

        self.machine
            .apply(SessionEvent::OutcomeResolved { eliminated: true })?;
        self.last_victims = victims.clone();
        Ok(RoundOutcome::Eliminated { victims })
    }

    /// Dismiss the post-round display and move on.
    ///
    /// Ends the game when the last configured round just settled or fewer
    /// than two members remain active; otherwise opens the next round's
    /// suit pick.
    pub fn acknowledge_elimination(&mut self) -> Result<SessionPhase, ServiceError> {
        let phase = self.machine.phase();
        if phase != SessionPhase::Elimination && phase != SessionPhase::Advance {
            return Err(ServiceError::InvalidState(format!(
                "cannot acknowledge the round outcome while in {phase:?}"
            )));
        }

        let last_round = self.current_round >= self.rules.last_round_number();
        let survivors = self.team.as_ref().map(Team::active_count).unwrap_or(0);
        let game_over = last_round || survivors < 2;

        let next = self
            .machine
            .apply(SessionEvent::Acknowledged { game_over })?;
        self.last_victims.clear();
        self.selected_suit = None;
        self.stream.clear();
        self.cursor = 0;

        if game_over {
            info!(round = self.current_round, survivors, "game over");
        } else {
            self.current_round += 1;
        }
        Ok(next)
    }

    /// Discard all live state and return to the setup screen.
    pub fn reset(&mut self) {
        self.machine.reset();
        self.team = None;
        self.current_round = 0;
        self.selected_suit = None;
        self.stream.clear();
        self.cursor = 0;
        self.cursor_generation += 1;
        self.round_score = 0;
        self.round_started_at = None;
        self.last_victims.clear();
    }

    /// Current phase of the session.
    pub fn phase(&self) -> SessionPhase {
        self.machine.phase()
    }

    /// Session the team is playing in.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Contest format the session runs under.
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// The configured team, if setup has completed.
    pub fn team(&self) -> Option<&Team> {
        self.team.as_ref()
    }

    /// Current round number; 0 before setup completes.
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Settings for the current round.
    pub fn round_rules(&self) -> Result<&RoundRules, ServiceError> {
        self.rules.round(self.current_round).ok_or_else(|| {
            ServiceError::InvalidState(format!("round {} is not configured", self.current_round))
        })
    }

    /// In-round score accumulated so far.
    pub fn round_score(&self) -> u32 {
        self.round_score
    }

    /// The cosmetic suit picked for the current round.
    pub fn selected_suit(&self) -> Option<Suit> {
        self.selected_suit
    }

    /// The question the cursor points at, while a round is in progress.
    pub fn current_question(&self) -> Option<&Question> {
        if self.machine.phase() != SessionPhase::RoundInProgress {
            return None;
        }
        self.stream.get(self.cursor)
    }

    /// Zero-based index of the current question within the stream.
    pub fn question_index(&self) -> usize {
        self.cursor
    }

    /// Number of questions drawn for the current round.
    pub fn stream_len(&self) -> usize {
        self.stream.len()
    }

    /// Monotonic counter bumped every time the cursor moves or a stream is
    /// drawn; countdown timers use it to detect stale expiries.
    pub fn cursor_generation(&self) -> u64 {
        self.cursor_generation
    }

    /// Members eliminated by the last resolved outcome, for display.
    pub fn last_victims(&self) -> &[String] {
        &self.last_victims
    }

    fn ensure_phase(&self, expected: SessionPhase, action: &str) -> Result<(), ServiceError> {
        let phase = self.machine.phase();
        if phase != expected {
            return Err(ServiceError::InvalidState(format!(
                "cannot {action} while in {phase:?}"
            )));
        }
        Ok(())
    }

    fn team_mut(&mut self) -> Result<&mut Team, ServiceError> {
        self.team
            .as_mut()
            .ok_or_else(|| ServiceError::InvalidState("no team is configured".into()))
    }
}
