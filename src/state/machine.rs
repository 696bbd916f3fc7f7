use thiserror::Error;

/// Phases a team's play session moves through.
///
/// The presentation layer drives the session strictly forward; the only
/// backwards edge is an explicit reset to [`SessionPhase::NotStarted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Team setup has not completed; nothing is playable yet.
    NotStarted,
    /// Waiting for the cosmetic suit pick that opens the round.
    SuitSelect,
    /// The round's question stream is live and accepting answers.
    RoundInProgress,
    /// The stream is exhausted and the round score is settled.
    RoundSettled,
    /// The settled score fell short; eliminated members are on display.
    Elimination,
    /// The settled score cleared the threshold; no one is eliminated.
    Advance,
    /// The contest ended for this team, by survival or by attrition.
    GameOver,
}

/// Events that can be applied to the session phase machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Team setup validated; the first round can open.
    TeamConfigured,
    /// Suit picked and the round's question stream drawn.
    RoundStarted,
    /// The question cursor consumed the last question of the stream.
    StreamExhausted,
    /// The settled score was compared against the round threshold.
    OutcomeResolved {
        /// Whether the comparison triggered an elimination.
        eliminated: bool,
    },
    /// The post-round display was dismissed.
    Acknowledged {
        /// Whether the contest is over instead of opening another round.
        game_over: bool,
    },
    /// Discard all live state and return to setup.
    Reset,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the machine was in when the invalid event was received.
    pub from: SessionPhase,
    /// The event that cannot be applied from this phase.
    pub event: SessionEvent,
}

/// Phase machine guarding the session's round progression.
///
/// Owned by exactly one [`crate::state::session::GameSession`]; all
/// mutation happens through [`SessionMachine::apply`], which rejects any
/// event not legal for the current phase.
#[derive(Debug, Clone)]
pub struct SessionMachine {
    phase: SessionPhase,
    version: usize,
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self {
            phase: SessionPhase::NotStarted,
            version: 0,
        }
    }
}

impl SessionMachine {
    /// Create a new machine initialised in the not-started phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Number of transitions applied so far.
    pub fn version(&self) -> usize {
        self.version
    }

    /// Apply an event, moving the machine to the next phase.
    pub fn apply(&mut self, event: SessionEvent) -> Result<SessionPhase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.phase = next;
        self.version += 1;
        Ok(self.phase)
    }

    /// Shorthand for [`SessionEvent::Reset`], which is valid from any phase.
    pub fn reset(&mut self) {
        self.phase = SessionPhase::NotStarted;
        self.version += 1;
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: SessionEvent) -> Result<SessionPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (SessionPhase::NotStarted, SessionEvent::TeamConfigured) => SessionPhase::SuitSelect,
            (SessionPhase::SuitSelect, SessionEvent::RoundStarted) => SessionPhase::RoundInProgress,
            (SessionPhase::RoundInProgress, SessionEvent::StreamExhausted) => {
                SessionPhase::RoundSettled
            }
            (SessionPhase::RoundSettled, SessionEvent::OutcomeResolved { eliminated: true }) => {
                SessionPhase::Elimination
            }
            (SessionPhase::RoundSettled, SessionEvent::OutcomeResolved { eliminated: false }) => {
                SessionPhase::Advance
            }
            (
                SessionPhase::Elimination | SessionPhase::Advance,
                SessionEvent::Acknowledged { game_over: true },
            ) => SessionPhase::GameOver,
            (
                SessionPhase::Elimination | SessionPhase::Advance,
                SessionEvent::Acknowledged { game_over: false },
            ) => SessionPhase::SuitSelect,
            (_, SessionEvent::Reset) => SessionPhase::NotStarted,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(machine: &mut SessionMachine, event: SessionEvent) -> SessionPhase {
        machine.apply(event).unwrap()
    }

    #[test]
    fn initial_phase_is_not_started() {
        let machine = SessionMachine::new();
        assert_eq!(machine.phase(), SessionPhase::NotStarted);
        assert_eq!(machine.version(), 0);
    }

    #[test]
    fn full_happy_path_through_survival() {
        let mut machine = SessionMachine::new();

        assert_eq!(
            apply(&mut machine, SessionEvent::TeamConfigured),
            SessionPhase::SuitSelect
        );
        assert_eq!(
            apply(&mut machine, SessionEvent::RoundStarted),
            SessionPhase::RoundInProgress
        );
        assert_eq!(
            apply(&mut machine, SessionEvent::StreamExhausted),
            SessionPhase::RoundSettled
        );
        assert_eq!(
            apply(&mut machine, SessionEvent::OutcomeResolved { eliminated: false }),
            SessionPhase::Advance
        );
        assert_eq!(
            apply(&mut machine, SessionEvent::Acknowledged { game_over: false }),
            SessionPhase::SuitSelect
        );
    }

    #[test]
    fn elimination_path_reaches_game_over() {
        let mut machine = SessionMachine::new();
        apply(&mut machine, SessionEvent::TeamConfigured);
        apply(&mut machine, SessionEvent::RoundStarted);
        apply(&mut machine, SessionEvent::StreamExhausted);

        assert_eq!(
            apply(&mut machine, SessionEvent::OutcomeResolved { eliminated: true }),
            SessionPhase::Elimination
        );
        assert_eq!(
            apply(&mut machine, SessionEvent::Acknowledged { game_over: true }),
            SessionPhase::GameOver
        );
    }

    #[test]
    fn advance_can_end_the_game_after_final_round() {
        let mut machine = SessionMachine::new();
        apply(&mut machine, SessionEvent::TeamConfigured);
        apply(&mut machine, SessionEvent::RoundStarted);
        apply(&mut machine, SessionEvent::StreamExhausted);
        apply(&mut machine, SessionEvent::OutcomeResolved { eliminated: false });

        assert_eq!(
            apply(&mut machine, SessionEvent::Acknowledged { game_over: true }),
            SessionPhase::GameOver
        );
    }

    #[test]
    fn invalid_transition_returns_error() {
        let mut machine = SessionMachine::new();
        let err = machine.apply(SessionEvent::StreamExhausted).unwrap_err();
        assert_eq!(err.from, SessionPhase::NotStarted);
        assert_eq!(err.event, SessionEvent::StreamExhausted);
    }

    #[test]
    fn answering_is_rejected_after_settlement() {
        let mut machine = SessionMachine::new();
        apply(&mut machine, SessionEvent::TeamConfigured);
        apply(&mut machine, SessionEvent::RoundStarted);
        apply(&mut machine, SessionEvent::StreamExhausted);

        let err = machine.apply(SessionEvent::StreamExhausted).unwrap_err();
        assert_eq!(err.from, SessionPhase::RoundSettled);
    }

    #[test]
    fn reset_is_valid_from_any_phase() {
        let mut machine = SessionMachine::new();
        assert_eq!(apply(&mut machine, SessionEvent::Reset), SessionPhase::NotStarted);

        apply(&mut machine, SessionEvent::TeamConfigured);
        apply(&mut machine, SessionEvent::RoundStarted);
        assert_eq!(apply(&mut machine, SessionEvent::Reset), SessionPhase::NotStarted);
    }

    #[test]
    fn version_counts_transitions() {
        let mut machine = SessionMachine::new();
        apply(&mut machine, SessionEvent::TeamConfigured);
        apply(&mut machine, SessionEvent::RoundStarted);
        assert_eq!(machine.version(), 2);
    }
}
