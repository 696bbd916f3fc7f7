use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Settled outcome of one round for one team, as persisted by the result store.
///
/// Rows are append-only and disjoint by `(session_id, team_name, round_number)`:
/// a row is written exactly once, at round settlement, and never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundResultEntity {
    /// Game session the result belongs to.
    pub session_id: Uuid,
    /// Name of the team that played the round (unique within a session).
    pub team_name: String,
    /// Round the result was settled for, starting at 1.
    pub round_number: u32,
    /// Points scored in the round.
    pub score: u32,
    /// Wall-clock seconds the team spent answering the round.
    pub elapsed_seconds: f64,
}

/// Question record supplied by the question store for a session round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Stable identifier of the question inside its bank.
    pub id: String,
    /// Round the question is drawn for.
    pub round_number: u32,
    /// Prompt shown to the team.
    pub text: String,
    /// Answer mode of the question.
    pub kind: QuestionKind,
    /// Selectable options; `None` for free-text questions.
    pub options: Option<Vec<String>>,
    /// The correct answer, compared per [`QuestionKind`] rules.
    pub answer: String,
    /// Display order inside the round's candidate pool.
    pub sort_order: u32,
}

/// Answer mode of a question, deciding how submissions are matched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// One of a fixed option set; submissions must match the answer exactly.
    MultipleChoice,
    /// Typed answer; matched case-insensitively with surrounding whitespace trimmed.
    FreeText,
}
