use serde::{Deserialize, Serialize};

use crate::dao::models::{QuestionEntity, QuestionKind};

/// A person on a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Stable identifier within the team.
    pub id: String,
    /// Display name as entered at setup.
    pub name: String,
    /// Whether the member has been eliminated. Never reverts to `false`
    /// for the lifetime of a game; only a full reset clears it.
    pub eliminated: bool,
}

/// One contesting group and its accumulated results.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    /// Team name, unique within the session.
    pub name: String,
    /// Members in setup order.
    pub members: Vec<Member>,
    /// Sum of all settled round scores.
    pub total_score: u32,
    /// Settled score per completed round, in round order.
    pub round_scores: Vec<u32>,
    /// Elapsed seconds per completed round, in round order.
    pub round_times: Vec<f64>,
}

impl Team {
    /// Build a fresh team from validated setup input.
    pub fn new(name: String, member_names: Vec<String>) -> Self {
        let members = member_names
            .into_iter()
            .enumerate()
            .map(|(index, member_name)| Member {
                id: format!("member-{index}"),
                name: member_name,
                eliminated: false,
            })
            .collect();

        Self {
            name,
            members,
            total_score: 0,
            round_scores: Vec::new(),
            round_times: Vec::new(),
        }
    }

    /// Members still in the game.
    pub fn active_members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|member| !member.eliminated)
    }

    /// Number of members still in the game.
    pub fn active_count(&self) -> usize {
        self.active_members().count()
    }
}

/// Runtime representation of a drawn question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Identifier inherited from the question bank.
    pub id: String,
    /// Prompt shown to the team.
    pub text: String,
    /// Answer mode deciding how submissions are matched.
    pub kind: QuestionKind,
    /// Selectable options; empty for free-text questions.
    pub options: Vec<String>,
    /// The correct answer.
    pub answer: String,
}

impl From<QuestionEntity> for Question {
    fn from(value: QuestionEntity) -> Self {
        Self {
            id: value.id,
            text: value.text,
            kind: value.kind,
            options: value.options.unwrap_or_default(),
            answer: value.answer,
        }
    }
}

/// Cosmetic card pick that opens each round. No scoring effect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Suit {
    /// ♣
    Clubs,
    /// ♠
    Spades,
    /// ♥
    Hearts,
    /// ♦
    Diamonds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_team_starts_with_everyone_active() {
        let team = Team::new("Alpha".into(), vec!["Ann".into(), "Bo".into(), "Cy".into()]);
        assert_eq!(team.active_count(), 3);
        assert_eq!(team.members[0].id, "member-0");
        assert_eq!(team.members[2].name, "Cy");
        assert_eq!(team.total_score, 0);
        assert!(team.round_scores.is_empty());
    }

    #[test]
    fn active_members_skips_eliminated() {
        let mut team = Team::new("Alpha".into(), vec!["Ann".into(), "Bo".into(), "Cy".into()]);
        team.members[1].eliminated = true;

        let names: Vec<&str> = team.active_members().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Ann", "Cy"]);
    }

    #[test]
    fn question_from_entity_defaults_missing_options() {
        let entity = QuestionEntity {
            id: "r4q1".into(),
            round_number: 4,
            text: "What does HTML stand for?".into(),
            kind: QuestionKind::FreeText,
            options: None,
            answer: "HyperText Markup Language".into(),
            sort_order: 0,
        };

        let question = Question::from(entity);
        assert!(question.options.is_empty());
        assert_eq!(question.kind, QuestionKind::FreeText);
    }
}
