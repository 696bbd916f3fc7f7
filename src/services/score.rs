//! Answer evaluation. Pure functions, no state.

use crate::dao::models::QuestionKind;
use crate::state::game::Question;

/// Whether a submission matches the question's correct answer.
///
/// Multiple choice compares exactly (options are echoed back verbatim by
/// the presentation layer); free text is matched case-insensitively with
/// surrounding whitespace trimmed.
pub fn matches(question: &Question, submitted: &str) -> bool {
    match question.kind {
        QuestionKind::MultipleChoice => submitted == question.answer,
        QuestionKind::FreeText => {
            submitted.trim().to_lowercase() == question.answer.trim().to_lowercase()
        }
    }
}

/// Point delta produced by a submission: the full award on a match,
/// nothing otherwise.
pub fn delta(question: &Question, submitted: &str, points_per_correct: u32) -> u32 {
    if matches(question, submitted) {
        points_per_correct
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(answer: &str) -> Question {
        Question {
            id: "q".into(),
            text: "?".into(),
            kind: QuestionKind::MultipleChoice,
            options: vec!["Echo".into(), "Shadow".into()],
            answer: answer.into(),
        }
    }

    fn free_text(answer: &str) -> Question {
        Question {
            id: "q".into(),
            text: "?".into(),
            kind: QuestionKind::FreeText,
            options: Vec::new(),
            answer: answer.into(),
        }
    }

    #[test]
    fn choice_requires_exact_match() {
        let question = choice("Echo");
        assert!(matches(&question, "Echo"));
        assert!(!matches(&question, "echo"));
        assert!(!matches(&question, " Echo "));
        assert!(!matches(&question, "Shadow"));
    }

    #[test]
    fn free_text_trims_and_ignores_case() {
        let question = free_text("const");
        assert!(matches(&question, "const"));
        assert!(matches(&question, "  CONST "));
        assert!(matches(&question, "Const"));
        assert!(!matches(&question, "constant"));
    }

    #[test]
    fn free_text_answer_side_is_trimmed_too() {
        let question = free_text(" HyperText Markup Language ");
        assert!(matches(&question, "hypertext markup language"));
    }

    #[test]
    fn delta_awards_all_or_nothing() {
        let question = choice("42");
        assert_eq!(delta(&question, "42", 25), 25);
        assert_eq!(delta(&question, "40", 25), 0);
    }
}
