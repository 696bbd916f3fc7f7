//! Contest format configuration: rounds, sampling, thresholds, timing.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::dao::models::QuestionKind;

/// Default location on disk where the library looks for the JSON rules file.
const DEFAULT_CONFIG_PATH: &str = "config/rules.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BORDERLAND_ARENA_CONFIG_PATH";

/// Default points credited per correct answer.
const DEFAULT_POINTS_PER_CORRECT: u32 = 25;
/// Default number of questions sampled per round.
const DEFAULT_QUESTION_SAMPLE: usize = 5;
/// Default settled score below which a round triggers elimination.
const DEFAULT_SCORE_THRESHOLD: u32 = 50;
/// Default per-question answering budget.
const DEFAULT_QUESTION_TIME_BUDGET: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable contest format shared by every session of a game.
///
/// Two formats ship as constructors: [`GameRules::classic`] (three
/// multiple-choice rounds) and [`GameRules::extended`] (four rounds with a
/// free-text finale). Both are plain configurations of the same state
/// machine; nothing in the core branches on the format itself.
pub struct GameRules {
    /// Points credited for each correct answer.
    pub points_per_correct: u32,
    /// Time budget a team has to answer a single question.
    pub question_time_budget: Duration,
    /// Per-round settings, ordered by round number starting at 1.
    pub rounds: Vec<RoundRules>,
}

/// Settings for one scored round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRules {
    /// Round number, starting at 1 and increasing by 1 per round.
    pub number: u32,
    /// Display label for the dashboard header, if any.
    pub label: Option<String>,
    /// Number of questions sampled from the round's candidate pool.
    pub question_sample: usize,
    /// Members eliminated when the settled score falls below the threshold.
    pub elimination_count: u32,
    /// Minimum settled score required to avoid elimination.
    pub score_threshold: u32,
    /// Answer mode every question of the round uses.
    pub kind: QuestionKind,
}

impl GameRules {
    /// The legacy three-round format: multiple choice only, five questions
    /// per round, two members at stake in the final round.
    pub fn classic() -> Self {
        Self {
            points_per_correct: DEFAULT_POINTS_PER_CORRECT,
            question_time_budget: DEFAULT_QUESTION_TIME_BUDGET,
            rounds: vec![
                RoundRules {
                    number: 1,
                    label: Some("Entry Game".into()),
                    question_sample: DEFAULT_QUESTION_SAMPLE,
                    elimination_count: 1,
                    score_threshold: DEFAULT_SCORE_THRESHOLD,
                    kind: QuestionKind::MultipleChoice,
                },
                RoundRules {
                    number: 2,
                    label: Some("Mind Trap".into()),
                    question_sample: DEFAULT_QUESTION_SAMPLE,
                    elimination_count: 1,
                    score_threshold: DEFAULT_SCORE_THRESHOLD,
                    kind: QuestionKind::MultipleChoice,
                },
                RoundRules {
                    number: 3,
                    label: Some("Betrayal Stage".into()),
                    question_sample: DEFAULT_QUESTION_SAMPLE,
                    elimination_count: 2,
                    score_threshold: DEFAULT_SCORE_THRESHOLD,
                    kind: QuestionKind::MultipleChoice,
                },
            ],
        }
    }

    /// The four-round format: three multiple-choice rounds followed by a
    /// shorter free-text finale.
    pub fn extended() -> Self {
        let mut rules = Self::classic();
        if let Some(third) = rules.rounds.last_mut() {
            third.elimination_count = 1;
        }
        rules.rounds.push(RoundRules {
            number: 4,
            label: Some("Final Gauntlet".into()),
            question_sample: 4,
            elimination_count: 2,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            kind: QuestionKind::FreeText,
        });
        rules
    }

    /// Load the rules from disk, falling back to the classic format.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawRules>(&contents) {
                Ok(raw) => match GameRules::try_from(raw) {
                    Ok(rules) => {
                        info!(
                            path = %path.display(),
                            rounds = rules.rounds.len(),
                            "loaded contest rules from config"
                        );
                        rules
                    }
                    Err(reason) => {
                        warn!(
                            path = %path.display(),
                            %reason,
                            "rejected contest rules; falling back to classic format"
                        );
                        Self::classic()
                    }
                },
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to classic format"
                    );
                    Self::classic()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using classic format"
                );
                Self::classic()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to classic format"
                );
                Self::classic()
            }
        }
    }

    /// Settings for the given round number, if configured.
    pub fn round(&self, number: u32) -> Option<&RoundRules> {
        self.rounds.iter().find(|round| round.number == number)
    }

    /// Number of the last configured round.
    pub fn last_round_number(&self) -> u32 {
        self.rounds.last().map(|round| round.number).unwrap_or(0)
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self::classic()
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the rules file located at [`DEFAULT_CONFIG_PATH`].
struct RawRules {
    points_per_correct: Option<u32>,
    question_time_budget_secs: Option<u64>,
    rounds: Vec<RawRound>,
}

#[derive(Debug, Deserialize)]
/// JSON representation of a single round entry inside the rules file.
struct RawRound {
    number: u32,
    label: Option<String>,
    question_sample: Option<usize>,
    elimination_count: Option<u32>,
    score_threshold: Option<u32>,
    kind: Option<QuestionKind>,
}

impl TryFrom<RawRules> for GameRules {
    type Error = String;

    fn try_from(value: RawRules) -> Result<Self, Self::Error> {
        let rounds: Vec<RoundRules> = value
            .rounds
            .into_iter()
            .map(|raw| RoundRules {
                number: raw.number,
                label: raw.label,
                question_sample: raw.question_sample.unwrap_or(DEFAULT_QUESTION_SAMPLE),
                elimination_count: raw.elimination_count.unwrap_or(1),
                score_threshold: raw.score_threshold.unwrap_or(DEFAULT_SCORE_THRESHOLD),
                kind: raw.kind.unwrap_or(QuestionKind::MultipleChoice),
            })
            .collect();

        let rules = Self {
            points_per_correct: value.points_per_correct.unwrap_or(DEFAULT_POINTS_PER_CORRECT),
            question_time_budget: Duration::from_secs(value.question_time_budget_secs.unwrap_or(
                DEFAULT_QUESTION_TIME_BUDGET.as_secs(),
            )),
            rounds,
        };
        rules.validated()
    }
}

impl GameRules {
    fn validated(self) -> Result<Self, String> {
        if self.rounds.is_empty() {
            return Err("rules must configure at least one round".into());
        }
        for (index, round) in self.rounds.iter().enumerate() {
            let expected = index as u32 + 1;
            if round.number != expected {
                return Err(format!(
                    "round numbers must increase from 1 without gaps (position {} has number {})",
                    index + 1,
                    round.number
                ));
            }
            if round.question_sample == 0 {
                return Err(format!("round {} samples zero questions", round.number));
            }
        }
        if self.points_per_correct == 0 {
            return Err("points per correct answer must be positive".into());
        }
        Ok(self)
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
