/// Victim selection for under-threshold rounds.
pub mod elimination;
/// Answer evaluation and point awards.
pub mod score;
/// Cross-team leaderboard aggregation.
pub mod scoreboard;
