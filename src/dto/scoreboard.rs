use serde::Serialize;

/// Aggregated ranking row for one team.
///
/// Derived data: recomputed from the result store on every invocation of
/// the aggregator and never persisted on its own.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoreboardEntry {
    /// Team the row aggregates.
    pub team_name: String,
    /// Sum of all settled round scores.
    pub total_score: u32,
    /// Sum of all round times, in seconds. The sole tie-break key:
    /// on equal score the faster team ranks higher.
    pub total_time: f64,
    /// Per-round breakdown in row order.
    pub rounds: Vec<RoundBreakdown>,
}

/// One settled round inside a scoreboard entry.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoundBreakdown {
    /// Round number the row settles.
    pub round: u32,
    /// Points scored in the round.
    pub score: u32,
    /// Seconds spent on the round.
    pub time: f64,
}
