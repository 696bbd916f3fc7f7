/// Cross-team leaderboard views.
pub mod scoreboard;
/// Per-team session views and feedback payloads.
pub mod session;

/// Render a seconds count the way the scoreboard displays it, e.g. `2m 5s`.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let mins = total / 60;
    let secs = total % 60;
    if mins > 0 {
        format!("{mins}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_splits_minutes() {
        assert_eq!(format_duration(125.0), "2m 5s");
        assert_eq!(format_duration(59.9), "59s");
        assert_eq!(format_duration(0.0), "0s");
        assert_eq!(format_duration(-3.0), "0s");
    }
}
