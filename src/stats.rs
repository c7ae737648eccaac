use crate::models::{AggregateStats, CHALLENGE_DAYS, ScoreRecord};

pub fn aggregate(records: &[ScoreRecord]) -> AggregateStats {
    if records.is_empty() {
        return AggregateStats::default();
    }

    let total = records.len();
    let listening_sum: u32 = records.iter().map(|r| u32::from(r.listening)).sum();
    let reading_sum: u32 = records.iter().map(|r| u32::from(r.reading)).sum();

    let (writing_sum, writing_count) = records
        .iter()
        .filter(|r| r.writing > 0.0)
        .fold((0.0f64, 0usize), |(sum, count), r| (sum + r.writing, count + 1));

    let avg_writing = if writing_count == 0 {
        0.0
    } else {
        round_tenth(writing_sum / writing_count as f64)
    };

    AggregateStats {
        avg_listening: round_tenth(f64::from(listening_sum) / total as f64),
        avg_reading: round_tenth(f64::from(reading_sum) / total as f64),
        avg_writing,
        total,
    }
}

/// Whole-percent share of the challenge completed, capped at 100.
pub fn progress_percent(days_logged: usize) -> u8 {
    let capped = days_logged.min(CHALLENGE_DAYS);
    (capped as f64 / CHALLENGE_DAYS as f64 * 100.0).round() as u8
}

// Averages are non-negative, so rounding half away from zero is half-up.
fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
