use chrono::{DateTime, Utc};

use crate::score;

/// End-of-session scorecard.
///
/// Persisted once when a map is finished and shown again on later visits until
/// the player resets the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionSummary {
    mistakes: u32,
    duration_ms: u64,
    total_questions: u32,
}

impl CompletionSummary {
    #[must_use]
    pub fn new(mistakes: u32, duration_ms: u64, total_questions: u32) -> Self {
        Self {
            mistakes,
            duration_ms,
            total_questions,
        }
    }

    /// Builds the summary for a run that started at `started_at` and finished at
    /// `completed_at`. A clock that went backwards yields a zero duration.
    #[must_use]
    pub fn from_run(
        mistakes: u32,
        total_questions: u32,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let elapsed = (completed_at - started_at).num_milliseconds();
        let duration_ms = u64::try_from(elapsed).unwrap_or(0);
        Self::new(mistakes, duration_ms, total_questions)
    }

    #[must_use]
    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    /// Accuracy percentage, see [`score::accuracy`].
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        score::accuracy(self.total_questions, self.mistakes)
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.mistakes == 0
    }

    #[must_use]
    pub fn headline(&self) -> &'static str {
        if self.is_perfect() {
            "Perfect Score!"
        } else {
            "Challenge Complete!"
        }
    }

    /// Line shown under the headline.
    #[must_use]
    pub fn subtitle(&self) -> &'static str {
        if self.is_perfect() {
            "You're a true Geo Genius!"
        } else {
            "Great effort! Review and try again."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn from_run_measures_elapsed_time() {
        let start = fixed_now();
        let summary = CompletionSummary::from_run(2, 3, start, start + Duration::seconds(75));
        assert_eq!(summary.duration_ms(), 75_000);
        assert_eq!(summary.mistakes(), 2);
        assert_eq!(summary.total_questions(), 3);
        assert!((summary.accuracy() - 60.0).abs() < f64::EPSILON);
        assert_eq!(summary.headline(), "Challenge Complete!");
        assert_eq!(summary.subtitle(), "Great effort! Review and try again.");
    }

    #[test]
    fn backwards_clock_clamps_to_zero() {
        let start = fixed_now();
        let summary = CompletionSummary::from_run(0, 4, start, start - Duration::seconds(5));
        assert_eq!(summary.duration_ms(), 0);
        assert!(summary.is_perfect());
        assert_eq!(summary.headline(), "Perfect Score!");
        assert_eq!(summary.subtitle(), "You're a true Geo Genius!");
    }
}
