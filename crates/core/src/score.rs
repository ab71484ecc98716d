//! Accuracy and duration figures for the completion screen.
//!
//! Attempts are counted as `total_questions + mistakes`: every region is answered
//! correctly exactly once, and every wrong guess adds one more attempt.

/// Accuracy as a percentage in `[0, 100]`.
///
/// An empty map with no mistakes is treated as a perfect 100.
#[must_use]
pub fn accuracy(total_questions: u32, mistakes: u32) -> f64 {
    let attempts = u64::from(total_questions) + u64::from(mistakes);
    if attempts == 0 {
        return 100.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let pct = (u64::from(total_questions) * 100) as f64 / attempts as f64;
    pct
}

/// Share of regions found so far, `0` for an empty map.
#[must_use]
pub fn progress_percent(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let pct = correct as f64 / total as f64 * 100.0;
    pct
}

/// Accuracy formatted for display, e.g. `"83.3%"`.
#[must_use]
pub fn format_accuracy(total_questions: u32, mistakes: u32) -> String {
    format!("{:.1}%", accuracy(total_questions, mistakes))
}

/// Human readable duration: `"2m 5s"`, or `"42s"` under a minute.
#[must_use]
pub fn format_duration(duration_ms: u64) -> String {
    let total_seconds = duration_ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn accuracy_reference_values() {
        assert!(approx(accuracy(10, 0), 100.0));
        assert!(approx(accuracy(0, 0), 100.0));
        assert!(approx(accuracy(8, 2), 80.0));
        assert!(approx(accuracy(3, 2), 60.0));
        assert!(approx(accuracy(0, 4), 0.0));
    }

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(format_accuracy(5, 1), "83.3%");
        assert_eq!(format_accuracy(8, 2), "80.0%");
        assert_eq!(format_accuracy(2, 1), "66.7%");
    }

    #[test]
    fn progress_is_share_of_total() {
        assert!(approx(progress_percent(0, 0), 0.0));
        assert!(approx(progress_percent(1, 4), 25.0));
        assert!(approx(progress_percent(3, 3), 100.0));
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(42_999), "42s");
        assert_eq!(format_duration(60_000), "1m 0s");
        assert_eq!(format_duration(125_000), "2m 5s");
    }
}
