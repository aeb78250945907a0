use std::time::Duration;

/// Length of the trailing report window, in seconds.
pub const DEFAULT_WINDOW_SECS: u64 = 300;

/// Trailing time window that decides which reports count and how long a
/// reporter must wait before reporting the same space again.
///
/// All timestamps are Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    secs: u64,
}

impl Default for ReportWindow {
    fn default() -> Self {
        Self::from_secs(DEFAULT_WINDOW_SECS)
    }
}

impl ReportWindow {
    pub const fn from_secs(secs: u64) -> Self {
        Self { secs }
    }

    pub const fn secs(&self) -> u64 {
        self.secs
    }

    pub const fn duration(&self) -> Duration {
        Duration::from_secs(self.secs)
    }

    /// Earliest `created_at` that still counts at `now`.
    #[allow(clippy::cast_possible_wrap)]
    pub const fn since(&self, now: i64) -> i64 {
        now.saturating_sub(self.secs as i64)
    }

    pub const fn contains(&self, created_at: i64, now: i64) -> bool {
        created_at >= self.since(now)
    }

    /// Minutes a reporter still has to wait after reporting at `last`.
    ///
    /// `None` once the earlier report has left the window, so a reporter never
    /// has two reports counted at once. Otherwise the remaining time rounded
    /// up to whole minutes, never less than one.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    pub const fn retry_after_minutes(&self, last: i64, now: i64) -> Option<u64> {
        let elapsed = now.saturating_sub(last);
        if elapsed > self.secs as i64 {
            return None;
        }
        let remaining = if elapsed < 0 {
            self.secs
        } else {
            self.secs - elapsed as u64
        };
        if remaining == 0 {
            return Some(1);
        }
        Some(remaining.div_ceil(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_750_000_000;

    #[test]
    fn window_boundary_is_inclusive() {
        let window = ReportWindow::default();
        assert!(window.contains(NOW - 300, NOW));
        assert!(!window.contains(NOW - 301, NOW));
        assert!(window.contains(NOW, NOW));
    }

    #[test]
    fn retry_after_rounds_up() {
        let window = ReportWindow::default();
        assert_eq!(window.retry_after_minutes(NOW, NOW), Some(5));
        assert_eq!(window.retry_after_minutes(NOW - 61, NOW), Some(4));
        assert_eq!(window.retry_after_minutes(NOW - 299, NOW), Some(1));
    }

    #[test]
    fn retry_allowed_once_window_elapsed() {
        let window = ReportWindow::default();
        assert_eq!(window.retry_after_minutes(NOW - 300, NOW), Some(1));
        assert_eq!(window.retry_after_minutes(NOW - 301, NOW), None);
        assert_eq!(window.retry_after_minutes(NOW - 10_000, NOW), None);
    }

    #[test]
    fn retry_never_overlaps_a_counted_report() {
        let window = ReportWindow::default();
        for elapsed in 0..=400 {
            let last = NOW - elapsed;
            if window.retry_after_minutes(last, NOW).is_none() {
                assert!(!window.contains(last, NOW), "overlap at {elapsed}s");
            }
        }
    }

    #[test]
    fn short_window_still_reports_a_minute() {
        let window = ReportWindow::from_secs(10);
        assert_eq!(window.retry_after_minutes(NOW - 5, NOW), Some(1));
        assert_eq!(window.duration(), Duration::from_secs(10));
    }
}
