//! Progress tracking for dataset imports

use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar over the rows of one table import
///
/// With the bar disabled every call is a no-op apart from bookkeeping.
pub struct ProgressTracker {
    /// Rows inserted so far
    processed: u64,
    start_time: Instant,
    bar: Option<ProgressBar>,
}

impl ProgressTracker {
    /// Create a tracker for `total` rows of `table`
    ///
    /// # Arguments
    /// * `table` - Table name shown next to the bar
    /// * `total` - Number of rows to import
    /// * `enable_bar` - Whether to draw a progress bar on stderr
    pub fn new(table: &str, total: u64, enable_bar: bool) -> Self {
        let bar = enable_bar.then(|| {
            let bar = ProgressBar::new(total);
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} {prefix} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-");
            bar.set_style(style);
            bar.set_prefix(table.to_string());
            bar
        });

        Self {
            processed: 0,
            start_time: Instant::now(),
            bar,
        }
    }

    /// Record `count` more rows
    pub fn advance(&mut self, count: u64) {
        self.processed += count;

        if let Some(ref bar) = self.bar {
            bar.set_position(self.processed);

            let elapsed = self.start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                let speed = self.processed as f64 / elapsed;
                bar.set_message(format!("({:.0} rows/sec)", speed));
            }
        }
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Finish and clear the progress bar
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_tracker_counts() {
        let mut tracker = ProgressTracker::new("rooms", 1000, false);
        tracker.advance(500);
        tracker.advance(250);
        assert_eq!(tracker.processed(), 750);
        tracker.finish();
    }
}
