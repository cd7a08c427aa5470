use crate::analyzer::FrameReport;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;

/// Progress tracker for a stream being analyzed
pub struct StreamProgress {
    progress_bar: ProgressBar,
    start_time: Instant,
    total_frames: Option<u64>,
    processed_frames: u64,
    failed_frames: u64,
    alert_frames: u64,
    last_average: u32,
    last_imgsz: u32,
}

impl StreamProgress {
    /// Creates a new progress tracker with known total frames
    pub fn new(total_frames: u64, camera_id: &str) -> Self {
        let progress_bar = ProgressBar::new(total_frames);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({percent}%) | {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        progress_bar.set_style(style);
        progress_bar.set_message(format!("Analyzing {}", camera_id));

        Self::with_bar(progress_bar, Some(total_frames))
    }

    /// Creates a new progress tracker for a live stream with no known end
    pub fn new_unknown_total(camera_id: &str) -> Self {
        let progress_bar = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} frames | {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        progress_bar.set_style(style);
        progress_bar.set_message(format!("Analyzing {}", camera_id));

        Self::with_bar(progress_bar, None)
    }

    /// A tracker that draws nothing
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden(), None)
    }

    fn with_bar(progress_bar: ProgressBar, total_frames: Option<u64>) -> Self {
        Self {
            progress_bar,
            start_time: Instant::now(),
            total_frames,
            processed_frames: 0,
            failed_frames: 0,
            alert_frames: 0,
            last_average: 0,
            last_imgsz: 0,
        }
    }

    /// Records an analyzed frame
    pub fn record_report(&mut self, report: &FrameReport) {
        self.processed_frames += 1;
        if report.alert {
            self.alert_frames += 1;
        }
        self.last_average = report.average_count;
        self.last_imgsz = report.next_imgsz;
        self.progress_bar.inc(1);

        let msg = self.get_progress_message();
        self.progress_bar.set_message(msg);
    }

    /// Records a frame the detector could not handle
    pub fn record_failure(&mut self) {
        self.processed_frames += 1;
        self.failed_frames += 1;
        self.progress_bar.inc(1);

        let msg = self.get_progress_message();
        self.progress_bar.set_message(msg);
    }

    /// Gets comprehensive progress message
    fn get_progress_message(&self) -> String {
        if self.processed_frames == 0 {
            return "Starting...".to_string();
        }
        let current_fps = self.throughput();

        let eta = match self.total_frames {
            Some(total) if current_fps > 0.0 => {
                let remaining = total.saturating_sub(self.processed_frames);
                format!(" | ETA: {}", format_duration(remaining as f64 / current_fps))
            }
            Some(_) => " | ETA: Calculating...".to_string(),
            None => String::new(),
        };

        format!(
            "avg {} | imgsz {} | alerts {} | failed {} | Speed: {:.1} fps{}",
            self.last_average, self.last_imgsz, self.alert_frames, self.failed_frames, current_fps, eta
        )
    }

    fn throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.processed_frames as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Finishes the progress bar
    pub fn finish(&self) {
        let total_time = self.start_time.elapsed();
        let message = format!(
            "Completed! Frames: {} | Alerts: {} | Failed: {} | Processing: {} | Avg FPS: {:.1}",
            self.processed_frames,
            self.alert_frames,
            self.failed_frames,
            format_duration(total_time.as_secs_f64()),
            self.throughput()
        );
        self.progress_bar.finish_with_message(message);
    }

    /// Gets the total number of frames
    pub fn total_frames(&self) -> Option<u64> {
        self.total_frames
    }

    /// Gets the current number of processed frames
    pub fn processed_frames(&self) -> u64 {
        self.processed_frames
    }

    pub fn alert_frames(&self) -> u64 {
        self.alert_frames
    }

    pub fn failed_frames(&self) -> u64 {
        self.failed_frames
    }
}

/// Formats a duration in seconds to h:mm:ss format
fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn report(alert: bool, average_count: u32) -> FrameReport {
        FrameReport {
            frame_index: 1,
            timestamp: Utc::now(),
            person_count: 0,
            head_count: 0,
            count: 0,
            average_count,
            alert,
            heads: Vec::new(),
            imgsz_used: 640,
            next_imgsz: 576,
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0:00");
        assert_eq!(format_duration(30.0), "0:30");
        assert_eq!(format_duration(90.0), "1:30");
        assert_eq!(format_duration(3661.0), "1:01:01");
        assert_eq!(format_duration(7200.0), "2:00:00");
    }

    #[test]
    fn test_progress_tracker_creation() {
        let tracker = StreamProgress::new(1000, "cam01");
        assert_eq!(tracker.total_frames(), Some(1000));
        assert_eq!(tracker.processed_frames(), 0);
        assert_eq!(StreamProgress::new_unknown_total("cam01").total_frames(), None);
    }

    #[test]
    fn test_progress_counts_alerts_and_failures() {
        let mut tracker = StreamProgress::hidden();
        tracker.record_report(&report(false, 3));
        tracker.record_report(&report(true, 9));
        tracker.record_failure();
        assert_eq!(tracker.processed_frames(), 3);
        assert_eq!(tracker.alert_frames(), 1);
        assert_eq!(tracker.failed_frames(), 1);
        let msg = tracker.get_progress_message();
        assert!(msg.starts_with("avg 9 | imgsz 576 | alerts 1 | failed 1"), "{msg}");
    }
}
