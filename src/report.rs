// src/report.rs
//
// Verbose-mode diagnostics: an appended CSV with one row per frame, and
// a running accuracy tracker comparing the calculated steering against
// the latest ground-truth value.

use crate::types::FrameResult;
use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

pub struct DiagnosticsLog {
    path: PathBuf,
}

impl DiagnosticsLog {
    /// Create the log and append the header row.
    pub fn create(path: &str) -> Result<Self> {
        let log = Self {
            path: PathBuf::from(path),
        };
        log.append_line(
            "time_stamp,actual_ground_steering,calculated_turn,blue_pixels_count,\
             yellow_pixels_count,blue_x,blue_y,yellow_x,yellow_y",
        )?;
        Ok(log)
    }

    pub fn append_row(&self, result: &FrameResult, actual_ground_steering: f64) -> Result<()> {
        // Undetected centroids are reported as -1, matching the pre-reset
        // sentinel the downstream tooling expects
        let (blue_x, blue_y) = result
            .blue
            .centroid
            .map(|c| (c.x, c.y))
            .unwrap_or((-1.0, -1.0));
        let (yellow_x, yellow_y) = result
            .yellow
            .centroid
            .map(|c| (c.x, c.y))
            .unwrap_or((-1.0, -1.0));

        self.append_line(&format!(
            "{},{},{},{},{},{},{},{},{}",
            result.timestamp_us,
            actual_ground_steering,
            result.steering,
            result.blue.pixel_count,
            result.yellow.pixel_count,
            blue_x,
            blue_y,
            yellow_x,
            yellow_y
        ))
    }

    fn append_line(&self, line: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

/// Running accuracy of the calculated turn against ground truth.
#[derive(Debug, Default)]
pub struct AccuracyTracker {
    total_frames: u64,
    correct_frames: u64,
}

impl AccuracyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, calculated: f64, actual: f64, straight: f64) -> bool {
        self.total_frames += 1;
        let correct = is_acceptable_turn(calculated, actual, straight);
        if correct {
            self.correct_frames += 1;
        }
        correct
    }

    pub fn percentage(&self) -> f64 {
        if self.total_frames == 0 {
            return 0.0;
        }
        (self.correct_frames as f64 / self.total_frames as f64) * 100.0
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn correct_frames(&self) -> u64 {
        self.correct_frames
    }
}

/// A calculated turn is acceptable when it lands within (actual/2,
/// actual*1.5) on the same side as the actual value; when the actual
/// steering is zero, only the straight magnitude counts as correct.
pub fn is_acceptable_turn(calculated: f64, actual: f64, straight: f64) -> bool {
    if actual == 0.0 {
        calculated == straight
    } else if actual > 0.0 {
        (calculated <= actual && calculated > actual / 2.0)
            || (calculated >= actual && calculated < actual * 1.5)
    } else {
        (calculated >= actual && calculated < actual / 2.0)
            || (calculated <= actual && calculated > actual * 1.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Centroid, Detection};

    #[test]
    fn test_zero_actual_requires_straight() {
        assert!(is_acceptable_turn(-0.049, 0.0, -0.049));
        assert!(!is_acceptable_turn(0.14545, 0.0, -0.049));
    }

    #[test]
    fn test_positive_actual_band() {
        // actual 0.12: anything in (0.06, 0.18) passes
        assert!(is_acceptable_turn(0.11, 0.12, -0.049));
        assert!(is_acceptable_turn(0.14545, 0.12, -0.049));
        assert!(!is_acceptable_turn(0.05, 0.12, -0.049));
        assert!(!is_acceptable_turn(0.20, 0.12, -0.049));
    }

    #[test]
    fn test_negative_actual_band() {
        assert!(is_acceptable_turn(-0.11, -0.12, -0.049));
        assert!(is_acceptable_turn(-0.14545, -0.12, -0.049));
        assert!(!is_acceptable_turn(-0.05, -0.12, -0.049));
        assert!(!is_acceptable_turn(-0.20, -0.12, -0.049));
    }

    #[test]
    fn test_accuracy_percentage() {
        let mut tracker = AccuracyTracker::new();
        tracker.record(-0.049, 0.0, -0.049);
        tracker.record(0.14545, 0.0, -0.049);
        tracker.record(0.11, 0.12, -0.049);
        tracker.record(0.11, 0.12, -0.049);
        assert_eq!(tracker.total_frames(), 4);
        assert_eq!(tracker.correct_frames(), 3);
        assert!((tracker.percentage() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_csv_rows() {
        let path = std::env::temp_dir().join(format!("cone-steering-csv-{}.csv", std::process::id()));
        let path_str = path.to_str().unwrap();
        std::fs::remove_file(&path).ok();

        let log = DiagnosticsLog::create(path_str).unwrap();
        let result = FrameResult {
            timestamp_us: 1234,
            steering: -0.049,
            blue: Detection {
                pixel_count: 200,
                centroid: Some(Centroid { x: 100.0, y: 50.0 }),
            },
            yellow: Detection::none(),
        };
        log.append_row(&result, 0.07).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert!(lines.next().unwrap().starts_with("time_stamp,"));
        assert_eq!(lines.next().unwrap(), "1234,0.07,-0.049,200,0,100,50,-1,-1");
        std::fs::remove_file(&path).ok();
    }
}
