// src/pipeline/metrics.rs
//
// Counters for every frame class the pipeline sees. Cheap atomics so a
// monitoring thread could read them while the run is live.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub total_frames: Arc<AtomicU64>,
    pub frames_both_detected: Arc<AtomicU64>,
    pub frames_blue_only: Arc<AtomicU64>,
    pub frames_yellow_only: Arc<AtomicU64>,
    pub frames_no_detection: Arc<AtomicU64>,
    pub sync_frames_used: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            total_frames: Arc::new(AtomicU64::new(0)),
            frames_both_detected: Arc::new(AtomicU64::new(0)),
            frames_blue_only: Arc::new(AtomicU64::new(0)),
            frames_yellow_only: Arc::new(AtomicU64::new(0)),
            frames_no_detection: Arc::new(AtomicU64::new(0)),
            sync_frames_used: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fps(&self) -> f64 {
        let frames = self.total_frames.load(Ordering::Relaxed);
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.01 {
            frames as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames.load(Ordering::Relaxed),
            frames_both_detected: self.frames_both_detected.load(Ordering::Relaxed),
            frames_blue_only: self.frames_blue_only.load(Ordering::Relaxed),
            frames_yellow_only: self.frames_yellow_only.load(Ordering::Relaxed),
            frames_no_detection: self.frames_no_detection.load(Ordering::Relaxed),
            sync_frames_used: self.sync_frames_used.load(Ordering::Relaxed),
            fps: self.fps(),
            elapsed_secs: self.started_at.elapsed().as_secs_f64(),
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub frames_both_detected: u64,
    pub frames_blue_only: u64,
    pub frames_yellow_only: u64,
    pub frames_no_detection: u64,
    pub sync_frames_used: u64,
    pub fps: f64,
    pub elapsed_secs: f64,
}
