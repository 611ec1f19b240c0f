// src/pipeline/mod.rs
//
// Frame pipeline orchestrator. Two phases: while Resolving, every
// frame's detection pair additionally feeds the side resolver; once the
// resolver commits, the steering policy is oriented to the verdict and
// the resolver is never consulted again. Detection and steering run on
// every frame in both phases, so the vehicle steers (under the default
// convention) even before the placement is known.

pub mod metrics;

use crate::color_detector::ColorDetector;
use crate::frame_source::FrameSource;
use crate::ground_truth::GroundSteering;
use crate::report::{AccuracyTracker, DiagnosticsLog};
use crate::side_resolver::SideResolver;
use crate::steering::{decide, SteeringPolicy};
use crate::types::{Config, Frame, FrameResult, HsvRange};
use anyhow::Result;
use self::metrics::PipelineMetrics;
use std::io::Write;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Resolving,
    Decided,
}

pub struct SteeringPipeline {
    detector: ColorDetector,
    resolver: SideResolver,
    policy: SteeringPolicy,
    phase: PipelinePhase,
    blue_range: HsvRange,
    yellow_range: HsvRange,
    team_id: String,
    ground_truth: GroundSteering,
    metrics: PipelineMetrics,
    accuracy: AccuracyTracker,
    diagnostics: Option<DiagnosticsLog>,
}

impl SteeringPipeline {
    pub fn new(config: &Config, ground_truth: GroundSteering) -> Result<Self> {
        let diagnostics = if config.logging.verbose {
            Some(DiagnosticsLog::create(&config.logging.info_file)?)
        } else {
            None
        };

        Ok(Self {
            detector: ColorDetector::new(config.detection.clone()),
            resolver: SideResolver::new(config.resolver.total_sync_frames),
            policy: SteeringPolicy::from_config(&config.steering),
            phase: PipelinePhase::Resolving,
            blue_range: config.detection.blue,
            yellow_range: config.detection.yellow,
            team_id: config.steering.team_id.clone(),
            ground_truth,
            metrics: PipelineMetrics::new(),
            accuracy: AccuracyTracker::new(),
            diagnostics,
        })
    }

    pub fn phase(&self) -> PipelinePhase {
        self.phase
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    pub fn accuracy(&self) -> &AccuracyTracker {
        &self.accuracy
    }

    pub fn policy(&self) -> &SteeringPolicy {
        &self.policy
    }

    /// Process one frame end to end: detect both colors, feed the
    /// resolver while still Resolving, decide the steering magnitude.
    pub fn process_frame(&mut self, frame: &Frame) -> Result<FrameResult> {
        let expected = frame.width * frame.height * 4;
        if frame.data.len() != expected {
            anyhow::bail!(
                "malformed frame buffer: {} bytes, expected {}",
                frame.data.len(),
                expected
            );
        }

        let blue = self.detector.detect(frame, &self.blue_range);
        let yellow = self.detector.detect(frame, &self.yellow_range);

        self.metrics.inc(&self.metrics.total_frames);
        match (blue.is_detected(), yellow.is_detected()) {
            (true, true) => self.metrics.inc(&self.metrics.frames_both_detected),
            (true, false) => self.metrics.inc(&self.metrics.frames_blue_only),
            (false, true) => self.metrics.inc(&self.metrics.frames_yellow_only),
            (false, false) => self.metrics.inc(&self.metrics.frames_no_detection),
        }

        if self.phase == PipelinePhase::Resolving {
            if blue.is_detected() && yellow.is_detected() {
                self.metrics.inc(&self.metrics.sync_frames_used);
            }
            if let Some(assignment) = self.resolver.observe(&blue, &yellow) {
                self.policy.orient(assignment);
                self.phase = PipelinePhase::Decided;
                info!(?assignment, "pipeline entered decided phase");
            }
        }

        let steering = decide(&blue, &yellow, &self.policy);
        let result = FrameResult {
            timestamp_us: frame.timestamp_us,
            steering,
            blue,
            yellow,
        };

        let actual = self.ground_truth.latest();
        let correct = self.accuracy.record(steering, actual, self.policy.straight);
        debug!(
            steering,
            actual, correct, "frame decided"
        );

        if let Some(log) = &self.diagnostics {
            log.append_row(&result, actual)?;
        }

        Ok(result)
    }

    /// Drive the pipeline until the source reports end of stream,
    /// emitting one machine-parseable record per frame.
    pub fn run(&mut self, source: &mut dyn FrameSource, out: &mut dyn Write) -> Result<()> {
        while let Some(frame) = source.next_frame()? {
            let result = self.process_frame(&frame)?;
            writeln!(
                out,
                "{};{};{}",
                self.team_id, result.timestamp_us, result.steering
            )?;
        }

        // Stream ended before the voting window filled: commit to
        // whatever evidence accumulated (degraded-confidence path)
        if self.phase == PipelinePhase::Resolving {
            let assignment = self.resolver.finalize_degraded();
            self.policy.orient(assignment);
            self.phase = PipelinePhase::Decided;
        }

        info!("frame source exhausted, stopping cleanly");
        Ok(())
    }
}
