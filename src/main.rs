// src/main.rs

mod color_detector;
mod config;
mod frame_source;
mod ground_truth;
mod pipeline;
mod report;
mod side_resolver;
mod steering;
mod types;

use anyhow::Result;
use frame_source::RawFrameReader;
use ground_truth::GroundSteering;
use pipeline::SteeringPipeline;
use std::io::Write;
use std::path::Path;
use tracing::info;
use types::Config;

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());
    let config = Config::load(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!("cone_steering={}", config.logging.level))
        .with_writer(std::io::stderr)
        .init();

    info!("Cone track steering starting");
    info!(
        "Source: {} ({}x{} @ {} fps)",
        config.source.name, config.source.width, config.source.height, config.source.fps
    );
    info!(
        "Detection: min_pixels={}, sync window={} frames",
        config.detection.min_pixels, config.resolver.total_sync_frames
    );

    // Written by the transport layer when a ground steering request
    // arrives; this binary only reads the latest value for accuracy
    // reporting.
    let ground_truth = GroundSteering::new();

    let mut source = RawFrameReader::open(Path::new(&config.source.name), &config.source)?;
    let mut pipeline = SteeringPipeline::new(&config, ground_truth.clone())?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    pipeline.run(&mut source, &mut out)?;
    out.flush()?;

    let summary = pipeline.metrics().summary();
    info!("Run complete");
    info!("  Total frames: {}", summary.total_frames);
    info!(
        "  Both colors visible: {} ({:.1}%)",
        summary.frames_both_detected,
        100.0 * summary.frames_both_detected as f64 / summary.total_frames.max(1) as f64
    );
    info!("  Blue only: {}", summary.frames_blue_only);
    info!("  Yellow only: {}", summary.frames_yellow_only);
    info!("  No detection: {}", summary.frames_no_detection);
    info!("  Sync frames used: {}", summary.sync_frames_used);
    info!("  Processing speed: {:.1} FPS", summary.fps);

    if config.logging.verbose {
        info!(
            "  Turn accuracy: {:.1}% ({} of {} frames)",
            pipeline.accuracy().percentage(),
            pipeline.accuracy().correct_frames(),
            pipeline.accuracy().total_frames()
        );
    }

    Ok(())
}
