use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub detection: DetectionConfig,
    pub resolver: ResolverConfig,
    pub steering: SteeringConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Identifier of the frame source (recording file path)
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub fps: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Minimum non-zero pixel count below which a color is treated as undetected
    pub min_pixels: u32,
    pub blue: HsvRange,
    pub yellow: HsvRange,
    /// Crop to ignore the sky, in source pixel coordinates
    pub offset_x: usize,
    pub offset_y: usize,
    /// Exclusion disc over the vehicle's own cables, in cropped coordinates
    pub cable_mask: Option<CircleMask>,
}

/// HSV threshold range in OpenCV scale: H 0-180, S 0-255, V 0-255.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HsvRange {
    pub low: [u8; 3],
    pub high: [u8; 3],
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CircleMask {
    pub center_x: i64,
    pub center_y: i64,
    pub radius: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Number of usable (both colors detected) frames to vote over
    pub total_sync_frames: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteeringConfig {
    /// Prefix for every output record
    pub team_id: String,
    pub straight: f64,
    pub left: f64,
    pub hard_left: f64,
    pub right: f64,
    pub hard_right: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub verbose: bool,
    pub info_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                name: "recording.rgba".to_string(),
                width: 640,
                height: 480,
                fps: 30,
            },
            detection: DetectionConfig::default(),
            resolver: ResolverConfig {
                total_sync_frames: 5,
            },
            steering: SteeringConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                verbose: false,
                info_file: "info.csv".to_string(),
            },
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_pixels: 55,
            blue: HsvRange {
                low: [108, 95, 50],
                high: [146, 178, 88],
            },
            yellow: HsvRange {
                low: [0, 83, 112],
                high: [98, 193, 225],
            },
            offset_x: 30,
            offset_y: 267,
            // Center of the crop, two thirds down plus the cable stub
            cable_mask: Some(CircleMask {
                center_x: 305,
                center_y: 202,
                radius: 100,
            }),
        }
    }
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            team_id: "group_17".to_string(),
            straight: -0.049,
            left: 0.11,
            hard_left: 0.14545,
            right: -0.11,
            hard_right: -0.14545,
        }
    }
}

/// One camera frame: tightly packed RGBA bytes plus its sample timestamp.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub timestamp_us: i64,
}

/// Per-frame, per-color presence signal. The centroid is present iff the
/// pixel count exceeded the noise threshold; its absence is the sole
/// "not found" signal, never an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub pixel_count: u32,
    pub centroid: Option<Centroid>,
}

impl Detection {
    pub fn none() -> Self {
        Self {
            pixel_count: 0,
            centroid: None,
        }
    }

    pub fn is_detected(&self) -> bool {
        self.centroid.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
}

/// Per-frame output record, consumed by transport/logging collaborators.
#[derive(Debug, Clone, Copy)]
pub struct FrameResult {
    pub timestamp_us: i64,
    pub steering: f64,
    pub blue: Detection,
    pub yellow: Detection,
}
