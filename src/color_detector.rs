// src/color_detector.rs
//
// HSV-based cone detection on raw RGBA frames.
//
// Segmentation runs over a cropped region of interest (the sky band is
// ignored) in HSV space, followed by a morphological close to remove
// small holes from the foreground, then pixel counting and a first-order
// moment centroid. A color counts as detected only when its pixel count
// clears the noise threshold; below that the mask is treated as noise
// floor and no centroid is produced.

use crate::types::{Centroid, Detection, DetectionConfig, Frame, HsvRange};

/// Binary mask over the cropped region, one byte per pixel (0 or 1).
#[derive(Debug, Clone)]
pub struct BinaryMask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl BinaryMask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: u8) {
        self.data[y * self.width + x] = v;
    }

    pub fn count_non_zero(&self) -> u32 {
        self.data.iter().filter(|&&v| v != 0).count() as u32
    }
}

/// Convert RGB to HSV in OpenCV scale (H: 0-180, S: 0-255, V: 0-255),
/// so threshold constants tuned against OpenCV carry over unchanged.
#[inline]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let r_n = r as f32 / 255.0;
    let g_n = g as f32 / 255.0;
    let b_n = b as f32 / 255.0;

    let max = r_n.max(g_n).max(b_n);
    let min = r_n.min(g_n).min(b_n);
    let delta = max - min;

    let h = if delta < 1e-6 {
        0.0
    } else if (max - r_n).abs() < 1e-6 {
        60.0 * (((g_n - b_n) / delta) % 6.0)
    } else if (max - g_n).abs() < 1e-6 {
        60.0 * (((b_n - r_n) / delta) + 2.0)
    } else {
        60.0 * (((r_n - g_n) / delta) + 4.0)
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    let s = if max < 1e-6 { 0.0 } else { delta / max };

    ((h / 2.0).round() as u8, (s * 255.0).round() as u8, (max * 255.0).round() as u8)
}

/// Threshold the cropped frame region against an HSV range.
///
/// Pixels inside the configured cable exclusion disc are never set, the
/// same effect as the original's filled black circle over the cables.
pub fn segment(frame: &Frame, range: &HsvRange, config: &DetectionConfig) -> BinaryMask {
    let crop_w = frame.width.saturating_sub(config.offset_x);
    let crop_h = frame.height.saturating_sub(config.offset_y);
    let mut mask = BinaryMask::new(crop_w, crop_h);

    for cy in 0..crop_h {
        for cx in 0..crop_w {
            if let Some(disc) = &config.cable_mask {
                let dx = cx as i64 - disc.center_x;
                let dy = cy as i64 - disc.center_y;
                if dx * dx + dy * dy <= disc.radius * disc.radius {
                    continue;
                }
            }

            let idx = ((cy + config.offset_y) * frame.width + (cx + config.offset_x)) * 4;
            let r = frame.data[idx];
            let g = frame.data[idx + 1];
            let b = frame.data[idx + 2];

            let (h, s, v) = rgb_to_hsv(r, g, b);
            if h >= range.low[0]
                && h <= range.high[0]
                && s >= range.low[1]
                && s <= range.high[1]
                && v >= range.low[2]
                && v <= range.high[2]
            {
                mask.set(cx, cy, 1);
            }
        }
    }

    mask
}

// 5x5 elliptical structuring element, the fixed kernel of the close.
const ELLIPSE_5X5: [(i32, i32); 17] = [
    (0, -2),
    (-2, -1),
    (-1, -1),
    (0, -1),
    (1, -1),
    (2, -1),
    (-2, 0),
    (-1, 0),
    (0, 0),
    (1, 0),
    (2, 0),
    (-2, 1),
    (-1, 1),
    (0, 1),
    (1, 1),
    (2, 1),
    (0, 2),
];

fn dilate(mask: &BinaryMask) -> BinaryMask {
    let mut out = BinaryMask::new(mask.width, mask.height);
    for y in 0..mask.height {
        for x in 0..mask.width {
            // Out-of-bounds neighbors count as unset
            let hit = ELLIPSE_5X5.iter().any(|&(dx, dy)| {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                nx >= 0
                    && ny >= 0
                    && (nx as usize) < mask.width
                    && (ny as usize) < mask.height
                    && mask.get(nx as usize, ny as usize) != 0
            });
            if hit {
                out.set(x, y, 1);
            }
        }
    }
    out
}

fn erode(mask: &BinaryMask) -> BinaryMask {
    let mut out = BinaryMask::new(mask.width, mask.height);
    for y in 0..mask.height {
        for x in 0..mask.width {
            // Out-of-bounds neighbors count as set, so borders do not erode
            let all = ELLIPSE_5X5.iter().all(|&(dx, dy)| {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx < 0 || ny < 0 || nx as usize >= mask.width || ny as usize >= mask.height {
                    return true;
                }
                mask.get(nx as usize, ny as usize) != 0
            });
            if all {
                out.set(x, y, 1);
            }
        }
    }
    out
}

/// Morphological close: dilate then erode. Removes small holes from the
/// foreground. The ordering and kernel size are a fixed contract.
pub fn morph_close(mask: &BinaryMask) -> BinaryMask {
    erode(&dilate(mask))
}

/// Centroid from first-order moments (m10/m00, m01/m00), in cropped
/// coordinates. None for an empty mask.
pub fn centroid(mask: &BinaryMask) -> Option<Centroid> {
    let mut m00: u64 = 0;
    let mut m10: u64 = 0;
    let mut m01: u64 = 0;

    for y in 0..mask.height {
        for x in 0..mask.width {
            if mask.get(x, y) != 0 {
                m00 += 1;
                m10 += x as u64;
                m01 += y as u64;
            }
        }
    }

    if m00 == 0 {
        return None;
    }

    Some(Centroid {
        x: m10 as f64 / m00 as f64,
        y: m01 as f64 / m00 as f64,
    })
}

pub struct ColorDetector {
    config: DetectionConfig,
}

impl ColorDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Detect one cone color in the frame. Always returns a value;
    /// an absent centroid is the "not found" signal.
    pub fn detect(&self, frame: &Frame, range: &HsvRange) -> Detection {
        let mask = morph_close(&segment(frame, range, &self.config));
        let pixel_count = mask.count_non_zero();

        let centroid = if pixel_count > self.config.min_pixels {
            centroid(&mask)
        } else {
            None
        };

        Detection {
            pixel_count,
            centroid,
        }
    }
}
