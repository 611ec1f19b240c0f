// src/frame_source.rs

use crate::types::{Frame, SourceConfig};
use anyhow::Result;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

/// Upstream frame boundary: blocks until the next frame is available,
/// yields Ok(None) on clean end of stream.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Replays a recording of tightly packed WIDTH x HEIGHT x 4 RGBA frames.
/// Timestamps are synthesized from the configured frame rate.
pub struct RawFrameReader {
    reader: BufReader<File>,
    width: usize,
    height: usize,
    fps: u32,
    current_frame: u64,
}

impl RawFrameReader {
    pub fn open(path: &Path, config: &SourceConfig) -> Result<Self> {
        info!("Opening recording: {}", path.display());
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            width: config.width,
            height: config.height,
            fps: config.fps,
            current_frame: 0,
        })
    }
}

impl FrameSource for RawFrameReader {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let frame_bytes = self.width * self.height * 4;
        let mut data = vec![0u8; frame_bytes];

        let mut read = 0;
        while read < frame_bytes {
            let n = self.reader.read(&mut data[read..])?;
            if n == 0 {
                break;
            }
            read += n;
        }

        if read == 0 {
            return Ok(None);
        }
        if read < frame_bytes {
            anyhow::bail!(
                "truncated frame {}: got {} of {} bytes",
                self.current_frame,
                read,
                frame_bytes
            );
        }

        let timestamp_us = (self.current_frame as i64) * 1_000_000 / self.fps as i64;
        self.current_frame += 1;

        Ok(Some(Frame {
            data,
            width: self.width,
            height: self.height,
            timestamp_us,
        }))
    }
}
