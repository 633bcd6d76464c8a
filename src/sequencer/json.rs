//! JSON serialization types for compiled frame maps

use super::{Frame, FrameList, FrameMap};
use serde::Serialize;

/// Top-level JSON structure for a frame map
#[derive(Debug, Clone, Serialize)]
pub struct FrameMapJson {
    /// Sample rate the durations were quantized against
    pub sample_rate: u32,
    /// Envelope time-units per note
    pub time_units: u32,
    pub channels: Vec<ChannelJson>,
}

/// JSON representation of one channel
#[derive(Debug, Clone, Serialize)]
pub struct ChannelJson {
    pub index: usize,
    pub elapsed_seconds: f64,
    pub elapsed_samples: i64,
    pub frames: Vec<FrameJson>,
}

/// JSON representation of one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameJson {
    /// Frequency in Hz (omitted for rests)
    #[serde(skip_serializing_if = "is_zero")]
    pub frequency: u32,
    pub half_period: u16,
    pub amplitude: u8,
    pub duration_units: u32,
    pub release_start: u8,
}

fn is_zero(v: &u32) -> bool {
    *v == 0
}

impl FrameMapJson {
    pub fn new(map: &FrameMap) -> Self {
        let config = map.config();
        Self {
            sample_rate: config.sample_rate,
            time_units: config.time_units,
            channels: map
                .iter()
                .enumerate()
                .map(|(index, list)| ChannelJson::new(index, list))
                .collect(),
        }
    }
}

impl ChannelJson {
    fn new(index: usize, list: &FrameList) -> Self {
        let summary = list.summary();
        Self {
            index,
            elapsed_seconds: summary.elapsed_seconds,
            elapsed_samples: summary.elapsed_samples,
            frames: list.iter().map(FrameJson::from).collect(),
        }
    }
}

impl From<&Frame> for FrameJson {
    fn from(frame: &Frame) -> Self {
        let waveform = frame.waveform();
        Self {
            frequency: frame.frequency(),
            half_period: waveform.half_period,
            amplitude: waveform.amplitude,
            duration_units: frame.duration_units(),
            release_start: frame.release_start(),
        }
    }
}
