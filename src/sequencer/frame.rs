//! Sequencer frames and per-channel frame lists

use crate::error::ErrorKind;
use crate::synth::WaveformDef;

/// Initial frame capacity of a channel list
pub const FRAME_BLOCK: usize = 16;

/// Largest duration a frame can encode, in envelope time-units
pub const MAX_DURATION_UNITS: u32 = u16::MAX as u32 + 1;

/// One note or rest, as consumed by the playback engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    frequency: u32,
    waveform: WaveformDef,
    /// Duration in envelope time-units, minus one
    time_scale_1: u16,
    release_start: u8,
}

impl Frame {
    /// Pack a frame, failing if `duration_units` is outside 1..=65536
    pub fn new(
        frequency: u32,
        waveform: WaveformDef,
        duration_units: u32,
        release_start: u8,
    ) -> Result<Self, ErrorKind> {
        Ok(Self {
            frequency,
            waveform,
            time_scale_1: encode_duration(duration_units)?,
            release_start,
        })
    }

    /// Frequency in Hz, 0 for a rest
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn is_rest(&self) -> bool {
        self.frequency == 0
    }

    pub fn waveform(&self) -> WaveformDef {
        self.waveform
    }

    /// Duration in envelope time-units (1..=65536)
    pub fn duration_units(&self) -> u32 {
        self.time_scale_1 as u32 + 1
    }

    /// Duration as stored for the engine (units - 1)
    pub fn encoded_duration(&self) -> u16 {
        self.time_scale_1
    }

    /// Envelope offset at which release begins
    pub fn release_start(&self) -> u8 {
        self.release_start
    }
}

fn encode_duration(units: u32) -> Result<u16, ErrorKind> {
    if units == 0 || units > MAX_DURATION_UNITS {
        return Err(ErrorKind::PackTimeScale);
    }
    Ok((units - 1) as u16)
}

/// Total time played by a channel
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelSummary {
    pub elapsed_seconds: f64,
    /// Quantized sample count actually covered by the frames
    pub elapsed_samples: i64,
}

/// Ordered frames of one channel
#[derive(Debug, Clone, Default)]
pub struct FrameList {
    frames: Vec<Frame>,
    summary: ChannelSummary,
}

impl FrameList {
    pub fn new() -> Self {
        Self {
            frames: Vec::with_capacity(FRAME_BLOCK),
            summary: ChannelSummary::default(),
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    pub fn summary(&self) -> ChannelSummary {
        self.summary
    }

    /// Sum of all frame durations, in envelope time-units
    pub fn total_units(&self) -> u64 {
        self.frames.iter().map(|f| f.duration_units() as u64).sum()
    }

    pub(crate) fn set_summary(&mut self, summary: ChannelSummary) {
        self.summary = summary;
    }

    pub(crate) fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Replace the last frame's descriptor and extend its duration
    pub(crate) fn join_last(
        &mut self,
        frequency: u32,
        waveform: WaveformDef,
        extra_units: u32,
        release_start: u8,
    ) -> Result<(), ErrorKind> {
        let last = self.frames.last_mut().ok_or(ErrorKind::JoinWithoutNote)?;
        let units = last.duration_units().saturating_add(extra_units);
        *last = Frame::new(frequency, waveform, units, release_start)?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a FrameList {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}
