//! Compiled output: per-channel sequencer frame lists

pub mod frame;
pub mod json;

pub use frame::{ChannelSummary, Frame, FrameList, MAX_DURATION_UNITS};
pub use json::FrameMapJson;

use crate::error::ErrorKind;
use crate::synth::{SynthConfig, WaveformBuilder};

/// Frames of every channel, indexed by channel number
#[derive(Debug, Clone, Default)]
pub struct FrameMap {
    channels: Vec<FrameList>,
    config: SynthConfig,
}

impl FrameMap {
    pub fn new(config: SynthConfig) -> Self {
        Self {
            channels: Vec::new(),
            config,
        }
    }

    /// Engine constants the frames were quantized against
    pub fn config(&self) -> SynthConfig {
        self.config
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, index: usize) -> Option<&FrameList> {
        self.channels.get(index)
    }

    /// Frames of a channel, empty if the channel is unknown
    pub fn frames(&self, index: usize) -> &[Frame] {
        self.channels.get(index).map(FrameList::frames).unwrap_or(&[])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FrameList> {
        self.channels.iter()
    }

    pub fn total_frames(&self) -> usize {
        self.channels.iter().map(FrameList::len).sum()
    }

    pub fn summaries(&self) -> Vec<ChannelSummary> {
        self.channels.iter().map(FrameList::summary).collect()
    }

    /// Make sure channels `0..count` exist
    pub(crate) fn ensure_channels(&mut self, count: usize) {
        if self.channels.len() < count {
            self.channels.resize_with(count, FrameList::new);
        }
    }

    pub(crate) fn channel_mut(&mut self, index: usize) -> &mut FrameList {
        self.ensure_channels(index + 1);
        &mut self.channels[index]
    }
}

impl<'a> IntoIterator for &'a FrameMap {
    type Item = &'a FrameList;
    type IntoIter = std::slice::Iter<'a, FrameList>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.iter()
    }
}

/// A note or rest ready to be packed
#[derive(Debug, Clone, Copy)]
pub struct NoteEvent {
    /// Frequency in Hz (0 = rest)
    pub frequency: u32,
    pub volume: u8,
    /// Duration in envelope time-units
    pub time_scale: u32,
    /// Sounding fraction of the envelope
    pub articulation: f64,
    /// Extend the previous frame instead of appending
    pub join: bool,
}

/// Appends or amends frames, packing them through the engine's builder
pub struct FrameEmitter<'a> {
    builder: &'a dyn WaveformBuilder,
    time_units: u32,
}

impl<'a> FrameEmitter<'a> {
    pub fn new(builder: &'a dyn WaveformBuilder, time_units: u32) -> Self {
        Self {
            builder,
            time_units,
        }
    }

    /// Envelope offset where release starts for a given articulation
    pub fn release_start(&self, articulation: f64) -> u8 {
        let units = (self.time_units as f64 * articulation).round() as i64 - 1;
        units.clamp(0, u8::MAX as i64) as u8
    }

    pub fn emit(&self, list: &mut FrameList, event: NoteEvent) -> Result<(), ErrorKind> {
        if event.join && list.is_empty() {
            return Err(ErrorKind::JoinWithoutNote);
        }

        let waveform = if event.frequency == 0 {
            self.builder
                .build(0, 0)
                .ok_or(ErrorKind::PackPause)?
        } else {
            self.builder
                .build(event.frequency, event.volume)
                .ok_or(ErrorKind::PackWaveform)?
        };

        let release_start = self.release_start(event.articulation);
        if event.join {
            list.join_last(event.frequency, waveform, event.time_scale, release_start)
        } else {
            let frame = Frame::new(event.frequency, waveform, event.time_scale, release_start)?;
            list.push(frame);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{SquareWave, WaveformDef};

    struct Refusing;

    impl WaveformBuilder for Refusing {
        fn build(&self, _frequency: u32, _volume: u8) -> Option<WaveformDef> {
            None
        }
    }

    fn note(frequency: u32, time_scale: u32, join: bool) -> NoteEvent {
        NoteEvent {
            frequency,
            volume: 63,
            time_scale,
            articulation: 7.0 / 8.0,
            join,
        }
    }

    #[test]
    fn test_release_start() {
        let wave = SquareWave::new(16000);
        let emitter = FrameEmitter::new(&wave, 32);
        assert_eq!(emitter.release_start(1.0), 31);
        assert_eq!(emitter.release_start(7.0 / 8.0), 27);
        assert_eq!(emitter.release_start(2.5 / 4.0), 19);
    }

    #[test]
    fn test_emit_and_join() {
        let wave = SquareWave::new(16000);
        let emitter = FrameEmitter::new(&wave, 32);
        let mut list = FrameList::new();

        emitter.emit(&mut list, note(440, 250, false)).unwrap();
        emitter.emit(&mut list, note(0, 125, false)).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.frames()[1].is_rest());
        assert!(list.frames()[1].waveform().is_silence());

        emitter.emit(&mut list, note(440, 125, true)).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.frames()[1].duration_units(), 250);
        assert_eq!(list.frames()[1].frequency(), 440);
    }

    #[test]
    fn test_join_without_frame() {
        let wave = SquareWave::new(16000);
        let emitter = FrameEmitter::new(&wave, 32);
        let mut list = FrameList::new();
        assert_eq!(
            emitter.emit(&mut list, note(440, 10, true)),
            Err(ErrorKind::JoinWithoutNote)
        );
    }

    #[test]
    fn test_builder_refusal() {
        let emitter = FrameEmitter::new(&Refusing, 32);
        let mut list = FrameList::new();
        assert_eq!(
            emitter.emit(&mut list, note(0, 10, false)),
            Err(ErrorKind::PackPause)
        );
        assert_eq!(
            emitter.emit(&mut list, note(440, 10, false)),
            Err(ErrorKind::PackWaveform)
        );
        assert!(list.is_empty());
    }

    #[test]
    fn test_zero_time_scale_rejected() {
        let wave = SquareWave::new(16000);
        let emitter = FrameEmitter::new(&wave, 32);
        let mut list = FrameList::new();
        assert_eq!(
            emitter.emit(&mut list, note(440, 0, false)),
            Err(ErrorKind::PackTimeScale)
        );
    }

    #[test]
    fn test_frame_map_grows() {
        let mut map = FrameMap::new(SynthConfig::default());
        assert_eq!(map.channel_count(), 0);
        map.channel_mut(2);
        assert_eq!(map.channel_count(), 3);
        map.ensure_channels(1);
        assert_eq!(map.channel_count(), 3);
        assert!(map.frames(7).is_empty());
    }
}
