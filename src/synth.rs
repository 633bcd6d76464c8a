//! Playback engine interface
//!
//! The real-time engine steps through compiled frames sample by sample. The
//! compiler only needs its numeric constants and a way to turn a
//! frequency/volume pair into a waveform descriptor.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Default synthesis sample rate (Hz)
pub const DEFAULT_SAMPLE_RATE: u32 = 16000;

/// Default number of envelope time-units per note envelope
pub const DEFAULT_TIME_UNITS: u32 = 32;

/// Largest volume the engine accepts
pub const MAX_VOLUME: u8 = 128;

/// Engine constants consumed by the compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Envelope time-units per note (release offsets are stored in a byte)
    pub time_units: u32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            time_units: DEFAULT_TIME_UNITS,
        }
    }
}

impl SynthConfig {
    pub fn new(sample_rate: u32, time_units: u32) -> Self {
        Self {
            sample_rate,
            time_units,
        }
    }

    /// Read a JSON configuration; missing fields keep their defaults
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::Config("sample rate must be positive".to_string()));
        }
        if !(1..=256).contains(&self.time_units) {
            return Err(Error::Config(format!(
                "time units must be within 1..=256, got {}",
                self.time_units
            )));
        }
        Ok(())
    }
}

/// Waveform descriptor packed into each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WaveformDef {
    /// Samples per half cycle (0 for silence)
    pub half_period: u16,
    /// Output amplitude
    pub amplitude: u8,
}

impl WaveformDef {
    pub const SILENCE: Self = Self {
        half_period: 0,
        amplitude: 0,
    };

    pub fn is_silence(&self) -> bool {
        self.half_period == 0
    }
}

/// Builds waveform descriptors for the playback engine
pub trait WaveformBuilder {
    /// Build a descriptor for `frequency` Hz (0 = rest) at `volume` (0..=128).
    ///
    /// Returns `None` when the engine cannot represent the parameters.
    fn build(&self, frequency: u32, volume: u8) -> Option<WaveformDef>;
}

/// Square wave voice, the engine's default waveform
#[derive(Debug, Clone, Copy)]
pub struct SquareWave {
    sample_rate: u32,
}

impl SquareWave {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }
}

impl WaveformBuilder for SquareWave {
    fn build(&self, frequency: u32, volume: u8) -> Option<WaveformDef> {
        if frequency == 0 {
            return Some(WaveformDef::SILENCE);
        }
        if volume > MAX_VOLUME {
            return None;
        }
        let half_period = (self.sample_rate as f64 / (2.0 * frequency as f64)).round();
        if half_period < 1.0 || half_period > u16::MAX as f64 {
            return None;
        }
        Some(WaveformDef {
            half_period: half_period as u16,
            amplitude: volume,
        })
    }
}
