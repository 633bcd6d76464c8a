//! Channel state management

use crate::error::ErrorKind;
use tracing::debug;

/// Highest octave reachable with `o`
pub const MAX_OCTAVE_SET: u8 = 6;

/// Highest octave reachable with `>`
pub const MAX_OCTAVE_STEP: u8 = 9;

/// Largest accepted volume
pub const MAX_VOLUME: u32 = 128;

/// Sounding fraction of a note before release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Articulation {
    Legato,
    Normal,
    Staccato,
}

impl Articulation {
    pub fn ratio(self) -> f64 {
        match self {
            Self::Legato => 1.0,
            Self::Normal => 7.0 / 8.0,
            Self::Staccato => 2.5 / 4.0,
        }
    }

    /// Parse the letter following `m`
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            b'l' => Some(Self::Legato),
            b'n' => Some(Self::Normal),
            b's' => Some(Self::Staccato),
            _ => None,
        }
    }
}

/// Played time of a channel, exact and quantized
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunningTime {
    pub seconds: f64,
    /// Samples covered by emitted frames (multiple of the envelope time-units)
    pub time_units: i64,
}

/// Parser state of one channel
#[derive(Debug, Clone)]
pub struct ChannelState {
    pub octave: u8,
    /// Default note length (4 = quarter)
    pub default_length: u32,
    pub default_length_dot: u32,
    /// Tempo (BPM)
    pub tempo: u32,
    pub volume: u8,
    pub articulation: Articulation,
    /// Selected on the current source line
    pub active: bool,
    pub running_time: RunningTime,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            octave: 4,
            default_length: 4,
            default_length_dot: 0,
            tempo: 120,
            volume: 63,
            articulation: Articulation::Normal,
            active: false,
            running_time: RunningTime::default(),
        }
    }
}

impl ChannelState {
    pub fn set_octave(&mut self, octave: u8) -> Result<(), ErrorKind> {
        if octave > MAX_OCTAVE_SET {
            return Err(ErrorKind::InvalidOctave);
        }
        self.octave = octave;
        Ok(())
    }

    pub fn octave_down(&mut self) -> Result<(), ErrorKind> {
        self.octave = self
            .octave
            .checked_sub(1)
            .ok_or(ErrorKind::OctaveStepDown)?;
        Ok(())
    }

    pub fn octave_up(&mut self) -> Result<(), ErrorKind> {
        if self.octave >= MAX_OCTAVE_STEP {
            return Err(ErrorKind::OctaveStepUp);
        }
        self.octave += 1;
        Ok(())
    }

    pub fn set_volume(&mut self, volume: u32) -> Result<(), ErrorKind> {
        if volume > MAX_VOLUME {
            return Err(ErrorKind::InvalidVolume);
        }
        self.volume = volume as u8;
        Ok(())
    }
}

/// Channel states, grown on first reference and never shrunk
#[derive(Debug, Default)]
pub struct ChannelTable {
    states: Vec<ChannelState>,
}

impl ChannelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, channel: usize) -> Option<&ChannelState> {
        self.states.get(channel)
    }

    pub fn get_mut(&mut self, channel: usize) -> Option<&mut ChannelState> {
        self.states.get_mut(channel)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChannelState> {
        self.states.iter()
    }

    /// Mark a channel active, creating it (and any lower channel) if unknown
    pub fn enable(&mut self, channel: usize) {
        if channel >= self.states.len() {
            for index in self.states.len()..=channel {
                debug!(channel = index, "new channel");
            }
            self.states.resize_with(channel + 1, ChannelState::default);
        }
        self.states[channel].active = true;
    }

    pub fn disable(&mut self, channel: usize) {
        if let Some(state) = self.states.get_mut(channel) {
            state.active = false;
        }
    }

    /// Line start: only channel 0 is active
    pub fn reset_active(&mut self) {
        for state in self.states.iter_mut().skip(1) {
            state.active = false;
        }
        self.enable(0);
    }

    /// Indices of the channels active on the current line
    pub fn active_channels(&self) -> Vec<usize> {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.active)
            .map(|(i, _)| i)
            .collect()
    }

    /// Apply a state change to every active channel, stopping at the first failure
    pub fn for_each_active<F>(&mut self, mut f: F) -> Result<(), ErrorKind>
    where
        F: FnMut(&mut ChannelState) -> Result<(), ErrorKind>,
    {
        for state in self.states.iter_mut().filter(|s| s.active) {
            f(state)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = ChannelState::default();
        assert_eq!(state.octave, 4);
        assert_eq!(state.default_length, 4);
        assert_eq!(state.default_length_dot, 0);
        assert_eq!(state.tempo, 120);
        assert_eq!(state.volume, 63);
        assert_eq!(state.articulation, Articulation::Normal);
        assert_eq!(state.running_time, RunningTime::default());
    }

    #[test]
    fn test_octave_bounds() {
        let mut state = ChannelState::default();
        assert!(state.set_octave(6).is_ok());
        assert_eq!(state.set_octave(7), Err(ErrorKind::InvalidOctave));
        assert_eq!(state.octave, 6);

        for _ in 0..3 {
            state.octave_up().unwrap();
        }
        assert_eq!(state.octave, 9);
        assert_eq!(state.octave_up(), Err(ErrorKind::OctaveStepUp));

        state.set_octave(0).unwrap();
        assert_eq!(state.octave_down(), Err(ErrorKind::OctaveStepDown));
        assert_eq!(state.octave, 0);
    }

    #[test]
    fn test_volume_bounds() {
        let mut state = ChannelState::default();
        assert!(state.set_volume(0).is_ok());
        assert!(state.set_volume(128).is_ok());
        assert_eq!(state.set_volume(129), Err(ErrorKind::InvalidVolume));
        assert_eq!(state.volume, 128);
    }

    #[test]
    fn test_articulation_codes() {
        assert_eq!(Articulation::from_code(b'l'), Some(Articulation::Legato));
        assert_eq!(Articulation::from_code(b's'), Some(Articulation::Staccato));
        assert_eq!(Articulation::from_code(b'x'), None);
        assert_eq!(Articulation::Staccato.ratio(), 0.625);
    }

    #[test]
    fn test_table_activation() {
        let mut table = ChannelTable::new();
        table.reset_active();
        assert_eq!(table.len(), 1);
        assert_eq!(table.active_channels(), vec![0]);

        table.disable(0);
        table.enable(2);
        assert_eq!(table.len(), 3);
        assert_eq!(table.active_channels(), vec![2]);

        table.reset_active();
        assert_eq!(table.len(), 3);
        assert_eq!(table.active_channels(), vec![0]);
    }

    #[test]
    fn test_for_each_active() {
        let mut table = ChannelTable::new();
        table.enable(0);
        table.enable(1);
        table.enable(2);
        table.disable(1);
        table
            .for_each_active(|s| s.set_volume(100))
            .unwrap();
        assert_eq!(table.get(0).unwrap().volume, 100);
        assert_eq!(table.get(1).unwrap().volume, 63);
        assert_eq!(table.get(2).unwrap().volume, 100);
    }
}
