//! Note duration quantization
//!
//! Durations are emitted as whole envelope time-units. Each channel keeps the
//! exact elapsed time next to the quantized one, and every note is rounded
//! against the exact total rather than on its own, so rounding error never
//! accumulates and channels stay in sync over long pieces.

use super::channel::RunningTime;
use crate::error::ErrorKind;
use crate::sequencer::MAX_DURATION_UNITS;
use crate::synth::SynthConfig;

/// Seconds taken by a note of `length` (4 = quarter) with `dots` at `tempo` BPM
pub fn note_seconds(tempo: u32, length: u32, dots: u32) -> f64 {
    let mut effective = length as f64;
    for _ in 0..dots {
        effective /= 1.5;
    }
    60.0 * 4.0 / tempo as f64 / effective
}

/// Advance `running` by one note and return its duration in time-units.
///
/// `tempo` and `length` must be non-zero. A note that does not fit a single
/// frame leaves `running` untouched.
pub fn quantize(
    running: &mut RunningTime,
    config: &SynthConfig,
    tempo: u32,
    length: u32,
    dots: u32,
) -> Result<u32, ErrorKind> {
    let seconds = running.seconds + note_seconds(tempo, length, dots);

    let units = config.time_units as f64;
    let total = (seconds * config.sample_rate as f64).round();
    let time_scale = ((total - running.time_units as f64) / units).round();

    if !(1.0..=MAX_DURATION_UNITS as f64).contains(&time_scale) {
        return Err(ErrorKind::PackTimeScale);
    }
    let time_scale = time_scale as u32;

    running.seconds = seconds;
    running.time_units += time_scale as i64 * config.time_units as i64;
    Ok(time_scale)
}
