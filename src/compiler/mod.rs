//! MML Compiler - parses MML and generates sequencer frames
//!
//! A compile is a single pass over the source text. Uppercase letters at the
//! start of a line select the channels the rest of the line applies to
//! (channel 0 when none are given). Lowercase commands either change the
//! state of every selected channel or emit a note/rest frame on each of them.

pub mod channel;
pub mod cursor;
pub mod duration;
pub mod note;
pub mod reporter;

use crate::error::{Error, ErrorKind, Result};
use crate::sequencer::{ChannelSummary, FrameEmitter, FrameMap, NoteEvent};
use crate::synth::{SquareWave, SynthConfig, WaveformBuilder};
use channel::{Articulation, ChannelTable};
use cursor::Cursor;
use note::{NoteEntry, NoteToken};
use reporter::ErrorReporter;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, trace, warn};

/// Main compiler: engine configuration and collaborators
pub struct Compiler {
    config: SynthConfig,
    builder: Box<dyn WaveformBuilder>,
    reporter: Option<Box<dyn ErrorReporter>>,
}

impl Compiler {
    /// Compiler for the default engine configuration
    pub fn new() -> Self {
        let config = SynthConfig::default();
        Self {
            config,
            builder: Box::new(SquareWave::new(config.sample_rate)),
            reporter: None,
        }
    }

    /// Compiler for a specific engine configuration, using the square wave builder
    pub fn with_config(config: SynthConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            builder: Box::new(SquareWave::new(config.sample_rate)),
            reporter: None,
        })
    }

    /// Replace the waveform descriptor builder
    pub fn with_builder(mut self, builder: impl WaveformBuilder + 'static) -> Self {
        self.builder = Box::new(builder);
        self
    }

    pub fn config(&self) -> SynthConfig {
        self.config
    }

    /// Install the sink notified of compile errors, replacing any previous one
    pub fn set_error_handler(&mut self, reporter: impl ErrorReporter + 'static) {
        self.reporter = Some(Box::new(reporter));
    }

    /// Compile MML source text into a frame map
    pub fn compile(&mut self, text: &str) -> Result<FrameMap> {
        let emitter = FrameEmitter::new(self.builder.as_ref(), self.config.time_units);
        let mut context = CompileContext::new(text, self.config, emitter);

        match context.run() {
            Ok(()) => Ok(context.finish()),
            Err(kind) => {
                let (line, column) = (context.cursor.line(), context.cursor.column());
                warn!(%kind, line, column, "MML compile failed");
                if let Some(reporter) = self.reporter.as_mut() {
                    reporter.report(&kind.to_string(), line, column);
                }
                Err(Error::Compile { kind, line, column })
            }
        }
    }

    /// Compile MML read from `input`
    pub fn compile_reader<R: Read>(&mut self, mut input: R) -> Result<FrameMap> {
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        self.compile(&text)
    }

    /// Compile an MML file
    pub fn compile_file(&mut self, path: &Path) -> Result<FrameMap> {
        let file = File::open(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to open '{}': {}", path.display(), e),
            ))
        })?;
        self.compile_reader(file)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// All mutable state of one compile call
struct CompileContext<'a> {
    cursor: Cursor<'a>,
    channels: ChannelTable,
    frames: FrameMap,
    emitter: FrameEmitter<'a>,
    config: SynthConfig,
    /// `&` seen; the next note extends the previous frame
    join: bool,
}

impl<'a> CompileContext<'a> {
    fn new(text: &'a str, config: SynthConfig, emitter: FrameEmitter<'a>) -> Self {
        Self {
            cursor: Cursor::new(text),
            channels: ChannelTable::new(),
            frames: FrameMap::new(config),
            emitter,
            config,
            join: false,
        }
    }

    fn run(&mut self) -> std::result::Result<(), ErrorKind> {
        self.start_line();

        while let Some(code) = self.cursor.advance() {
            match code {
                b'\n' => self.start_line(),
                b'#' | b';' => {
                    self.cursor.skip_line();
                    self.start_line();
                }
                b'|' => {}
                _ if code <= b' ' || !code.is_ascii() => {}
                b'&' => self.join = true,
                b'A'..=b'Z' => self.select_channels(code)?,
                b'o' => {
                    let octave = self.cursor.read_digit().ok_or(ErrorKind::InvalidOctave)?;
                    self.channels.for_each_active(|s| s.set_octave(octave))?;
                }
                b'l' => {
                    let length = self
                        .cursor
                        .read_positive()
                        .ok_or(ErrorKind::InvalidLength)?;
                    let dots = self.cursor.read_dots();
                    self.channels.for_each_active(|s| {
                        s.default_length = length;
                        s.default_length_dot = dots;
                        Ok(())
                    })?;
                }
                b't' => {
                    let tempo = self
                        .cursor
                        .read_positive()
                        .ok_or(ErrorKind::InvalidTempo)?;
                    self.channels.for_each_active(|s| {
                        s.tempo = tempo;
                        Ok(())
                    })?;
                }
                b'v' => {
                    let volume = self.cursor.read_number().ok_or(ErrorKind::InvalidVolume)?;
                    self.channels.for_each_active(|s| s.set_volume(volume))?;
                }
                b'<' => self.channels.for_each_active(|s| s.octave_down())?,
                b'>' => self.channels.for_each_active(|s| s.octave_up())?,
                b'm' => {
                    let articulation = self
                        .cursor
                        .peek()
                        .and_then(Articulation::from_code)
                        .ok_or(ErrorKind::InvalidArticulation)?;
                    self.cursor.advance();
                    self.channels.for_each_active(|s| {
                        s.articulation = articulation;
                        Ok(())
                    })?;
                }
                _ => match NoteEntry::from_code(code) {
                    Some(entry) => {
                        let token = NoteToken::parse(entry, &mut self.cursor)?;
                        self.play(&token)?;
                    }
                    None => return Err(ErrorKind::UnknownCommand),
                },
            }
        }

        Ok(())
    }

    /// New source line: channel 0 only, no pending join
    fn start_line(&mut self) {
        self.channels.reset_active();
        self.frames.ensure_channels(self.channels.len());
        self.join = false;
    }

    /// Decode the channel selector run starting with `first`
    fn select_channels(&mut self, first: u8) -> std::result::Result<(), ErrorKind> {
        if self.cursor.column() != 1 {
            return Err(ErrorKind::MisplacedChannelSelector);
        }
        self.channels.disable(0);
        self.channels.enable((first - b'A') as usize);
        while let Some(code) = self.cursor.advance_if(|b| b.is_ascii_uppercase()) {
            self.channels.enable((code - b'A') as usize);
        }
        self.frames.ensure_channels(self.channels.len());
        Ok(())
    }

    /// Emit a note or rest on every active channel
    fn play(&mut self, token: &NoteToken) -> std::result::Result<(), ErrorKind> {
        let join = std::mem::take(&mut self.join);

        for index in self.channels.active_channels() {
            let Some(state) = self.channels.get_mut(index) else {
                continue;
            };
            let frequency = token.frequency(state.octave);
            let (length, dots) =
                token.resolve_length(state.default_length, state.default_length_dot);
            let time_scale =
                duration::quantize(&mut state.running_time, &self.config, state.tempo, length, dots)?;

            let event = NoteEvent {
                frequency,
                volume: state.volume,
                time_scale,
                articulation: state.articulation.ratio(),
                join,
            };
            trace!(channel = index, frequency, time_scale, join, "frame");
            self.emitter.emit(self.frames.channel_mut(index), event)?;
        }

        Ok(())
    }

    /// Hand the frames over, recording how long each channel played
    fn finish(mut self) -> FrameMap {
        self.frames.ensure_channels(self.channels.len());
        for (index, state) in self.channels.iter().enumerate() {
            let list = self.frames.channel_mut(index);
            list.set_summary(ChannelSummary {
                elapsed_seconds: state.running_time.seconds,
                elapsed_samples: state.running_time.time_units,
            });
            info!(
                channel = index,
                seconds = state.running_time.seconds,
                samples = state.running_time.time_units,
                frames = list.len(),
                "channel compiled"
            );
        }
        self.frames
    }
}
