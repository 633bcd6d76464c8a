use std::io;

/// Broad class of a compile diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Unknown or misplaced characters
    Syntax,
    /// Values outside the range a command accepts
    Range,
    /// Well-formed input that cannot be turned into a frame
    Semantic,
}

/// Every diagnostic the MML compiler can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("Unknown command")]
    UnknownCommand,

    #[error("Misplaced channel selector")]
    MisplacedChannelSelector,

    #[error("Invalid octave")]
    InvalidOctave,

    #[error("Invalid length")]
    InvalidLength,

    #[error("Invalid tempo")]
    InvalidTempo,

    #[error("Invalid volume")]
    InvalidVolume,

    #[error("Invalid octave step down")]
    OctaveStepDown,

    #[error("Invalid octave step up")]
    OctaveStepUp,

    #[error("Invalid music articulation")]
    InvalidArticulation,

    #[error("Invalid sharp")]
    InvalidSharp,

    #[error("Invalid note code")]
    InvalidNoteCode,

    #[error("Can't join, no note before")]
    JoinWithoutNote,

    #[error("Can't pack frame: pause")]
    PackPause,

    #[error("Can't pack frame: waveform")]
    PackWaveform,

    #[error("Can't pack frame: adsr time_scale")]
    PackTimeScale,
}

impl ErrorKind {
    pub fn category(&self) -> Category {
        match self {
            Self::UnknownCommand | Self::MisplacedChannelSelector => Category::Syntax,
            Self::InvalidOctave
            | Self::InvalidLength
            | Self::InvalidTempo
            | Self::InvalidVolume
            | Self::OctaveStepDown
            | Self::OctaveStepUp
            | Self::InvalidArticulation
            | Self::InvalidSharp
            | Self::InvalidNoteCode
            | Self::PackTimeScale => Category::Range,
            Self::JoinWithoutNote | Self::PackPause | Self::PackWaveform => Category::Semantic,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{line}:{column}: {kind}")]
    Compile {
        kind: ErrorKind,
        line: usize,
        column: usize,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Diagnostic kind, if this is a compile error
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Compile { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
