pub mod compiler;
pub mod error;
pub mod sequencer;
pub mod synth;

pub use compiler::Compiler;
pub use error::{Error, ErrorKind};
pub use sequencer::{Frame, FrameList, FrameMap};
pub use synth::SynthConfig;
