//! Note and frequency calculations
//!
//! Note codes run from 0 ("C" of octave 0) to 84. Code 33 is the 440 Hz
//! reference, so octave 2 here is the fourth octave in scientific pitch.

use super::cursor::Cursor;
use crate::error::ErrorKind;

/// Highest explicit note code
pub const MAX_NOTE_CODE: u32 = 84;

/// Note code of the 440 Hz reference
pub const REFERENCE_CODE: i32 = 33;

/// Frequency in Hz of a note code (truncated)
pub fn freq_from_code(code: i32) -> u32 {
    (440.0 * 2f64.powf((code - REFERENCE_CODE) as f64 / 12.0)) as u32
}

/// Chromatic offset of a letter within its octave (`c` = 0).
///
/// Letters step by whole tones except between `e`/`f` and `b`/`c`. The
/// letter below `a` (`` ` ``) wraps to `g`.
pub fn letter_semitone(letter: u8) -> i32 {
    let step = (letter as i32 - b'a' as i32 + 5).rem_euclid(7);
    let semitone = step * 2;
    if semitone > 4 {
        semitone - 1
    } else {
        semitone
    }
}

/// Frequency of letter note at `octave`
pub fn freq_from_note(letter: u8, sharp: bool, octave: u8) -> u32 {
    let semitone = letter_semitone(letter) + sharp as i32;
    freq_from_code(semitone + octave as i32 * 12)
}

/// How a note or rest was introduced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEntry {
    /// `p` or `r`
    Rest,
    /// `n` followed by a note code
    Code,
    /// `a`..`g`
    Letter(u8),
}

impl NoteEntry {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            b'p' | b'r' => Some(Self::Rest),
            b'n' => Some(Self::Code),
            b'a'..=b'g' => Some(Self::Letter(code)),
            _ => None,
        }
    }
}

/// Modifier characters following a note entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    /// `+` or `#`
    Sharp,
    /// `-`
    Flat,
    /// Start of a digit run
    Digits,
    /// `.`
    Dot,
}

impl Modifier {
    fn classify(b: u8, entry: NoteEntry) -> Option<Self> {
        let letter = matches!(entry, NoteEntry::Letter(_));
        match b {
            b'+' | b'#' if letter => Some(Self::Sharp),
            b'-' if letter => Some(Self::Flat),
            b'0'..=b'9' => Some(Self::Digits),
            b'.' => Some(Self::Dot),
            _ => None,
        }
    }
}

/// Position in the modifier grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModifierState {
    AwaitingModifier,
    HasExplicitLength,
    HasNoteCode,
}

impl ModifierState {
    fn next(self, entry: NoteEntry, modifier: Modifier) -> Result<Self, ErrorKind> {
        use ModifierState::*;

        match (self, modifier) {
            (state, Modifier::Dot | Modifier::Sharp | Modifier::Flat) => Ok(state),
            (AwaitingModifier, Modifier::Digits) => match entry {
                NoteEntry::Code => Ok(HasNoteCode),
                _ => Ok(HasExplicitLength),
            },
            (HasExplicitLength, Modifier::Digits) => Err(ErrorKind::InvalidLength),
            (HasNoteCode, Modifier::Digits) => Err(ErrorKind::InvalidNoteCode),
        }
    }
}

/// A fully parsed note or rest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteToken {
    pub entry: NoteEntry,
    pub sharp: bool,
    /// Explicit length (4 = quarter)
    pub length: Option<u32>,
    pub dots: u32,
    pub note_code: Option<u32>,
}

impl NoteToken {
    /// Read the modifiers following `entry`, which has already been consumed
    pub fn parse(entry: NoteEntry, cursor: &mut Cursor) -> Result<Self, ErrorKind> {
        let mut token = Self {
            entry,
            sharp: false,
            length: None,
            dots: 0,
            note_code: None,
        };
        let mut state = ModifierState::AwaitingModifier;

        while let Some(modifier) = cursor.peek().and_then(|b| Modifier::classify(b, entry)) {
            state = state.next(entry, modifier)?;
            match modifier {
                Modifier::Sharp | Modifier::Flat => {
                    token.apply_accidental(modifier)?;
                    cursor.advance();
                }
                Modifier::Dot => {
                    token.dots += 1;
                    cursor.advance();
                }
                Modifier::Digits => {
                    let value = cursor.read_number().unwrap_or(0);
                    match state {
                        ModifierState::HasNoteCode => {
                            if value > MAX_NOTE_CODE {
                                return Err(ErrorKind::InvalidNoteCode);
                            }
                            token.note_code = Some(value);
                        }
                        _ => {
                            if value == 0 {
                                return Err(ErrorKind::InvalidLength);
                            }
                            token.length = Some(value);
                        }
                    }
                }
            }
        }

        if entry == NoteEntry::Code && token.note_code.is_none() {
            return Err(ErrorKind::InvalidNoteCode);
        }
        Ok(token)
    }

    fn apply_accidental(&mut self, modifier: Modifier) -> Result<(), ErrorKind> {
        let NoteEntry::Letter(mut letter) = self.entry else {
            return Ok(());
        };
        if modifier == Modifier::Flat {
            if matches!(letter, b'e' | b'b') {
                return Err(ErrorKind::InvalidSharp);
            }
            letter -= 1;
        }
        if matches!(letter, b'e' | b'b') {
            return Err(ErrorKind::InvalidSharp);
        }
        self.entry = NoteEntry::Letter(letter);
        self.sharp = true;
        Ok(())
    }

    pub fn is_rest(&self) -> bool {
        match self.entry {
            NoteEntry::Rest => true,
            NoteEntry::Code => self.note_code == Some(0),
            NoteEntry::Letter(_) => false,
        }
    }

    /// Frequency in Hz at the channel's `octave`, 0 for rests
    pub fn frequency(&self, octave: u8) -> u32 {
        if self.is_rest() {
            return 0;
        }
        match self.entry {
            NoteEntry::Code => freq_from_code(self.note_code.unwrap_or(0) as i32),
            NoteEntry::Letter(letter) => freq_from_note(letter, self.sharp, octave),
            NoteEntry::Rest => 0,
        }
    }

    /// Length and dots to play, falling back to the channel defaults
    pub fn resolve_length(&self, default_length: u32, default_dots: u32) -> (u32, u32) {
        match self.length {
            Some(length) => (length, self.dots),
            None if self.dots == 0 => (default_length, default_dots),
            None => (default_length, self.dots),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<NoteToken, ErrorKind> {
        let mut cursor = Cursor::new(text);
        let entry = NoteEntry::from_code(cursor.advance().unwrap()).unwrap();
        NoteToken::parse(entry, &mut cursor)
    }

    #[test]
    fn test_freq_from_code() {
        assert_eq!(freq_from_code(33), 440);
        assert_eq!(freq_from_code(45), 880);
        assert_eq!(freq_from_code(21), 220);
        assert_eq!(freq_from_code(0), 65);
    }

    #[test]
    fn test_letter_semitones() {
        let semitones: Vec<i32> = b"cdefgab".iter().map(|&l| letter_semitone(l)).collect();
        assert_eq!(semitones, vec![0, 2, 4, 5, 7, 9, 11]);
        assert_eq!(letter_semitone(b'`'), 7);
    }

    #[test]
    fn test_freq_from_note() {
        // a at octave 2 is the reference pitch
        assert_eq!(freq_from_note(b'a', false, 2), 440);
        assert_eq!(freq_from_note(b'c', true, 2), freq_from_code(25));
    }

    #[test]
    fn test_plain_letter() {
        let token = parse("c").unwrap();
        assert_eq!(token.entry, NoteEntry::Letter(b'c'));
        assert_eq!(token.length, None);
        assert_eq!(token.dots, 0);
        assert!(!token.sharp);
    }

    #[test]
    fn test_length_and_dots() {
        let token = parse("d8..").unwrap();
        assert_eq!(token.length, Some(8));
        assert_eq!(token.dots, 2);

        let token = parse("d.8").unwrap();
        assert_eq!(token.length, Some(8));
        assert_eq!(token.dots, 1);
    }

    #[test]
    fn test_double_length_rejected() {
        assert_eq!(parse("c4.8"), Err(ErrorKind::InvalidLength));
        assert_eq!(parse("c0"), Err(ErrorKind::InvalidLength));
    }

    #[test]
    fn test_accidentals() {
        let token = parse("f+").unwrap();
        assert_eq!(token.entry, NoteEntry::Letter(b'f'));
        assert!(token.sharp);

        let token = parse("c#4").unwrap();
        assert!(token.sharp);
        assert_eq!(token.length, Some(4));

        let token = parse("d-").unwrap();
        assert_eq!(token.entry, NoteEntry::Letter(b'c'));
        assert!(token.sharp);

        let token = parse("a-").unwrap();
        assert_eq!(token.frequency(4), freq_from_note(b'g', true, 4));
    }

    #[test]
    fn test_invalid_accidentals() {
        for text in ["e+", "b#", "e-", "b-", "f-", "c-", "d--"] {
            assert_eq!(parse(text), Err(ErrorKind::InvalidSharp), "{}", text);
        }
    }

    #[test]
    fn test_rest_ignores_accidentals() {
        let mut cursor = Cursor::new("r+");
        cursor.advance();
        let token = NoteToken::parse(NoteEntry::Rest, &mut cursor).unwrap();
        assert!(token.is_rest());
        assert_eq!(cursor.peek(), Some(b'+'));
    }

    #[test]
    fn test_note_code() {
        let token = parse("n33").unwrap();
        assert_eq!(token.note_code, Some(33));
        assert_eq!(token.length, None);
        assert_eq!(token.frequency(4), 440);

        let token = parse("n0.").unwrap();
        assert!(token.is_rest());
        assert_eq!(token.dots, 1);
        assert_eq!(token.frequency(4), 0);
    }

    #[test]
    fn test_invalid_note_code() {
        assert_eq!(parse("n85"), Err(ErrorKind::InvalidNoteCode));
        assert_eq!(parse("n"), Err(ErrorKind::InvalidNoteCode));
        assert_eq!(parse("n12.4"), Err(ErrorKind::InvalidNoteCode));
        assert!(parse("n84").is_ok());
    }

    #[test]
    fn test_resolve_length() {
        let token = parse("c").unwrap();
        assert_eq!(token.resolve_length(8, 1), (8, 1));

        let token = parse("c.").unwrap();
        assert_eq!(token.resolve_length(8, 2), (8, 1));

        let token = parse("c16").unwrap();
        assert_eq!(token.resolve_length(8, 1), (16, 0));
    }
}
