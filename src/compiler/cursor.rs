//! Byte cursor over MML source with line/column tracking

/// Single-pass reader over the source text.
///
/// `column` is the 1-based column of the last consumed character; it drops to
/// 0 after a newline. Carriage returns do not move the column.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
            line: 1,
            column: 0,
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    pub fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        match b {
            b'\n' => {
                self.line += 1;
                self.column = 0;
            }
            b'\r' => {}
            _ => self.column += 1,
        }
        Some(b)
    }

    /// Consume the next byte if `pred` accepts it
    pub fn advance_if(&mut self, pred: impl Fn(u8) -> bool) -> Option<u8> {
        match self.peek() {
            Some(b) if pred(b) => self.advance(),
            _ => None,
        }
    }

    /// Read one byte and interpret it as a decimal digit.
    ///
    /// A non-digit is consumed as well, unless it ends the line.
    pub fn read_digit(&mut self) -> Option<u8> {
        match self.peek()? {
            b'\n' => None,
            b => {
                self.advance();
                b.is_ascii_digit().then(|| b - b'0')
            }
        }
    }

    /// Read a run of decimal digits, saturating at `u32::MAX`.
    ///
    /// Returns `None` (consuming nothing) if no digit follows.
    pub fn read_number(&mut self) -> Option<u32> {
        let mut value: Option<u32> = None;
        while let Some(b) = self.advance_if(|b| b.is_ascii_digit()) {
            let digit = (b - b'0') as u32;
            value = Some(
                value
                    .unwrap_or(0)
                    .saturating_mul(10)
                    .saturating_add(digit),
            );
        }
        value
    }

    /// Read a non-zero number; on failure nothing is consumed
    pub fn read_positive(&mut self) -> Option<u32> {
        let mut ahead = self.clone();
        let value = ahead.read_number().filter(|&n| n > 0)?;
        *self = ahead;
        Some(value)
    }

    /// Count and consume a run of `.` characters
    pub fn read_dots(&mut self) -> u32 {
        let mut dots = 0;
        while self.advance_if(|b| b == b'.').is_some() {
            dots += 1;
        }
        dots
    }

    /// Discard everything up to and including the next newline
    pub fn skip_line(&mut self) {
        while let Some(b) = self.advance() {
            if b == b'\n' {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_and_column() {
        let mut cursor = Cursor::new("ab\r\ncd");
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (1, 1));
        cursor.advance();
        cursor.advance(); // \r
        assert_eq!((cursor.line(), cursor.column()), (1, 2));
        cursor.advance(); // \n
        assert_eq!((cursor.line(), cursor.column()), (2, 0));
        cursor.advance();
        assert_eq!((cursor.line(), cursor.column()), (2, 1));
    }

    #[test]
    fn test_read_number() {
        let mut cursor = Cursor::new("120c");
        assert_eq!(cursor.read_number(), Some(120));
        assert_eq!(cursor.column(), 3);
        assert_eq!(cursor.peek(), Some(b'c'));
        assert_eq!(cursor.read_number(), None);
        assert_eq!(cursor.column(), 3);
    }

    #[test]
    fn test_read_number_saturates() {
        let mut cursor = Cursor::new("99999999999999");
        assert_eq!(cursor.read_number(), Some(u32::MAX));
        assert!(cursor.is_eof());
    }

    #[test]
    fn test_read_digit_and_dots() {
        let mut cursor = Cursor::new("7..x");
        assert_eq!(cursor.read_digit(), Some(7));
        assert_eq!(cursor.read_dots(), 2);
        assert_eq!(cursor.read_digit(), None);
    }

    #[test]
    fn test_read_digit_stops_at_newline() {
        let mut cursor = Cursor::new("x\n");
        assert_eq!(cursor.read_digit(), None);
        assert_eq!(cursor.column(), 1);
        assert_eq!(cursor.read_digit(), None);
        assert_eq!((cursor.line(), cursor.column()), (1, 1));
        assert_eq!(cursor.peek(), Some(b'\n'));
    }

    #[test]
    fn test_read_positive() {
        let mut cursor = Cursor::new("00c");
        assert_eq!(cursor.read_positive(), None);
        assert_eq!(cursor.column(), 0);
        assert_eq!(cursor.peek(), Some(b'0'));

        let mut cursor = Cursor::new("016c");
        assert_eq!(cursor.read_positive(), Some(16));
        assert_eq!(cursor.peek(), Some(b'c'));
    }

    #[test]
    fn test_skip_line() {
        let mut cursor = Cursor::new("comment\nc");
        cursor.skip_line();
        assert_eq!(cursor.line(), 2);
        assert_eq!(cursor.peek(), Some(b'c'));

        let mut cursor = Cursor::new("no newline");
        cursor.skip_line();
        assert!(cursor.is_eof());
    }
}
