//! Compile error notification

/// Receives each compile diagnostic as it is detected
pub trait ErrorReporter {
    fn report(&mut self, message: &str, line: usize, column: usize);
}

impl<F> ErrorReporter for F
where
    F: FnMut(&str, usize, usize),
{
    fn report(&mut self, message: &str, line: usize, column: usize) {
        self(message, line, column)
    }
}
