//! Where the assistant's streamed text goes.

use std::io::{self, Write};

/// Terminal output used by the session.
pub trait Console: Send {
    /// Prints a text fragment as soon as it arrives.
    fn write_text(&mut self, text: &str);

    /// Ends the current text segment.
    fn end_line(&mut self);

    /// Shown before each line of user input.
    fn prompt(&mut self) {}
}

/// Writes to the process's stdout, flushing after every fragment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn write_text(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }

    fn end_line(&mut self) {
        let mut out = io::stdout().lock();
        let _ = out.write_all(b"\n");
        let _ = out.flush();
    }

    fn prompt(&mut self) {
        let mut out = io::stdout().lock();
        let _ = out.write_all(b"> ");
        let _ = out.flush();
    }
}
