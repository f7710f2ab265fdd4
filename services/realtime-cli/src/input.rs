//! Terminal input.
//!
//! Lines are read on a plain OS thread. A blocking stdin read on a runtime
//! thread would keep the runtime alive at shutdown until the user pressed
//! Enter.

use std::io::BufRead;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Forwards lines from `reader` to the returned channel until end of input,
/// a read error, or the receiver being dropped.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    error!(error = %e, "stdin");
                    return;
                }
            }
        }
        debug!("End of input.");
    });
    rx
}

/// [`spawn_line_reader`] over the process's stdin.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    spawn_line_reader(std::io::BufReader::new(std::io::stdin()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_lines_are_forwarded_in_order() {
        let mut lines = spawn_line_reader(Cursor::new("hello\n\nworld\n"));
        assert_eq!(lines.recv().await.as_deref(), Some("hello"));
        assert_eq!(lines.recv().await.as_deref(), Some(""));
        assert_eq!(lines.recv().await.as_deref(), Some("world"));
        assert_eq!(lines.recv().await, None);
    }

    #[tokio::test]
    async fn test_invalid_utf8_ends_input() {
        let mut lines = spawn_line_reader(Cursor::new(b"ok\n\xff\xfe\nlater\n".to_vec()));
        assert_eq!(lines.recv().await.as_deref(), Some("ok"));
        assert_eq!(lines.recv().await, None);
    }
}
