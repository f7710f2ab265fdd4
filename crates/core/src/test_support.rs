//! In-memory stand-ins for the terminal and the connection.

use crate::console::Console;
use async_trait::async_trait;
use openai_realtime::{FrameSink, FrameSource, TransportError};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Records console output; `|` marks a line end and `>` a prompt.
#[derive(Clone, Default)]
pub(crate) struct RecordingConsole(Arc<Mutex<String>>);

impl RecordingConsole {
    pub(crate) fn text(&self) -> String {
        self.0.lock().unwrap().clone()
    }
}

impl Console for RecordingConsole {
    fn write_text(&mut self, text: &str) {
        self.0.lock().unwrap().push_str(text);
    }

    fn end_line(&mut self) {
        self.0.lock().unwrap().push('|');
    }

    fn prompt(&mut self) {
        self.0.lock().unwrap().push('>');
    }
}

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub(crate) fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Forwards written frames to a channel. Fails once the receiver is gone.
pub(crate) struct ChannelSink(pub(crate) mpsc::UnboundedSender<String>);

#[async_trait]
impl FrameSink for ChannelSink {
    async fn send_frame(&mut self, frame: String) -> Result<(), TransportError> {
        self.0.send(frame).map_err(|_| TransportError::Closed)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Never completes a write.
pub(crate) struct StalledSink;

#[async_trait]
impl FrameSink for StalledSink {
    async fn send_frame(&mut self, _frame: String) -> Result<(), TransportError> {
        std::future::pending().await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Yields frames pushed into a channel; ends when the sender is dropped.
pub(crate) struct ChannelSource(pub(crate) mpsc::UnboundedReceiver<Result<String, TransportError>>);

#[async_trait]
impl FrameSource for ChannelSource {
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
        self.0.recv().await
    }
}

pub(crate) fn sink() -> (ChannelSink, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelSink(tx), rx)
}

pub(crate) fn source() -> (
    mpsc::UnboundedSender<Result<String, TransportError>>,
    ChannelSource,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, ChannelSource(rx))
}

/// Drains every frame written so far, parsed as JSON.
pub(crate) fn written(frames: &mut mpsc::UnboundedReceiver<String>) -> Vec<serde_json::Value> {
    let mut out = Vec::new();
    while let Ok(frame) = frames.try_recv() {
        out.push(serde_json::from_str(&frame).unwrap());
    }
    out
}
