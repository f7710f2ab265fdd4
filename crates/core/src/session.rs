//! The session loop: one task drains inbound events while the caller's task
//! turns local input into user turns. All writes go through one
//! [`EventWriter`].

use crate::{
    console::Console,
    dispatcher::{DispatchSettings, Dispatcher},
    encoder,
    tools::ToolRegistry,
};
use anyhow::{Context, Result};
use openai_realtime::{EventWriter, FrameSink, FrameSource, WriteError, WriterConfig, spawn_writer};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// System instructions sent in the session update.
    pub instructions: String,
    pub dispatch: DispatchSettings,
    pub writer: WriterConfig,
}

/// Why the read direction stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadExit {
    Cancelled,
    /// The server closed the connection.
    Closed,
    /// Reading from the transport failed.
    Failed,
}

/// Why the input loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputExit {
    Cancelled,
    EndOfInput,
    WriterClosed,
}

/// Receives and dispatches inbound frames until cancelled or the transport
/// ends. Replies produced by the dispatcher are written as one batch.
///
/// Cancellation is checked before every receive, so no frame is dispatched
/// once it has been observed. Writes already in progress are not aborted.
pub async fn read_loop<S, C>(
    mut source: S,
    mut dispatcher: Dispatcher<C>,
    writer: EventWriter,
    cancel: CancellationToken,
) -> ReadExit
where
    S: FrameSource,
    C: Console,
{
    let exit = loop {
        let frame = tokio::select! {
            biased;
            _ = cancel.cancelled() => break ReadExit::Cancelled,
            frame = source.next_frame() => frame,
        };
        let frame = match frame {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                error!(error = %e, "Read failed.");
                break ReadExit::Failed;
            }
            None => {
                info!("Connection closed by server.");
                break ReadExit::Closed;
            }
        };

        let replies = dispatcher.handle_frame(&frame);
        if let Err(e) = writer.send_batch(&replies).await {
            warn!(error = %e, "Failed to send tool result.");
        }
    };

    let pending = dispatcher.pending_calls();
    if pending > 0 {
        warn!(pending, ?exit, "Read direction stopped with unanswered tool calls.");
    }
    exit
}

/// Sends each non-blank line as a user message followed by a response
/// request. Blank lines are skipped.
pub async fn input_loop<C: Console>(
    mut lines: mpsc::Receiver<String>,
    mut console: C,
    writer: EventWriter,
    cancel: CancellationToken,
) -> InputExit {
    loop {
        if writer.is_closed() {
            error!("Connection is no longer writable.");
            return InputExit::WriterClosed;
        }
        console.prompt();
        let line = tokio::select! {
            biased;
            _ = cancel.cancelled() => return InputExit::Cancelled,
            line = lines.recv() => line,
        };
        let Some(line) = line else {
            return InputExit::EndOfInput;
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let turn = [encoder::user_message(text), encoder::response_trigger(None)];
        match writer.send_batch(&turn).await {
            Ok(()) => {}
            Err(WriteError::Closed) => {
                error!("Connection is no longer writable.");
                return InputExit::WriterClosed;
            }
            Err(e) => warn!(error = %e, "Failed to send user message."),
        }
    }
}

/// One conversation over one connection.
pub struct Session<C> {
    settings: SessionSettings,
    tools: Arc<ToolRegistry>,
    console: C,
}

impl<C> Session<C>
where
    C: Console + Clone + 'static,
{
    pub fn new(settings: SessionSettings, tools: ToolRegistry, console: C) -> Self {
        Self {
            settings,
            tools: Arc::new(tools),
            console,
        }
    }

    /// Configures the session, then runs the read direction alongside the
    /// input loop until input ends or `cancel` fires.
    ///
    /// Fails only if the session update cannot be sent.
    pub async fn run<Src, Snk>(
        self,
        source: Src,
        sink: Snk,
        lines: mpsc::Receiver<String>,
        cancel: CancellationToken,
    ) -> Result<()>
    where
        Src: FrameSource + 'static,
        Snk: FrameSink + 'static,
    {
        let cancel = cancel.child_token();
        let (writer, writer_task) = spawn_writer(sink, self.settings.writer);

        let update = encoder::session_update(&self.settings.instructions, self.tools.definitions());
        writer.send(&update).await.context("session.update failed")?;
        info!("session.update sent");

        let dispatcher = Dispatcher::new(
            self.settings.dispatch.clone(),
            self.tools.clone(),
            self.console.clone(),
        );
        let reader = tokio::spawn(read_loop(source, dispatcher, writer.clone(), cancel.clone()));

        let input_exit = input_loop(lines, self.console, writer, cancel.clone()).await;
        debug!(?input_exit, "Input loop finished.");
        cancel.cancel();

        match reader.await {
            Ok(read_exit) => debug!(?read_exit, "Read loop finished."),
            Err(e) => error!(error = %e, "Read loop panicked."),
        }
        if tokio::time::timeout(self.settings.writer.write_timeout, writer_task)
            .await
            .is_err()
        {
            warn!("Writer did not shut down in time.");
        }
        Ok(())
    }
}
