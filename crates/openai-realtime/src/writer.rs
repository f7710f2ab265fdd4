//! The single writer for a connection.
//!
//! The sink is owned by one task that drains a bounded queue of write jobs.
//! Callers hold cloneable [`EventWriter`] handles; each submission waits for
//! its own outcome. A batch is written back to back, so frames from other
//! submitters never land between the frames of one batch.

use crate::transport::{FrameSink, TransportError};
use openai_realtime_types::ClientEvent;
use std::time::Duration;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, error, warn};

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("write timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("writer is closed")]
    Closed,
}

#[derive(Debug, Clone, Copy)]
pub struct WriterConfig {
    /// Upper bound on a single frame write.
    pub write_timeout: Duration,
    /// Number of pending jobs before submitters wait.
    pub queue_depth: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            write_timeout: Duration::from_secs(30),
            queue_depth: 128,
        }
    }
}

struct WriteJob {
    frames: Vec<String>,
    reply: oneshot::Sender<Result<(), WriteError>>,
}

/// Handle for submitting outbound events to the writer task.
#[derive(Clone)]
pub struct EventWriter {
    tx: mpsc::Sender<WriteJob>,
}

impl EventWriter {
    pub async fn send(&self, event: &ClientEvent) -> Result<(), WriteError> {
        self.send_batch(std::slice::from_ref(event)).await
    }

    /// Writes `events` in order with nothing interleaved. Stops at the first
    /// frame that fails.
    pub async fn send_batch(&self, events: &[ClientEvent]) -> Result<(), WriteError> {
        if events.is_empty() {
            return Ok(());
        }
        let frames = events
            .iter()
            .map(|event| {
                debug!(kind = event.kind(), "Queueing event.");
                serde_json::to_string(event)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let (reply, outcome) = oneshot::channel();
        self.tx
            .send(WriteJob { frames, reply })
            .await
            .map_err(|_| WriteError::Closed)?;
        outcome.await.map_err(|_| WriteError::Closed)?
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Spawns the writer task that owns `sink`.
///
/// The task ends when every [`EventWriter`] is dropped, closing the sink on
/// the way out, or at the first failed or timed out write. After a failure
/// all further submissions get [`WriteError::Closed`].
pub fn spawn_writer<S>(sink: S, config: WriterConfig) -> (EventWriter, JoinHandle<()>)
where
    S: FrameSink + 'static,
{
    let (tx, rx) = mpsc::channel(config.queue_depth.max(1));
    let handle = tokio::spawn(run_writer(sink, rx, config.write_timeout));
    (EventWriter { tx }, handle)
}

async fn run_writer<S: FrameSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<WriteJob>,
    write_timeout: Duration,
) {
    while let Some(job) = rx.recv().await {
        let mut outcome = Ok(());
        for frame in job.frames {
            outcome = match tokio::time::timeout(write_timeout, sink.send_frame(frame)).await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(WriteError::Transport(e)),
                Err(_) => Err(WriteError::Timeout(write_timeout)),
            };
            if outcome.is_err() {
                break;
            }
        }

        let failed = outcome.is_err();
        if let Err(e) = &outcome {
            error!(error = %e, "Write failed. Closing the write direction.");
            rx.close();
        }
        // The submitter may have gone away; the outcome is already logged.
        let _ = job.reply.send(outcome);
        if failed {
            return;
        }
    }

    debug!("All writers dropped. Closing connection.");
    if let Err(e) = sink.close().await {
        warn!(error = %e, "Failed to close connection cleanly.");
    }
}
