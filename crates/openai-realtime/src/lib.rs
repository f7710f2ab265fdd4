//! WebSocket plumbing for the OpenAI Realtime API.
//!
//! - `transport`: dialing, plus the [`FrameSink`]/[`FrameSource`] seams the
//!   session is written against.
//! - `writer`: the single writer task that serializes every outbound frame.

pub mod transport;
pub mod writer;

pub use transport::{
    BETA_HEADER_VALUE, DEFAULT_REALTIME_URL, FrameSink, FrameSource, TransportError, WsSink,
    WsSource, connect, realtime_url,
};
pub use writer::{EventWriter, WriteError, WriterConfig, spawn_writer};
