//! Connection setup and the frame-level transport seams.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, client::IntoClientRequest, protocol::Message as WsMessage},
};
use tracing::{debug, info, warn};

pub const DEFAULT_REALTIME_URL: &str = "wss://api.openai.com/v1/realtime";

/// Value of the `OpenAI-Beta` opt-in header.
pub const BETA_HEADER_VALUE: &str = "realtime=v1";

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub type WsSink = SplitSink<WsStream, WsMessage>;
pub type WsSource = SplitStream<WsStream>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("websocket error: {0}")]
    WebSocket(tungstenite::Error),
    #[error("connection closed")]
    Closed,
}

impl From<tungstenite::Error> for TransportError {
    fn from(e: tungstenite::Error) -> Self {
        match e {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => Self::Closed,
            e => Self::WebSocket(e),
        }
    }
}

/// The write half of a message-framed connection.
#[async_trait]
pub trait FrameSink: Send {
    async fn send_frame(&mut self, frame: String) -> Result<(), TransportError>;
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// The read half of a message-framed connection.
#[async_trait]
pub trait FrameSource: Send {
    /// Waits for the next text frame. Returns `None` once the peer has closed.
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>>;
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send_frame(&mut self, frame: String) -> Result<(), TransportError> {
        self.send(WsMessage::Text(frame.into())).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        SinkExt::close(self).await?;
        Ok(())
    }
}

#[async_trait]
impl FrameSource for WsSource {
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
        while let Some(msg) = self.next().await {
            match msg {
                Ok(WsMessage::Text(text)) => return Some(Ok(text.to_string())),
                Ok(WsMessage::Binary(data)) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => warn!("Dropping non UTF-8 binary frame."),
                },
                Ok(WsMessage::Close(frame)) => {
                    info!(?frame, "Server closed the connection.");
                    return None;
                }
                Ok(_) => continue,
                Err(tungstenite::Error::ConnectionClosed) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
        None
    }
}

/// Builds the endpoint URL for `model`.
pub fn realtime_url(base: &str, model: &str) -> String {
    format!("{base}?model={model}")
}

/// Dials the Realtime endpoint and splits the socket into its two directions.
///
/// The handshake, including TLS, must finish within `handshake_timeout`.
pub async fn connect(
    url: &str,
    api_key: &SecretString,
    handshake_timeout: Duration,
) -> Result<(WsSink, WsSource)> {
    let mut request = url.into_client_request()?;
    request.headers_mut().insert(
        "Authorization",
        format!("Bearer {}", api_key.expose_secret()).parse()?,
    );
    request
        .headers_mut()
        .insert("OpenAI-Beta", BETA_HEADER_VALUE.parse()?);

    let (ws_stream, response) = match tokio::time::timeout(handshake_timeout, connect_async(request)).await {
        Err(_) => bail!("handshake with {url} timed out after {handshake_timeout:?}"),
        Ok(Err(tungstenite::Error::Http(response))) => {
            warn!(status = %response.status(), "Handshake failed.");
            bail!("handshake rejected with status {}", response.status());
        }
        Ok(result) => result.context("Failed to connect to OpenAI Realtime WebSocket")?,
    };
    debug!(status = %response.status(), "WebSocket handshake complete.");

    let (sink, source) = ws_stream.split();
    Ok((sink, source))
}
