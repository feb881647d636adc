//! The streaming-connection seam consumed by sessions.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use checkin_core::{ConnectionError, Frame};

/// A bidirectional message stream that has completed its handshake.
///
/// `receive` yields data frames only; transports answer control frames
/// themselves. A clean end of stream is reported as
/// `ConnectionError::Closed`.
#[async_trait]
pub trait Connection: Send {
    async fn receive(&mut self) -> Result<Frame, ConnectionError>;

    async fn send(&mut self, frame: Frame) -> Result<(), ConnectionError>;

    /// Best-effort close. Errors are ignored; the handle is released
    /// afterwards either way.
    async fn close(&mut self);
}

/// `Connection` over an upgraded axum WebSocket.
pub struct WsConnection {
    socket: WebSocket,
}

impl WsConnection {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

#[async_trait]
impl Connection for WsConnection {
    async fn receive(&mut self) -> Result<Frame, ConnectionError> {
        loop {
            let msg = match self.socket.recv().await {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => return Err(ConnectionError::transport(e)),
                None => return Err(ConnectionError::Closed { code: None }),
            };
            match msg {
                Message::Text(text) => return Ok(Frame::Text(text.as_str().to_owned())),
                Message::Binary(data) => return Ok(Frame::Binary(data.to_vec())),
                Message::Close(frame) => {
                    return Err(ConnectionError::Closed {
                        code: frame.map(|f| f.code),
                    })
                }
                // axum replies to pings on its own
                Message::Ping(_) | Message::Pong(_) => continue,
            }
        }
    }

    async fn send(&mut self, frame: Frame) -> Result<(), ConnectionError> {
        let msg = match frame {
            Frame::Text(text) => Message::Text(text.into()),
            Frame::Binary(data) => Message::Binary(data.into()),
        };
        self.socket.send(msg).await.map_err(ConnectionError::transport)
    }

    async fn close(&mut self) {
        let _ = self.socket.send(Message::Close(None)).await;
    }
}
