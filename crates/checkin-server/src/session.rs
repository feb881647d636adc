//! Connection session: one task per accepted connection, from registration
//! through disconnect.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use checkin_core::protocol::KEEPALIVE_REPLY;
use checkin_core::{ClientId, ConnectionError, ConnectionHandle, Frame, Inbound};
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, trace};

use crate::config::ServerConfig;
use crate::connection::Connection;
use crate::registry::ConnectionRegistry;
use crate::store::CheckInStore;

/// Close codes that end a session without being reported as an error.
const EXPECTED_CLOSE_CODES: [u16; 3] = [1000, 1001, 1006];

/// Why a session stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The peer closed the stream (`code` is `None` when no close frame was
    /// received).
    Closed { code: Option<u16> },
    /// Nothing arrived within the keepalive interval.
    TimedOut(Duration),
    ReceiveFailed(String),
    SendFailed(String),
}

impl SessionEnd {
    /// Normal closes, going-away and abnormal closure are expected; timeouts,
    /// transport failures and any other close code are not.
    pub fn is_expected(&self) -> bool {
        match self {
            Self::Closed { code: None } => true,
            Self::Closed { code: Some(code) } => EXPECTED_CLOSE_CODES.contains(code),
            Self::TimedOut(_) | Self::ReceiveFailed(_) | Self::SendFailed(_) => false,
        }
    }

    fn log(&self) {
        if self.is_expected() {
            info!(reason = %self, "session ended");
        } else {
            error!(reason = %self, "session ended unexpectedly");
        }
    }
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed { code: Some(code) } => write!(f, "closed with code {code}"),
            Self::Closed { code: None } => f.write_str("closed without close frame"),
            Self::TimedOut(after) => write!(f, "no message within {after:?}"),
            Self::ReceiveFailed(e) => write!(f, "receive failed: {e}"),
            Self::SendFailed(e) => write!(f, "send failed: {e}"),
        }
    }
}

/// Everything a session needs from the rest of the process.
#[derive(Clone)]
pub struct SessionContext {
    pub registry: Arc<ConnectionRegistry>,
    pub store: Arc<CheckInStore>,
    pub keepalive_interval: Duration,
    pub write_timeout: Duration,
}

impl SessionContext {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        store: Arc<CheckInStore>,
        config: &ServerConfig,
    ) -> Self {
        Self {
            registry,
            store,
            keepalive_interval: config.keepalive_interval(),
            write_timeout: config.write_timeout(),
        }
    }

    /// Run a session for an accepted connection until it ends.
    ///
    /// The connection is registered on entry and unregistered on every exit
    /// path, including when the returned future is dropped mid-flight.
    #[instrument(skip_all, fields(client_id = tracing::field::Empty))]
    pub async fn run<C: Connection>(&self, mut conn: C) -> SessionEnd {
        let handle = self.registry.next_handle();
        let registration = Registration::new(&self.registry, handle);
        tracing::Span::current().record("client_id", registration.client_id.as_str());
        info!("client connected");

        let end = self.read_loop(&mut conn).await;
        end.log();

        drop(registration);
        if timeout(self.write_timeout, conn.close()).await.is_err() {
            debug!(after = ?self.write_timeout, "close frame not delivered, releasing connection");
        }
        end
    }

    /// Process frames strictly in arrival order. Each receive is bounded by
    /// the keepalive interval, so any inbound frame re-arms the deadline.
    async fn read_loop<C: Connection>(&self, conn: &mut C) -> SessionEnd {
        loop {
            let frame = match timeout(self.keepalive_interval, conn.receive()).await {
                Ok(Ok(frame)) => frame,
                Ok(Err(ConnectionError::Closed { code })) => return SessionEnd::Closed { code },
                Ok(Err(ConnectionError::Transport(e))) => return SessionEnd::ReceiveFailed(e),
                Err(_) => return SessionEnd::TimedOut(self.keepalive_interval),
            };

            match Inbound::classify(&frame) {
                Inbound::Keepalive => {
                    trace!("keepalive received");
                    if let Err(e) = self.send(conn, Frame::text(KEEPALIVE_REPLY)).await {
                        return SessionEnd::SendFailed(e.to_string());
                    }
                }
                Inbound::Update(update) => {
                    info!(status = %update.status, "updating status");
                    self.store.update(update.status);
                    info!("status updated");
                }
                Inbound::Malformed(e) => {
                    error!(error = %e, "error parsing status update");
                }
            }
        }
    }

    async fn send<C: Connection>(&self, conn: &mut C, frame: Frame) -> Result<(), ConnectionError> {
        match timeout(self.write_timeout, conn.send(frame)).await {
            Ok(result) => result,
            Err(_) => Err(ConnectionError::Transport(format!(
                "write timed out after {:?}",
                self.write_timeout
            ))),
        }
    }
}

/// Registry membership for the lifetime of a session.
struct Registration<'a> {
    registry: &'a ConnectionRegistry,
    handle: ConnectionHandle,
    client_id: ClientId,
}

impl<'a> Registration<'a> {
    fn new(registry: &'a ConnectionRegistry, handle: ConnectionHandle) -> Self {
        let client_id = registry.register(handle);
        Self {
            registry,
            handle,
            client_id,
        }
    }
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        if self.registry.unregister(self.handle).is_some() {
            info!(client_id = %self.client_id, "client disconnected");
        }
    }
}
