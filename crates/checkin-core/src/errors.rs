/// Failure reported by a streaming connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// The peer closed the stream. `code` is the close code from the close
    /// frame, or `None` when the stream ended without one.
    #[error("connection closed (code: {code:?})")]
    Closed { code: Option<u16> },

    #[error("transport error: {0}")]
    Transport(String),
}

impl ConnectionError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}
