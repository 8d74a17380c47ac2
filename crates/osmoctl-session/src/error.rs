use osmoctl_duml::MessageType;

/// Errors that can occur in device-session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] osmoctl_transport::TransportError),

    /// Wire-level error.
    #[error("wire error: {0}")]
    Wire(#[from] osmoctl_duml::WireError),

    /// The device session has not completed Init yet.
    #[error("device not initialized, call init first")]
    NotInitialized,

    /// A reply was requested for a fire-and-forget message type.
    #[error("message type {msg_type} does not carry the ack-required flag")]
    AckRequiredMissing { msg_type: MessageType },

    /// The awaited message did not arrive in time.
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The operation was cancelled by the caller.
    #[error("operation cancelled")]
    Cancelled,

    /// The device answered with bytes the choreography does not accept.
    #[error("unexpected payload in {context}: {payload:02X?}")]
    UnexpectedPayload {
        context: &'static str,
        payload: Vec<u8>,
    },

    /// The session has been shut down.
    #[error("session closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, SessionError>;
