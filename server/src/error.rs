use std::io;
use tokio_tungstenite::tungstenite;

/// Failures surfaced by the server's transport layer.
///
/// Nothing on the tick path produces one of these; they come from binding
/// the listener and from per-connection handshakes.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("websocket handshake failed: {0}")]
    Handshake(#[from] tungstenite::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
