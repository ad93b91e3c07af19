//! Error types for the streaming client.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::market::websocket_client::ConnectionState;

#[derive(Error, Debug)]
pub enum StreamError {
    /// The transport could not be established.
    #[error("WebSocket connection failed: {0}")]
    Dial(#[source] tungstenite::Error),

    /// A send was attempted with no live connection.
    #[error("WebSocket not connected")]
    ConnectionUnavailable,

    /// An inbound frame could not be decompressed.
    #[error("frame decompression failed: {0}")]
    Codec(#[source] std::io::Error),

    #[error("malformed price {0:?}")]
    MalformedPrice(String),

    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("WebSocket send failed: {0}")]
    Send(#[source] tungstenite::Error),

    #[error("cannot connect while {0}")]
    InvalidState(ConnectionState),

    #[error("client is closed")]
    Closed,

    #[error("configuration error: {0}")]
    Config(String),
}
