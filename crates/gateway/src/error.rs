//! Error type for the gateway boundary.

/// Errors surfaced by the hosted backend's REST and WebSocket surfaces.
///
/// API error bodies are passed through largely verbatim: the hosted
/// service already produces human-readable messages and the stores
/// surface them to the UI as-is.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Gateway API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// Failed to establish the WebSocket connection.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A protocol-level error on an already-established connection.
    #[error("Protocol error: {0}")]
    Protocol(String),
}
