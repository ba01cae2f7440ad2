//! WebSocket connection and frame-processing loop for the change feed.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use super::messages::parse_message;
use super::FeedShared;
use crate::error::GatewayError;

/// The change-feed socket stream type.
pub type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Why [`drive`] returned.
pub enum DriveOutcome {
    /// The cancellation token fired; the task should exit.
    Cancelled,
    /// The socket closed or errored; the caller should reconnect.
    ConnectionLost,
}

/// Connect to the change-feed WebSocket endpoint.
pub async fn connect(ws_url: &str) -> Result<WsStream, GatewayError> {
    let (ws_stream, _response) = connect_async(ws_url).await.map_err(|e| {
        GatewayError::Connection(format!("Failed to connect to change feed at {ws_url}: {e}"))
    })?;

    tracing::info!(ws_url, "Connected to change feed");
    Ok(ws_stream)
}

/// Drive an established connection until it is lost or cancelled.
///
/// Interleaves three inputs: the cancellation token, outbound frames
/// queued by [`FeedClient::subscribe`](super::FeedClient::subscribe),
/// and inbound frames from the server. Inbound row changes are fanned
/// out to the per-table broadcast channels on `shared`.
pub async fn drive(
    ws_stream: &mut WsStream,
    shared: &FeedShared,
    outbound_rx: &mut mpsc::UnboundedReceiver<String>,
    cancel: &CancellationToken,
) -> DriveOutcome {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = ws_stream.close(None).await;
                return DriveOutcome::Cancelled;
            }
            frame = outbound_rx.recv() => {
                // The sender half lives as long as the FeedClient, so a
                // closed channel means shutdown.
                let Some(frame) = frame else {
                    let _ = ws_stream.close(None).await;
                    return DriveOutcome::Cancelled;
                };
                if let Err(e) = ws_stream.send(Message::Text(frame.into())).await {
                    tracing::error!(error = %e, "WebSocket send error");
                    return DriveOutcome::ConnectionLost;
                }
            }
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_text_frame(&text, shared).await;
                    }
                    Some(Ok(Message::Binary(_))) => {
                        tracing::trace!("Ignoring binary frame on change feed");
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                        // Handled automatically by tungstenite.
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "Change feed WebSocket closed");
                        return DriveOutcome::ConnectionLost;
                    }
                    Some(Ok(Message::Frame(_))) => {}
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "WebSocket receive error");
                        return DriveOutcome::ConnectionLost;
                    }
                    None => {
                        tracing::info!("Change feed stream ended");
                        return DriveOutcome::ConnectionLost;
                    }
                }
            }
        }
    }
}

/// Parse one text frame and fan out any row change it carries.
async fn handle_text_frame(text: &str, shared: &FeedShared) {
    match parse_message(text) {
        Ok(msg) => {
            if let Some(event) = msg.into_change_event() {
                shared.publish(event).await;
            }
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                raw_frame = %text,
                "Failed to parse change feed frame",
            );
        }
    }
}
