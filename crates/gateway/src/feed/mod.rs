//! Change-feed client: one WebSocket connection, many table feeds.
//!
//! [`FeedClient`] owns a background socket task (connect -> drive ->
//! reconnect loop) and fans incoming row changes out to per-table
//! broadcast channels. Subscriptions survive reconnects: after every
//! successful (re)connect the client re-sends a subscribe frame for
//! each table that has ever been subscribed.

pub mod messages;
pub mod reconnect;
pub mod socket;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, RwLock};
use tokio_util::sync::CancellationToken;

use crate::error::GatewayError;
use crate::gateway::{ChangeEvent, ChangeFeed, FEED_CHANNEL_CAPACITY};
use reconnect::{reconnect_loop, ReconnectConfig};
use socket::DriveOutcome;

/// State shared between the [`FeedClient`] handle and its socket task.
pub struct FeedShared {
    /// Per-table broadcast senders, created lazily on first subscribe.
    channels: RwLock<HashMap<String, broadcast::Sender<ChangeEvent>>>,
}

impl FeedShared {
    fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Sender for a table's channel, created if missing.
    async fn sender_for(&self, table: &str) -> broadcast::Sender<ChangeEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(table.to_string())
            .or_insert_with(|| broadcast::channel(FEED_CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Tables with an open channel (used to resubscribe after reconnect).
    async fn tables(&self) -> Vec<String> {
        self.channels.read().await.keys().cloned().collect()
    }

    /// Fan one event out to its table's subscribers, if any.
    pub(crate) async fn publish(&self, event: ChangeEvent) {
        let channels = self.channels.read().await;
        if let Some(sender) = channels.get(&event.table) {
            // A send error only means there are zero receivers right now.
            let _ = sender.send(event);
        } else {
            tracing::debug!(table = %event.table, "Change event for unsubscribed table dropped");
        }
    }
}

/// Handle to the change-feed socket task.
///
/// Dropping the client cancels the task; individual [`ChangeFeed`]s
/// are independent receivers and may outlive each other freely.
pub struct FeedClient {
    shared: Arc<FeedShared>,
    outbound_tx: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
}

impl FeedClient {
    /// Spawn the socket task and return its handle.
    ///
    /// The task connects lazily-but-immediately: the first connection
    /// attempt starts right away, and failures enter the backoff loop,
    /// so a temporarily unreachable feed does not fail construction.
    pub fn start(ws_url: String) -> Self {
        let shared = Arc::new(FeedShared::new());
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        tokio::spawn(run(
            ws_url,
            Arc::clone(&shared),
            outbound_rx,
            cancel.clone(),
        ));

        Self {
            shared,
            outbound_tx,
            cancel,
        }
    }

    /// Open (or re-open) a feed for one table.
    pub async fn subscribe(&self, table: &str) -> Result<ChangeFeed, GatewayError> {
        let rx = self.shared.sender_for(table).await.subscribe();
        // Queue the subscribe frame; if the socket is down it will be
        // re-sent on reconnect from the channel map anyway.
        self.outbound_tx
            .send(messages::subscribe_frame(table))
            .map_err(|_| GatewayError::Connection("change feed task has stopped".into()))?;
        Ok(ChangeFeed::new(table, rx))
    }

    /// Stop the socket task.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for FeedClient {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Socket task body: connect, resubscribe, drive, reconnect, repeat.
async fn run(
    ws_url: String,
    shared: Arc<FeedShared>,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
) {
    let config = ReconnectConfig::default();

    let mut stream = loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            result = socket::connect(&ws_url) => match result {
                Ok(stream) => break stream,
                Err(e) => {
                    tracing::warn!(error = %e, "Initial change feed connection failed");
                    match reconnect_loop(&ws_url, &config, &cancel).await {
                        Some(stream) => break stream,
                        None => return,
                    }
                }
            }
        }
    };

    loop {
        // Re-send subscribe frames for every table that has a channel.
        for table in shared.tables().await {
            if let Err(e) = send_subscribe(&table, &mut stream).await {
                tracing::warn!(table = %table, error = %e, "Resubscribe failed");
            }
        }

        match socket::drive(&mut stream, &shared, &mut outbound_rx, &cancel).await {
            DriveOutcome::Cancelled => return,
            DriveOutcome::ConnectionLost => {
                match reconnect_loop(&ws_url, &config, &cancel).await {
                    Some(next_stream) => stream = next_stream,
                    None => return,
                }
            }
        }
    }
}

/// Send a subscribe frame for one table directly on the stream.
async fn send_subscribe(table: &str, stream: &mut socket::WsStream) -> Result<(), GatewayError> {
    use futures::SinkExt;
    use tokio_tungstenite::tungstenite::Message;

    stream
        .send(Message::Text(messages::subscribe_frame(table).into()))
        .await
        .map_err(|e| GatewayError::Protocol(format!("failed to send subscribe frame: {e}")))
}
