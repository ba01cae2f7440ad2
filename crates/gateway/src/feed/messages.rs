//! Change-feed WebSocket message types and parser.
//!
//! The feed sends JSON frames with the shape
//! `{"type": "<kind>", "data": {...}}`. This module deserializes them
//! into a strongly-typed [`FeedMessage`] enum and converts row changes
//! into [`ChangeEvent`]s.

use impact_core::types::RowId;
use serde::Deserialize;

use crate::gateway::{ChangeEvent, ChangeKind};

/// All known change-feed frame types.
///
/// Deserialized via the internally-tagged `"type"` field with
/// associated `"data"` content.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum FeedMessage {
    /// Acknowledgement of a subscribe request.
    #[serde(rename = "subscribed")]
    Subscribed(SubscribedData),

    /// A row was inserted.
    #[serde(rename = "insert")]
    Insert(RowChangeData),

    /// A row was updated.
    #[serde(rename = "update")]
    Update(RowChangeData),

    /// A row was deleted.
    #[serde(rename = "delete")]
    Delete(DeleteData),

    /// Keep-alive ping from the server; payload is ignored.
    #[serde(rename = "heartbeat")]
    Heartbeat(serde_json::Value),
}

/// Payload for `subscribed` frames.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscribedData {
    pub table: String,
}

/// Payload for `insert` and `update` frames.
#[derive(Debug, Clone, Deserialize)]
pub struct RowChangeData {
    pub table: String,
    /// The full row after the change.
    pub row: serde_json::Value,
}

/// Payload for `delete` frames.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteData {
    pub table: String,
    /// Id of the removed row.
    pub old_id: RowId,
    /// Last known row contents, when the server provides them.
    #[serde(default)]
    pub row: serde_json::Value,
}

impl FeedMessage {
    /// Convert a row-change frame into a [`ChangeEvent`].
    ///
    /// `Subscribed` and `Heartbeat` frames carry no row change and
    /// yield `None`.
    pub fn into_change_event(self) -> Option<ChangeEvent> {
        match self {
            FeedMessage::Insert(data) => Some(ChangeEvent {
                table: data.table,
                kind: ChangeKind::Insert,
                row: data.row,
                old_id: None,
            }),
            FeedMessage::Update(data) => Some(ChangeEvent {
                table: data.table,
                kind: ChangeKind::Update,
                row: data.row,
                old_id: None,
            }),
            FeedMessage::Delete(data) => Some(ChangeEvent {
                table: data.table,
                kind: ChangeKind::Delete,
                row: data.row,
                old_id: Some(data.old_id),
            }),
            FeedMessage::Subscribed(_) | FeedMessage::Heartbeat(_) => None,
        }
    }
}

/// Parse a feed text frame into a typed enum.
///
/// Returns `Err` for malformed JSON or unknown `type` values.
/// Callers should log unknown frames and continue.
pub fn parse_message(text: &str) -> Result<FeedMessage, serde_json::Error> {
    serde_json::from_str(text)
}

/// Build the outbound subscribe frame for a table.
pub fn subscribe_frame(table: &str) -> String {
    serde_json::json!({
        "action": "subscribe",
        "table": table,
    })
    .to_string()
}
