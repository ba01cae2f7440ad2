//! The [`DataGateway`] trait and its supporting types.
//!
//! Rows cross this boundary as `serde_json::Value`; the typed models
//! live one layer up, in the store crate. Keeping the boundary untyped
//! mirrors the hosted service's row-oriented API and lets one gateway
//! instance serve every table.

use async_trait::async_trait;
use impact_core::types::RowId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::GatewayError;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Single-column equality filter (the only filter shape the dashboard
/// needs: "rows whose parent id equals X").
#[derive(Debug, Clone)]
pub struct Filter {
    pub column: String,
    pub value: serde_json::Value,
}

impl Filter {
    /// `column = value` equality filter.
    pub fn eq(column: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Equality filter on a UUID column (ids are serialized as strings).
    pub fn eq_id(column: impl Into<String>, id: RowId) -> Self {
        Self::eq(column, id.to_string())
    }
}

/// Single-column ordering.
#[derive(Debug, Clone)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Change events
// ---------------------------------------------------------------------------

/// Kind of row-level change delivered on the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A row-level change observed on one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
    /// The full row for inserts and updates; may be `Null` for deletes.
    pub row: serde_json::Value,
    /// Id of the removed row; present for deletes.
    pub old_id: Option<RowId>,
}

// ---------------------------------------------------------------------------
// Change feed handle
// ---------------------------------------------------------------------------

/// Broadcast capacity per change-feed receiver. Slow consumers observe
/// a lag warning and skip ahead rather than stalling the socket task.
pub const FEED_CHANNEL_CAPACITY: usize = 256;

/// Disposable handle to one table's change feed.
///
/// Dropping the handle releases only this receiver; the underlying
/// subscription keeps serving other handles.
pub struct ChangeFeed {
    table: String,
    rx: broadcast::Receiver<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(table: impl Into<String>, rx: broadcast::Receiver<ChangeEvent>) -> Self {
        Self {
            table: table.into(),
            rx,
        }
    }

    /// Table this feed is subscribed to.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Wait for the next change on this table.
    ///
    /// Returns `None` once the feed is permanently closed. Events for
    /// other tables sharing the channel are skipped, and a lagged
    /// receiver logs a warning and continues from the oldest retained
    /// event.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.table == self.table => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        table = %self.table,
                        skipped,
                        "Change feed lagged; skipping ahead",
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// DataGateway
// ---------------------------------------------------------------------------

/// The hosted backend's data surface, as consumed by the entity stores.
///
/// Implementations: [`RestGateway`](crate::rest::RestGateway) for the
/// real service, [`MemoryGateway`](crate::memory::MemoryGateway) for
/// tests. Stores hold `Arc<dyn DataGateway>` — the instance is injected
/// explicitly, never a module-level global.
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Fetch rows from a table, optionally filtered and ordered.
    async fn select(
        &self,
        table: &str,
        filter: Option<&Filter>,
        order: Option<&Order>,
    ) -> Result<Vec<serde_json::Value>, GatewayError>;

    /// Insert one row, returning the persisted row (the server assigns
    /// id and timestamps).
    async fn insert(
        &self,
        table: &str,
        row: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError>;

    /// Apply a partial patch to the row with the given id, returning
    /// the updated row.
    async fn update(
        &self,
        table: &str,
        id: RowId,
        patch: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError>;

    /// Delete the row with the given id.
    async fn delete(&self, table: &str, id: RowId) -> Result<(), GatewayError>;

    /// Open a change feed for one table.
    async fn subscribe(&self, table: &str) -> Result<ChangeFeed, GatewayError>;
}
