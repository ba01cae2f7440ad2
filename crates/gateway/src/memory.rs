//! In-process gateway and auth doubles.
//!
//! [`MemoryGateway`] behaves like the hosted service from the stores'
//! point of view: it mints ids and timestamps on insert, returns full
//! rows from writes, and publishes a [`ChangeEvent`] on its broadcast
//! bus after every successful write — exactly what another session's
//! writes look like over the real feed. Tests drive error paths with
//! [`MemoryGateway::fail_next`] and inject feed-only events with
//! [`MemoryGateway::emit`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use impact_core::types::RowId;
use tokio::sync::{broadcast, RwLock};

use crate::auth::{AuthProvider, Session};
use crate::error::GatewayError;
use crate::gateway::{
    ChangeEvent, ChangeFeed, ChangeKind, DataGateway, Filter, Order, FEED_CHANNEL_CAPACITY,
};

/// In-memory [`DataGateway`] for tests.
pub struct MemoryGateway {
    tables: RwLock<HashMap<String, Vec<serde_json::Value>>>,
    bus: broadcast::Sender<ChangeEvent>,
    /// Message for a one-shot injected failure, consumed by the next
    /// data operation.
    fail_next: Mutex<Option<String>>,
    /// Number of data operations attempted (including injected
    /// failures). Lets tests assert that validation rejected an input
    /// before any gateway call.
    calls: AtomicUsize,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        let (bus, _) = broadcast::channel(FEED_CHANNEL_CAPACITY);
        Self {
            tables: RwLock::new(HashMap::new()),
            bus,
            fail_next: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Make the next data operation fail with the given message
    /// (surfaced as a 500 [`GatewayError::Api`]).
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.fail_next.lock().unwrap() = Some(message.into());
    }

    /// Number of data operations attempted so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Publish a change event without touching the tables, as if a
    /// foreign session's write arrived on the feed.
    pub fn emit(&self, event: ChangeEvent) {
        let _ = self.bus.send(event);
    }

    /// Insert rows directly, minting missing ids and timestamps. No
    /// change events are published; useful for test fixtures.
    pub async fn seed(&self, table: &str, rows: Vec<serde_json::Value>) {
        let mut tables = self.tables.write().await;
        let stored = tables.entry(table.to_string()).or_default();
        for mut row in rows {
            Self::stamp_row(&mut row);
            stored.push(row);
        }
    }

    // ---- helpers ----

    fn begin_op(&self) -> Result<(), GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fail_next.lock().unwrap().take() {
            return Err(GatewayError::Api {
                status: 500,
                body: message,
            });
        }
        Ok(())
    }

    /// Fill in server-assigned fields if absent.
    fn stamp_row(row: &mut serde_json::Value) {
        let Some(object) = row.as_object_mut() else {
            return;
        };
        let now = serde_json::json!(Utc::now());
        object
            .entry("id")
            .or_insert_with(|| serde_json::json!(RowId::new_v4()));
        object.entry("created_at").or_insert_with(|| now.clone());
        object.insert("updated_at".into(), now);
    }

    fn row_id_matches(row: &serde_json::Value, id: RowId) -> bool {
        row.get("id").and_then(|v| v.as_str()) == Some(id.to_string().as_str())
    }

    fn compare_column(a: &serde_json::Value, b: &serde_json::Value) -> std::cmp::Ordering {
        match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
            _ => a.to_string().cmp(&b.to_string()),
        }
    }
}

#[async_trait]
impl DataGateway for MemoryGateway {
    async fn select(
        &self,
        table: &str,
        filter: Option<&Filter>,
        order: Option<&Order>,
    ) -> Result<Vec<serde_json::Value>, GatewayError> {
        self.begin_op()?;

        let tables = self.tables.read().await;
        let mut rows: Vec<serde_json::Value> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| match filter {
                        Some(filter) => row.get(&filter.column) == Some(&filter.value),
                        None => true,
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = order {
            let null = serde_json::Value::Null;
            rows.sort_by(|a, b| {
                let left = a.get(&order.column).unwrap_or(&null);
                let right = b.get(&order.column).unwrap_or(&null);
                let ordering = Self::compare_column(left, right);
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        Ok(rows)
    }

    async fn insert(
        &self,
        table: &str,
        mut row: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        self.begin_op()?;

        Self::stamp_row(&mut row);
        let mut tables = self.tables.write().await;
        tables.entry(table.to_string()).or_default().push(row.clone());

        let _ = self.bus.send(ChangeEvent {
            table: table.to_string(),
            kind: ChangeKind::Insert,
            row: row.clone(),
            old_id: None,
        });
        Ok(row)
    }

    async fn update(
        &self,
        table: &str,
        id: RowId,
        patch: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        self.begin_op()?;

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        let Some(row) = rows.iter_mut().find(|row| Self::row_id_matches(row, id)) else {
            return Err(GatewayError::Api {
                status: 404,
                body: format!("no matching row in {table}"),
            });
        };

        if let (Some(object), Some(patch_object)) = (row.as_object_mut(), patch.as_object()) {
            for (key, value) in patch_object {
                object.insert(key.clone(), value.clone());
            }
            object.insert("updated_at".into(), serde_json::json!(Utc::now()));
        }
        let updated = row.clone();
        drop(tables);

        let _ = self.bus.send(ChangeEvent {
            table: table.to_string(),
            kind: ChangeKind::Update,
            row: updated.clone(),
            old_id: None,
        });
        Ok(updated)
    }

    async fn delete(&self, table: &str, id: RowId) -> Result<(), GatewayError> {
        self.begin_op()?;

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        let before = rows.len();
        rows.retain(|row| !Self::row_id_matches(row, id));
        let removed = rows.len() < before;
        drop(tables);

        // Deleting an absent row succeeds (the hosted dialect is
        // idempotent here), but only a real removal emits an event.
        if removed {
            let _ = self.bus.send(ChangeEvent {
                table: table.to_string(),
                kind: ChangeKind::Delete,
                row: serde_json::Value::Null,
                old_id: Some(id),
            });
        }
        Ok(())
    }

    async fn subscribe(&self, table: &str) -> Result<ChangeFeed, GatewayError> {
        Ok(ChangeFeed::new(table, self.bus.subscribe()))
    }
}

// ---------------------------------------------------------------------------
// MemoryAuth
// ---------------------------------------------------------------------------

/// In-process [`AuthProvider`] for tests. Accepts any credentials.
pub struct MemoryAuth {
    session: RwLock<Option<Session>>,
}

impl MemoryAuth {
    /// Start with no session.
    pub fn anonymous() -> Self {
        Self {
            session: RwLock::new(None),
        }
    }

    /// Start already logged in as the given user.
    pub fn logged_in(user_id: RowId) -> Self {
        Self {
            session: RwLock::new(Some(Session {
                user_id,
                access_token: "test-token".into(),
            })),
        }
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn current_session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<Session, GatewayError> {
        let session = Session {
            user_id: RowId::new_v4(),
            access_token: "test-token".into(),
        };
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn register(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        self.login(email, password).await
    }

    async fn logout(&self) -> Result<(), GatewayError> {
        *self.session.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn insert_mints_id_and_timestamps() {
        let gateway = MemoryGateway::new();
        let row = gateway
            .insert("projects", serde_json::json!({"name": "x"}))
            .await
            .unwrap();

        assert!(row["id"].as_str().is_some());
        assert!(row["created_at"].as_str().is_some());
        assert!(row["updated_at"].as_str().is_some());
    }

    #[tokio::test]
    async fn writes_publish_change_events() {
        let gateway = MemoryGateway::new();
        let mut feed = gateway.subscribe("projects").await.unwrap();

        let row = gateway
            .insert("projects", serde_json::json!({"name": "x"}))
            .await
            .unwrap();

        let event = feed.next().await.unwrap();
        assert_eq!(event.kind, ChangeKind::Insert);
        assert_eq!(event.row["id"], row["id"]);
    }

    #[tokio::test]
    async fn feed_filters_by_table() {
        let gateway = MemoryGateway::new();
        let mut feed = gateway.subscribe("indicators").await.unwrap();

        gateway
            .insert("projects", serde_json::json!({"name": "other table"}))
            .await
            .unwrap();
        gateway
            .insert("indicators", serde_json::json!({"name": "mine"}))
            .await
            .unwrap();

        let event = feed.next().await.unwrap();
        assert_eq!(event.table, "indicators");
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let gateway = MemoryGateway::new();
        let result = gateway
            .update("projects", RowId::new_v4(), serde_json::json!({"name": "y"}))
            .await;
        assert_matches!(result, Err(GatewayError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn delete_of_unknown_id_succeeds_without_event() {
        let gateway = MemoryGateway::new();
        let mut feed = gateway.subscribe("projects").await.unwrap();

        gateway.delete("projects", RowId::new_v4()).await.unwrap();
        gateway
            .insert("projects", serde_json::json!({"name": "marker"}))
            .await
            .unwrap();

        // The first event observed is the insert marker, not a delete.
        let event = feed.next().await.unwrap();
        assert_eq!(event.kind, ChangeKind::Insert);
    }

    #[tokio::test]
    async fn fail_next_fails_exactly_one_operation() {
        let gateway = MemoryGateway::new();
        gateway.fail_next("backend unavailable");

        let first = gateway.select("projects", None, None).await;
        assert_matches!(first, Err(GatewayError::Api { status: 500, .. }));

        let second = gateway.select("projects", None, None).await;
        assert!(second.is_ok());
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn select_orders_descending() {
        let gateway = MemoryGateway::new();
        gateway
            .seed(
                "measurements",
                vec![
                    serde_json::json!({"value": 1.0, "measured_on": "2026-01-01"}),
                    serde_json::json!({"value": 2.0, "measured_on": "2026-03-01"}),
                    serde_json::json!({"value": 3.0, "measured_on": "2026-02-01"}),
                ],
            )
            .await;

        let rows = gateway
            .select("measurements", None, Some(&Order::desc("measured_on")))
            .await
            .unwrap();
        assert_eq!(rows[0]["value"], 2.0);
        assert_eq!(rows[1]["value"], 3.0);
        assert_eq!(rows[2]["value"], 1.0);
    }
}
