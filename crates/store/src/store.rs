//! Generic in-memory entity store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use impact_core::types::RowId;
use impact_core::validation::ensure_valid;
use impact_gateway::{AuthProvider, ChangeEvent, ChangeKind, DataGateway, Filter, Order};
use tokio::sync::RwLock;

use crate::entity::Entity;
use crate::error::StoreError;

/// Clears the loading flag on every exit path, success or failure.
struct LoadingGuard {
    flag: Arc<AtomicBool>,
}

impl LoadingGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self {
            flag: Arc::clone(flag),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// In-memory list of one table's rows plus loading/error state.
///
/// All writes go through the gateway before local state changes —
/// the list is a cache of server truth, never an optimistic guess.
/// Cloning is cheap and shares state; presentation code holds clones
/// and never mutates the list directly.
///
/// Operations are not serialized against each other: two in-flight
/// writes race and the last response to resolve wins locally,
/// independent of call order. Likewise, a `fetch_all` replacement can
/// race a concurrently delivered change event and revert it; there is
/// no deduplication between the two input paths.
pub struct EntityStore<E: Entity> {
    gateway: Arc<dyn DataGateway>,
    auth: Arc<dyn AuthProvider>,
    rows: Arc<RwLock<Vec<E>>>,
    last_error: Arc<RwLock<Option<String>>>,
    loading: Arc<AtomicBool>,
}

impl<E: Entity> Clone for EntityStore<E> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            auth: Arc::clone(&self.auth),
            rows: Arc::clone(&self.rows),
            last_error: Arc::clone(&self.last_error),
            loading: Arc::clone(&self.loading),
        }
    }
}

impl<E: Entity> EntityStore<E> {
    /// Build a store over injected gateway and auth instances.
    pub fn new(gateway: Arc<dyn DataGateway>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            gateway,
            auth,
            rows: Arc::new(RwLock::new(Vec::new())),
            last_error: Arc::new(RwLock::new(None)),
            loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn gateway(&self) -> Arc<dyn DataGateway> {
        Arc::clone(&self.gateway)
    }

    // ---- state accessors ----

    /// Snapshot of the current list.
    pub async fn rows(&self) -> Vec<E> {
        self.rows.read().await.clone()
    }

    /// Whether a fetch is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Message of the most recent failed operation, cleared by the
    /// next success.
    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    // ---- fetch ----

    /// Fetch the full list, ordered newest-first, and replace the
    /// local list on success. On failure the prior list is untouched.
    pub async fn fetch_all(&self) -> Result<Vec<E>, StoreError> {
        self.fetch_with(None).await
    }

    /// Fetch only the rows belonging to one parent.
    ///
    /// Root entities have no parent column; calling this on one is a
    /// caller error and fails without touching the gateway.
    pub async fn fetch_by_parent(&self, parent: RowId) -> Result<Vec<E>, StoreError> {
        let Some(column) = E::PARENT_COLUMN else {
            return Err(StoreError::Internal(format!(
                "{} rows have no parent column",
                E::NAME
            )));
        };
        self.fetch_with(Some(Filter::eq_id(column, parent))).await
    }

    async fn fetch_with(&self, filter: Option<Filter>) -> Result<Vec<E>, StoreError> {
        let _guard = LoadingGuard::acquire(&self.loading);

        let result = async {
            let values = self
                .gateway
                .select(E::TABLE, filter.as_ref(), Some(&Order::desc("created_at")))
                .await?;
            let fetched = values
                .into_iter()
                .map(decode_row::<E>)
                .collect::<Result<Vec<E>, StoreError>>()?;
            *self.rows.write().await = fetched.clone();
            Ok(fetched)
        }
        .await;

        self.settle(result).await
    }

    // ---- writes ----

    /// Insert a row. Requires a session; validates before the network
    /// call; prepends the persisted row on success.
    pub async fn create(&self, input: E::Create) -> Result<E, StoreError> {
        let result = self.create_inner(input).await;
        self.settle(result).await
    }

    async fn create_inner(&self, input: E::Create) -> Result<E, StoreError> {
        let session = self
            .auth
            .current_session()
            .await
            .ok_or(StoreError::AuthRequired)?;
        ensure_valid(&input)?;

        let mut row =
            serde_json::to_value(&input).map_err(|e| StoreError::Internal(e.to_string()))?;
        if E::STAMP_CREATED_BY {
            if let Some(object) = row.as_object_mut() {
                object.insert("created_by".into(), serde_json::json!(session.user_id));
            }
        }

        let persisted = self.gateway.insert(E::TABLE, row).await?;
        let entity = decode_row::<E>(persisted)?;
        self.rows.write().await.insert(0, entity.clone());

        tracing::debug!(table = E::TABLE, id = %entity.id(), "Row created");
        Ok(entity)
    }

    /// Apply a partial patch. The matching local row is replaced; an id
    /// absent from the local list is a silent local no-op (the server
    /// row is still updated) so stores that never fetched can write.
    pub async fn update(&self, id: RowId, patch: E::Patch) -> Result<E, StoreError> {
        let result = self.update_inner(id, patch).await;
        self.settle(result).await
    }

    async fn update_inner(&self, id: RowId, patch: E::Patch) -> Result<E, StoreError> {
        ensure_valid(&patch)?;
        let value =
            serde_json::to_value(&patch).map_err(|e| StoreError::Internal(e.to_string()))?;

        let updated = self.gateway.update(E::TABLE, id, value).await?;
        let entity = decode_row::<E>(updated)?;

        let mut rows = self.rows.write().await;
        if let Some(slot) = rows.iter_mut().find(|row| row.id() == id) {
            *slot = entity.clone();
        }
        drop(rows);

        tracing::debug!(table = E::TABLE, %id, "Row updated");
        Ok(entity)
    }

    /// Delete a row. The local entry is removed only after the server
    /// confirms the deletion.
    pub async fn delete(&self, id: RowId) -> Result<(), StoreError> {
        let result = async {
            self.gateway.delete(E::TABLE, id).await?;
            self.rows.write().await.retain(|row| row.id() != id);
            tracing::debug!(table = E::TABLE, %id, "Row deleted");
            Ok(())
        }
        .await;
        self.settle(result).await
    }

    // ---- local lookups ----

    /// Pure local lookup; `None` on miss, never an error, no network.
    pub async fn get_by_id(&self, id: RowId) -> Option<E> {
        self.rows.read().await.iter().find(|row| row.id() == id).cloned()
    }

    /// Pure local lookup of all rows under one parent; empty on miss.
    pub async fn get_by_parent(&self, parent: RowId) -> Vec<E> {
        self.rows
            .read()
            .await
            .iter()
            .filter(|row| row.parent_id() == Some(parent))
            .cloned()
            .collect()
    }

    /// Like [`get_by_id`](Self::get_by_id) but failing with
    /// [`StoreError::NotFound`] on miss, for callers that require the
    /// row to exist.
    pub async fn require(&self, id: RowId) -> Result<E, StoreError> {
        self.get_by_id(id).await.ok_or(StoreError::NotFound {
            entity: E::NAME,
            id,
        })
    }

    // ---- change feed fold ----

    /// Fold one change event into the list: insert prepends if the id
    /// is new, update replaces an existing entry, delete removes by id.
    /// Events for unknown ids and undecodable rows are ignored.
    pub async fn apply_change(&self, event: ChangeEvent) {
        if event.table != E::TABLE {
            return;
        }

        match event.kind {
            ChangeKind::Insert => {
                let Ok(entity) = decode_change_row::<E>(event.row) else {
                    return;
                };
                let mut rows = self.rows.write().await;
                if !rows.iter().any(|row| row.id() == entity.id()) {
                    rows.insert(0, entity);
                }
            }
            ChangeKind::Update => {
                let Ok(entity) = decode_change_row::<E>(event.row) else {
                    return;
                };
                let mut rows = self.rows.write().await;
                if let Some(slot) = rows.iter_mut().find(|row| row.id() == entity.id()) {
                    *slot = entity;
                }
            }
            ChangeKind::Delete => {
                let Some(id) = event.old_id else {
                    tracing::warn!(table = E::TABLE, "Delete event without old_id ignored");
                    return;
                };
                // Removing an id that is not present is a no-op.
                self.rows.write().await.retain(|row| row.id() != id);
            }
        }
    }

    // ---- error bookkeeping ----

    /// Record the outcome: failures store their message for the UI,
    /// successes clear it.
    async fn settle<T>(&self, result: Result<T, StoreError>) -> Result<T, StoreError> {
        match &result {
            Ok(_) => *self.last_error.write().await = None,
            Err(err) => {
                tracing::warn!(table = E::TABLE, error = %err, "Store operation failed");
                *self.last_error.write().await = Some(err.to_string());
            }
        }
        result
    }
}

/// Decode a gateway row into the typed model.
fn decode_row<E: Entity>(value: serde_json::Value) -> Result<E, StoreError> {
    serde_json::from_value(value)
        .map_err(|e| StoreError::Internal(format!("malformed {} row: {e}", E::TABLE)))
}

/// Decode a change-feed row, logging instead of failing: a malformed
/// event must not poison the store.
fn decode_change_row<E: Entity>(value: serde_json::Value) -> Result<E, ()> {
    serde_json::from_value(value).map_err(|e| {
        tracing::warn!(table = E::TABLE, error = %e, "Undecodable change event row ignored");
    })
}
