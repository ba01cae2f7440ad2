//! Background change listener for one store.

use tokio_util::sync::CancellationToken;

use crate::entity::Entity;
use crate::error::StoreError;
use crate::store::EntityStore;

/// Subscribes to a store's table on the change feed and folds incoming
/// events into the store until stopped.
///
/// Dropping the listener cancels the background task; a store must
/// never keep receiving folds after its owner is gone.
pub struct ChangeListener {
    cancel: CancellationToken,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl ChangeListener {
    /// Subscribe and start folding.
    ///
    /// The subscription itself can fail (feed task stopped); folding
    /// errors cannot — undecodable events are logged and skipped by
    /// the store.
    pub async fn spawn<E: Entity>(store: EntityStore<E>) -> Result<Self, StoreError> {
        let mut feed = store.gateway().subscribe(E::TABLE).await?;
        let cancel = CancellationToken::new();

        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => {
                        tracing::debug!(table = E::TABLE, "Change listener stopped");
                        return;
                    }
                    event = feed.next() => {
                        match event {
                            Some(event) => store.apply_change(event).await,
                            None => {
                                tracing::info!(table = E::TABLE, "Change feed closed");
                                return;
                            }
                        }
                    }
                }
            }
        });

        Ok(Self {
            cancel,
            task: Some(task),
        })
    }

    /// Stop folding without waiting for the task to finish.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Stop folding and wait for the task to exit. Used by tests that
    /// need a happens-before edge against subsequent events.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ChangeListener {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
