//! Error type for store operations.
//!
//! Every failure leaves the store's prior state valid; none are
//! retried automatically — the user re-triggers the action.

use impact_core::error::CoreError;
use impact_core::types::RowId;
use impact_gateway::GatewayError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A write was attempted without an authenticated session.
    #[error("Sign in required")]
    AuthRequired,

    /// Caller-side validation rejected the input before any network
    /// call was made.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The gateway reported a failure; the message is passed through
    /// largely verbatim.
    #[error(transparent)]
    Remote(#[from] GatewayError),

    /// A lookup that required a row found none.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: RowId },

    /// A row crossed the gateway boundary in a shape the model cannot
    /// represent.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => StoreError::Validation(msg),
            CoreError::NotFound { entity, id } => StoreError::NotFound { entity, id },
            CoreError::Internal(msg) => StoreError::Internal(msg),
        }
    }
}
