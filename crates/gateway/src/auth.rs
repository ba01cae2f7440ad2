//! Authentication against the hosted backend.
//!
//! The client never verifies credentials itself — it exchanges them
//! for an opaque bearer token and remembers the resulting session.
//! [`RestGateway`](crate::rest::RestGateway) shares the session slot so
//! data requests carry the token automatically.

use std::sync::Arc;

use async_trait::async_trait;
use impact_core::types::RowId;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::GatewayError;
use crate::rest::GatewayConfig;

/// An authenticated session: who the user is plus the bearer token
/// proving it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: RowId,
    pub access_token: String,
}

/// Shared, mutable session slot. `None` means "no session".
pub type SessionSlot = Arc<RwLock<Option<Session>>>;

/// The hosted backend's authentication surface.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The current session, if any. Pure lookup; never touches the
    /// network.
    async fn current_session(&self) -> Option<Session>;

    /// Exchange credentials for a session. The session is remembered
    /// for subsequent calls.
    async fn login(&self, email: &str, password: &str) -> Result<Session, GatewayError>;

    /// Register a new account. On success the new session is remembered.
    async fn register(&self, email: &str, password: &str) -> Result<Session, GatewayError>;

    /// Invalidate the current session server-side and forget it locally.
    /// A no-op when no session is held.
    async fn logout(&self) -> Result<(), GatewayError>;
}

// ---------------------------------------------------------------------------
// REST implementation
// ---------------------------------------------------------------------------

/// Wire shape of the service's token and signup responses.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: RowId,
}

/// [`AuthProvider`] backed by the hosted service's `/auth/v1` endpoints.
pub struct RestAuth {
    client: reqwest::Client,
    config: GatewayConfig,
    session: SessionSlot,
}

impl RestAuth {
    /// Create an auth client sharing `session` with the data gateway.
    pub fn new(client: reqwest::Client, config: GatewayConfig, session: SessionSlot) -> Self {
        Self {
            client,
            config,
            session,
        }
    }

    async fn token_request(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, GatewayError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self
            .client
            .post(format!("{}{path}", self.config.rest_url))
            .header("apikey", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        let session = Session {
            user_id: token.user.id,
            access_token: token.access_token,
        };

        *self.session.write().await = Some(session.clone());
        tracing::info!(user_id = %session.user_id, "Session established");
        Ok(session)
    }
}

#[async_trait]
impl AuthProvider for RestAuth {
    async fn current_session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    async fn login(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        self.token_request("/auth/v1/token?grant_type=password", email, password)
            .await
    }

    async fn register(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        self.token_request("/auth/v1/signup", email, password).await
    }

    async fn logout(&self) -> Result<(), GatewayError> {
        let Some(session) = self.session.read().await.clone() else {
            return Ok(());
        };

        let response = self
            .client
            .post(format!("{}/auth/v1/logout", self.config.rest_url))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        let status = response.status();
        // The token is forgotten locally even if the server-side revoke
        // failed: a stale token must not keep authorizing writes.
        *self.session.write().await = None;

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!("Session ended");
        Ok(())
    }
}
