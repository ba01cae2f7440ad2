//! REST implementation of [`DataGateway`].
//!
//! Talks to the hosted service's row-oriented REST dialect:
//! `GET /rest/v1/{table}?{col}=eq.{v}&order={col}.{dir}`, `POST` with
//! `Prefer: return=representation`, and `PATCH`/`DELETE` addressed by
//! `?id=eq.{id}`. Realtime subscriptions are delegated to the
//! [`FeedClient`].

use async_trait::async_trait;
use impact_core::types::RowId;

use crate::auth::SessionSlot;
use crate::error::GatewayError;
use crate::feed::FeedClient;
use crate::gateway::{ChangeFeed, DataGateway, Filter, Order};

/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base HTTP URL, e.g. `https://project.example.co`.
    pub rest_url: String,
    /// WebSocket URL for the change feed, e.g. `wss://project.example.co/feed/v1`.
    pub ws_url: String,
    /// Project API key, sent on every request.
    pub api_key: String,
}

/// [`DataGateway`] backed by the hosted service.
pub struct RestGateway {
    client: reqwest::Client,
    config: GatewayConfig,
    session: SessionSlot,
    feed: FeedClient,
}

impl RestGateway {
    /// Build a gateway and start its change-feed client.
    ///
    /// `session` is shared with [`RestAuth`](crate::auth::RestAuth) so
    /// that requests carry the bearer token once a user logs in; before
    /// login the API key alone authorizes reads.
    pub fn connect(client: reqwest::Client, config: GatewayConfig, session: SessionSlot) -> Self {
        let feed = FeedClient::start(config.ws_url.clone());
        Self {
            client,
            config,
            session,
            feed,
        }
    }

    /// Stop the change-feed socket task. In-flight REST requests are
    /// unaffected.
    pub fn shutdown_feed(&self) {
        self.feed.shutdown();
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.config.rest_url)
    }

    /// Render a filter value the way the REST dialect expects:
    /// strings bare, everything else as compact JSON.
    fn render_value(value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    async fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header("apikey", &self.config.api_key);
        match self.session.read().await.as_ref() {
            Some(session) => request.bearer_auth(&session.access_token),
            None => request.bearer_auth(&self.config.api_key),
        }
    }

    // ---- response helpers ----

    /// Ensure the response has a success status code, returning the
    /// status and body as [`GatewayError::Api`] otherwise.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GatewayError> {
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
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// The write endpoints return the affected rows as a one-element
    /// array; an empty array means no row matched.
    async fn parse_single_row(
        response: reqwest::Response,
        table: &str,
    ) -> Result<serde_json::Value, GatewayError> {
        let mut rows: Vec<serde_json::Value> = Self::parse_response(response).await?;
        if rows.is_empty() {
            return Err(GatewayError::Api {
                status: 404,
                body: format!("no matching row in {table}"),
            });
        }
        Ok(rows.remove(0))
    }
}

#[async_trait]
impl DataGateway for RestGateway {
    async fn select(
        &self,
        table: &str,
        filter: Option<&Filter>,
        order: Option<&Order>,
    ) -> Result<Vec<serde_json::Value>, GatewayError> {
        let mut request = self.client.get(self.table_url(table));

        if let Some(filter) = filter {
            request = request.query(&[(
                filter.column.as_str(),
                format!("eq.{}", Self::render_value(&filter.value)),
            )]);
        }
        if let Some(order) = order {
            let direction = if order.descending { "desc" } else { "asc" };
            request = request.query(&[("order", format!("{}.{direction}", order.column))]);
        }

        let response = self.apply_auth(request).await.send().await?;
        Self::parse_response(response).await
    }

    async fn insert(
        &self,
        table: &str,
        row: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&row);

        let response = self.apply_auth(request).await.send().await?;
        Self::parse_single_row(response, table).await
    }

    async fn update(
        &self,
        table: &str,
        id: RowId,
        patch: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&patch);

        let response = self.apply_auth(request).await.send().await?;
        Self::parse_single_row(response, table).await
    }

    async fn delete(&self, table: &str, id: RowId) -> Result<(), GatewayError> {
        let request = self
            .client
            .delete(self.table_url(table))
            .query(&[("id", format!("eq.{id}"))]);

        let response = self.apply_auth(request).await.send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn subscribe(&self, table: &str) -> Result<ChangeFeed, GatewayError> {
        self.feed.subscribe(table).await
    }
}
