//! `impact-monitor`: a headless terminal monitor for an impact
//! portfolio hosted on the backend service.
//!
//! On startup it fetches every tracked table, subscribes to the
//! change feed so foreign writes keep the caches current, and logs a
//! portfolio rollup on a fixed interval until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use impact_core::models::{Indicator, Measurement, Project, ProjectIndicator, SdgAlignment};
use impact_gateway::{
    AuthProvider, DataGateway, GatewayConfig, RestAuth, RestGateway, SessionSlot,
};
use impact_store::{ChangeListener, EntityStore};

mod config;
mod rollup;

use config::MonitorConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "impact_monitor=debug,impact_store=info,impact_gateway=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = MonitorConfig::from_env()?;
    tracing::info!(rest_url = %config.rest_url, ws_url = %config.ws_url, "Loaded configuration");

    // --- Gateway ---
    let client = reqwest::Client::new();
    let session = SessionSlot::default();
    let gateway_config = GatewayConfig {
        rest_url: config.rest_url.clone(),
        ws_url: config.ws_url.clone(),
        api_key: config.api_key.clone(),
    };
    let gateway = Arc::new(RestGateway::connect(
        client.clone(),
        gateway_config.clone(),
        session.clone(),
    ));
    let auth: Arc<dyn AuthProvider> =
        Arc::new(RestAuth::new(client, gateway_config, session));
    tracing::info!("Gateway connected");

    // --- Session ---
    if let (Some(email), Some(password)) = (&config.email, &config.password) {
        let signed_in = auth.login(email, password).await?;
        tracing::info!(user_id = %signed_in.user_id, "Signed in");
    } else {
        tracing::info!("No credentials configured, running read-only");
    }

    // --- Stores ---
    let data: Arc<dyn DataGateway> = gateway.clone();
    let projects: EntityStore<Project> = EntityStore::new(data.clone(), auth.clone());
    let indicators: EntityStore<Indicator> = EntityStore::new(data.clone(), auth.clone());
    let measurements: EntityStore<Measurement> = EntityStore::new(data.clone(), auth.clone());
    let links: EntityStore<ProjectIndicator> = EntityStore::new(data.clone(), auth.clone());
    let alignments: EntityStore<SdgAlignment> = EntityStore::new(data, auth);

    projects.fetch_all().await?;
    indicators.fetch_all().await?;
    measurements.fetch_all().await?;
    links.fetch_all().await?;
    alignments.fetch_all().await?;
    tracing::info!(
        projects = projects.rows().await.len(),
        indicators = indicators.rows().await.len(),
        "Initial fetch complete",
    );

    // --- Change listeners ---
    let listeners = vec![
        ChangeListener::spawn(projects.clone()).await?,
        ChangeListener::spawn(indicators.clone()).await?,
        ChangeListener::spawn(measurements.clone()).await?,
        ChangeListener::spawn(links.clone()).await?,
        ChangeListener::spawn(alignments.clone()).await?,
    ];
    tracing::info!(count = listeners.len(), "Change listeners running");

    // --- Rollup loop ---
    let mut ticker = tokio::time::interval(Duration::from_secs(config.rollup_interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                rollup::report(&projects, &indicators, &measurements, &links, &alignments).await;
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    // --- Shutdown ---
    for listener in listeners {
        listener.shutdown().await;
    }
    gateway.shutdown_feed();
    tracing::info!("Monitor stopped");

    Ok(())
}
