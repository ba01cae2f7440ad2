/// Monitor configuration loaded from environment variables.
///
/// Connection settings have no defaults; the monitor is useless
/// without a backend to talk to. Everything else defaults to values
/// suitable for local development.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Base HTTP URL of the hosted backend.
    pub rest_url: String,
    /// WebSocket URL of the change feed.
    pub ws_url: String,
    /// Project API key, sent on every request.
    pub api_key: String,
    /// Optional account credentials. Without them the monitor runs
    /// read-only on the API key.
    pub email: Option<String>,
    /// See `email`.
    pub password: Option<String>,
    /// Seconds between portfolio rollup reports (default: `60`).
    pub rollup_interval_secs: u64,
}

impl MonitorConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                       | Default                  |
    /// |-------------------------------|--------------------------|
    /// | `IMPACT_REST_URL`             | — (required)             |
    /// | `IMPACT_WS_URL`               | derived from `REST_URL`  |
    /// | `IMPACT_API_KEY`              | — (required)             |
    /// | `IMPACT_EMAIL`                | unset (read-only mode)   |
    /// | `IMPACT_PASSWORD`             | unset (read-only mode)   |
    /// | `IMPACT_ROLLUP_INTERVAL_SECS` | `60`                     |
    pub fn from_env() -> anyhow::Result<Self> {
        let rest_url = require("IMPACT_REST_URL")?;
        let ws_url = match std::env::var("IMPACT_WS_URL") {
            Ok(url) => url,
            Err(_) => derive_ws_url(&rest_url),
        };
        let api_key = require("IMPACT_API_KEY")?;

        let email = std::env::var("IMPACT_EMAIL").ok();
        let password = std::env::var("IMPACT_PASSWORD").ok();

        let rollup_interval_secs: u64 = std::env::var("IMPACT_ROLLUP_INTERVAL_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .map_err(|_| anyhow::anyhow!("IMPACT_ROLLUP_INTERVAL_SECS must be a valid u64"))?;
        anyhow::ensure!(
            rollup_interval_secs > 0,
            "IMPACT_ROLLUP_INTERVAL_SECS must be positive"
        );

        Ok(Self {
            rest_url,
            ws_url,
            api_key,
            email,
            password,
            rollup_interval_secs,
        })
    }
}

fn require(name: &str) -> anyhow::Result<String> {
    std::env::var(name).map_err(|_| anyhow::anyhow!("{name} must be set"))
}

/// `https://host` becomes `wss://host/feed/v1`; plain `http` maps to `ws`.
fn derive_ws_url(rest_url: &str) -> String {
    let base = rest_url.trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };
    format!("{ws_base}/feed/v1")
}
