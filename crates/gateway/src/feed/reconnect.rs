//! Exponential-backoff reconnection for the change-feed socket.
//!
//! When the feed connection drops, the socket task calls
//! [`reconnect_loop`] to keep retrying with increasing delays until
//! either the connection is restored or the [`CancellationToken`] is
//! triggered. Store operations are never retried — this loop is the
//! only retrying component in the system.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::socket::{self, WsStream};

/// Tunable parameters for the exponential-backoff strategy.
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`ReconnectConfig::max_delay`].
pub fn next_delay(current: Duration, config: &ReconnectConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Attempt to reconnect to the change feed with exponential backoff.
///
/// Returns `Some(stream)` once a connection succeeds, or `None` if the
/// `cancel` token is triggered before a successful connection.
pub async fn reconnect_loop(
    ws_url: &str,
    config: &ReconnectConfig,
    cancel: &CancellationToken,
) -> Option<WsStream> {
    let mut delay = config.initial_delay;
    let mut attempt = 0u32;

    loop {
        // Wait before the attempt, respecting cancellation.
        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(delay) => {}
        }

        attempt += 1;
        tracing::info!(
            ws_url,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Reconnecting to change feed",
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(ws_url, "Reconnect cancelled");
                return None;
            }
            result = socket::connect(ws_url) => {
                match result {
                    Ok(stream) => {
                        tracing::info!(ws_url, attempt, "Reconnected to change feed");
                        return Some(stream);
                    }
                    Err(e) => {
                        tracing::warn!(
                            ws_url,
                            error = %e,
                            "Reconnect attempt {attempt} failed",
                        );
                    }
                }
            }
        }

        delay = next_delay(delay, config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_delay_doubles() {
        let config = ReconnectConfig::default();
        let d = next_delay(Duration::from_secs(1), &config);
        assert_eq!(d, Duration::from_secs(2));
    }

    #[test]
    fn next_delay_clamps_at_max() {
        let config = ReconnectConfig {
            max_delay: Duration::from_secs(10),
            ..Default::default()
        };
        let d = next_delay(Duration::from_secs(8), &config);
        assert_eq!(d, Duration::from_secs(10));
    }

    #[test]
    fn full_backoff_sequence() {
        let config = ReconnectConfig::default();
        let mut delay = config.initial_delay;
        let expected = [1, 2, 4, 8, 16, 30, 30, 30];

        for &expected_secs in &expected {
            assert_eq!(delay.as_secs(), expected_secs);
            delay = next_delay(delay, &config);
        }
    }

    #[tokio::test]
    async fn cancellation_token_stops_reconnect() {
        let cancel = CancellationToken::new();
        // Cancel immediately; reconnect_loop must return None without
        // attempting a connection.
        cancel.cancel();

        let config = ReconnectConfig::default();
        let result = reconnect_loop("ws://localhost:9999", &config, &cancel).await;
        assert!(result.is_none());
    }
}
