//! Stream configuration, loadable from the environment.

use std::time::Duration;

use crate::error::StreamError;

/// Fixed wait before each reconnect attempt. No growth, no jitter.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(2);
/// Pause between consecutive subscribe requests.
pub const DEFAULT_SUBSCRIBE_DELAY: Duration = Duration::from_millis(100);

pub const ENV_ENDPOINT: &str = "BINGX_WS_ENDPOINT";
pub const ENV_CHANNELS: &str = "BINGX_CHANNELS";
pub const ENV_RECONNECT_DELAY_MS: &str = "BINGX_RECONNECT_DELAY_MS";
pub const ENV_SUBSCRIBE_DELAY_MS: &str = "BINGX_SUBSCRIBE_DELAY_MS";

#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Overrides the parser's endpoint when set.
    pub endpoint: Option<String>,
    /// Subscribed in this order on every (re)connect.
    pub channels: Vec<String>,
    pub reconnect_delay: Duration,
    pub subscribe_delay: Duration,
}

impl StreamConfig {
    pub fn new<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            endpoint: None,
            channels: channels.into_iter().map(Into::into).collect(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            subscribe_delay: DEFAULT_SUBSCRIBE_DELAY,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_subscribe_delay(mut self, delay: Duration) -> Self {
        self.subscribe_delay = delay;
        self
    }

    /// Loads `.env` if present, then reads the `BINGX_*` variables.
    pub fn from_env() -> Result<Self, StreamError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    ///
    /// `BINGX_CHANNELS` is required and comma-separated; blank entries are
    /// skipped. Delays are whole milliseconds.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StreamError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_channels = lookup(ENV_CHANNELS)
            .ok_or_else(|| StreamError::Config(format!("{ENV_CHANNELS} is not set")))?;

        let channels: Vec<String> = raw_channels
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect();

        if channels.is_empty() {
            return Err(StreamError::Config(format!("{ENV_CHANNELS} lists no channels")));
        }

        let mut config = Self::new(channels);

        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|e| !e.trim().is_empty()) {
            config.endpoint = Some(endpoint.trim().to_string());
        }
        if let Some(delay) = parse_millis(&lookup, ENV_RECONNECT_DELAY_MS)? {
            config.reconnect_delay = delay;
        }
        if let Some(delay) = parse_millis(&lookup, ENV_SUBSCRIBE_DELAY_MS)? {
            config.subscribe_delay = delay;
        }

        Ok(config)
    }
}

fn parse_millis<F>(lookup: &F, key: &str) -> Result<Option<Duration>, StreamError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|e| StreamError::Config(format!("{key}={value:?}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StreamConfig::new(["BTC-USDT@trade"]);
        assert_eq!(config.endpoint, None);
        assert_eq!(config.channels, vec!["BTC-USDT@trade".to_string()]);
        assert_eq!(config.reconnect_delay, Duration::from_secs(2));
        assert_eq!(config.subscribe_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_from_lookup_full() {
        let config = StreamConfig::from_lookup(lookup_from(&[
            (ENV_CHANNELS, "BTC-USDT@trade, ETH-USDT@trade,,"),
            (ENV_ENDPOINT, "ws://127.0.0.1:9000"),
            (ENV_RECONNECT_DELAY_MS, "500"),
            (ENV_SUBSCRIBE_DELAY_MS, "5"),
        ]))
        .unwrap();

        assert_eq!(config.channels, vec!["BTC-USDT@trade", "ETH-USDT@trade"]);
        assert_eq!(config.endpoint.as_deref(), Some("ws://127.0.0.1:9000"));
        assert_eq!(config.reconnect_delay, Duration::from_millis(500));
        assert_eq!(config.subscribe_delay, Duration::from_millis(5));
    }

    #[test]
    fn test_missing_channels() {
        let err = StreamConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, StreamError::Config(_)));

        let err = StreamConfig::from_lookup(lookup_from(&[(ENV_CHANNELS, " , ")])).unwrap_err();
        assert!(matches!(err, StreamError::Config(_)));
    }

    #[test]
    fn test_invalid_delay() {
        let err = StreamConfig::from_lookup(lookup_from(&[
            (ENV_CHANNELS, "BTC-USDT@trade"),
            (ENV_RECONNECT_DELAY_MS, "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(ENV_RECONNECT_DELAY_MS));
    }
}
