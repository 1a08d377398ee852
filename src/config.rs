use std::time::Duration;

use crate::error::RelayError;

/// Value shipped in `.env.example`; treated the same as an unset token.
pub const PLACEHOLDER_TOKEN: &str = "YOUR_BOT_TOKEN_HERE";

#[derive(Debug, Clone)]
pub struct Config {
    /// Primary (lawsense) bot token, `BOT_TOKEN`.
    pub bot_token: Option<String>,
    /// Medical (densa) bot token, `MED_BOT_TOKEN`.
    pub med_bot_token: Option<String>,
    pub host: String,
    pub port: u16,
    /// Public base URL used for automatic webhook registration.
    pub webhook_url: Option<String>,
    /// Delay before the deferred `/ask` answer is sent.
    pub ask_delay: Duration,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_ask_delay() -> Duration {
    Duration::from_millis(2000)
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, RelayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset. Token validity is not checked here;
    /// see [`crate::registry::Registry::initialize`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| RelayError::InvalidConfig(format!("PORT={raw} is not a port")))?,
            None => default_port(),
        };

        let ask_delay = match get("ASK_DELAY_MS") {
            Some(raw) => raw.parse::<u64>().map(Duration::from_millis).map_err(|_| {
                RelayError::InvalidConfig(format!("ASK_DELAY_MS={raw} is not a number"))
            })?,
            None => default_ask_delay(),
        };

        Ok(Self {
            bot_token: get("BOT_TOKEN"),
            med_bot_token: get("MED_BOT_TOKEN"),
            host: get("HOST").unwrap_or_else(default_host),
            port,
            webhook_url: get("WEBHOOK_URL"),
            ask_delay,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, RelayError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("BOT_TOKEN", "123:abc")]).unwrap();
        assert_eq!(config.bot_token.as_deref(), Some("123:abc"));
        assert!(config.med_bot_token.is_none());
        assert!(config.webhook_url.is_none());
        assert_eq!(config.port, 3000);
        assert_eq!(config.ask_delay, Duration::from_millis(2000));
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = load(&[("BOT_TOKEN", "  "), ("WEBHOOK_URL", "")]).unwrap();
        assert!(config.bot_token.is_none());
        assert!(config.webhook_url.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("BOT_TOKEN", "t"),
            ("MED_BOT_TOKEN", "m"),
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("WEBHOOK_URL", "https://relay.example.com"),
            ("ASK_DELAY_MS", "10"),
        ])
        .unwrap();
        assert_eq!(config.med_bot_token.as_deref(), Some("m"));
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(
            config.webhook_url.as_deref(),
            Some("https://relay.example.com")
        );
        assert_eq!(config.ask_delay, Duration::from_millis(10));
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let err = load(&[("PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
