//! Pool configuration.
//!
//! `PoolOptions` can be built in code, deserialized from a host application's
//! config file, or read from `DB_*` environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{OrmError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PoolOptions {
    #[serde(default = "default_host")]
    pub host: String,
    pub user: String,
    pub password: String,
    pub db: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_charset")]
    pub charset: String,
    #[serde(default = "default_autocommit")]
    pub autocommit: bool,
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
    #[serde(default = "default_min_pool_size")]
    pub min_pool_size: u32,
    /// Upper bound on waiting for a free connection, in milliseconds. `None`
    /// waits forever.
    #[serde(default)]
    pub acquire_timeout_ms: Option<u64>,
    /// Upper bound on opening the pool's first connection, in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3306
}

fn default_charset() -> String {
    "utf-8".to_string()
}

fn default_autocommit() -> bool {
    true
}

fn default_max_pool_size() -> u32 {
    10
}

fn default_min_pool_size() -> u32 {
    1
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl PoolOptions {
    pub fn new(user: impl Into<String>, password: impl Into<String>, db: impl Into<String>) -> Self {
        Self {
            host: default_host(),
            user: user.into(),
            password: password.into(),
            db: db.into(),
            port: default_port(),
            charset: default_charset(),
            autocommit: default_autocommit(),
            max_pool_size: default_max_pool_size(),
            min_pool_size: default_min_pool_size(),
            acquire_timeout_ms: None,
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    pub fn autocommit(mut self, autocommit: bool) -> Self {
        self.autocommit = autocommit;
        self
    }

    pub fn max_pool_size(mut self, size: u32) -> Self {
        self.max_pool_size = size;
        self
    }

    pub fn min_pool_size(mut self, size: u32) -> Self {
        self.min_pool_size = size;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout_ms = Some(duration_ms(timeout));
        self
    }

    pub fn acquire_timeout_duration(&self) -> Option<Duration> {
        self.acquire_timeout_ms.map(Duration::from_millis)
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = duration_ms(timeout);
        self
    }

    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Reads the options from `DB_*` environment variables.
    ///
    /// `DB_USER`, `DB_PASSWORD` and `DB_NAME` are required; everything else
    /// falls back to the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| OrmError::Config(format!("{} is not set", key)))
        };

        let mut options = Self::new(
            required("DB_USER")?,
            required("DB_PASSWORD")?,
            required("DB_NAME")?,
        );
        if let Some(host) = lookup("DB_HOST") {
            options.host = host;
        }
        if let Some(charset) = lookup("DB_CHARSET") {
            options.charset = charset;
        }
        if let Some(port) = parse_var(&lookup, "DB_PORT")? {
            options.port = port;
        }
        if let Some(autocommit) = parse_var(&lookup, "DB_AUTOCOMMIT")? {
            options.autocommit = autocommit;
        }
        if let Some(size) = parse_var(&lookup, "DB_MAX_POOL_SIZE")? {
            options.max_pool_size = size;
        }
        if let Some(size) = parse_var(&lookup, "DB_MIN_POOL_SIZE")? {
            options.min_pool_size = size;
        }
        options.acquire_timeout_ms = parse_var(&lookup, "DB_ACQUIRE_TIMEOUT_MS")?;
        if let Some(timeout) = parse_var(&lookup, "DB_CONNECT_TIMEOUT_MS")? {
            options.connect_timeout_ms = timeout;
        }

        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_pool_size == 0 {
            return Err(OrmError::Config(
                "max_pool_size must be at least 1".to_string(),
            ));
        }
        if self.acquire_timeout_ms == Some(0) {
            return Err(OrmError::Config(
                "acquire_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.connect_timeout_ms == 0 {
            return Err(OrmError::Config(
                "connect_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.min_pool_size > self.max_pool_size {
            return Err(OrmError::Config(format!(
                "min_pool_size ({}) exceeds max_pool_size ({})",
                self.min_pool_size, self.max_pool_size
            )));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| OrmError::Config(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn new_applies_defaults() {
        let options = PoolOptions::new("www", "secret", "awesome");
        assert_eq!(options.host, "localhost");
        assert_eq!(options.port, 3306);
        assert_eq!(options.charset, "utf-8");
        assert!(options.autocommit);
        assert_eq!(options.max_pool_size, 10);
        assert_eq!(options.min_pool_size, 1);
        assert_eq!(options.acquire_timeout_duration(), None);
        assert_eq!(options.connect_timeout_duration(), Duration::from_secs(10));
    }

    #[test]
    fn sub_second_timeouts_keep_their_precision() {
        let options = PoolOptions::new("www", "secret", "awesome")
            .acquire_timeout(Duration::from_millis(500))
            .connect_timeout(Duration::from_millis(250));
        assert_eq!(options.acquire_timeout_duration(), Some(Duration::from_millis(500)));
        assert_eq!(options.connect_timeout_duration(), Duration::from_millis(250));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_timeouts() {
        let options = PoolOptions::new("www", "secret", "awesome").acquire_timeout(Duration::ZERO);
        assert!(matches!(options.validate(), Err(OrmError::Config(_))));

        let options = PoolOptions::new("www", "secret", "awesome").connect_timeout(Duration::ZERO);
        assert!(matches!(options.validate(), Err(OrmError::Config(_))));
    }

    #[test]
    fn deserialize_fills_missing_fields() {
        let options: PoolOptions = serde_json::from_str(
            r#"{"user": "www", "password": "secret", "db": "awesome", "port": 3307}"#,
        )
        .unwrap();
        assert_eq!(options.port, 3307);
        assert_eq!(options.host, "localhost");
        assert_eq!(options.max_pool_size, 10);
    }

    #[test]
    fn from_env_requires_credentials() {
        let err = PoolOptions::from_lookup(lookup(&[("DB_USER", "www")])).unwrap_err();
        assert!(matches!(err, OrmError::Config(msg) if msg.contains("DB_PASSWORD")));
    }

    #[test]
    fn from_env_parses_overrides() {
        let options = PoolOptions::from_lookup(lookup(&[
            ("DB_USER", "www"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "awesome"),
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "3307"),
            ("DB_AUTOCOMMIT", "false"),
            ("DB_MAX_POOL_SIZE", "4"),
            ("DB_ACQUIRE_TIMEOUT_MS", "1500"),
            ("DB_CONNECT_TIMEOUT_MS", "750"),
        ]))
        .unwrap();
        assert_eq!(options.host, "db.internal");
        assert_eq!(options.port, 3307);
        assert!(!options.autocommit);
        assert_eq!(options.max_pool_size, 4);
        assert_eq!(options.acquire_timeout_duration(), Some(Duration::from_millis(1500)));
        assert_eq!(options.connect_timeout_duration(), Duration::from_millis(750));
    }

    #[test]
    fn from_env_rejects_garbage_numbers() {
        let err = PoolOptions::from_lookup(lookup(&[
            ("DB_USER", "www"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "awesome"),
            ("DB_PORT", "three"),
        ]))
        .unwrap_err();
        assert!(matches!(err, OrmError::Config(msg) if msg.contains("DB_PORT")));
    }

    #[test]
    fn validate_rejects_inverted_pool_bounds() {
        let options = PoolOptions::new("www", "secret", "awesome")
            .min_pool_size(5)
            .max_pool_size(2);
        assert!(options.validate().is_err());
    }
}
