//! Client configuration.
//!
//! This module defines the TOML-deserializable [`ClientConfig`] and the
//! process-wide default currency used when a server representation omits
//! the `currency` field.

use std::sync::{LazyLock, RwLock};

use serde::Deserialize;
use url::Url;

use crate::error::{ClientError, Result};

/// Process-wide default currency, consulted during deserialization when an
/// invoice or line item arrives without a `currency` field.
static DEFAULT_CURRENCY: LazyLock<RwLock<String>> = LazyLock::new(|| RwLock::new("USD".to_owned()));

/// Returns the process-wide default currency code.
#[must_use]
pub fn default_currency() -> String {
    DEFAULT_CURRENCY.read().map_or_else(|_| "USD".to_owned(), |c| c.clone())
}

/// Sets the process-wide default currency.
///
/// The code is upcased before storing. Takes effect for all subsequently
/// deserialized resources.
///
/// # Errors
///
/// Returns [`ClientError::InvalidConfig`] unless the code is exactly three
/// ASCII letters (ISO 4217).
pub fn set_default_currency<S: AsRef<str>>(code: S) -> Result<()> {
    let code = code.as_ref();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ClientError::InvalidConfig(format!(
            "currency must be a three-letter ISO 4217 code, got: {code}"
        )));
    }
    if let Ok(mut current) = DEFAULT_CURRENCY.write() {
        *current = code.to_ascii_uppercase();
    }
    Ok(())
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Configuration for a [`Client`](crate::Client).
///
/// Deserializable from TOML:
///
/// ```
/// use rebill::ClientConfig;
///
/// let toml = r#"
///     base_url = "https://api.rebill.example.com/v2"
///     api_key = "sk_live_abc123"
/// "#;
///
/// let config: ClientConfig = toml::from_str(toml).unwrap();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL for the billing API, including any version prefix.
    pub base_url: String,

    /// Private API key, sent as the HTTP Basic auth username.
    pub api_key: String,

    /// Total request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl ClientConfig {
    /// Creates a configuration with default timeouts.
    pub fn new<U: Into<String>, K: Into<String>>(base_url: U, api_key: K) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    /// Validates the configuration.
    ///
    /// Checks that:
    /// - the base URL parses, uses HTTPS, and is not a loopback host
    /// - the API key is non-empty and free of control characters
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] if any check fails.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::InvalidConfig(format!("invalid base_url '{}': {e}", self.base_url))
        })?;

        if url.scheme() != "https" {
            return Err(ClientError::InvalidConfig(format!(
                "base_url must use HTTPS, got: {}",
                url.scheme()
            )));
        }

        if let Some(host) = url.host_str() {
            let host = host.to_lowercase();
            if host == "localhost" || host == "::1" || host == "[::1]" || host.starts_with("127.") {
                return Err(ClientError::InvalidConfig(format!(
                    "base_url must not be localhost or loopback: {host}"
                )));
            }
        }

        if self.api_key.is_empty() {
            return Err(ClientError::InvalidConfig("api_key cannot be empty".to_owned()));
        }
        if self.api_key.chars().any(|c| c.is_ascii_control()) {
            return Err(ClientError::InvalidConfig(
                "api_key contains control characters".to_owned(),
            ));
        }

        Ok(())
    }
}

/// Serializes access to the process-wide currency from tests, which would
/// otherwise race when run in parallel.
#[cfg(test)]
pub(crate) fn currency_test_guard() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            base_url = "https://api.rebill.example.com/v2"
            api_key = "sk_test_xyz"
        "#;

        let config: ClientConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.base_url, "https://api.rebill.example.com/v2");
        assert_eq!(config.api_key, "sk_test_xyz");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 10);
    }

    #[test]
    fn test_config_custom_timeouts() {
        let toml = r#"
            base_url = "https://api.rebill.example.com"
            api_key = "sk_test_xyz"
            timeout_secs = 60
            connect_timeout_secs = 5
        "#;

        let config: ClientConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.connect_timeout_secs, 5);
    }

    #[test]
    fn test_config_missing_api_key_rejected() {
        let toml = r#"
            base_url = "https://api.rebill.example.com"
        "#;
        let result: std::result::Result<ClientConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_valid() {
        let config = ClientConfig::new("https://api.rebill.example.com/v2", "sk_test_xyz");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_http_rejected() {
        let config = ClientConfig::new("http://api.rebill.example.com", "sk_test_xyz");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("HTTPS"));
    }

    #[test]
    fn test_validate_localhost_rejected() {
        for url in ["https://localhost/v2", "https://127.0.0.1/v2", "https://[::1]/v2"] {
            let config = ClientConfig::new(url, "sk_test_xyz");
            assert!(config.validate().is_err(), "expected rejection for {url}");
        }
    }

    #[test]
    fn test_validate_empty_api_key_rejected() {
        let config = ClientConfig::new("https://api.rebill.example.com", "");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn test_validate_control_chars_in_api_key_rejected() {
        let config = ClientConfig::new("https://api.rebill.example.com", "key\r\nEvil: header");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_garbage_url_rejected() {
        let config = ClientConfig::new("not a url", "sk_test_xyz");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_currency_roundtrip() {
        let _guard = currency_test_guard();

        assert_eq!(default_currency(), "USD");
        set_default_currency("eur").unwrap();
        assert_eq!(default_currency(), "EUR");

        set_default_currency("USD").unwrap();
        assert_eq!(default_currency(), "USD");
    }

    #[test]
    fn test_set_default_currency_invalid() {
        let _guard = currency_test_guard();

        assert!(set_default_currency("").is_err());
        assert!(set_default_currency("US").is_err());
        assert!(set_default_currency("DOLLARS").is_err());
        assert!(set_default_currency("U$D").is_err());
        // The invalid attempts must not have clobbered the configured value.
        assert_eq!(default_currency(), "USD");
    }
}
