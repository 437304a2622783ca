//! Adapter configuration.
//!
//! The adapter itself is configured programmatically. `MandrillConfig::from_env`
//! is an opt-in helper for binaries that keep credentials in the environment.

use crate::error::{MailError, MailResult};
use crate::models::Recipient;
use crate::provider::mandrill::MANDRILL_BASE_URL;
use std::env;
use std::fmt;

/// Credentials and sender identity for a Mandrill adapter
#[derive(Clone)]
pub struct MandrillConfig {
    pub api_key: String,
    /// Tracking, signing and return-path domain
    pub domain: String,
    /// Sender used when a message does not name one
    pub sender: Recipient,
    pub base_url: String,
}

impl MandrillConfig {
    pub fn new(api_key: impl Into<String>, domain: impl Into<String>, sender: Recipient) -> Self {
        Self {
            api_key: api_key.into(),
            domain: domain.into(),
            sender,
            base_url: MANDRILL_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Load from environment variables.
    ///
    /// Expects:
    /// - `MANDRILL_API_KEY`
    /// - `MANDRILL_DOMAIN`
    /// - `MANDRILL_FROM_EMAIL`
    /// - `MANDRILL_FROM_NAME` (optional, defaults to empty)
    /// - `MANDRILL_BASE_URL` (optional)
    pub fn from_env() -> MailResult<Self> {
        let api_key = env_required("MANDRILL_API_KEY")?;
        let domain = env_required("MANDRILL_DOMAIN")?;
        let from_email = env_required("MANDRILL_FROM_EMAIL")?;
        let from_name = env_or_default("MANDRILL_FROM_NAME", "");

        Ok(Self::new(api_key, domain, Recipient::sender(from_email, from_name))
            .with_base_url(env_or_default("MANDRILL_BASE_URL", MANDRILL_BASE_URL)))
    }
}

impl fmt::Debug for MandrillConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MandrillConfig")
            .field("api_key", &"<redacted>")
            .field("domain", &self.domain)
            .field("sender", &self.sender.email)
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn env_required(key: &str) -> MailResult<String> {
    env::var(key)
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            MailError::Config(format!(
                "environment variable '{}' is required but not set",
                key
            ))
        })
}

fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_VARS: [&str; 5] = [
        "MANDRILL_API_KEY",
        "MANDRILL_DOMAIN",
        "MANDRILL_FROM_EMAIL",
        "MANDRILL_FROM_NAME",
        "MANDRILL_BASE_URL",
    ];

    #[test]
    fn test_config_from_env_success() {
        temp_env::with_vars(
            [
                ("MANDRILL_API_KEY", Some("md-key")),
                ("MANDRILL_DOMAIN", Some("mail.example.com")),
                ("MANDRILL_FROM_EMAIL", Some("noreply@example.com")),
                ("MANDRILL_FROM_NAME", Some("Example")),
                ("MANDRILL_BASE_URL", None),
            ],
            || {
                let config = MandrillConfig::from_env().unwrap();
                assert_eq!(config.api_key, "md-key");
                assert_eq!(config.domain, "mail.example.com");
                assert_eq!(config.sender.email, "noreply@example.com");
                assert_eq!(config.sender.name, "Example");
                assert_eq!(config.base_url, MANDRILL_BASE_URL);
            },
        );
    }

    #[test]
    fn test_config_from_env_custom_base_url() {
        temp_env::with_vars(
            [
                ("MANDRILL_API_KEY", Some("md-key")),
                ("MANDRILL_DOMAIN", Some("mail.example.com")),
                ("MANDRILL_FROM_EMAIL", Some("noreply@example.com")),
                ("MANDRILL_FROM_NAME", None),
                ("MANDRILL_BASE_URL", Some("http://localhost:9999")),
            ],
            || {
                let config = MandrillConfig::from_env().unwrap();
                assert_eq!(config.base_url, "http://localhost:9999");
                assert_eq!(config.sender.name, "");
            },
        );
    }

    #[test]
    fn test_config_from_env_missing_key() {
        temp_env::with_vars_unset(ALL_VARS, || {
            let err = MandrillConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("MANDRILL_API_KEY"));
            assert!(err.to_string().contains("required"));
        });
    }

    #[test]
    fn test_config_from_env_empty_domain() {
        temp_env::with_vars(
            [
                ("MANDRILL_API_KEY", Some("md-key")),
                ("MANDRILL_DOMAIN", Some("")),
            ],
            || {
                let err = MandrillConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("MANDRILL_DOMAIN"));
            },
        );
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = MandrillConfig::new("secret", "x.com", Recipient::sender("a@x.com", ""));
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
    }
}
