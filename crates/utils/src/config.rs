use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;

/// Top-level configuration for the Mailvia relay.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub relay: RelayConfig,
}

/// Relay configuration.
#[derive(Debug, Deserialize)]
pub struct RelayConfig {
    /// Domain appended to synthesized From display names.
    #[serde(default = "default_domain")]
    pub domain: String,

    #[serde(default)]
    pub spool: SpoolConfig,

    #[serde(default)]
    pub smtp: SmtpConfig,

    /// Recipient-to-destination forwarding entries (exact addresses).
    #[serde(default)]
    pub forwarding: HashMap<String, String>,
}

/// Message spool configuration.
#[derive(Debug, Deserialize)]
pub struct SpoolConfig {
    #[serde(default = "default_spool_path")]
    pub path: String,

    /// Key prefix prepended to event message identifiers.
    #[serde(default)]
    pub prefix: String,
}

impl Default for SpoolConfig {
    fn default() -> Self {
        Self {
            path: default_spool_path(),
            prefix: String::new(),
        }
    }
}

/// Outbound SMTP submission configuration.
#[derive(Debug, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,

    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Optional path to a stored SMTP credentials record (JSON). When set,
    /// submission is authenticated over STARTTLS against the record's
    /// endpoint instead of the plain host/port relay.
    pub credentials_file: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            credentials_file: None,
        }
    }
}

/// Loads configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Errors that can occur while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// An I/O error occurred reading the file.
    Io(std::io::Error),
    /// A parse error occurred deserializing TOML.
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "Config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

fn default_domain() -> String {
    "localhost".to_string()
}

fn default_spool_path() -> String {
    "spool".to_string()
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[relay]
domain = "example.com"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.relay.domain, "example.com");
        assert_eq!(config.relay.spool.path, "spool");
        assert_eq!(config.relay.smtp.port, 587);
        assert!(config.relay.forwarding.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[relay]
domain = "example.com"

[relay.spool]
path = "my_spool"
prefix = "inbox/"

[relay.smtp]
host = "smtp.example.com"
port = 2525
credentials_file = "secrets/smtp.json"

[relay.forwarding]
"hello@example.com" = "you@gmail.com"
"admin@example.com" = "admin@gmail.com"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.relay.domain, "example.com");
        assert_eq!(config.relay.spool.path, "my_spool");
        assert_eq!(config.relay.spool.prefix, "inbox/");
        assert_eq!(config.relay.smtp.host, "smtp.example.com");
        assert_eq!(config.relay.smtp.port, 2525);
        assert_eq!(
            config.relay.smtp.credentials_file.as_deref(),
            Some("secrets/smtp.json")
        );
        assert_eq!(config.relay.forwarding.len(), 2);
        assert_eq!(
            config.relay.forwarding["hello@example.com"],
            "you@gmail.com"
        );
    }

    #[test]
    fn test_parse_defaults() {
        let toml = r#"
[relay]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.relay.domain, "localhost");
        assert_eq!(config.relay.spool.path, "spool");
        assert_eq!(config.relay.spool.prefix, "");
        assert_eq!(config.relay.smtp.host, "localhost");
        assert_eq!(config.relay.smtp.port, 587);
        assert!(config.relay.smtp.credentials_file.is_none());
    }
}
