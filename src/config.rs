//! Middleware configuration, persisted as TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working in-memory setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(cashmere::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {message}")]
    #[diagnostic(
        code(cashmere::config::parse),
        help("Check the TOML syntax. Known keys: signifier_base, extra_infrastructure_actions, snapshot_path, fetch_timeout_secs, agent_webid.")
    )]
    Parse { message: String },

    #[error("invalid config: {message}")]
    #[diagnostic(code(cashmere::config::invalid), help("{message}"))]
    Invalid { message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Configuration of the signifier store, action index, and description fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashmereConfig {
    /// IRI prefix for derived signifier identities.
    #[serde(default = "default_signifier_base")]
    pub signifier_base: String,
    /// Action names filtered from the index on top of the built-in set.
    #[serde(default)]
    pub extra_infrastructure_actions: Vec<String>,
    /// Turtle file the CLI loads signifiers from and saves them to.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
    /// Timeout for fetching Thing Descriptions.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Value of the `X-Agent-WebID` header sent with fetches.
    #[serde(default)]
    pub agent_webid: Option<String>,
}

fn default_signifier_base() -> String {
    "http://localhost:8080/signifiers/".into()
}
fn default_fetch_timeout_secs() -> u64 {
    10
}

impl Default for CashmereConfig {
    fn default() -> Self {
        Self {
            signifier_base: default_signifier_base(),
            extra_infrastructure_actions: Vec::new(),
            snapshot_path: None,
            fetch_timeout_secs: default_fetch_timeout_secs(),
            agent_webid: None,
        }
    }
}

impl CashmereConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    fn validate(&self) -> ConfigResult<()> {
        if !self.signifier_base.contains(':') {
            return Err(ConfigError::Invalid {
                message: format!(
                    "signifier_base must be an absolute IRI, got \"{}\"",
                    self.signifier_base
                ),
            });
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "fetch_timeout_secs must be > 0".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = CashmereConfig::from_toml_str("").unwrap();
        assert_eq!(config, CashmereConfig::default());
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn fields_override_defaults() {
        let config = CashmereConfig::from_toml_str(
            r#"
            signifier_base = "http://example.org/sig/"
            extra_infrastructure_actions = ["getLuminosity"]
            snapshot_path = "/tmp/signifiers.ttl"
            agent_webid = "http://localhost:8080/agents/alex"
            "#,
        )
        .unwrap();
        assert_eq!(config.signifier_base, "http://example.org/sig/");
        assert_eq!(config.extra_infrastructure_actions, vec!["getLuminosity"]);
        assert_eq!(config.snapshot_path, Some(PathBuf::from("/tmp/signifiers.ttl")));
        assert_eq!(config.agent_webid.as_deref(), Some("http://localhost:8080/agents/alex"));
    }

    #[test]
    fn relative_base_is_rejected() {
        assert!(matches!(
            CashmereConfig::from_toml_str(r#"signifier_base = "signifiers/""#),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        assert!(matches!(
            CashmereConfig::from_toml_str("signifier_base = "),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            CashmereConfig::load(&dir.path().join("absent.toml")),
            Err(ConfigError::Read { .. })
        ));
    }
}
