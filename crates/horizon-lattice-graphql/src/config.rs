//! Serializable client configuration.
//!
//! ```ignore
//! let config = ClientConfig::from_toml_str(r#"
//! url = "https://api.example.com/graphql"
//! strict = true
//! timeout_ms = 5000
//!
//! [headers]
//! Authorization = "Bearer my-token"
//! "#)?;
//!
//! let client = GraphQLClientBuilder::from_config(config).build()?;
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GraphQLClientError, Result};

/// Construction-time settings of a [`GraphQLClient`](crate::GraphQLClient).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// The GraphQL endpoint URL.
    pub url: String,
    /// Only match response members against primary field names.
    pub strict: bool,
    /// Headers applied to every request.
    pub headers: BTreeMap<String, String>,
    /// Default per-call timeout in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl ClientConfig {
    /// Create a configuration for `url` with defaults for everything else.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| GraphQLClientError::Config(e.to_string()))
    }

    /// Read a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| GraphQLClientError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Render the configuration as TOML text.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| GraphQLClientError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_str() {
        let config = ClientConfig::from_toml_str(
            r#"
            url = "https://api.example.com/graphql"
            strict = true
            timeout_ms = 2500

            [headers]
            Authorization = "Bearer abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.url, "https://api.example.com/graphql");
        assert!(config.strict);
        assert_eq!(config.timeout_ms, Some(2500));
        assert_eq!(
            config.headers.get("Authorization").map(String::as_str),
            Some("Bearer abc")
        );
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_toml_str(r#"url = "http://localhost/graphql""#).unwrap();
        assert!(!config.strict);
        assert!(config.headers.is_empty());
        assert_eq!(config.timeout_ms, None);
    }

    #[test]
    fn test_invalid_toml() {
        let err = ClientConfig::from_toml_str("url = ").unwrap_err();
        assert!(matches!(err, GraphQLClientError::Config(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = ClientConfig::new("http://localhost/graphql");
        config.headers.insert("X-Api-Key".into(), "k".into());

        let text = config.to_toml_string().unwrap();
        assert_eq!(ClientConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let err = ClientConfig::load("/nonexistent/graphql.toml").unwrap_err();
        assert!(matches!(err, GraphQLClientError::Config(_)));
    }
}
