//! Serializer configuration shared by the request envelope and the CLI.

use serde::{Deserialize, Serialize};

/// Controls how request bodies and CLI output are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SerializerConfig {
    /// Emit indented JSON instead of the compact form.
    #[serde(default)]
    pub pretty: bool,
}

impl SerializerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        SerializerConfig { pretty: true }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializer_config_default() {
        let config = SerializerConfig::default();
        assert!(!config.pretty);
        assert!(SerializerConfig::pretty().pretty);
        assert!(SerializerConfig::new().with_pretty(true).pretty);
    }

    #[test]
    fn test_serializer_config_serde() {
        let config: SerializerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SerializerConfig::default());

        let config: SerializerConfig = serde_json::from_str(r#"{"pretty": true}"#).unwrap();
        assert!(config.pretty);
        assert_eq!(serde_json::to_string(&config).unwrap(), r#"{"pretty":true}"#);
    }
}
