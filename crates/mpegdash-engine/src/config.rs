//! Host configuration read by the adapter

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Class name given to surfaces created by the adapter
pub const DEFAULT_SURFACE_CLASS: &str = "fp-engine mpegdash-engine";

/// Adapter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Host autoplay flag
    pub autoplay: bool,
    /// Forward streaming session faults to the host as `error` events
    pub report_session_errors: bool,
    /// Class name of created surfaces
    pub surface_class: String,
    /// Base for relative video sources; without one they reach the
    /// streaming engine unchanged
    pub base_url: Option<Url>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            autoplay: false,
            report_session_errors: false,
            surface_class: DEFAULT_SURFACE_CLASS.to_string(),
            base_url: None,
        }
    }
}

impl EngineConfig {
    /// Parse configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn with_session_errors(mut self, report: bool) -> Self {
        self.report_session_errors = report;
        self
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.surface_class.trim().is_empty() {
            return Err(Error::InvalidConfig("surface_class must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(!config.autoplay);
        assert!(!config.report_session_errors);
        assert_eq!(config.surface_class, "fp-engine mpegdash-engine");
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json(r#"{"autoplay": true}"#).unwrap();
        assert!(config.autoplay);
        assert_eq!(config.surface_class, DEFAULT_SURFACE_CLASS);
    }

    #[test]
    fn test_base_url_from_json() {
        let config =
            EngineConfig::from_json(r#"{"base_url": "https://cdn.example.com/live/"}"#).unwrap();
        assert_eq!(
            config.base_url.unwrap().as_str(),
            "https://cdn.example.com/live/"
        );
    }

    #[test]
    fn test_rejects_empty_class() {
        let err = EngineConfig::from_json(r#"{"surface_class": "  "}"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = EngineConfig::from_json("{autoplay").unwrap_err();
        assert_eq!(err.error_code(), "JSON");
    }
}
