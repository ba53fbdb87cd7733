//! Executor configuration loaded from TOML.
//!
//! Every field has a default so an empty document is a valid configuration.

use serde::Deserialize;
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("executor config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("executor config invalid: {0}")]
    Invalid(String),
}

///
/// ExecutorConfig
///
/// Per-site executor settings shared by every scan on that site.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutorConfig {
    pub progress: ProgressConfig,
    pub remote_probe: RemoteProbeConfig,
}

impl ExecutorConfig {
    /// Parse and validate one TOML document.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(src)?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.progress.report_interval == 0 {
            return Err(ConfigError::Invalid(
                "progress.report_interval must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

///
/// ProgressConfig
///

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ProgressConfig {
    /// Tuples processed between two progress reports.
    pub report_interval: u64,
}

impl ProgressConfig {
    pub const DEFAULT_REPORT_INTERVAL: u64 = 10_000;
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            report_interval: Self::DEFAULT_REPORT_INTERVAL,
        }
    }
}

///
/// RemoteProbeConfig
///
/// Diagnostic attribute fetch issued by the coordinator site before each
/// non-empty vertex scan. Disabled unless explicitly turned on.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteProbeConfig {
    pub enabled: bool,
    pub coordinator_site: u64,
    pub destination_host: u32,
    pub probe_count: usize,

    /// Attribute names to fetch; empty means every column.
    pub vertex_attributes: Vec<String>,
    pub edge_attributes: Vec<String>,
}

impl Default for RemoteProbeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            coordinator_site: 0,
            destination_host: 1,
            probe_count: 3,
            vertex_attributes: Vec::new(),
            edge_attributes: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ExecutorConfig::from_toml_str("").expect("empty config should parse");

        assert_eq!(config, ExecutorConfig::default());
        assert!(!config.remote_probe.enabled);
        assert_eq!(config.progress.report_interval, 10_000);
    }

    #[test]
    fn remote_probe_section_overrides_defaults() {
        let config = ExecutorConfig::from_toml_str(
            r#"
            [remote_probe]
            enabled = true
            destination_host = 4
            vertex_attributes = ["name"]
            "#,
        )
        .expect("probe config should parse");

        assert!(config.remote_probe.enabled);
        assert_eq!(config.remote_probe.destination_host, 4);
        assert_eq!(config.remote_probe.probe_count, 3);
        assert_eq!(config.remote_probe.vertex_attributes, vec!["name"]);
        assert!(config.remote_probe.edge_attributes.is_empty());
    }

    #[test]
    fn zero_report_interval_is_rejected() {
        let err = ExecutorConfig::from_toml_str("[progress]\nreport_interval = 0\n")
            .expect_err("zero interval must be rejected");

        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ExecutorConfig::from_toml_str("[progress]\nbogus = 1\n")
            .expect_err("unknown keys must be rejected");

        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
