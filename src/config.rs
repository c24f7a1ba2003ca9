//! Tracker Configuration
//!
//! Selects between tracking and pass-through behaviour at the composition
//! root, and names the sink a binary should build.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable enabling or disabling tracking.
pub const ENV_ENABLED: &str = "CALLTRACK_ENABLED";

/// Environment variable naming the sink.
pub const ENV_SINK: &str = "CALLTRACK_SINK";

/// Environment variable raising logged records to info level.
pub const ENV_LOG_INFO: &str = "CALLTRACK_LOG_INFO";

// =============================================================================
// Sink Kind
// =============================================================================

/// Telemetry sink backends a binary can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Records written through `tracing`
    #[default]
    Logging,
    /// Records kept in memory
    Memory,
    /// Records aggregated into Prometheus metrics
    Prometheus,
}

impl std::fmt::Display for SinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkKind::Logging => write!(f, "logging"),
            SinkKind::Memory => write!(f, "memory"),
            SinkKind::Prometheus => write!(f, "prometheus"),
        }
    }
}

impl std::str::FromStr for SinkKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "logging" | "log" => Ok(SinkKind::Logging),
            "memory" | "in-memory" => Ok(SinkKind::Memory),
            "prometheus" => Ok(SinkKind::Prometheus),
            other => Err(Error::Config(format!("unknown sink kind: {}", other))),
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for building a [`Tracker`](crate::tracking::Tracker)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Emit telemetry (false selects the pass-through tracker)
    pub enabled: bool,

    /// Sink backend
    pub sink: SinkKind,

    /// Log records at info level instead of debug
    pub log_info_level: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sink: SinkKind::Logging,
            log_info_level: false,
        }
    }
}

impl TrackerConfig {
    /// Read configuration from `CALLTRACK_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through a variable lookup, falling back to
    /// defaults for unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_ENABLED) {
            config.enabled = parse_flag(ENV_ENABLED, &value)?;
        }
        if let Some(value) = lookup(ENV_SINK) {
            config.sink = value.parse()?;
        }
        if let Some(value) = lookup(ENV_LOG_INFO) {
            config.log_info_level = parse_flag(ENV_LOG_INFO, &value)?;
        }

        Ok(config)
    }

    /// Apply command-line overrides on top of this configuration.
    ///
    /// Unset overrides leave the current value in place; `disable_tracking`
    /// can only turn tracking off.
    pub fn with_overrides(
        mut self,
        disable_tracking: bool,
        sink: Option<&str>,
        log_info_level: bool,
    ) -> Result<Self> {
        if disable_tracking {
            self.enabled = false;
        }
        if let Some(sink) = sink {
            self.sink = sink.parse()?;
        }
        if log_info_level {
            self.log_info_level = true;
        }
        Ok(self)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = TrackerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert!(config.enabled);
        assert_eq!(config.sink, SinkKind::Logging);
    }

    #[test]
    fn test_reads_variables() {
        let config = TrackerConfig::from_lookup(lookup(&[
            (ENV_ENABLED, "off"),
            (ENV_SINK, "Prometheus"),
            (ENV_LOG_INFO, "1"),
        ]))
        .unwrap();

        assert!(!config.enabled);
        assert_eq!(config.sink, SinkKind::Prometheus);
        assert!(config.log_info_level);
    }

    #[test]
    fn test_environment_disable_survives_without_overrides() {
        let config = TrackerConfig::from_lookup(lookup(&[(ENV_ENABLED, "false")]))
            .unwrap()
            .with_overrides(false, None, false)
            .unwrap();

        assert!(!config.enabled);
        assert_eq!(config.sink, SinkKind::Logging);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = TrackerConfig::from_lookup(lookup(&[
            (ENV_ENABLED, "true"),
            (ENV_SINK, "memory"),
        ]))
        .unwrap()
        .with_overrides(true, Some("prometheus"), true)
        .unwrap();

        assert!(!config.enabled);
        assert_eq!(config.sink, SinkKind::Prometheus);
        assert!(config.log_info_level);
    }

    #[test]
    fn test_override_rejects_unknown_sink() {
        assert_matches!(
            TrackerConfig::default().with_overrides(false, Some("kafka"), false),
            Err(Error::Config(_))
        );
    }

    #[test]
    fn test_rejects_bad_flag() {
        assert_matches!(
            TrackerConfig::from_lookup(lookup(&[(ENV_ENABLED, "maybe")])),
            Err(Error::Config(_))
        );
    }

    #[test]
    fn test_rejects_unknown_sink() {
        assert_matches!("kafka".parse::<SinkKind>(), Err(Error::Config(_)));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: TrackerConfig = serde_json::from_str(r#"{"sink":"memory"}"#).unwrap();
        assert!(config.enabled);
        assert_eq!(config.sink, SinkKind::Memory);
    }
}
