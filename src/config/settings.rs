use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::{ConfigError, ConfigResult};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Top-level settings file layout.
///
/// ```toml
/// [brain]
/// enable = true
/// mcp_bin = "/opt/brain/bin/brain-mcp"
/// mcp_root = "/srv/brain"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub brain: BridgeConfig,
}

/// Configuration consumed by the bridge for one review.
///
/// Constructed once and passed by reference into the composer, the direct
/// queries and the façade. Nothing below those entry points looks settings up
/// on its own.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Master switch; a disabled bridge never spawns the binary
    pub enable: bool,
    /// Brain MCP server binary
    pub mcp_bin: PathBuf,
    /// Extra arguments passed to `mcp_bin`
    pub mcp_args: Vec<String>,
    /// Data root exported to the child as `BRAIN_ROOT`
    pub mcp_root: PathBuf,
    /// Per-call timeout, also bounding the handshake
    pub timeout_seconds: f64,
    /// Slice used when a caller does not name one
    pub default_slice: String,
    pub max_modules: usize,
    pub max_risks: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enable: false,
            mcp_bin: PathBuf::from("brain-mcp"),
            mcp_args: Vec::new(),
            mcp_root: PathBuf::from("."),
            timeout_seconds: DEFAULT_TIMEOUT_SECS as f64,
            default_slice: "runtime".to_string(),
            max_modules: 10,
            max_risks: 5,
        }
    }
}

impl BridgeConfig {
    /// Per-call timeout as a `Duration`.
    ///
    /// Values that are not a positive, representable duration fall back to
    /// the default.
    pub fn call_timeout(&self) -> Duration {
        self.timeout_duration()
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    fn timeout_duration(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.timeout_seconds)
            .ok()
            .filter(|timeout| !timeout.is_zero())
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.timeout_duration().is_none() {
            return Err(ConfigError::invalid(format!(
                "brain.timeout_seconds must be a positive number of seconds within range, got {}",
                self.timeout_seconds
            )));
        }
        if self.default_slice.trim().is_empty() {
            return Err(ConfigError::invalid("brain.default_slice must not be empty"));
        }
        if self.max_modules == 0 {
            return Err(ConfigError::invalid("brain.max_modules must be at least 1"));
        }
        if self.mcp_bin.as_os_str().is_empty() {
            return Err(ConfigError::invalid("brain.mcp_bin must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_keep_bridge_disabled() {
        let config = BridgeConfig::default();
        assert!(!config.enable);
        assert_eq!(config.default_slice, "runtime");
        assert_eq!(config.call_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_table_fills_remaining_fields_with_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [brain]
            enable = true
            mcp_bin = "/opt/brain/brain-mcp"
            max_risks = 3
            "#,
        )
        .unwrap();

        assert!(settings.brain.enable);
        assert_eq!(settings.brain.mcp_bin, PathBuf::from("/opt/brain/brain-mcp"));
        assert_eq!(settings.brain.max_risks, 3);
        assert_eq!(settings.brain.max_modules, 10);
        assert!(settings.brain.mcp_args.is_empty());
    }

    #[test]
    fn missing_brain_table_yields_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.brain, BridgeConfig::default());
    }

    #[test]
    fn fractional_timeout_is_honoured() {
        let config = BridgeConfig {
            timeout_seconds: 0.25,
            ..BridgeConfig::default()
        };
        assert_eq!(config.call_timeout(), Duration::from_millis(250));
    }

    #[rstest]
    #[case::zero_timeout(BridgeConfig { timeout_seconds: 0.0, ..BridgeConfig::default() }, "timeout_seconds")]
    #[case::negative_timeout(BridgeConfig { timeout_seconds: -1.0, ..BridgeConfig::default() }, "timeout_seconds")]
    #[case::nan_timeout(BridgeConfig { timeout_seconds: f64::NAN, ..BridgeConfig::default() }, "timeout_seconds")]
    #[case::overflowing_timeout(BridgeConfig { timeout_seconds: 1e30, ..BridgeConfig::default() }, "timeout_seconds")]
    #[case::sub_nanosecond_timeout(BridgeConfig { timeout_seconds: 1e-12, ..BridgeConfig::default() }, "timeout_seconds")]
    #[case::blank_slice(BridgeConfig { default_slice: "  ".into(), ..BridgeConfig::default() }, "default_slice")]
    #[case::no_modules(BridgeConfig { max_modules: 0, ..BridgeConfig::default() }, "max_modules")]
    #[case::empty_binary(BridgeConfig { mcp_bin: PathBuf::new(), ..BridgeConfig::default() }, "mcp_bin")]
    fn validate_rejects_out_of_range_values(#[case] config: BridgeConfig, #[case] field: &str) {
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains(field), "unexpected error: {}", error);
    }

    #[rstest]
    #[case::infinite(f64::INFINITY)]
    #[case::overflowing(1e30)]
    #[case::negative(-5.0)]
    fn invalid_timeout_falls_back_to_default_duration(#[case] timeout_seconds: f64) {
        let config = BridgeConfig {
            timeout_seconds,
            ..BridgeConfig::default()
        };
        assert_eq!(config.call_timeout(), Duration::from_secs(30));
    }
}
