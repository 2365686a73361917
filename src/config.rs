pub mod settings;
pub mod user;

pub use settings::{BridgeConfig, Settings};
pub use user::{load_config_file, load_user_config, user_config_path};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            message: message.into(),
        }
    }
}

/// Resolve the effective settings.
///
/// An explicit path must exist; otherwise the user config is used when
/// present, falling back to defaults. The result is validated either way.
pub fn load_settings(explicit: Option<&Path>) -> ConfigResult<Settings> {
    let settings = match explicit {
        Some(path) => load_config_file(path)?,
        None => load_user_config()?.unwrap_or_default(),
    };
    settings.brain.validate()?;
    Ok(settings)
}
