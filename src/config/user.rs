//! User configuration loading for brain-bridge.
//!
//! User config location: $XDG_CONFIG_HOME/brain-bridge/brain-bridge.toml
//! Fallback: <platform config dir>/brain-bridge/brain-bridge.toml

use std::path::{Path, PathBuf};

use super::settings::Settings;
use super::{ConfigError, ConfigResult};

const APP_DIR: &str = "brain-bridge";
const CONFIG_FILE: &str = "brain-bridge.toml";

/// Returns the path to the user configuration file.
///
/// The path is determined by:
/// 1. If $XDG_CONFIG_HOME is set: $XDG_CONFIG_HOME/brain-bridge/brain-bridge.toml
/// 2. Otherwise: `dirs::config_dir()`/brain-bridge/brain-bridge.toml
///
/// Returns None if no config directory can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    if let Some(xdg_config) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(xdg_config).join(APP_DIR).join(CONFIG_FILE));
    }

    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Load the user configuration file, if there is one.
///
/// A missing file is not an error and yields `Ok(None)`.
pub fn load_user_config() -> ConfigResult<Option<Settings>> {
    let Some(path) = user_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        log::debug!(
            target: "brain_bridge::config",
            "No user config at {}",
            path.display()
        );
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}

/// Parse a settings file at an explicit path.
pub fn load_config_file(path: &Path) -> ConfigResult<Settings> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: Settings = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!(
        target: "brain_bridge::config",
        "Loaded config from {}",
        path.display()
    );
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn with_xdg_config_home<T>(value: Option<&Path>, f: impl FnOnce() -> T) -> T {
        let original = env::var_os("XDG_CONFIG_HOME");
        // SAFETY: every test touching XDG_CONFIG_HOME is #[serial]
        unsafe {
            match value {
                Some(v) => env::set_var("XDG_CONFIG_HOME", v),
                None => env::remove_var("XDG_CONFIG_HOME"),
            }
        }
        let result = f();
        // SAFETY: same as above - restoring original env state
        unsafe {
            match original {
                Some(v) => env::set_var("XDG_CONFIG_HOME", v),
                None => env::remove_var("XDG_CONFIG_HOME"),
            }
        }
        result
    }

    #[test]
    #[serial]
    fn user_config_path_uses_xdg_config_home_when_set() {
        let path = with_xdg_config_home(Some(Path::new("/custom/config")), user_config_path);

        assert_eq!(
            path,
            Some(PathBuf::from("/custom/config/brain-bridge/brain-bridge.toml")),
            "should use XDG_CONFIG_HOME/brain-bridge/brain-bridge.toml"
        );
    }

    #[test]
    #[serial]
    fn load_user_config_returns_none_when_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = with_xdg_config_home(Some(dir.path()), load_user_config).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    #[serial]
    fn load_user_config_reads_brain_table() {
        let dir = tempfile::tempdir().unwrap();
        let app_dir = dir.path().join(APP_DIR);
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(
            app_dir.join(CONFIG_FILE),
            "[brain]\nenable = true\ndefault_slice = \"api\"\n",
        )
        .unwrap();

        let loaded = with_xdg_config_home(Some(dir.path()), load_user_config)
            .unwrap()
            .expect("config file should be found");

        assert!(loaded.brain.enable);
        assert_eq!(loaded.brain.default_slice, "api");
    }

    #[test]
    fn load_config_file_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[brain\nenable = ").unwrap();

        let error = load_config_file(&path).unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
        assert!(error.to_string().contains("broken.toml"));
    }

    #[test]
    fn load_config_file_reports_missing_file() {
        let error = load_config_file(Path::new("/nonexistent/brain-bridge.toml")).unwrap_err();
        assert!(matches!(error, ConfigError::Io { .. }));
    }
}
