//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the crate looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MATCHDAY_CONFIG_PATH";
/// Team name used in notification titles when none is configured.
const DEFAULT_TEAM_NAME: &str = "Camels";
/// Upper bound applied to each push transport call.
const DEFAULT_DISPATCH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    team_name: String,
    dispatch_timeout: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to
    /// built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        team = %app_config.team_name,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Team name prefixed to every notification title.
    pub fn team_name(&self) -> &str {
        &self.team_name
    }

    /// Bound applied to each push transport call before the batch is
    /// counted as fully failed.
    pub fn dispatch_timeout(&self) -> Duration {
        self.dispatch_timeout
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            team_name: DEFAULT_TEAM_NAME.to_owned(),
            dispatch_timeout: Duration::from_secs(DEFAULT_DISPATCH_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    team_name: Option<String>,
    dispatch_timeout_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            team_name: value.team_name.unwrap_or(defaults.team_name),
            dispatch_timeout: value
                .dispatch_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.dispatch_timeout),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
