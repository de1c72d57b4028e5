//! Layered settings: defaults, optional file, then `ROCKET_*` environment

use std::path::Path;

use rocket_transform::RocketConfig;
use serde::{Deserialize, Serialize};

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Full CLI settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Transform parameters
    pub transform: RocketConfig,
    /// Logging parameters
    pub log: LogSettings,
}

/// Load settings, e.g. `ROCKET_TRANSFORM__NUM_KERNELS=2000`
pub fn load_settings(path: Option<&Path>) -> Result<Settings, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix("ROCKET")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
