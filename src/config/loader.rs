use crate::config::Config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const APP_DIR_NAME: &str = "event-permalinks";

/// Load configuration from a YAML file and validate its custom rules
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        serde_yaml::from_str(&content).with_context(|| "Failed to parse YAML config file")?;
    config.base_dir = path.parent().map(Path::to_path_buf);

    // Fail early on broken rules instead of at the first request.
    config.parse_rules()?;

    Ok(config)
}

/// `explicit` when given, else `./config.yaml`, else the per-user config
/// directory. `None` means built-in defaults.
pub fn find_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    let user = dirs::config_dir()?.join(APP_DIR_NAME).join(CONFIG_FILE_NAME);
    if user.exists() {
        debug!("Using user config file {}", user.display());
        return Some(user);
    }
    None
}

/// Configuration at `path`, or the defaults when there is no file.
pub fn load_or_default(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_config(path),
        None => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}
